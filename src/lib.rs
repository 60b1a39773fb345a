//! Commentdrop - saves visitor comments as JSON files for static sites
//!
//! A single POST endpoint validates a submitted form, escapes the comment
//! body and writes it below `<comments>/<page id>/`, where a site generator
//! can pick it up on its next build.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod logger;
pub mod services;
pub mod templates;
pub mod types;

use axum::{
    routing::{any, get},
    Router,
};

pub use config::{CliArgs, Config};
pub use errors::CommentError;
pub use services::{CommentService, CommentStore, CommentValidator, FilenameBuilder};
pub use types::{ApiResponse, AppState, Comment, FormFields, ValidationFailure};

/// Path of the test form page
pub const DEMO_FORM_PATH: &str = "/new";

/// Build the router for the comment endpoint (and the test form when enabled)
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new().route(&state.config.endpoint, any(handlers::handle_comment));
    if state.config.demo_form && state.config.endpoint != DEMO_FORM_PATH {
        router = router.route(DEMO_FORM_PATH, get(handlers::handle_comment_form));
    }
    router.with_state(state)
}
