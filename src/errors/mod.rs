use std::fmt;
use std::io;
use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::types::{ApiResponse, ValidationFailure};

pub const MUST_BE_POST: &str = "Must be POST";
pub const SAVE_FAILED: &str = "Could not save the comment";

/// Everything that can stop a comment from being saved
#[derive(Debug)]
pub enum CommentError {
    MethodNotAllowed,
    BadForm(String),
    Rejected(ValidationFailure),
    CreateDir { path: PathBuf, source: io::Error },
    Write { path: PathBuf, source: io::Error },
    Touch { path: PathBuf, source: io::Error },
    Serialize(serde_json::Error),
    Timestamp(time::error::Format),
}

impl CommentError {
    pub fn status(&self) -> StatusCode {
        match self {
            CommentError::MethodNotAllowed | CommentError::BadForm(_) | CommentError::Rejected(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the visitor; server side details stay in the log
    pub fn public_message(&self) -> String {
        match self {
            CommentError::MethodNotAllowed => MUST_BE_POST.to_string(),
            CommentError::BadForm(msg) => msg.clone(),
            CommentError::Rejected(failure) => failure.message.to_string(),
            _ => SAVE_FAILED.to_string(),
        }
    }
}

impl fmt::Display for CommentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommentError::MethodNotAllowed => write!(f, "{}", MUST_BE_POST),
            CommentError::BadForm(msg) => write!(f, "malformed form: {}", msg),
            CommentError::Rejected(failure) => {
                write!(f, "invalid {}: {}", failure.field, failure.message)
            }
            CommentError::CreateDir { path, source } => {
                write!(f, "failed to create directory {:?}: {}", path, source)
            }
            CommentError::Write { path, source } => {
                write!(f, "failed to write comment {:?}: {}", path, source)
            }
            CommentError::Touch { path, source } => {
                write!(f, "failed to update touch file {:?}: {}", path, source)
            }
            CommentError::Serialize(e) => write!(f, "JSON error: {}", e),
            CommentError::Timestamp(e) => write!(f, "timestamp error: {}", e),
        }
    }
}

impl std::error::Error for CommentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommentError::CreateDir { source, .. }
            | CommentError::Write { source, .. }
            | CommentError::Touch { source, .. } => Some(source),
            CommentError::Serialize(e) => Some(e),
            CommentError::Timestamp(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CommentError {
    fn from(err: serde_json::Error) -> Self {
        CommentError::Serialize(err)
    }
}

impl From<time::error::Format> for CommentError {
    fn from(err: time::error::Format) -> Self {
        CommentError::Timestamp(err)
    }
}

impl From<ValidationFailure> for CommentError {
    fn from(failure: ValidationFailure) -> Self {
        CommentError::Rejected(failure)
    }
}

impl IntoResponse for CommentError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{}", self);
        }
        (status, Json(ApiResponse::error(self.public_message()))).into_response()
    }
}
