use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequest, Multipart, Query, Request, State},
    http::{header, Method},
    response::Html,
    Form, Json,
};
use log::{debug, info, warn};

use crate::errors::CommentError;
use crate::templates::render_comment_form;
use crate::types::{ApiResponse, AppState, FormFields};

pub const THANK_YOU: &str = "Thank you for the comment";

/// Handle a comment submission. Every method is routed here so that
/// anything but POST gets the JSON error reply instead of a bare 405.
pub async fn handle_comment(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    request: Request,
) -> Result<Json<ApiResponse>, CommentError> {
    if request.method() != Method::POST {
        warn!("Rejected {} request to {}", request.method(), request.uri().path());
        return Err(CommentError::MethodNotAllowed);
    }

    let peer = peer.map(|ConnectInfo(addr)| addr.ip().to_string());
    debug!("Comment submission from {:?}", peer);

    let form = read_form(request, &state).await?;

    match state.comments.submit(&form, peer.as_deref()) {
        Ok(path) => {
            info!("Accepted comment from {} as {:?}", peer.as_deref().unwrap_or("unknown peer"), path);
            Ok(Json(ApiResponse::ok(THANK_YOU)))
        }
        Err(CommentError::Rejected(failure)) => {
            warn!("Rejected comment, {}: {}", failure.field, failure.message);
            Err(CommentError::Rejected(failure))
        }
        Err(e) => Err(e),
    }
}

/// Serve the test form
pub async fn handle_comment_form(State(state): State<AppState>) -> Html<String> {
    Html(render_comment_form(&state.config.endpoint))
}

/// Decode an urlencoded or multipart body into a field map, then add fields
/// from the query string. For repeated fields the first value wins, so
/// body values take precedence.
async fn read_form(request: Request, state: &AppState) -> Result<FormFields, CommentError> {
    let Query(query) = Query::<Vec<(String, String)>>::try_from_uri(request.uri())
        .map_err(|e| CommentError::BadForm(e.body_text()))?;
    let mut form = read_body_fields(request, state).await?;
    for (name, value) in query {
        form.entry(name).or_insert(value);
    }
    Ok(form)
}

async fn read_body_fields(request: Request, state: &AppState) -> Result<FormFields, CommentError> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false);

    if !is_multipart {
        let Form(pairs) = Form::<Vec<(String, String)>>::from_request(request, state)
            .await
            .map_err(|e| CommentError::BadForm(e.body_text()))?;
        let mut form = FormFields::new();
        for (name, value) in pairs {
            form.entry(name).or_insert(value);
        }
        return Ok(form);
    }

    let mut multipart = Multipart::from_request(request, state)
        .await
        .map_err(|e| CommentError::BadForm(e.body_text()))?;
    let mut form = FormFields::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| CommentError::BadForm(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let value = field.text().await.map_err(|e| CommentError::BadForm(e.body_text()))?;
        form.entry(name).or_insert(value);
    }
    Ok(form)
}
