use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::services::CommentService;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub comments: Arc<CommentService>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, regex::Error> {
        let config = Arc::new(config);
        let comments = Arc::new(CommentService::new(Arc::clone(&config))?);
        Ok(Self { config, comments })
    }
}

/// Raw submitted form, field name to value
pub type FormFields = HashMap<String, String>;

/// Value of a form field, empty when the field was not sent
pub fn form_value<'a>(form: &'a FormFields, field: &str) -> &'a str {
    form.get(field).map(String::as_str).unwrap_or("")
}

/// First failing validation rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub field: &'static str,
    pub message: &'static str,
}

impl ValidationFailure {
    pub fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// A validated comment as written to disk. The raw email is never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub name: String,
    pub email_md5: String,
    pub email_md5_salted: String,
    pub website: String,
    pub avatar_type: String,
    #[serde(rename = "ipv4Address")]
    pub ip_address: String,
    pub page_id: String,
    pub body: String,
    pub timestamp: String,
}

/// Body of every reply from the comment endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub message: String,
    pub is_error: bool,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { message: message.into(), is_error: false }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { message: message.into(), is_error: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_uses_published_field_names() {
        let comment = Comment {
            name: "Jane".into(),
            email_md5: "a".into(),
            email_md5_salted: "b".into(),
            website: String::new(),
            avatar_type: "gravatar".into(),
            ip_address: "127.0.0.1".into(),
            page_id: "posts/hello".into(),
            body: "hi".into(),
            timestamp: "2024-01-02T03:04:05Z".into(),
        };
        let value = serde_json::to_value(&comment).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            [
                "avatarType",
                "body",
                "emailMd5",
                "emailMd5Salted",
                "ipv4Address",
                "name",
                "pageId",
                "timestamp",
                "website"
            ]
        );
    }

    #[test]
    fn api_response_shape() {
        let json = serde_json::to_string(&ApiResponse::error("Must be POST")).unwrap();
        assert_eq!(json, r#"{"message":"Must be POST","isError":true}"#);
    }
}
