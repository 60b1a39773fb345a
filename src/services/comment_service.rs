use std::path::PathBuf;
use std::sync::Arc;

use log::debug;
use md5::{Digest, Md5};
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

use crate::config::Config;
use crate::errors::CommentError;
use crate::services::body_service::process_body;
use crate::services::filename_service::FilenameBuilder;
use crate::services::store_service::CommentStore;
use crate::services::validation_service::CommentValidator;
use crate::types::{form_value, Comment, FormFields};

/// Peer address recorded when the connection does not provide one
pub const UNKNOWN_ADDRESS: &str = "Unknown";

/// Validates, converts and stores one submitted comment at a time.
/// Holds only read-only state, so a single instance serves all requests.
#[derive(Debug)]
pub struct CommentService {
    config: Arc<Config>,
    validator: CommentValidator,
    filenames: FilenameBuilder,
    store: CommentStore,
}

impl CommentService {
    pub fn new(config: Arc<Config>) -> Result<Self, regex::Error> {
        let store = CommentStore::new(config.comments_dir.clone(), config.touch_file.clone());
        Ok(Self {
            validator: CommentValidator::new()?,
            filenames: FilenameBuilder::new()?,
            store,
            config,
        })
    }

    /// Save a submission received now; returns the path of the new file
    pub fn submit(&self, form: &FormFields, peer: Option<&str>) -> Result<PathBuf, CommentError> {
        self.submit_at(form, peer, now_in(self.config.utc_offset))
    }

    pub fn submit_at(
        &self,
        form: &FormFields,
        peer: Option<&str>,
        now: OffsetDateTime,
    ) -> Result<PathBuf, CommentError> {
        self.validator.validate(form, &self.config.content_dir)?;

        let comment = self.build_comment(form, peer, now)?;
        let json = serde_json::to_vec(&comment)?;
        let filename = self.filenames.build_filename(&comment.name, &comment.body, now);
        debug!("Storing comment for {:?} as {}", comment.page_id, filename);
        self.store.save(&comment.page_id, &filename, &json)
    }

    /// Only call with a form that passed validation
    fn build_comment(
        &self,
        form: &FormFields,
        peer: Option<&str>,
        now: OffsetDateTime,
    ) -> Result<Comment, CommentError> {
        let email = form_value(form, "email");
        Ok(Comment {
            name: form_value(form, "name").to_string(),
            email_md5: md5_hex(email, ""),
            email_md5_salted: md5_hex(email, &self.config.salt),
            website: form_value(form, "website").to_string(),
            avatar_type: form_value(form, "avatar_type").to_string(),
            ip_address: peer.unwrap_or(UNKNOWN_ADDRESS).to_string(),
            page_id: form_value(form, "page_id").to_string(),
            body: process_body(form_value(form, "body")),
            timestamp: now.format(&Rfc3339)?,
        })
    }
}

/// Lowercase hex MD5 of `value` followed by `salt`, used for avatar lookups
pub fn md5_hex(value: &str, salt: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(value.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

/// Current time at the configured offset
pub fn now_in(offset: UtcOffset) -> OffsetDateTime {
    OffsetDateTime::now_utc().to_offset(offset)
}
