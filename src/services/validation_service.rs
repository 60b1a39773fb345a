use std::path::Path;

use log::debug;
use regex::Regex;

use crate::types::{form_value, FormFields, ValidationFailure};

const MAX_NAME: usize = 128;
const MAX_EMAIL: usize = 128;
const MAX_WEBSITE: usize = 128;
const MAX_AVATAR_TYPE: usize = 32;
const MAX_PAGE_ID: usize = 1024;
const MAX_CONTENT_TYPE: usize = 4;
const MAX_BODY: usize = 8192;

/// Checks submitted comment fields. Patterns are compiled once and the
/// validator holds no other state, so one instance serves every request.
#[derive(Debug, Clone)]
pub struct CommentValidator {
    name: Regex,
    email: Regex,
    website: Regex,
    lowercase_word: Regex,
    page_id: Regex,
}

impl CommentValidator {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            name: Regex::new(r"^[A-Za-z0-9_\s-]+$")?,
            email: Regex::new(r"^[A-Za-z0-9_.+-]+@[A-Za-z0-9_.+-]+$")?,
            website: Regex::new(r"^(?i-u:https?://)?[A-Za-z0-9.-]+(:[0-9]+)?(/\S*)?$")?,
            lowercase_word: Regex::new(r"^[a-z]+$")?,
            page_id: Regex::new(r"^[a-z0-9-]+(/[a-z0-9-]+)*$")?,
        })
    }

    /// Returns the first rule the form breaks, checked in a fixed order.
    pub fn validate(&self, form: &FormFields, content_dir: &Path) -> Result<(), ValidationFailure> {
        if !form_value(form, "last_name").is_empty() {
            return Err(ValidationFailure::new(
                "last_name",
                "You appear to be a spammer, or your browser auto-fills this form.",
            ));
        }

        let name = form_value(form, "name");
        if too_long(name, MAX_NAME) || !self.name.is_match(name) {
            return Err(ValidationFailure::new("name", "Name is not valid"));
        }

        let email = form_value(form, "email");
        if too_long(email, MAX_EMAIL) || !self.email.is_match(email) {
            return Err(ValidationFailure::new("email", "Email address is not valid"));
        }

        let website = form_value(form, "website");
        if too_long(website, MAX_WEBSITE) || (!website.is_empty() && !self.website.is_match(website)) {
            return Err(ValidationFailure::new("website", "Website is not valid"));
        }

        let avatar_type = form_value(form, "avatar_type");
        if too_long(avatar_type, MAX_AVATAR_TYPE) || !self.lowercase_word.is_match(avatar_type) {
            return Err(ValidationFailure::new("avatar_type", "Avatar type is not valid"));
        }

        let page_id = form_value(form, "page_id");
        if too_long(page_id, MAX_PAGE_ID) || !self.page_id.is_match(page_id) {
            return Err(ValidationFailure::new("page_id", "page_id is not valid"));
        }

        let content_type = form_value(form, "content_type");
        if too_long(content_type, MAX_CONTENT_TYPE) || !self.lowercase_word.is_match(content_type) {
            return Err(ValidationFailure::new("content_type", "Content type is not valid"));
        }

        let body = form_value(form, "body");
        if body.is_empty() || too_long(body, MAX_BODY) {
            return Err(ValidationFailure::new("body", "You forgot to write the actual comment!"));
        }

        if !page_exists(content_dir, page_id, content_type) {
            return Err(ValidationFailure::new("page_id", "Specified post does not exist"));
        }

        Ok(())
    }
}

fn too_long(value: &str, max: usize) -> bool {
    value.chars().count() > max
}

/// `content_dir/page_id.content_type` must exist
pub fn page_exists(content_dir: &Path, page_id: &str, content_type: &str) -> bool {
    let page = content_dir.join(format!("{}.{}", page_id, content_type));
    let exists = page.exists();
    debug!("Page exists check: {:?} -> {}", page, exists);
    exists
}
