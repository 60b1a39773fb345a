use regex::Regex;
use time::OffsetDateTime;

const MAX_WORDS: usize = 7;
const MAX_SLUG_LEN: usize = 32;

/// Derives human readable comment file names from the comment itself
#[derive(Debug, Clone)]
pub struct FilenameBuilder {
    words: Regex,
}

impl FilenameBuilder {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self { words: Regex::new("[A-Za-z]+")? })
    }

    /// `<timestamp>-<first words>.json`, or `<timestamp>.json` when name
    /// and body hold no letters.
    pub fn build_filename(&self, name: &str, body: &str, now: OffsetDateTime) -> String {
        let words = self.first_words(&format!("{} {}", name, body));
        let timestamp = build_timestamp(now);
        if words.is_empty() {
            format!("{}.json", timestamp)
        } else {
            format!("{}-{}.json", timestamp, words)
        }
    }

    /// Up to seven lowercased ASCII words joined with hyphens, at most 32 bytes
    pub fn first_words(&self, text: &str) -> String {
        let words: Vec<String> = self
            .words
            .find_iter(text)
            .take(MAX_WORDS)
            .map(|m| m.as_str().to_ascii_lowercase())
            .collect();
        let mut joined = words.join("-");
        // ASCII only, so any byte index is a char boundary
        joined.truncate(MAX_SLUG_LEN);
        joined.trim_end_matches([' ', '-']).to_string()
    }
}

/// `YYYY-M-D-HHMMSS`, date parts unpadded
pub fn build_timestamp(now: OffsetDateTime) -> String {
    format!(
        "{}-{}-{}-{:02}{:02}{:02}",
        now.year(),
        u8::from(now.month()),
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}
