use std::path::{Path, PathBuf};

use clap::Parser;
use time::UtcOffset;

/// Command line flags, read once at startup
#[derive(Debug, Parser)]
#[command(name = "commentdrop", version, about = "Saves posted comments as JSON files for a static site")]
pub struct CliArgs {
    /// Full path to the site sources
    #[arg(long = "src", env = "COMMENTDROP_SRC", default_value = ".")]
    pub src: PathBuf,

    /// Content directory, relative to the sources
    #[arg(long, env = "COMMENTDROP_CONTENT", default_value = "content")]
    pub content: PathBuf,

    /// Directory the comments are saved to, relative to the sources
    #[arg(long, env = "COMMENTDROP_COMMENTS", default_value = "comments")]
    pub comments: PathBuf,

    /// File updated whenever a new comment directory is created, relative to the sources
    #[arg(long, env = "COMMENTDROP_TOUCH", default_value = "")]
    pub touch: String,

    /// Address to listen on; empty means any address
    #[arg(long, env = "COMMENTDROP_ADDRESS", default_value = "")]
    pub address: String,

    /// Port to listen on
    #[arg(long, env = "COMMENTDROP_PORT", default_value_t = 8080)]
    pub port: u16,

    /// URL path that accepts comments
    #[arg(long, env = "COMMENTDROP_PATH", default_value = "/comment")]
    pub path: String,

    /// Salt for the anonymised email hash
    #[arg(long, env = "COMMENTDROP_SALT", default_value = "")]
    pub salt: String,

    /// Serve a test form on GET /new
    #[arg(long)]
    pub demo_form: bool,
}

impl CliArgs {
    pub fn into_config(self) -> Config {
        let touch = if self.touch.is_empty() { None } else { Some(PathBuf::from(self.touch)) };
        Config::with_custom(
            self.src,
            &self.content,
            &self.comments,
            touch.as_deref(),
            self.salt,
            Some(self.address),
            Some(self.port),
            Some(self.path),
        )
        .with_demo_form(self.demo_form)
    }
}

/// Application configuration, immutable once built
#[derive(Debug, Clone)]
pub struct Config {
    pub base_dir: PathBuf,
    pub content_dir: PathBuf,
    pub comments_dir: PathBuf,
    pub touch_file: Option<PathBuf>,
    pub salt: String,
    pub host: String,
    pub port: u16,
    pub endpoint: String,
    pub demo_form: bool,
    /// Offset used for comment timestamps and file names
    pub utc_offset: UtcOffset,
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::with_custom(
            PathBuf::from("."),
            Path::new("content"),
            Path::new("comments"),
            None,
            String::new(),
            None,
            None,
            None,
        )
    }

    /// Create configuration with custom values; directories are joined onto `base_dir`
    #[allow(clippy::too_many_arguments)]
    pub fn with_custom(
        base_dir: PathBuf,
        content: &Path,
        comments: &Path,
        touch: Option<&Path>,
        salt: String,
        host: Option<String>,
        port: Option<u16>,
        endpoint: Option<String>,
    ) -> Self {
        let endpoint = endpoint.unwrap_or_else(|| "/comment".to_string());
        Self {
            content_dir: base_dir.join(content),
            comments_dir: base_dir.join(comments),
            touch_file: touch.map(|t| base_dir.join(t)),
            base_dir,
            salt,
            host: host.filter(|h| !h.is_empty()).unwrap_or_else(|| "0.0.0.0".to_string()),
            port: port.unwrap_or(8080),
            endpoint: normalize_endpoint(&endpoint),
            demo_form: false,
            utc_offset: UtcOffset::UTC,
        }
    }

    pub fn with_demo_form(mut self, enabled: bool) -> Self {
        self.demo_form = enabled;
        self
    }

    pub fn with_utc_offset(mut self, offset: UtcOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    /// Host and port for binding the listener
    pub fn bind_addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_endpoint(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let config = CliArgs::parse_from(["commentdrop"]).into_config();
        assert_eq!(config.content_dir, PathBuf::from("./content"));
        assert_eq!(config.comments_dir, PathBuf::from("./comments"));
        assert_eq!(config.touch_file, None);
        assert_eq!(config.bind_addr(), ("0.0.0.0", 8080));
        assert_eq!(config.endpoint, "/comment");
        assert!(!config.demo_form);
        assert_eq!(config.utc_offset, UtcOffset::UTC);
    }

    #[test]
    fn directories_resolve_against_src() {
        let config = CliArgs::parse_from([
            "commentdrop",
            "--src",
            "/srv/site",
            "--comments",
            "data/comments",
            "--touch",
            ".comment",
            "--address",
            "127.0.0.1",
            "--port",
            "9000",
            "--path",
            "api/comment",
        ])
        .into_config();
        assert_eq!(config.content_dir, PathBuf::from("/srv/site/content"));
        assert_eq!(config.comments_dir, PathBuf::from("/srv/site/data/comments"));
        assert_eq!(config.touch_file, Some(PathBuf::from("/srv/site/.comment")));
        assert_eq!(config.bind_addr(), ("127.0.0.1", 9000));
        assert_eq!(config.endpoint, "/api/comment");
    }

    #[test]
    fn utc_offset_is_kept() {
        let offset = UtcOffset::from_hms(2, 0, 0).unwrap();
        let config = Config::new().with_utc_offset(offset);
        assert_eq!(config.utc_offset, offset);
    }
}
