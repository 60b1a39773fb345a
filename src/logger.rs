use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use log::{Level, LevelFilter, Log, Metadata, Record};
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// `log` backend: coloured lines on stderr, plain lines in an optional file
pub struct Logger {
    pub severity: Level,
    pub file: Option<Arc<Mutex<File>>>,
    pub enable_colors: bool,
    pub utc_offset: UtcOffset,
}

impl Logger {
    pub fn new(
        file_path: Option<PathBuf>,
        severity: Option<Level>,
        enable_colors: bool,
        utc_offset: UtcOffset,
    ) -> Self {
        let file = file_path.and_then(|path| {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
                .map(|f| Arc::new(Mutex::new(f)))
        });

        Logger {
            severity: severity.unwrap_or(Level::Info),
            file,
            enable_colors,
            utc_offset,
        }
    }

    fn timestamp(&self) -> String {
        let now = OffsetDateTime::now_utc().to_offset(self.utc_offset);
        now.format(format_description!("[hour]:[minute]:[second]"))
            .unwrap_or_default()
    }

    fn color(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1b[31m",
            Level::Warn => "\x1b[33m",
            Level::Info => "\x1b[36m",
            Level::Debug => "\x1b[35m",
            Level::Trace => "\x1b[37m",
        }
    }

    /// Install from `COMMENTDROP_LOG` (or `RUST_LOG`), `COMMENTDROP_LOG_FILE` and `NO_COLOR`
    pub fn init(utc_offset: UtcOffset) -> Result<(), log::SetLoggerError> {
        let severity = std::env::var("COMMENTDROP_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string())
            .parse::<Level>()
            .unwrap_or(Level::Info);
        let file_path = std::env::var_os("COMMENTDROP_LOG_FILE").map(PathBuf::from);
        let enable_colors = std::env::var_os("NO_COLOR").is_none();

        let logger = Logger::new(file_path, Some(severity), enable_colors, utc_offset);
        log::set_max_level(LevelFilter::Trace);
        log::set_logger(Box::leak(Box::new(logger)))
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.severity
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp = self.timestamp();
        let level = record.level();
        let args = record.args();

        let line = if self.enable_colors {
            format!("{}[{timestamp}] {level}\x1b[0m {args}\n", Self::color(level))
        } else {
            format!("[{timestamp}] {level} {args}\n")
        };
        let _ = std::io::stderr().write_all(line.as_bytes());

        if let Some(file) = &self.file {
            if let Ok(mut guard) = file.lock() {
                let _ = writeln!(guard, "[{timestamp}] {level} {args}");
            }
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
        if let Some(file) = &self.file {
            if let Ok(mut guard) = file.lock() {
                let _ = guard.flush();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_plain_lines_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs/commentdrop.log");
        let logger = Logger::new(Some(path.clone()), Some(Level::Info), true, UtcOffset::UTC);

        logger.log(&Record::builder().level(Level::Info).args(format_args!("saved")).build());
        logger.log(&Record::builder().level(Level::Debug).args(format_args!("hidden")).build());
        logger.flush();

        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains("INFO saved"));
        assert!(!contents.contains("hidden"));
        assert!(!contents.contains('\x1b'));
    }
}
