use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, error, info};

use crate::errors::CommentError;

/// Attempts at finding a free file name before giving up
const MAX_NAME_ATTEMPTS: u32 = 99;

/// Writes comment files below the comments directory
#[derive(Debug, Clone)]
pub struct CommentStore {
    comments_dir: PathBuf,
    touch_file: Option<PathBuf>,
}

impl CommentStore {
    pub fn new(comments_dir: PathBuf, touch_file: Option<PathBuf>) -> Self {
        debug!("Creating CommentStore in {:?} (touch file: {:?})", comments_dir, touch_file);
        Self { comments_dir, touch_file }
    }

    /// Directory holding the comments of one page
    pub fn page_dir(&self, page_id: &str) -> PathBuf {
        self.comments_dir.join(page_id)
    }

    /// Write `json` as `filename` in the page's directory and return the final path.
    ///
    /// The file is created exclusively with owner-only permissions; if the
    /// name is taken a `-2`, `-3`, ... suffix is added. A file that could not
    /// be written completely is removed again. The touch file is rewritten
    /// only when this call had to create the page directory; failing to
    /// touch it is logged but does not fail the save.
    pub fn save(&self, page_id: &str, filename: &str, json: &[u8]) -> Result<PathBuf, CommentError> {
        let dir = self.page_dir(page_id);
        let created = ensure_dir(&dir)?;

        let path = write_exclusive(&dir, filename, json)?;
        info!("Saved comment {:?}", path);

        if created {
            if let Some(touch) = &self.touch_file {
                if let Err(e) = touch_change_file(touch) {
                    error!("{}", e);
                }
            }
        }
        Ok(path)
    }
}

/// Create `dir` and its parents; true when it did not exist before
fn ensure_dir(dir: &Path) -> Result<bool, CommentError> {
    if dir.is_dir() {
        return Ok(false);
    }
    debug!("Creating comment directory {:?}", dir);
    fs::create_dir_all(dir).map_err(|source| {
        error!("Failed to create directory {:?}: {}", dir, source);
        CommentError::CreateDir { path: dir.to_path_buf(), source }
    })?;
    Ok(true)
}

fn write_exclusive(dir: &Path, filename: &str, json: &[u8]) -> Result<PathBuf, CommentError> {
    let (stem, ext) = match filename.rsplit_once('.') {
        Some((stem, ext)) => (stem, format!(".{}", ext)),
        None => (filename, String::new()),
    };

    for attempt in 1..=MAX_NAME_ATTEMPTS {
        let path = if attempt == 1 {
            dir.join(filename)
        } else {
            dir.join(format!("{}-{}{}", stem, attempt, ext))
        };
        match create_private(&path, true) {
            Ok(mut file) => {
                let written = file.write_all(json).and_then(|_| file.sync_all());
                drop(file);
                discard_on_failure(&path, written)?;
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!("{:?} already exists, trying another name", path);
            }
            Err(source) => return Err(CommentError::Write { path, source }),
        }
    }

    Err(CommentError::Write {
        path: dir.join(filename),
        source: io::Error::new(io::ErrorKind::AlreadyExists, "no free file name left"),
    })
}

/// Remove a partly written comment so the site never reads a truncated file
fn discard_on_failure(path: &Path, written: io::Result<()>) -> Result<(), CommentError> {
    let Err(source) = written else {
        return Ok(());
    };
    error!("Failed to write comment {:?}: {}", path, source);
    if let Err(e) = fs::remove_file(path) {
        error!("Failed to remove partial comment {:?}: {}", path, e);
    }
    Err(CommentError::Write { path: path.to_path_buf(), source })
}

/// Overwrite the touch file with a single byte so watchers see a new mtime
fn touch_change_file(path: &Path) -> Result<(), CommentError> {
    debug!("Touching {:?}", path);
    create_private(path, false)
        .and_then(|mut file| file.write_all(b"."))
        .map_err(|source| CommentError::Touch { path: path.to_path_buf(), source })
}

fn create_private(path: &Path, exclusive: bool) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true);
    if exclusive {
        options.create_new(true);
    } else {
        options.create(true).truncate(true);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(root: &TempDir) -> CommentStore {
        CommentStore::new(root.path().join("comments"), Some(root.path().join(".comment")))
    }

    #[test]
    fn writes_into_nested_page_dir() {
        let root = TempDir::new().unwrap();
        let path = store(&root).save("posts/hello", "a.json", b"{}").unwrap();
        assert_eq!(path, root.path().join("comments/posts/hello/a.json"));
        assert_eq!(fs::read(&path).unwrap(), b"{}");
    }

    #[cfg(unix)]
    #[test]
    fn comment_files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let root = TempDir::new().unwrap();
        let path = store(&root).save("page", "a.json", b"{}").unwrap();
        let mode = fs::metadata(path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn touch_only_when_directory_is_new() {
        let root = TempDir::new().unwrap();
        let store = store(&root);
        let touch = root.path().join(".comment");

        store.save("page", "a.json", b"{}").unwrap();
        assert_eq!(fs::read(&touch).unwrap(), b".");

        fs::remove_file(&touch).unwrap();
        store.save("page", "b.json", b"{}").unwrap();
        assert!(!touch.exists());

        store.save("other", "a.json", b"{}").unwrap();
        assert!(touch.exists());
    }

    #[test]
    fn no_touch_file_configured() {
        let root = TempDir::new().unwrap();
        let store = CommentStore::new(root.path().join("comments"), None);
        store.save("page", "a.json", b"{}").unwrap();
        assert!(!root.path().join(".comment").exists());
    }

    #[test]
    fn taken_names_get_a_suffix() {
        let root = TempDir::new().unwrap();
        let store = store(&root);
        let first = store.save("page", "2024-1-2-030405-hi.json", b"1").unwrap();
        let second = store.save("page", "2024-1-2-030405-hi.json", b"2").unwrap();
        let third = store.save("page", "2024-1-2-030405-hi.json", b"3").unwrap();
        assert_eq!(first.file_name().unwrap(), "2024-1-2-030405-hi.json");
        assert_eq!(second.file_name().unwrap(), "2024-1-2-030405-hi-2.json");
        assert_eq!(third.file_name().unwrap(), "2024-1-2-030405-hi-3.json");
        assert_eq!(fs::read(first).unwrap(), b"1");
    }

    #[test]
    fn directory_failure_is_reported() {
        let root = TempDir::new().unwrap();
        let comments = root.path().join("comments");
        fs::write(&comments, "not a directory").unwrap();
        let store = CommentStore::new(comments, None);
        let err = store.save("page", "a.json", b"{}").unwrap_err();
        assert!(matches!(err, CommentError::CreateDir { .. }));
    }

    #[test]
    fn touch_failure_keeps_the_comment() {
        let root = TempDir::new().unwrap();
        let store = CommentStore::new(
            root.path().join("comments"),
            Some(root.path().join("missing/dir/.comment")),
        );
        let path = store.save("page", "a.json", b"{}").unwrap();
        assert_eq!(fs::read(path).unwrap(), b"{}");
        assert!(!root.path().join("missing").exists());
    }

    #[test]
    fn touch_error_names_the_file() {
        let root = TempDir::new().unwrap();
        let touch = root.path().join("missing/.comment");
        let err = touch_change_file(&touch).unwrap_err();
        assert!(matches!(err, CommentError::Touch { ref path, .. } if *path == touch));
    }

    #[test]
    fn failed_write_leaves_no_partial_file() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("2024-1-2-030405-hi.json");
        fs::write(&path, b"{\"name\":\"Ja").unwrap();

        let failure = io::Error::other("disk full");
        let err = discard_on_failure(&path, Err(failure)).unwrap_err();

        assert!(matches!(err, CommentError::Write { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn successful_write_is_kept() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("a.json");
        fs::write(&path, b"{}").unwrap();
        discard_on_failure(&path, Ok(())).unwrap();
        assert!(path.exists());
    }
}
