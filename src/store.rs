use std::path::PathBuf;

use crate::models::UserRecord;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("user store at '{}' is not accessible: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("user store at '{}' is malformed: {source}", .path.display())]
    Malformed { path: PathBuf, source: serde_json::Error },
    #[error("failed to encode user store: {0}")]
    Encode(#[source] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Whole-document persistence of the user list.
///
/// Every call reads or writes the complete document; there is no partial
/// mutation primitive and no locking. Callers that need a consistent
/// read-modify-write must serialize it themselves (see `AccountService::serialized`).
pub trait UserStore: Send + Sync {
    /// All records in document order. Creates an empty document when none exists.
    fn load_all(&self) -> StoreResult<Vec<UserRecord>>;

    /// Replace the whole document with exactly `records`.
    fn save_all(&self, records: &[UserRecord]) -> StoreResult<()>;

    fn exists(&self, username: &str) -> StoreResult<bool> {
        Ok(self.load_all()?.iter().any(|u| u.username == username))
    }
}

pub mod json {
    use super::*;
    use std::io::{ErrorKind, Write};
    use std::path::Path;
    use tempfile::NamedTempFile;
    use tracing::{debug, info};

    pub const DEFAULT_FILE_NAME: &str = "users.json";

    /// Users document kept as a pretty-printed JSON array on disk.
    ///
    /// Writes go to a temp file in the same directory which is then renamed over
    /// the document, so a concurrent reader sees either the old or the new list,
    /// never a truncated one.
    #[derive(Debug, Clone)]
    pub struct JsonFileStore {
        path: PathBuf,
    }

    impl JsonFileStore {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn io_err(&self, source: std::io::Error) -> StoreError {
            StoreError::Io { path: self.path.clone(), source }
        }

        // fully written sibling of the document, ready to be renamed into place
        fn stage(&self, contents: &[u8]) -> StoreResult<NamedTempFile> {
            let dir = match self.path.parent() {
                Some(d) if !d.as_os_str().is_empty() => d,
                _ => Path::new("."),
            };
            std::fs::create_dir_all(dir).map_err(|e| self.io_err(e))?;
            let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.io_err(e))?;
            tmp.write_all(contents).map_err(|e| self.io_err(e))?;
            tmp.as_file().sync_all().map_err(|e| self.io_err(e))?;
            Ok(tmp)
        }

        // no-clobber so a document written by someone else in the meantime is kept
        fn create_empty(&self) -> StoreResult<bool> {
            let tmp = self.stage(b"[]")?;
            match tmp.persist_noclobber(&self.path) {
                Ok(_) => {
                    info!("created empty user store at '{}'", self.path.display());
                    Ok(true)
                }
                Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(false),
                Err(e) => Err(self.io_err(e.error)),
            }
        }
    }

    impl UserStore for JsonFileStore {
        fn load_all(&self) -> StoreResult<Vec<UserRecord>> {
            let bytes = match std::fs::read(&self.path) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    if self.create_empty()? {
                        return Ok(Vec::new());
                    }
                    std::fs::read(&self.path).map_err(|e| self.io_err(e))?
                }
                Err(e) => return Err(self.io_err(e)),
            };
            let users: Vec<UserRecord> = serde_json::from_slice(&bytes)
                .map_err(|source| StoreError::Malformed { path: self.path.clone(), source })?;
            debug!(count = users.len(), "loaded user store");
            Ok(users)
        }

        fn save_all(&self, records: &[UserRecord]) -> StoreResult<()> {
            let doc = serde_json::to_vec_pretty(records).map_err(StoreError::Encode)?;
            let tmp = self.stage(&doc)?;
            tmp.persist(&self.path).map_err(|e| self.io_err(e.error))?;
            Ok(())
        }
    }

}

pub mod memory {
    use super::*;
    use std::sync::{PoisonError, RwLock};

    /// Process-local document with the same whole-list semantics as the file store.
    #[derive(Debug, Default)]
    pub struct MemoryStore {
        users: RwLock<Vec<UserRecord>>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_records(records: Vec<UserRecord>) -> Self {
            Self { users: RwLock::new(records) }
        }
    }

    impl UserStore for MemoryStore {
        fn load_all(&self) -> StoreResult<Vec<UserRecord>> {
            Ok(self.users.read().unwrap_or_else(PoisonError::into_inner).clone())
        }

        fn save_all(&self, records: &[UserRecord]) -> StoreResult<()> {
            *self.users.write().unwrap_or_else(PoisonError::into_inner) = records.to_vec();
            Ok(())
        }
    }
}
