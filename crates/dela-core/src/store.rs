//! Durable storage for game snapshots.
//!
//! A store holds exactly one serialized snapshot. The session writes it after
//! every action and reads it once at startup.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Key the snapshot is stored under; bump alongside `SCHEMA_VERSION`
pub const STORAGE_KEY: &str = "dela_state_v02";

/// Errors from a snapshot store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Somewhere a snapshot can be kept between runs
pub trait SnapshotStore {
    /// Read the stored snapshot, `None` if nothing has been saved
    fn load(&self) -> Result<Option<String>, StoreError>;

    /// Replace the stored snapshot
    fn save(&mut self, snapshot: &str) -> Result<(), StoreError>;
}

/// Snapshot kept in a JSON file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store at an explicit file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store named after [`STORAGE_KEY`] inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{}.json", STORAGE_KEY)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, snapshot: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write then rename so a crash never leaves a half-written snapshot
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, snapshot)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Snapshot kept in memory, for tests and hosts that persist elsewhere
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: Option<String>,
    saves: usize,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a snapshot already stored
    pub fn with_snapshot(snapshot: impl Into<String>) -> Self {
        Self {
            snapshot: Some(snapshot.into()),
            ..Self::default()
        }
    }

    /// A store whose writes always fail, like a full quota
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> Option<&str> {
        self.snapshot.as_deref()
    }

    /// Number of successful saves
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.snapshot.clone())
    }

    fn save(&mut self, snapshot: &str) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Unavailable("quota exceeded".to_string()));
        }
        self.snapshot = Some(snapshot.to_string());
        self.saves += 1;
        Ok(())
    }
}
