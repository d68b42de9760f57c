//! Storage adapters for household state.
//!
//! Stores only move bytes; integrity checks happen in
//! [`Household::from_snapshot`](crate::Household::from_snapshot).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pledge_types::{Member, Promise};
use pledge_utils::{atomic_write, recover_bak_file};

pub const HOUSEHOLD_FILE_NAME: &str = "household.json";

/// Persisted layout: the roster and every promise, deadlines as RFC 3339 strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub members: Vec<Member>,
    #[serde(default)]
    pub promises: Vec<Promise>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode household state: {0}")]
    Encode(#[source] serde_json::Error),
}

pub trait Store {
    /// The last saved snapshot, or `None` if nothing has been saved yet.
    fn load(&self) -> Result<Option<Snapshot>, StoreError>;

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), StoreError>;
}

/// Keeps the last saved snapshot in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    saved: Option<Snapshot>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        Ok(self.saved.clone())
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), StoreError> {
        self.saved = Some(snapshot.clone());
        Ok(())
    }
}

/// Pretty-printed JSON file written atomically.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<dir>/household.json`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(HOUSEHOLD_FILE_NAME))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Store for JsonFileStore {
    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        recover_bak_file(&self.path);
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(err)),
        };
        let snapshot = serde_json::from_str(&content).map_err(|source| StoreError::Decode {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), "Loaded household state");
        Ok(Some(snapshot))
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }
        let bytes = serde_json::to_vec_pretty(snapshot).map_err(StoreError::Encode)?;
        atomic_write(&self.path, &bytes).map_err(|err| self.io_error(err))?;
        tracing::debug!(
            path = %self.path.display(),
            promises = snapshot.promises.len(),
            "Saved household state"
        );
        Ok(())
    }
}
