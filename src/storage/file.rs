use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};

use super::{PersistedState, StorageBackend};

/// JSON file backend. A missing file reads as "never persisted".
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Fails when the parent directory cannot be created, which callers treat
    /// as a fatal initialization error: the filter cannot run without a place
    /// to persist its state.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create storage directory {}", parent.display())
                })?;
            }
        }
        Ok(Self { path })
    }
}

impl StorageBackend for FileStorage {
    fn read(&self) -> Result<Option<PersistedState>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to read filter storage {}", self.path.display())
                })
            }
        };

        let state = serde_json::from_str(&contents).with_context(|| {
            format!("corrupt filter storage {}", self.path.display())
        })?;
        Ok(Some(state))
    }

    fn write(&self, state: &PersistedState) -> Result<()> {
        let json = serde_json::to_string_pretty(state).context("failed to encode filter state")?;
        fs::write(&self.path, json).with_context(|| {
            format!("failed to write filter storage {}", self.path.display())
        })
    }
}
