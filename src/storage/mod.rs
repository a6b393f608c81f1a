mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// The persisted key-value record: the enabled flag plus the domain list,
/// under the stable wire keys `enabled` / `blockedSites`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    pub enabled: bool,
    #[serde(rename = "blockedSites")]
    pub blocked_sites: Vec<String>,
}

/// Durable local storage for the filter settings.
///
/// A `write` must be visible to the next `read` within the same process.
pub trait StorageBackend: Send + Sync {
    /// Returns `None` when no state has ever been persisted.
    fn read(&self) -> Result<Option<PersistedState>>;

    fn write(&self, state: &PersistedState) -> Result<()>;
}
