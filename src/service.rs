use std::sync::Arc;

use anyhow::Result;

use crate::engine::BlocklistStore;
use crate::guard::PageGuard;

/// Drives the enable/disable lifecycle: persists the flag through the store
/// and installs or tears down the in-page guard on a real transition.
pub struct FilterService {
    store: Arc<BlocklistStore>,
    guard: Option<Arc<PageGuard>>,
}

impl FilterService {
    pub fn new(store: Arc<BlocklistStore>, guard: Option<Arc<PageGuard>>) -> Self {
        Self { store, guard }
    }

    /// Brings hooks in line with the loaded state; called once after
    /// `BlocklistStore::load`.
    pub fn start(&self) {
        if self.store.is_enabled() {
            if let Some(guard) = &self.guard {
                guard.install();
            }
        }
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<bool> {
        let changed = self.store.set_enabled(enabled)?;
        if changed {
            if let Some(guard) = &self.guard {
                if enabled {
                    guard.install();
                } else {
                    guard.teardown();
                }
            }
        }
        Ok(changed)
    }

    pub fn store(&self) -> &Arc<BlocklistStore> {
        &self.store
    }
}
