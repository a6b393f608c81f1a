use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anyhow::{bail, Result};

use super::{PersistedState, StorageBackend};

/// In-process backend: the page-local-storage analog, and the test double.
#[derive(Default)]
pub struct MemoryStorage {
    state: Mutex<Option<PersistedState>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose reads and writes always fail, for exercising the
    /// storage-unavailable path.
    pub fn failing() -> Self {
        let storage = Self::default();
        storage.fail_reads.store(true, Ordering::SeqCst);
        storage.fail_writes.store(true, Ordering::SeqCst);
        storage
    }

    /// Makes every subsequent write fail (reads keep working), for
    /// exercising failed-commit handling after a successful load.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self) -> Result<Option<PersistedState>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            bail!("storage unavailable");
        }
        Ok(self.state.lock().unwrap().clone())
    }

    fn write(&self, state: &PersistedState) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("storage unavailable");
        }
        *self.state.lock().unwrap() = Some(state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_is_visible_to_next_get() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.read().unwrap(), None);

        let state = PersistedState {
            enabled: true,
            blocked_sites: vec!["foo.com".to_string()],
        };
        storage.write(&state).unwrap();
        assert_eq!(storage.read().unwrap(), Some(state));
    }

    #[test]
    fn test_failing_backend_errors() {
        let storage = MemoryStorage::failing();
        assert!(storage.read().is_err());
        assert!(storage
            .write(&PersistedState {
                enabled: false,
                blocked_sites: vec![],
            })
            .is_err());
    }
}
