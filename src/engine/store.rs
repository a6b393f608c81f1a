use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::mirror::{self, ProfileMirror};
use crate::storage::{PersistedState, StorageBackend};

use super::matcher::{normalize_host, DomainMatcher};
use super::state::FilterState;

/// Out-of-the-box blocklist. Membership is configuration data; the
/// normalization rules (no scheme, no `www.`, lowercase) are the contract.
pub const DEFAULT_SEED: &[&str] = &[
    "pornhub.com",
    "xvideos.com",
    "xnxx.com",
    "xhamster.com",
    "redtube.com",
    "youporn.com",
    "spankbang.com",
    "eporner.com",
    "hqporner.com",
    "chaturbate.com",
    "stripchat.com",
    "livejasmin.com",
    "onlyfans.com",
    "brazzers.com",
    "rule34.xxx",
    "motherless.com",
];

/// Owns persistence and mutation of the blocklist and the enabled flag.
///
/// Every mutation rebuilds the matcher and swaps it into the shared
/// [`FilterState`], then persists, so readers never see a stale list.
pub struct BlocklistStore {
    backend: Arc<dyn StorageBackend>,
    state: FilterState,
    domains: RwLock<BTreeSet<String>>,
    mirror: Option<Arc<dyn ProfileMirror>>,
    seed: Vec<String>,
}

impl BlocklistStore {
    pub fn new(
        backend: Arc<dyn StorageBackend>,
        state: FilterState,
        mirror: Option<Arc<dyn ProfileMirror>>,
        extra_seed: &[String],
    ) -> Self {
        let mut seed: BTreeSet<String> = DEFAULT_SEED.iter().map(|s| s.to_string()).collect();
        for raw in extra_seed {
            if let Some(host) = normalize_host(raw) {
                seed.insert(host);
            }
        }
        Self {
            backend,
            state,
            domains: RwLock::new(BTreeSet::new()),
            mirror,
            seed: seed.into_iter().collect(),
        }
    }

    /// Reads persisted state, seeding defaults (disabled, default list) exactly
    /// once on first run. Safe to call repeatedly.
    pub fn load(&self) -> Result<()> {
        let persisted = self
            .backend
            .read()
            .context("failed to read persisted filter state")?;

        let persisted = match persisted {
            Some(p) => p,
            None => {
                let seeded = PersistedState {
                    enabled: false,
                    blocked_sites: self.seed.clone(),
                };
                self.backend
                    .write(&seeded)
                    .context("failed to seed default filter state")?;
                info!(domains = seeded.blocked_sites.len(), "seeded default blocklist");
                seeded
            }
        };

        let mut set = BTreeSet::new();
        for raw in &persisted.blocked_sites {
            if let Some(host) = normalize_host(raw) {
                set.insert(host);
            }
        }

        self.state.set_enabled(persisted.enabled);
        self.state.set_matcher(DomainMatcher::new(set.iter().cloned()));
        *self.domains.write().unwrap() = set;
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }

    /// Persists the flag and mirrors it best-effort. Returns whether the value
    /// actually changed (the service layer drives guard install/teardown off
    /// the transition). A failed write leaves the live flag untouched.
    pub fn set_enabled(&self, enabled: bool) -> Result<bool> {
        let prev = self.state.is_enabled();
        self.state.set_enabled(enabled);
        if let Err(e) = self.persist() {
            self.state.set_enabled(prev);
            return Err(e);
        }
        mirror::push_enabled_detached(&self.mirror, enabled);
        if prev != enabled {
            info!(enabled, "filter toggled");
        }
        Ok(prev != enabled)
    }

    /// Normalizes and inserts. Returns `false` when the entry was already
    /// present (set semantics), `Err` only on invalid input or a failed write.
    /// The live list only changes when the write sticks.
    pub fn add_domain(&self, raw: &str) -> Result<bool> {
        let Some(host) = normalize_host(raw) else {
            bail!("not a valid domain: {raw:?}");
        };

        let inserted = self.domains.write().unwrap().insert(host.clone());
        if inserted {
            if let Err(e) = self.persist() {
                self.domains.write().unwrap().remove(&host);
                return Err(e);
            }
            debug!(domain = %host, "blocklist entry added");
        }
        Ok(inserted)
    }

    /// Removes the exact normalized entry. `false` when it was absent.
    pub fn remove_domain(&self, raw: &str) -> Result<bool> {
        let Some(host) = normalize_host(raw) else {
            bail!("not a valid domain: {raw:?}");
        };

        let removed = self.domains.write().unwrap().remove(&host);
        if removed {
            if let Err(e) = self.persist() {
                self.domains.write().unwrap().insert(host);
                return Err(e);
            }
            debug!(domain = %host, "blocklist entry removed");
        }
        Ok(removed)
    }

    pub fn domains(&self) -> Vec<String> {
        self.domains.read().unwrap().iter().cloned().collect()
    }

    fn persist(&self) -> Result<()> {
        let snapshot = {
            let domains = self.domains.read().unwrap();
            PersistedState {
                enabled: self.state.is_enabled(),
                blocked_sites: domains.iter().cloned().collect(),
            }
        };
        self.backend
            .write(&snapshot)
            .context("failed to persist filter state")?;
        // Swap the live matcher only once the write stuck, so the filter
        // readers consult never diverges from persisted state.
        self.state
            .set_matcher(DomainMatcher::new(snapshot.blocked_sites.iter().cloned()));
        Ok(())
    }
}
