//! Best-effort mirroring of the enabled flag to a remote user profile.
//!
//! Contract: at-most-effort, never blocking, never surfaced. The store spawns
//! the push and discards the result; a failure is logged at debug level and
//! nothing else happens. Local operation never depends on this succeeding.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::config::MirrorConfig;

#[async_trait]
pub trait ProfileMirror: Send + Sync {
    async fn push_enabled(&self, enabled: bool) -> Result<()>;
}

/// HTTP implementation: one PUT to the configured profile endpoint.
pub struct HttpMirror {
    client: reqwest::Client,
    endpoint: String,
    user_id: String,
}

impl HttpMirror {
    /// Returns `None` when the mirror is not configured (no endpoint or user),
    /// which disables mirroring silently: local-only operation is not an
    /// error condition.
    pub fn from_config(config: &MirrorConfig) -> Option<Arc<dyn ProfileMirror>> {
        let endpoint = config.endpoint.clone()?;
        let user_id = config.user_id.clone()?;
        let client = reqwest::Client::builder()
            .user_agent("siteguard/0.1")
            .timeout(Duration::from_secs(5))
            .build()
            .ok()?;
        Some(Arc::new(Self {
            client,
            endpoint,
            user_id,
        }))
    }
}

#[async_trait]
impl ProfileMirror for HttpMirror {
    async fn push_enabled(&self, enabled: bool) -> Result<()> {
        let body = serde_json::json!({
            "userId": self.user_id,
            "blockerEnabled": enabled,
        });
        let resp = self
            .client
            .put(&self.endpoint)
            .json(&body)
            .send()
            .await
            .context("profile mirror unreachable")?;
        resp.error_for_status()
            .context("profile mirror rejected the update")?;
        Ok(())
    }
}

/// Spawns the push and discards the outcome. Without an async runtime there
/// is nowhere to run it, so the push is skipped; the caller's local operation
/// proceeds either way.
pub fn push_enabled_detached(mirror: &Option<Arc<dyn ProfileMirror>>, enabled: bool) {
    let Some(mirror) = mirror.clone() else {
        return;
    };
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        debug!("no async runtime available, skipping profile mirror push");
        return;
    };
    handle.spawn(async move {
        if let Err(e) = mirror.push_enabled(enabled).await {
            debug!("profile mirror write failed (ignored): {e:#}");
        }
    });
}
