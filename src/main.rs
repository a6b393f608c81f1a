use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

use siteguard::api::{self, ApiState};
use siteguard::config::Config;
use siteguard::engine::{BlocklistStore, FilterState};
use siteguard::init::setup_logging;
use siteguard::interceptor::NavigationInterceptor;
use siteguard::logger::{MemorySink, VerdictLogger};
use siteguard::mirror::HttpMirror;
use siteguard::service::FilterService;
use siteguard::storage::FileStorage;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load Config
    let config_path = std::env::args().nth(1).unwrap_or("config.toml".to_string());
    let config = if std::path::Path::new(&config_path).exists() {
        Config::load(&config_path).await?
    } else {
        Config::default()
    };

    // 2. Setup Logging
    setup_logging(&config);
    info!("Starting siteguard...");

    if !std::path::Path::new(&config_path).exists() {
        info!("Config file not found, using defaults.");
    }

    // 3. Open Storage (fatal if unavailable: the filter cannot persist state)
    let storage = Arc::new(FileStorage::open(&config.storage.path)?);

    // 4. Init Verdict Logger
    let memory_sink = MemorySink::new(config.logging.memory_capacity);
    let logs_buffer = memory_sink.clone_buffer();
    let logger = VerdictLogger::new(config.logging.clone(), vec![Box::new(memory_sink)]);

    // 5. Init Filter State & Store (seeds defaults on first run)
    let state = FilterState::new(config.blocked_page_url());
    let mirror = HttpMirror::from_config(&config.mirror);
    let store = Arc::new(BlocklistStore::new(
        storage,
        state.clone(),
        mirror,
        &config.blocklist.extra_domains,
    ));
    store.load()?;
    info!(
        enabled = store.is_enabled(),
        domains = store.domains().len(),
        "blocklist loaded"
    );

    // 6. Build Interception Surface
    let blocked_page_url = config.blocked_page_url();
    let interceptor = Arc::new(NavigationInterceptor::new(
        state.clone(),
        logger.clone(),
        blocked_page_url,
    ));

    // 7. Service Layer (the in-page guard deploys inside the hosted app, not
    // in this process; the service still owns the persisted toggle)
    let service = Arc::new(FilterService::new(store, None));
    service.start();

    // 8. Start Control API
    let api_state = Arc::new(ApiState {
        service,
        interceptor,
        logs_buffer,
        blocked_page_path: config.blocklist.blocked_page.clone(),
    });
    let addr = SocketAddr::new(config.host.parse()?, config.port);

    // 9. Graceful Shutdown
    tokio::select! {
        res = api::start_api_server(api_state, addr) => res?,
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received.");
        }
    }

    Ok(())
}
