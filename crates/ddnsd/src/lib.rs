// # ddnsd
//
// Integration layer for the Cloudflare DDNS updater. It wires the configured pieces
// together and hands control to `DdnsMonitor`; no detection, DNS or retry logic lives
// here.
//
// 1. Load configuration (overrides > environment > config file > defaults)
// 2. Install logging
// 3. Build the HTTP IP detector, the Cloudflare provider and the last-IP file store
// 4. Run one check, or monitor until shutdown
//
// The `ddnsd` binary is a thin CLI over [`run`]; embedders call it directly.

pub mod logging;
pub mod setup;

use ddns_core::config::{ConfigLayer, DdnsConfig};
use ddns_core::{DdnsMonitor, DnsProvider, FileStateStore, Shutdown};
use ddns_ip_http::HttpIpDetector;
use ddns_provider_cloudflare::CloudflareProvider;
use tracing::{debug, error, info};

/// Options accepted by [`run`]
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Keep checking until shutdown instead of checking once
    pub continuous: bool,
    /// Values that take precedence over the environment and the config file
    pub overrides: ConfigLayer,
    /// Enable debug logging
    pub debug: bool,
}

/// Load configuration, install logging and run
///
/// # Returns
///
/// For a single check, whether it succeeded. In continuous mode, `true` once the
/// loop stopped on request; `false` only if it could not start.
pub async fn run(options: RunOptions, shutdown: Shutdown) -> bool {
    let mut overrides = options.overrides;
    if options.debug {
        overrides.debug = Some(true);
    }

    let config = match DdnsConfig::load(overrides) {
        Ok(config) => config,
        Err(e) => {
            logging::init(options.debug, None);
            error!("{}", e);
            return false;
        }
    };

    logging::init(config.debug, config.log_file.as_deref());
    run_with_config(config, options.continuous, shutdown).await
}

/// Run with an already resolved configuration (logging is left to the caller)
pub async fn run_with_config(config: DdnsConfig, continuous: bool, shutdown: Shutdown) -> bool {
    for (key, value) in config.all() {
        debug!("{} = {}", key, value);
    }

    if !config.is_configured() {
        error!("No Cloudflare API token configured. Run `ddnsd --setup` or set DDNS_API_TOKEN");
        return false;
    }
    if let Err(e) = config.validate() {
        error!("{}", e);
        return false;
    }

    let mut monitor = match build_monitor(config) {
        Ok(monitor) => monitor,
        Err(e) => {
            error!("Failed to start: {}", e);
            return false;
        }
    };

    if continuous {
        monitor.run(shutdown).await;
        true
    } else {
        let ok = monitor.run_once().await;
        if ok {
            info!("DNS check completed");
        } else {
            error!("DNS check failed");
        }
        ok
    }
}

fn build_monitor(config: DdnsConfig) -> ddns_core::Result<DdnsMonitor> {
    let detector = HttpIpDetector::with_default_client(config.ip_providers.clone())?;
    let provider = CloudflareProvider::from_config(&config)?;
    let store = FileStateStore::new(&config.last_ip_file);

    info!(
        "Using {} (API {}), last known IP in {}",
        provider.provider_name(),
        provider.api_version(),
        store.path().display()
    );

    let (monitor, mut events) =
        DdnsMonitor::new(config, Box::new(detector), Box::new(provider), Box::new(store));

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!("Monitor event: {:?}", event);
        }
    });

    Ok(monitor)
}
