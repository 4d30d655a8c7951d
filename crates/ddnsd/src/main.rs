// # ddnsd - Cloudflare DDNS updater
//
// Keeps one Cloudflare A record pointed at this host's public IPv4 address.
//
// ## Usage
//
// ```bash
// ddnsd --setup                      # write the config file interactively
// ddnsd                              # check once, exit 0 on success, 1 on failure
// ddnsd --continuous                 # keep checking with an adaptive interval
// ddnsd --api-token TOKEN --domain example.com --subdomain home
// ```
//
// Values come from CLI flags, then `DDNS_*` environment variables, then the config
// file. See `ddns_core::config` for the full list.
//
// ## Signals
//
// SIGINT/SIGTERM asks the monitor to stop; a check already running is allowed to
// finish. A second signal exits immediately with code 130.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use ddns_core::Shutdown;
use ddns_core::config::{ConfigLayer, default_config_path};
use ddnsd::{RunOptions, setup};
use tracing::{error, info, warn};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Check succeeded, setup completed, or monitoring stopped on request
    Success = 0,
    /// Configuration error or failed check
    Failure = 1,
    /// Second shutdown signal while a check was still running
    Interrupted = 130,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Keep a Cloudflare A record pointed at this host's public IPv4 address
#[derive(Parser, Debug)]
#[command(name = "ddnsd", disable_version_flag = true)]
struct Cli {
    /// Keep monitoring instead of checking once
    #[arg(short, long)]
    continuous: bool,

    /// Print version
    #[arg(short = 'v', long)]
    version: bool,

    /// Run the interactive configuration wizard
    #[arg(long)]
    setup: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Cloudflare API token
    #[arg(long, value_name = "TOKEN")]
    api_token: Option<String>,

    /// Zone identifier (discovered when omitted)
    #[arg(long, value_name = "ID")]
    zone_id: Option<String>,

    /// DNS record identifier (discovered when omitted)
    #[arg(long, value_name = "ID")]
    record_id: Option<String>,

    /// Domain, e.g. example.com
    #[arg(long)]
    domain: Option<String>,

    /// Subdomain, e.g. home
    #[arg(long)]
    subdomain: Option<String>,

    /// Record TTL in seconds
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u32).range(60..))]
    ttl: Option<u32>,

    /// Proxy the record through Cloudflare
    #[arg(long)]
    proxied: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigLayer {
        ConfigLayer {
            api_token: self.api_token.clone(),
            zone_id: self.zone_id.clone(),
            record_id: self.record_id.clone(),
            domain: self.domain.clone(),
            subdomain: self.subdomain.clone(),
            ttl: self.ttl,
            // Absent flag means "not overridden", not "false"
            proxied: self.proxied.then_some(true),
            ..Default::default()
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        println!("ddnsd {}", env!("CARGO_PKG_VERSION"));
        return DdnsExitCode::Success.into();
    }

    if cli.setup {
        let path = ConfigLayer::from_env(|key| std::env::var(key).ok())
            .ok()
            .and_then(|env| env.config_file)
            .unwrap_or_else(default_config_path);
        return match setup::run(&path) {
            Ok(()) => DdnsExitCode::Success,
            Err(e) => {
                eprintln!("Setup failed: {:#}", e);
                DdnsExitCode::Failure
            }
        }
        .into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::Failure.into();
        }
    };

    let options = RunOptions {
        continuous: cli.continuous,
        overrides: cli.overrides(),
        debug: cli.debug,
    };

    let succeeded = rt.block_on(async {
        let shutdown = Shutdown::new();
        let signals = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = forward_signals(signals).await {
                error!("Signal handling unavailable: {}", e);
            }
        });

        ddnsd::run(options, shutdown).await
    });

    if succeeded {
        DdnsExitCode::Success.into()
    } else {
        DdnsExitCode::Failure.into()
    }
}

/// Turn SIGINT/SIGTERM into shutdown requests
///
/// The first signal lets the current check finish. The second exits the process.
#[cfg(unix)]
async fn forward_signals(shutdown: Shutdown) -> Result<()> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    loop {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        on_signal(&shutdown, name);
    }
}

#[cfg(not(unix))]
async fn forward_signals(shutdown: Shutdown) -> Result<()> {
    loop {
        tokio::signal::ctrl_c()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
        on_signal(&shutdown, "SIGINT");
    }
}

fn on_signal(shutdown: &Shutdown, name: &str) {
    if shutdown.request() >= 2 {
        warn!("Received {} again, exiting now", name);
        std::process::exit(DdnsExitCode::Interrupted as i32);
    }
    info!("Received {}, shutting down after the current check", name);
}
