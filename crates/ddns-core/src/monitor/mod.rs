//! Poll controller
//!
//! The DdnsMonitor is responsible for:
//! - Running one detect → compare → update → persist check
//! - In continuous mode, scheduling repeated checks with an adaptive interval
//! - Stopping cleanly when the shutdown token fires
//!
//! ## Check Flow
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │  IpSource   │────▶│ StateStore  │────▶│ DnsProvider  │────▶│ StateStore  │
//! │  (detect)   │     │ (compare)   │     │ (update)     │     │ (persist)   │
//! └─────────────┘     └─────────────┘     └──────────────┘     └─────────────┘
//! ```
//!
//! The order never changes: the last known IP is persisted only after the provider
//! reported a successful update, so a failed update is retried by the next check.
//!
//! ## Threading
//!
//! One check runs at a time, to completion, on the caller's task. Counters, the cached
//! target and the credential flag are touched only from that sequential loop.

use std::net::Ipv4Addr;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::DdnsConfig;
use crate::error::{Error, Result};
use crate::schedule::{PollSchedule, PollTransition};
use crate::shutdown::Shutdown;
use crate::traits::{DnsProvider, IpSource, ResolvedTarget, StateStore};

/// Pause after an unexpected error escapes a check
pub const ERROR_BACKOFF: Duration = Duration::from_secs(30);

/// Capacity of the event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Result of one check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Detected IP equals the last known IP; nothing was written
    Unchanged { ip: Ipv4Addr },
    /// The record now points at `new_ip` and the new IP was persisted
    Updated {
        previous_ip: Option<Ipv4Addr>,
        new_ip: Ipv4Addr,
    },
    /// The check could not complete; nothing was persisted
    Failed { reason: String },
}

impl CycleOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, CycleOutcome::Failed { .. })
    }

    /// How the schedule should read this outcome
    pub fn transition(&self) -> PollTransition {
        match self {
            CycleOutcome::Unchanged { .. } => PollTransition::Stable,
            CycleOutcome::Updated { .. } => PollTransition::Changed,
            CycleOutcome::Failed { .. } => PollTransition::Errored,
        }
    }

    fn failed(reason: impl Into<String>) -> Self {
        CycleOutcome::Failed {
            reason: reason.into(),
        }
    }
}

/// Events emitted by the DdnsMonitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Continuous monitoring started
    Started,

    /// A check finished and the next one is scheduled
    CheckCompleted {
        outcome: CycleOutcome,
        next_check: Duration,
    },

    /// An unexpected error escaped a check
    CheckErrored { error: String, retry_in: Duration },

    /// Continuous monitoring stopped
    Stopped { reason: String },
}

/// Poll controller
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsMonitor::new()`]
/// 2. Either call [`DdnsMonitor::run_once()`] or [`DdnsMonitor::run()`]
/// 3. `run()` returns once the shutdown token fires
pub struct DdnsMonitor {
    config: DdnsConfig,

    /// IP source for detection (also used by discovery to create a record)
    ip_source: Box<dyn IpSource>,

    /// DNS provider for resolving and updating the record
    provider: Box<dyn DnsProvider>,

    /// Last known IP
    state_store: Box<dyn StateStore>,

    /// Resolved on the first successful initialization, reused afterwards
    target: Option<ResolvedTarget>,

    /// Credentials are verified once per process
    credentials_verified: bool,

    schedule: PollSchedule,

    error_backoff: Duration,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<MonitorEvent>,
}

impl DdnsMonitor {
    /// Create a new monitor
    ///
    /// # Returns
    ///
    /// A tuple of (monitor, event_receiver) where event_receiver yields monitor events
    pub fn new(
        config: DdnsConfig,
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        state_store: Box<dyn StateStore>,
    ) -> (Self, mpsc::Receiver<MonitorEvent>) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let schedule = PollSchedule::new(config.poll);

        let monitor = Self {
            config,
            ip_source,
            provider,
            state_store,
            target: None,
            credentials_verified: false,
            schedule,
            error_backoff: ERROR_BACKOFF,
            event_tx: tx,
        };

        (monitor, rx)
    }

    /// Override the pause used after an unexpected error
    pub fn with_error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = backoff;
        self
    }

    /// Target resolved by the provider, once known
    pub fn target(&self) -> Option<&ResolvedTarget> {
        self.target.as_ref()
    }

    /// Consecutive checks that saw no change
    pub fn stable_checks(&self) -> u64 {
        self.schedule.stable_checks()
    }

    /// Run a single check
    ///
    /// # Returns
    ///
    /// `true` when the record is known to match the current IP (updated or unchanged)
    pub async fn run_once(&mut self) -> bool {
        match self.run_cycle().await {
            Ok(outcome) => outcome.is_success(),
            Err(e) => {
                error!("DNS check failed: {}", e);
                false
            }
        }
    }

    /// Run a single check, reporting the detailed outcome
    ///
    /// Expected failures (missing configuration, discovery, detection, a rejected or
    /// exhausted update) are `Ok(CycleOutcome::Failed)`. Transport or API errors during
    /// initialization escape as `Err`.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        if !self.config.is_configured() {
            warn!("No Cloudflare API token configured. Run `ddnsd --setup` or set DDNS_API_TOKEN");
            return Ok(CycleOutcome::failed("not configured"));
        }

        if let Err(e) = self.config.validate() {
            error!("{}", e);
            return Ok(CycleOutcome::failed(e.to_string()));
        }

        let target = match self.target.clone() {
            Some(target) => target,
            None => match self.provider.initialize(self.ip_source.as_ref()).await {
                Ok(target) => {
                    info!(
                        "Tracking {} (zone: {}, record: {})",
                        target.fqdn, target.zone_id, target.record_id
                    );
                    self.target = Some(target.clone());
                    target
                }
                Err(Error::Discovery(reason)) => {
                    error!("Failed to resolve the DNS record to update: {}", reason);
                    return Ok(CycleOutcome::failed(reason));
                }
                Err(e) => return Err(e),
            },
        };

        if !self.credentials_verified {
            if !self.provider.verify_credentials().await {
                error!(
                    "{} API token could not be verified",
                    self.provider.provider_name()
                );
                return Ok(CycleOutcome::failed("credential verification failed"));
            }
            self.credentials_verified = true;
        }

        let current_ip = match self.ip_source.detect().await {
            Ok(ip) => ip,
            Err(e) => {
                error!("{}", e);
                return Ok(CycleOutcome::failed(e.to_string()));
            }
        };
        debug!("Detected public IP: {}", current_ip);

        let last_ip = match self.state_store.get_last_ip().await {
            Ok(ip) => ip,
            Err(e) => {
                warn!("Could not read last known IP, treating as unknown: {}", e);
                None
            }
        };

        if last_ip == Some(current_ip) {
            info!("IP unchanged ({}), no update needed", current_ip);
            return Ok(CycleOutcome::Unchanged { ip: current_ip });
        }

        info!(
            "IP changed: {} -> {}",
            last_ip.map(|ip| ip.to_string()).unwrap_or_else(|| "unknown".to_string()),
            current_ip
        );

        match self.provider.update_record(&target, current_ip).await {
            Ok(true) => {
                if let Err(e) = self.state_store.save_ip(current_ip).await {
                    // The DNS update stands; the next check will simply update again.
                    error!("Record updated but the new IP could not be saved: {}", e);
                }
                info!("Updated {} -> {}", target.fqdn, current_ip);
                Ok(CycleOutcome::Updated {
                    previous_ip: last_ip,
                    new_ip: current_ip,
                })
            }
            Ok(false) => Ok(CycleOutcome::failed("update rejected by the API")),
            Err(e) => {
                error!("Failed to update {}: {}", target.fqdn, e);
                Ok(CycleOutcome::failed(e.to_string()))
            }
        }
    }

    /// Run checks until the shutdown token fires
    ///
    /// A failed check reschedules like an IP change. An error escaping a check is
    /// logged and followed by a fixed pause; the loop itself never ends on a bad check.
    /// A shutdown request during a sleep ends the loop immediately; one during a check
    /// takes effect once that check completes.
    pub async fn run(&mut self, shutdown: Shutdown) {
        info!(
            "Starting continuous monitoring (adaptive: {})",
            self.config.poll.adaptive
        );
        self.emit_event(MonitorEvent::Started);

        loop {
            if shutdown.is_requested() {
                break;
            }

            let delay = match self.run_cycle().await {
                Ok(outcome) => {
                    let transition = outcome.transition();
                    let next_check = self.schedule.next_interval(transition);
                    if transition == PollTransition::Errored {
                        warn!("Check failed, retrying at the minimum interval");
                    }
                    debug!(
                        "Transition: {:?}, stable checks: {}",
                        transition,
                        self.schedule.stable_checks()
                    );
                    self.emit_event(MonitorEvent::CheckCompleted {
                        outcome,
                        next_check,
                    });
                    next_check
                }
                Err(e) => {
                    error!(
                        "Unexpected error during check: {}. Pausing for {:?}",
                        e, self.error_backoff
                    );
                    self.emit_event(MonitorEvent::CheckErrored {
                        error: e.to_string(),
                        retry_in: self.error_backoff,
                    });
                    self.error_backoff
                }
            };

            if shutdown.is_requested() {
                break;
            }

            let next_at = chrono::Local::now()
                + chrono::TimeDelta::from_std(delay).unwrap_or_else(|_| chrono::TimeDelta::zero());
            info!(
                "Next check in {}s (at {})",
                delay.as_secs(),
                next_at.format("%H:%M:%S")
            );

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.requested() => {
                    break;
                }
            }
        }

        info!("Shutdown requested, monitoring stopped");
        self.emit_event(MonitorEvent::Stopped {
            reason: "Shutdown signal".to_string(),
        });
    }

    /// Emit a monitor event
    fn emit_event(&self, event: MonitorEvent) {
        if self.event_tx.try_send(event).is_err() {
            // Nobody is draining the channel; monitoring itself is unaffected.
            debug!("Event channel full or closed, dropping event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_transitions() {
        let ip = Ipv4Addr::new(1, 2, 3, 4);
        assert_eq!(CycleOutcome::Unchanged { ip }.transition(), PollTransition::Stable);
        assert_eq!(
            CycleOutcome::Updated {
                previous_ip: None,
                new_ip: ip
            }
            .transition(),
            PollTransition::Changed
        );
        let failed = CycleOutcome::failed("boom");
        assert_eq!(failed.transition(), PollTransition::Errored);
        assert!(!failed.is_success());
    }
}
