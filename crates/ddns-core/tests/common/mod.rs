//! Test doubles and common utilities for poll controller contract tests
//!
//! The doubles share their counters through `Arc`, so a test keeps a clone for
//! assertions while the monitor owns the boxed original.

#![allow(dead_code)]

use ddns_core::config::{ConfigLayer, DdnsConfig};
use ddns_core::error::{Error, ProviderFailure, Result};
use ddns_core::traits::{DnsProvider, IpSource, ResolvedTarget, StateStore};
use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// An IpSource that plays back a script of detection results
///
/// The last scripted result repeats once the script is exhausted.
#[derive(Clone)]
pub struct ScriptedIpSource {
    script: Arc<Mutex<VecDeque<Option<Ipv4Addr>>>>,
    last: Arc<Mutex<Option<Ipv4Addr>>>,
    detect_calls: Arc<AtomicUsize>,
}

impl ScriptedIpSource {
    /// Always detects `ip`
    pub fn fixed(ip: Ipv4Addr) -> Self {
        Self::sequence(vec![Some(ip)])
    }

    /// Detects each entry in turn; `None` is a detection failure
    pub fn sequence(script: Vec<Option<Ipv4Addr>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            last: Arc::new(Mutex::new(None)),
            detect_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Every detection fails
    pub fn failing() -> Self {
        Self::sequence(vec![None])
    }

    pub fn detect_calls(&self) -> usize {
        self.detect_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for ScriptedIpSource {
    async fn detect(&self) -> Result<Ipv4Addr> {
        self.detect_calls.fetch_add(1, Ordering::SeqCst);

        let next = {
            let mut script = self.script.lock().unwrap();
            let mut last = self.last.lock().unwrap();
            match script.pop_front() {
                Some(entry) => {
                    *last = entry;
                    // Keep the final entry around so it repeats.
                    if script.is_empty() {
                        script.push_back(entry);
                    }
                    entry
                }
                None => *last,
            }
        };

        next.ok_or_else(|| {
            Error::detection_failed(vec![ProviderFailure::new("scripted", "no address")])
        })
    }
}

/// How the mock provider answers update requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateBehavior {
    Succeed,
    /// API answered with `success: false`
    Reject,
    /// Every retry attempt failed
    Fail,
}

/// A mock DnsProvider that records every call
#[derive(Clone)]
pub struct MockDnsProvider {
    initialize_calls: Arc<AtomicUsize>,
    verify_calls: Arc<AtomicUsize>,
    updates: Arc<Mutex<Vec<(ResolvedTarget, Ipv4Addr)>>>,
    initialize_error: Arc<Mutex<Option<fn() -> Error>>>,
    credentials_valid: bool,
    update_behavior: UpdateBehavior,
    update_delay: Option<Duration>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self {
            initialize_calls: Arc::new(AtomicUsize::new(0)),
            verify_calls: Arc::new(AtomicUsize::new(0)),
            updates: Arc::new(Mutex::new(Vec::new())),
            initialize_error: Arc::new(Mutex::new(None)),
            credentials_valid: true,
            update_behavior: UpdateBehavior::Succeed,
            update_delay: None,
        }
    }

    pub fn with_invalid_credentials(mut self) -> Self {
        self.credentials_valid = false;
        self
    }

    pub fn with_update_behavior(mut self, behavior: UpdateBehavior) -> Self {
        self.update_behavior = behavior;
        self
    }

    /// Each update takes `delay` before answering
    pub fn with_update_delay(mut self, delay: Duration) -> Self {
        self.update_delay = Some(delay);
        self
    }

    /// Make `initialize` fail until cleared
    pub fn fail_initialize_with(&self, make_error: fn() -> Error) {
        *self.initialize_error.lock().unwrap() = Some(make_error);
    }

    pub fn clear_initialize_failure(&self) {
        *self.initialize_error.lock().unwrap() = None;
    }

    pub fn initialize_calls(&self) -> usize {
        self.initialize_calls.load(Ordering::SeqCst)
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn update_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }

    pub fn updated_ips(&self) -> Vec<Ipv4Addr> {
        self.updates.lock().unwrap().iter().map(|(_, ip)| *ip).collect()
    }

    pub fn updated_targets(&self) -> Vec<ResolvedTarget> {
        self.updates
            .lock()
            .unwrap()
            .iter()
            .map(|(target, _)| target.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn initialize(&self, _ip_source: &dyn IpSource) -> Result<ResolvedTarget> {
        self.initialize_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(make_error) = *self.initialize_error.lock().unwrap() {
            return Err(make_error());
        }
        Ok(test_target())
    }

    async fn verify_credentials(&self) -> bool {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        self.credentials_valid
    }

    async fn update_record(&self, target: &ResolvedTarget, new_ip: Ipv4Addr) -> Result<bool> {
        if let Some(delay) = self.update_delay {
            tokio::time::sleep(delay).await;
        }
        self.updates.lock().unwrap().push((target.clone(), new_ip));

        match self.update_behavior {
            UpdateBehavior::Succeed => Ok(true),
            UpdateBehavior::Reject => Ok(false),
            UpdateBehavior::Fail => Err(Error::api(500, "upstream unavailable", None)),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A StateStore whose reads and/or writes fail
#[derive(Clone, Default)]
pub struct BrokenStateStore {
    pub fail_reads: bool,
    pub fail_writes: bool,
    save_calls: Arc<AtomicUsize>,
}

impl BrokenStateStore {
    pub fn unwritable() -> Self {
        Self {
            fail_writes: true,
            ..Default::default()
        }
    }

    pub fn unreadable() -> Self {
        Self {
            fail_reads: true,
            ..Default::default()
        }
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl StateStore for BrokenStateStore {
    async fn get_last_ip(&self) -> Result<Option<Ipv4Addr>> {
        if self.fail_reads {
            return Err(Error::state_store("disk unreadable"));
        }
        Ok(None)
    }

    async fn save_ip(&self, _ip: Ipv4Addr) -> Result<()> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(Error::state_store("disk full"));
        }
        Ok(())
    }
}

/// The target every MockDnsProvider resolves to
pub fn test_target() -> ResolvedTarget {
    ResolvedTarget {
        zone_id: "z1".to_string(),
        record_id: "r1".to_string(),
        fqdn: "home.example.com".to_string(),
        domain: Some("example.com".to_string()),
        subdomain: Some("home".to_string()),
    }
}

/// A configured DdnsConfig with default polling
pub fn test_config() -> DdnsConfig {
    DdnsConfig::from_layer(ConfigLayer {
        api_token: Some("test-token-0123456789".to_string()),
        domain: Some("example.com".to_string()),
        subdomain: Some("home".to_string()),
        ..Default::default()
    })
}

/// A DdnsConfig with no API token
pub fn unconfigured() -> DdnsConfig {
    DdnsConfig::from_layer(ConfigLayer::default())
}

pub fn ip(last: u8) -> Ipv4Addr {
    Ipv4Addr::new(198, 51, 100, last)
}
