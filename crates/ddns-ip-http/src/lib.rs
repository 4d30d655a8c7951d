// # HTTP IP Source
//
// This crate provides the public IPv4 detector for the DDNS updater.
//
// ## Purpose
//
// Asks independent IP echo services (see [`providers`]) for the caller's address and
// returns the first valid IPv4 answer. A single service being down, slow, rate limited
// or returning garbage never fails detection on its own.
//
// ## Architecture
//
// - Provider order is shuffled per call to spread load (see [`ProviderOrder`])
// - Each service gets exactly one request, bounded by the HTTP client's timeout
// - Every failure reason is collected; if all services fail, they are reported together

pub mod providers;

use ddns_core::error::ProviderFailure;
use ddns_core::http::{DETECTION_TIMEOUT, ReqwestHttpClient};
use ddns_core::ipv4::parse_ipv4;
use ddns_core::traits::{HttpClient, HttpRequest, IpSource};
use ddns_core::{Error, Result};

use rand::rng;
use rand::seq::SliceRandom;
use std::net::Ipv4Addr;
use std::sync::Arc;

pub use providers::{FALLBACK_URL, IpProvider, ResponseFormat};

/// Decides the order in which providers are tried
pub trait ProviderOrder: Send + Sync {
    fn arrange(&self, providers: &mut [String]);
}

/// Uniformly random order (the default)
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomOrder;

impl ProviderOrder for RandomOrder {
    fn arrange(&self, providers: &mut [String]) {
        providers.shuffle(&mut rng());
    }
}

/// Configured order, unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedOrder;

impl ProviderOrder for FixedOrder {
    fn arrange(&self, _providers: &mut [String]) {}
}

/// Multi-provider HTTP IP detector
pub struct HttpIpDetector {
    http: Arc<dyn HttpClient>,

    /// Configured provider names; empty means [`IpProvider::DEFAULTS`]
    providers: Vec<String>,

    order: Box<dyn ProviderOrder>,
}

impl HttpIpDetector {
    /// Create a detector over `providers` using the given transport
    pub fn new(http: Arc<dyn HttpClient>, providers: Vec<String>) -> Self {
        Self {
            http,
            providers,
            order: Box::new(RandomOrder),
        }
    }

    /// Create a detector with a reqwest client bounded by the detection timeout
    pub fn with_default_client(providers: Vec<String>) -> Result<Self> {
        let http = ReqwestHttpClient::new(DETECTION_TIMEOUT)?;
        Ok(Self::new(Arc::new(http), providers))
    }

    /// Replace the provider ordering strategy
    pub fn with_order(mut self, order: impl ProviderOrder + 'static) -> Self {
        self.order = Box::new(order);
        self
    }

    /// Provider names in the order they would be tried next
    fn arranged_providers(&self) -> Vec<String> {
        let mut names: Vec<String> = if self.providers.is_empty() {
            IpProvider::DEFAULTS
                .iter()
                .map(|provider| provider.name().to_string())
                .collect()
        } else {
            self.providers.clone()
        };
        self.order.arrange(&mut names);
        names
    }

    /// One request to one provider; the error is the failure reason
    async fn query(&self, provider: IpProvider) -> std::result::Result<Ipv4Addr, String> {
        let response = self
            .http
            .execute(HttpRequest::get(provider.url()))
            .await
            .map_err(|e| e.to_string())?;

        if !response.is_success() {
            return Err(format!("HTTP status {}", response.status));
        }
        if response.body.trim().is_empty() {
            return Err("empty response".to_string());
        }

        let candidate = provider
            .format()
            .extract(&response.body)
            .ok_or_else(|| "unrecognized response format".to_string())?;

        parse_ipv4(&candidate).ok_or_else(|| format!("invalid IPv4 address '{candidate}'"))
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpDetector {
    async fn detect(&self) -> Result<Ipv4Addr> {
        let mut failures = Vec::new();

        for name in self.arranged_providers() {
            let Some(provider) = IpProvider::from_name(&name) else {
                tracing::warn!("Unknown IP provider '{}', skipping", name);
                failures.push(ProviderFailure::new(name, "unknown provider"));
                continue;
            };

            match self.query(provider).await {
                Ok(ip) => {
                    tracing::debug!("{} reported {}", provider, ip);
                    return Ok(ip);
                }
                Err(reason) => {
                    tracing::warn!("IP provider {} failed: {}", provider, reason);
                    failures.push(ProviderFailure::new(provider.name(), reason));
                }
            }
        }

        Err(Error::detection_failed(failures))
    }

    async fn fallback_detect(&self) -> Option<Ipv4Addr> {
        let response = match self.http.execute(HttpRequest::get(FALLBACK_URL)).await {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                tracing::debug!("Fallback IP lookup returned status {}", response.status);
                return None;
            }
            Err(e) => {
                tracing::debug!("Fallback IP lookup failed: {}", e);
                return None;
            }
        };

        ResponseFormat::Text
            .extract(&response.body)
            .and_then(|candidate| parse_ipv4(&candidate))
    }
}
