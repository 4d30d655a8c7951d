// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare implementation of `DnsProvider`.
//
// ## Responsibilities
//
// - Resolve the zone and A record to keep in sync ([`discovery`]), creating the record
//   when a name is configured but no such record exists
// - Verify the API token
// - Replace the record's content, retrying transient failures ([`retry`])
// - Tolerate API drift: a 404 on a zones path tries other API versions and record
//   path spellings before giving up ([`api`])
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Provider construction fails (rather than panicking) on an empty token
//
// ## API Reference
//
// - Verify token: GET `/user/tokens/verify`
// - List zones: GET `/zones`
// - List DNS records: GET `/zones/:zone_id/dns_records?type=A&name=...`
// - Create DNS record: POST `/zones/:zone_id/dns_records`
// - Update DNS record: PUT `/zones/:zone_id/dns_records/:record_id`

pub mod api;
pub mod discovery;
pub mod retry;
pub mod types;

use async_trait::async_trait;
use ddns_core::config::{CloudflareConfig, DdnsConfig, RetryConfig};
use ddns_core::http::{API_TIMEOUT, ReqwestHttpClient};
use ddns_core::traits::{DnsProvider, HttpClient, HttpMethod, IpSource, ResolvedTarget};
use ddns_core::{Error, Result};
use serde_json::Value;
use std::net::Ipv4Addr;
use std::sync::Arc;

use crate::api::{ApiClient, TOKEN_VERIFY_PATH};
use crate::types::DnsRecordPayload;

/// Lightest authenticated call, used when token verification is unavailable
const ZONE_LIST_CHECK_PATH: &str = "/zones?per_page=1";

/// Cloudflare DNS provider
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API token.
pub struct CloudflareProvider {
    api: ApiClient,

    /// Target hints and record attributes (immutable; discovery results live in
    /// the `ResolvedTarget`)
    config: CloudflareConfig,

    retry: RetryConfig,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api", &self.api)
            .field("config", &self.config)
            .field("retry", &self.retry)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a provider over the given transport
    ///
    /// # Errors
    ///
    /// `Error::Config` when the API token is empty.
    pub fn new(
        config: CloudflareConfig,
        retry: RetryConfig,
        http: Arc<dyn HttpClient>,
    ) -> Result<Self> {
        if config.api_token.trim().is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let api = ApiClient::new(
            http,
            config.api_token.clone(),
            config.api_url.clone(),
            config.api_version.clone(),
        );

        Ok(Self { api, config, retry })
    }

    /// Create a provider with a reqwest client bounded by the API timeout
    pub fn from_config(config: &DdnsConfig) -> Result<Self> {
        let http = ReqwestHttpClient::new(API_TIMEOUT)?;
        Self::new(config.cloudflare.clone(), config.retry, Arc::new(http))
    }

    /// API version currently in use (may change after drift recovery)
    pub fn api_version(&self) -> String {
        self.api.version()
    }

    async fn answers(&self, path: &str) -> Result<bool> {
        Ok(self
            .api
            .request::<Value>(HttpMethod::Get, path, None)
            .await?
            .success)
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    async fn initialize(&self, ip_source: &dyn IpSource) -> Result<ResolvedTarget> {
        discovery::discover(&self.api, &self.config, ip_source).await
    }

    async fn verify_credentials(&self) -> bool {
        match self.answers(TOKEN_VERIFY_PATH).await {
            Ok(true) => {
                tracing::debug!("API token verified");
                return true;
            }
            Ok(false) => tracing::debug!("Token verification reported failure, trying zone access"),
            Err(e) => tracing::debug!("Token verification failed ({}), trying zone access", e),
        }

        match self.answers(ZONE_LIST_CHECK_PATH).await {
            Ok(true) => true,
            Ok(false) => {
                tracing::error!("API token was rejected");
                false
            }
            Err(e) => {
                tracing::error!("API token could not be verified: {}", e);
                false
            }
        }
    }

    async fn update_record(&self, target: &ResolvedTarget, new_ip: Ipv4Addr) -> Result<bool> {
        if !target.is_complete() {
            return Err(Error::invalid_input(
                "zone and record identifiers must be resolved before updating",
            ));
        }

        let payload = DnsRecordPayload::a(
            target.fqdn.clone(),
            new_ip,
            self.config.ttl,
            self.config.proxied,
        );
        let body = serde_json::to_value(&payload)?;
        let path = format!("/zones/{}/dns_records/{}", target.zone_id, target.record_id);

        tracing::info!("Updating {} -> {}", target.fqdn, new_ip);

        let api = &self.api;
        let path = path.as_str();
        let response = retry::with_retry(&self.retry, move || {
            api.request::<Value>(HttpMethod::Put, path, Some(body.clone()))
        })
        .await?;

        if response.success {
            tracing::info!("DNS record updated successfully: {} -> {}", target.fqdn, new_ip);
            Ok(true)
        } else {
            tracing::error!(
                "Cloudflare rejected the update of {}: {}",
                target.fqdn,
                response.error_messages()
            );
            Ok(false)
        }
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddns_core::traits::{HttpRequest, HttpResponse};

    struct Offline;

    #[async_trait]
    impl HttpClient for Offline {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse> {
            Err(Error::http("offline"))
        }
    }

    #[test]
    fn empty_token_is_rejected() {
        let result = CloudflareProvider::new(
            CloudflareConfig::new("  "),
            RetryConfig::default(),
            Arc::new(Offline),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_api_token_not_exposed_in_debug() {
        let provider = CloudflareProvider::new(
            CloudflareConfig::new("secret_token_12345"),
            RetryConfig::default(),
            Arc::new(Offline),
        )
        .unwrap();

        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("secret_token"));
        assert!(debug_str.contains("CloudflareProvider"));
    }

    #[tokio::test]
    async fn incomplete_target_fails_fast() {
        let provider = CloudflareProvider::new(
            CloudflareConfig::new("token"),
            RetryConfig::default(),
            Arc::new(Offline),
        )
        .unwrap();
        let target = ResolvedTarget {
            zone_id: "z1".to_string(),
            record_id: String::new(),
            fqdn: "home.example.com".to_string(),
            domain: None,
            subdomain: None,
        };

        let result = provider.update_record(&target, Ipv4Addr::new(1, 2, 3, 4)).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn unreachable_api_fails_verification() {
        let provider = CloudflareProvider::new(
            CloudflareConfig::new("token"),
            RetryConfig::default(),
            Arc::new(Offline),
        )
        .unwrap();
        assert!(!provider.verify_credentials().await);
    }
}
