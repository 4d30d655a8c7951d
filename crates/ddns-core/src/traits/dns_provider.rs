// # DNS Provider Trait
//
// Defines the interface for keeping one DNS A record in sync with the detected IP.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Lifecycle
//
// ```rust,ignore
// use ddns_core::DnsProvider;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//     let ip_source = /* IpSource implementation */;
//
//     // Phase 1: resolve zone/record identifiers (once per process)
//     let target = provider.initialize(&ip_source).await?;
//
//     // Phase 2: update with the resolved target
//     provider.update_record(&target, "198.51.100.10".parse()?).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

use crate::traits::IpSource;

/// The record being kept in sync, produced by [`DnsProvider::initialize`]
///
/// Configuration stays immutable; everything discovery learns (zone id, record id,
/// record name and its split into subdomain/domain) lives here and is passed
/// explicitly to later calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub zone_id: String,
    pub record_id: String,
    /// Fully-qualified record name
    pub fqdn: String,
    pub domain: Option<String>,
    pub subdomain: Option<String>,
}

impl ResolvedTarget {
    /// Both identifiers are present and non-blank
    pub fn is_complete(&self) -> bool {
        !self.zone_id.trim().is_empty() && !self.record_id.trim().is_empty()
    }
}

/// Split a record name on its first dot into `(subdomain, domain)`
///
/// A name without a dot has no subdomain part.
pub fn split_fqdn(fqdn: &str) -> (Option<String>, String) {
    match fqdn.split_once('.') {
        Some((label, rest)) if !label.is_empty() && !rest.is_empty() => {
            (Some(label.to_string()), rest.to_string())
        }
        _ => (None, fqdn.to_string()),
    }
}

/// Trait for DNS provider implementations
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Responsibilities
///
/// - Resolve any missing identifiers for the target record
/// - Verify that the credential is usable
/// - Write the new address, retrying transient failures per the configured policy
///
/// The caller decides *whether* an update is needed (last-known IP comparison) and
/// *when* to check again.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Resolve the record to keep in sync
    ///
    /// May create the record when a name is known but no such record exists; the
    /// address for the new record comes from `ip_source`.
    ///
    /// # Returns
    ///
    /// - `Ok(ResolvedTarget)`: Zone and record identifiers are known
    /// - `Err(Error)`: Discovery could not resolve a unique target
    async fn initialize(&self, ip_source: &dyn IpSource)
    -> Result<ResolvedTarget, crate::Error>;

    /// Check that the credential can be used against the API
    async fn verify_credentials(&self) -> bool;

    /// Point the record at `new_ip`
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: The API reported success
    /// - `Ok(false)`: The API rejected the update (reasons are logged)
    /// - `Err(Error)`: Identifiers missing, or every retry attempt failed
    async fn update_record(
        &self,
        target: &ResolvedTarget,
        new_ip: Ipv4Addr,
    ) -> Result<bool, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
