// # IP Source Trait
//
// Defines the interface for detecting the caller's current public IPv4 address.
//
// ## Implementations
//
// - Multi-provider HTTP detection: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//
//     // Detect the current public IP (fails only if every provider fails)
//     let current_ip = source.detect().await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for IP source implementations
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Failure Model
///
/// `detect()` tolerates the failure of any individual upstream service. It fails only
/// when every configured service failed, with an error aggregating each reason
/// (`Error::DetectionFailed`). It never returns a partial or best-effort answer.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Detect the current public IPv4 address
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: The first valid address reported by a provider
    /// - `Err(Error)`: If every provider failed
    async fn detect(&self) -> Result<Ipv4Addr, crate::Error>;

    /// Single best-effort lookup against a last-resort service
    ///
    /// Returns `None` (never an error) on failure.
    async fn fallback_detect(&self) -> Option<Ipv4Addr> {
        None
    }
}
