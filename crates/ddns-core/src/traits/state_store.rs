// # State Store Trait
//
// Defines the interface for the persisted last-known IP.
//
// ## Purpose
//
// The state store makes repeated checks idempotent: a check whose detected IP equals
// the stored one performs no DNS update. The value is written only after a successful
// update, so a failed update is retried on the next check.
//
// ## Implementations
//
// - File-based: a single address string (`FileStateStore`)
// - In-memory: tests and ephemeral runs (`MemoryStateStore`)

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for state store implementations
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the last known IP
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Ipv4Addr))`: The last persisted IP
    /// - `Ok(None)`: Nothing persisted yet (or unreadable content)
    /// - `Err(Error)`: Storage error
    async fn get_last_ip(&self) -> Result<Option<Ipv4Addr>, crate::Error>;

    /// Persist a new last known IP
    async fn save_ip(&self, ip: Ipv4Addr) -> Result<(), crate::Error>;
}
