//! Core traits for the DDNS updater
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Detect the current public IPv4 address
//! - [`DnsProvider`]: Resolve and update the target DNS record
//! - [`StateStore`]: Persist the last known IP for idempotency
//! - [`HttpClient`]: Outbound HTTP transport

pub mod dns_provider;
pub mod http_client;
pub mod ip_source;
pub mod state_store;

pub use dns_provider::{DnsProvider, ResolvedTarget, split_fqdn};
pub use http_client::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use ip_source::IpSource;
pub use state_store::StateStore;
