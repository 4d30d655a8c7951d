// # ddns-core
//
// Core library for the Cloudflare dynamic DNS updater.
//
// ## Architecture Overview
//
// This library provides the core functionality for keeping one A record pointed at
// the host's public IPv4 address:
// - **IpSource**: Trait for detecting the current public IP
// - **DnsProvider**: Trait for resolving and updating the target record
// - **StateStore**: Trait for persisting the last known IP (idempotency)
// - **HttpClient**: Trait for the outbound HTTP transport
// - **DdnsMonitor**: Poll controller that orchestrates detect → compare → update → persist
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Two Phases**: Configuration is immutable; discovery returns a resolved target
// 3. **Library-First**: All core functionality can be used as a library
// 4. **Idempotency**: The last IP is only persisted after a successful update

pub mod config;
pub mod error;
pub mod http;
pub mod ipv4;
pub mod monitor;
pub mod schedule;
pub mod shutdown;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::{CloudflareConfig, ConfigLayer, DdnsConfig, PollConfig, RetryConfig};
pub use error::{Error, ProviderFailure, Result};
pub use http::ReqwestHttpClient;
pub use ipv4::{is_valid_ipv4, parse_ipv4};
pub use monitor::{CycleOutcome, DdnsMonitor, MonitorEvent};
pub use schedule::{PollSchedule, PollTransition};
pub use shutdown::Shutdown;
pub use state::{FileStateStore, MemoryStateStore};
pub use traits::{DnsProvider, HttpClient, IpSource, ResolvedTarget, StateStore};
