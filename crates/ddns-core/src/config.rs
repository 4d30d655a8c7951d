//! Configuration types for the DDNS updater
//!
//! Configuration is assembled once at startup from layered sources, highest precedence
//! first:
//!
//! 1. direct overrides (CLI flags or the programmatic entry point)
//! 2. `DDNS_*` environment variables
//! 3. the TOML config file written by `ddnsd --setup`
//! 4. built-in defaults
//!
//! Every source is read into a [`ConfigLayer`] (all fields optional); layers are stacked
//! with [`ConfigLayer::or`] and resolved into an immutable [`DdnsConfig`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Default record TTL in seconds
pub const DEFAULT_TTL: u32 = 120;

/// Default number of update attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay between update attempts
pub const DEFAULT_RETRY_DELAY_MS: u64 = 5_000;

/// Default fixed check interval (non-adaptive mode)
pub const DEFAULT_CHECK_INTERVAL_MS: u64 = 60_000;

/// Adaptive mode floor
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 30_000;

/// Adaptive mode ceiling
pub const DEFAULT_MAX_INTERVAL_MS: u64 = 300_000;

/// Default Cloudflare API version
pub const DEFAULT_API_VERSION: &str = "v4";

/// Default Cloudflare API base URL (the version segment is appended per request)
pub const DEFAULT_API_URL: &str = "https://api.cloudflare.com/client";

/// Directory name used under the OS config/data directories
const APP_DIR: &str = "cloudflare-ddns";

/// Main DDNS configuration
#[derive(Debug, Clone)]
pub struct DdnsConfig {
    /// Cloudflare credential, target identifiers and record attributes
    pub cloudflare: CloudflareConfig,

    /// Retry policy for record updates
    pub retry: RetryConfig,

    /// Polling policy for continuous mode
    pub poll: PollConfig,

    /// Ordered IP provider names; empty means the detector's default set
    pub ip_providers: Vec<String>,

    /// Optional log file (appended to, best-effort)
    pub log_file: Option<PathBuf>,

    /// Where the last known IP is persisted
    pub last_ip_file: PathBuf,

    /// Emit debug-level logs
    pub debug: bool,
}

/// Cloudflare target and API settings
#[derive(Clone, PartialEq, Eq)]
pub struct CloudflareConfig {
    /// API token
    /// ⚠️ NEVER log this value
    pub api_token: String,
    pub zone_id: Option<String>,
    pub record_id: Option<String>,
    pub domain: Option<String>,
    pub subdomain: Option<String>,
    /// Record TTL in seconds
    pub ttl: u32,
    pub proxied: bool,
    /// API version segment, e.g. `v4`
    pub api_version: String,
    /// API base URL without the version segment
    pub api_url: String,
    /// Look for a working API version before discovery
    pub auto_detect_api: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareConfig")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("record_id", &self.record_id)
            .field("domain", &self.domain)
            .field("subdomain", &self.subdomain)
            .field("ttl", &self.ttl)
            .field("proxied", &self.proxied)
            .field("api_version", &self.api_version)
            .field("api_url", &self.api_url)
            .field("auto_detect_api", &self.auto_detect_api)
            .finish()
    }
}

impl CloudflareConfig {
    /// Create a configuration holding only a token, everything else defaulted
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            zone_id: None,
            record_id: None,
            domain: None,
            subdomain: None,
            ttl: DEFAULT_TTL,
            proxied: false,
            api_version: DEFAULT_API_VERSION.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            auto_detect_api: true,
        }
    }

    /// Fully-qualified record name
    ///
    /// `subdomain.domain` when both are set, the bare domain when only the domain is set.
    pub fn fqdn(&self) -> Option<String> {
        match (self.domain.as_deref(), self.subdomain.as_deref()) {
            (Some(domain), Some(subdomain)) => Some(format!("{subdomain}.{domain}")),
            (Some(domain), None) => Some(domain.to_string()),
            _ => None,
        }
    }
}

/// Retry policy for record updates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Fixed delay between attempts (no exponential growth)
    pub delay_ms: u64,
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RETRIES,
            delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

/// Polling policy for continuous mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Interval used when adaptive mode is off
    pub interval_ms: u64,
    /// Adapt the interval to observed IP stability
    pub adaptive: bool,
    pub min_interval_ms: u64,
    pub max_interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_CHECK_INTERVAL_MS,
            adaptive: true,
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
            max_interval_ms: DEFAULT_MAX_INTERVAL_MS,
        }
    }
}

/// One configuration source with every field optional
///
/// Used for direct overrides, the environment, and the TOML config file alike.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigLayer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_delay_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_interval_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adaptive_interval: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_interval_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_interval_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_services: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_ip_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_detect_api: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
    /// Location of the TOML file; only meaningful in the override and env layers
    #[serde(skip)]
    pub config_file: Option<PathBuf>,
}

macro_rules! stack_fields {
    ($upper:ident, $lower:ident, $($field:ident),+ $(,)?) => {
        ConfigLayer {
            $($field: $upper.$field.or($lower.$field),)+
        }
    };
}

impl ConfigLayer {
    /// Stack this layer on top of `lower`: fields set here win
    pub fn or(self, lower: ConfigLayer) -> ConfigLayer {
        stack_fields!(
            self,
            lower,
            api_token,
            zone_id,
            record_id,
            domain,
            subdomain,
            ttl,
            proxied,
            max_retries,
            retry_delay_ms,
            check_interval_ms,
            adaptive_interval,
            min_interval_ms,
            max_interval_ms,
            ip_services,
            log_file,
            last_ip_file,
            api_version,
            api_url,
            auto_detect_api,
            debug,
            config_file,
        )
    }

    /// Read the `DDNS_*` variables through `lookup`
    ///
    /// Blank values count as unset. Malformed numbers and booleans are rejected rather
    /// than silently defaulted.
    pub fn from_env<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(Self {
            api_token: get("DDNS_API_TOKEN"),
            zone_id: get("DDNS_ZONE_ID"),
            record_id: get("DDNS_RECORD_ID"),
            domain: get("DDNS_DOMAIN"),
            subdomain: get("DDNS_SUBDOMAIN"),
            ttl: parse_number("DDNS_TTL", get("DDNS_TTL"))?,
            proxied: parse_flag("DDNS_PROXIED", get("DDNS_PROXIED"))?,
            max_retries: parse_number("DDNS_MAX_RETRIES", get("DDNS_MAX_RETRIES"))?,
            retry_delay_ms: parse_number("DDNS_RETRY_DELAY_MS", get("DDNS_RETRY_DELAY_MS"))?,
            check_interval_ms: parse_number(
                "DDNS_CHECK_INTERVAL_MS",
                get("DDNS_CHECK_INTERVAL_MS"),
            )?,
            adaptive_interval: parse_flag(
                "DDNS_ADAPTIVE_INTERVAL",
                get("DDNS_ADAPTIVE_INTERVAL"),
            )?,
            min_interval_ms: parse_number("DDNS_MIN_INTERVAL_MS", get("DDNS_MIN_INTERVAL_MS"))?,
            max_interval_ms: parse_number("DDNS_MAX_INTERVAL_MS", get("DDNS_MAX_INTERVAL_MS"))?,
            ip_services: get("DDNS_IP_SERVICES").map(|list| {
                list.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            }),
            log_file: get("DDNS_LOG_FILE").map(PathBuf::from),
            last_ip_file: get("DDNS_LAST_IP_FILE").map(PathBuf::from),
            api_version: get("DDNS_API_VERSION"),
            api_url: get("DDNS_API_URL"),
            auto_detect_api: parse_flag("DDNS_AUTO_DETECT_API", get("DDNS_AUTO_DETECT_API"))?,
            debug: parse_flag("DDNS_DEBUG", get("DDNS_DEBUG"))?,
            config_file: get("DDNS_CONFIG_FILE").map(PathBuf::from),
        })
    }

    /// Load a TOML config file; a missing file is an empty layer
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("Config file does not exist: {}", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|e| {
            Error::config(format!("Failed to parse config file {}: {}", path.display(), e))
        })
    }

    /// Write this layer as a TOML file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: Option<String>) -> Result<Option<T>> {
    value
        .map(|v| {
            v.parse::<T>()
                .map_err(|_| Error::config(format!("{key} must be a non-negative integer, got '{v}'")))
        })
        .transpose()
}

fn parse_flag(key: &str, value: Option<String>) -> Result<Option<bool>> {
    value
        .map(|v| match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(Error::config(format!("{key} must be true or false, got '{v}'"))),
        })
        .transpose()
}

/// Default location of the TOML config file
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.toml")
}

/// Default location of the last-IP file
pub fn default_last_ip_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("last_ip")
}

impl DdnsConfig {
    /// Load configuration from overrides, the process environment and the config file
    pub fn load(overrides: ConfigLayer) -> Result<Self> {
        let env = ConfigLayer::from_env(|key| std::env::var(key).ok())?;
        let path = overrides
            .config_file
            .clone()
            .or_else(|| env.config_file.clone())
            .unwrap_or_else(default_config_path);
        let file = ConfigLayer::from_file(&path)?;

        tracing::debug!("Loading configuration (file: {})", path.display());
        Ok(Self::from_layer(overrides.or(env).or(file)))
    }

    /// Resolve a stacked layer, filling gaps with defaults
    pub fn from_layer(layer: ConfigLayer) -> Self {
        let poll_defaults = PollConfig::default();

        Self {
            cloudflare: CloudflareConfig {
                api_token: layer.api_token.unwrap_or_default(),
                zone_id: layer.zone_id,
                record_id: layer.record_id,
                domain: layer.domain,
                subdomain: layer.subdomain,
                ttl: layer.ttl.unwrap_or(DEFAULT_TTL),
                proxied: layer.proxied.unwrap_or(false),
                api_version: layer
                    .api_version
                    .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
                api_url: layer
                    .api_url
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
                auto_detect_api: layer.auto_detect_api.unwrap_or(true),
            },
            retry: RetryConfig {
                max_attempts: layer.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
                delay_ms: layer.retry_delay_ms.unwrap_or(DEFAULT_RETRY_DELAY_MS),
            },
            poll: PollConfig {
                interval_ms: layer.check_interval_ms.unwrap_or(poll_defaults.interval_ms),
                adaptive: layer.adaptive_interval.unwrap_or(poll_defaults.adaptive),
                min_interval_ms: layer.min_interval_ms.unwrap_or(poll_defaults.min_interval_ms),
                max_interval_ms: layer.max_interval_ms.unwrap_or(poll_defaults.max_interval_ms),
            },
            ip_providers: layer.ip_services.unwrap_or_default(),
            log_file: layer.log_file,
            last_ip_file: layer.last_ip_file.unwrap_or_else(default_last_ip_path),
            debug: layer.debug.unwrap_or(false),
        }
    }

    /// A credential is present; without one the caller should run setup
    pub fn is_configured(&self) -> bool {
        !self.cloudflare.api_token.trim().is_empty()
    }

    /// Validate the configuration
    ///
    /// The token is always required. Accepted combinations:
    ///
    /// - token + domain + subdomain
    /// - token + domain (the domain is the full record name)
    /// - token + zone id + record id
    /// - token alone (zone and record are discovered)
    ///
    /// A subdomain needs a domain, and without a domain the zone id and record id come
    /// as a pair. Every missing field is reported at once; numeric fields are
    /// range-checked afterwards.
    pub fn validate(&self) -> Result<()> {
        let cf = &self.cloudflare;
        let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());

        let mut missing = Vec::new();
        if cf.api_token.trim().is_empty() {
            missing.push("DDNS_API_TOKEN");
        }
        if blank(&cf.domain) {
            if !blank(&cf.subdomain) {
                missing.push("DDNS_DOMAIN");
            }
            match (blank(&cf.zone_id), blank(&cf.record_id)) {
                (false, true) => missing.push("DDNS_RECORD_ID"),
                (true, false) => missing.push("DDNS_ZONE_ID"),
                _ => {}
            }
        }
        if !missing.is_empty() {
            return Err(Error::config(format!(
                "Missing required configuration: {}. Accepted combinations: \
                 token + domain + subdomain; token + domain (as the full record name); \
                 token + zone id + record id; token alone (full discovery)",
                missing.join(", ")
            )));
        }

        if cf.ttl != 1 && cf.ttl < 60 {
            return Err(Error::config(format!(
                "DDNS_TTL must be at least 60 seconds (or 1 for automatic). Got: {}",
                cf.ttl
            )));
        }

        if self.retry.max_attempts == 0 {
            return Err(Error::config("DDNS_MAX_RETRIES must be at least 1"));
        }

        if self.poll.min_interval_ms > self.poll.max_interval_ms {
            return Err(Error::config(format!(
                "DDNS_MIN_INTERVAL_MS ({}) cannot exceed DDNS_MAX_INTERVAL_MS ({})",
                self.poll.min_interval_ms, self.poll.max_interval_ms
            )));
        }

        Ok(())
    }

    /// Look up one resolved value by its environment key (token redacted)
    pub fn get(&self, key: &str) -> Option<String> {
        self.all().remove(key)
    }

    /// Every resolved value keyed by environment name, for diagnostics
    ///
    /// The API token is reduced to its last four characters.
    pub fn all(&self) -> BTreeMap<&'static str, String> {
        let cf = &self.cloudflare;
        let mut map = BTreeMap::new();

        if !cf.api_token.is_empty() {
            map.insert("DDNS_API_TOKEN", redact(&cf.api_token));
        }
        let optional = [
            ("DDNS_ZONE_ID", &cf.zone_id),
            ("DDNS_RECORD_ID", &cf.record_id),
            ("DDNS_DOMAIN", &cf.domain),
            ("DDNS_SUBDOMAIN", &cf.subdomain),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                map.insert(key, value.clone());
            }
        }
        if let Some(fqdn) = cf.fqdn() {
            map.insert("DDNS_FQDN", fqdn);
        }
        map.insert("DDNS_TTL", cf.ttl.to_string());
        map.insert("DDNS_PROXIED", cf.proxied.to_string());
        map.insert("DDNS_API_VERSION", cf.api_version.clone());
        map.insert("DDNS_API_URL", cf.api_url.clone());
        map.insert("DDNS_AUTO_DETECT_API", cf.auto_detect_api.to_string());
        map.insert("DDNS_MAX_RETRIES", self.retry.max_attempts.to_string());
        map.insert("DDNS_RETRY_DELAY_MS", self.retry.delay_ms.to_string());
        map.insert("DDNS_CHECK_INTERVAL_MS", self.poll.interval_ms.to_string());
        map.insert("DDNS_ADAPTIVE_INTERVAL", self.poll.adaptive.to_string());
        map.insert("DDNS_MIN_INTERVAL_MS", self.poll.min_interval_ms.to_string());
        map.insert("DDNS_MAX_INTERVAL_MS", self.poll.max_interval_ms.to_string());
        if !self.ip_providers.is_empty() {
            map.insert("DDNS_IP_SERVICES", self.ip_providers.join(","));
        }
        if let Some(ref log_file) = self.log_file {
            map.insert("DDNS_LOG_FILE", log_file.display().to_string());
        }
        map.insert("DDNS_LAST_IP_FILE", self.last_ip_file.display().to_string());
        map.insert("DDNS_DEBUG", self.debug.to_string());
        map
    }
}

fn redact(secret: &str) -> String {
    let tail: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("****{tail}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn fqdn_is_derived_from_domain_and_subdomain() {
        let mut cf = CloudflareConfig::new("t");
        assert_eq!(cf.fqdn(), None);

        cf.domain = Some("example.com".to_string());
        assert_eq!(cf.fqdn().as_deref(), Some("example.com"));

        cf.subdomain = Some("home".to_string());
        assert_eq!(cf.fqdn().as_deref(), Some("home.example.com"));
    }

    #[test]
    fn overrides_beat_env_beat_file_beat_defaults() {
        let overrides = ConfigLayer {
            subdomain: Some("cli".to_string()),
            ..Default::default()
        };
        let env_layer = ConfigLayer::from_env(env(&[
            ("DDNS_SUBDOMAIN", "env"),
            ("DDNS_DOMAIN", "env.example"),
            ("DDNS_TTL", "300"),
        ]))
        .unwrap();
        let file = ConfigLayer {
            api_token: Some("file-token".to_string()),
            domain: Some("file.example".to_string()),
            ..Default::default()
        };

        let config = DdnsConfig::from_layer(overrides.or(env_layer).or(file));

        assert_eq!(config.cloudflare.subdomain.as_deref(), Some("cli"));
        assert_eq!(config.cloudflare.domain.as_deref(), Some("env.example"));
        assert_eq!(config.cloudflare.api_token, "file-token");
        assert_eq!(config.cloudflare.ttl, 300);
        assert!(!config.cloudflare.proxied);
        assert_eq!(config.retry, RetryConfig::default());
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = DdnsConfig::from_layer(ConfigLayer::default());
        assert_eq!(config.cloudflare.ttl, 120);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay_ms, 5_000);
        assert_eq!(config.poll.interval_ms, 60_000);
        assert_eq!(config.poll.min_interval_ms, 30_000);
        assert_eq!(config.poll.max_interval_ms, 300_000);
        assert_eq!(config.cloudflare.api_version, "v4");
        assert!(config.ip_providers.is_empty());
    }

    #[test]
    fn env_rejects_malformed_values() {
        assert!(ConfigLayer::from_env(env(&[("DDNS_TTL", "soon")])).is_err());
        assert!(ConfigLayer::from_env(env(&[("DDNS_PROXIED", "maybe")])).is_err());
    }

    #[test]
    fn env_splits_provider_list_and_ignores_blanks() {
        let layer = ConfigLayer::from_env(env(&[
            ("DDNS_IP_SERVICES", "ipify, icanhazip,,"),
            ("DDNS_ZONE_ID", "   "),
        ]))
        .unwrap();
        assert_eq!(
            layer.ip_services,
            Some(vec!["ipify".to_string(), "icanhazip".to_string()])
        );
        assert_eq!(layer.zone_id, None);
    }

    #[test]
    fn validate_names_every_missing_field() {
        let config = DdnsConfig::from_layer(ConfigLayer {
            subdomain: Some("home".to_string()),
            ..Default::default()
        });
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("DDNS_API_TOKEN"));
        assert!(err.contains("DDNS_DOMAIN"));
    }

    fn token_layer() -> ConfigLayer {
        ConfigLayer {
            api_token: Some("t".to_string()),
            ..Default::default()
        }
    }

    fn missing_fields(layer: ConfigLayer) -> String {
        DdnsConfig::from_layer(layer).validate().unwrap_err().to_string()
    }

    #[test]
    fn validate_accepts_each_documented_combination() {
        let accepted = [
            ConfigLayer {
                domain: Some("example.com".to_string()),
                subdomain: Some("home".to_string()),
                ..token_layer()
            },
            ConfigLayer {
                domain: Some("home.example.com".to_string()),
                ..token_layer()
            },
            ConfigLayer {
                zone_id: Some("z1".to_string()),
                record_id: Some("r1".to_string()),
                ..token_layer()
            },
            token_layer(),
        ];

        for layer in accepted {
            let config = DdnsConfig::from_layer(layer.clone());
            assert!(config.validate().is_ok(), "rejected {layer:?}");
        }
    }

    #[test]
    fn validate_rejects_zone_id_without_record_id() {
        let err = missing_fields(ConfigLayer {
            zone_id: Some("z1".to_string()),
            ..token_layer()
        });
        assert!(err.contains("Missing required configuration: DDNS_RECORD_ID."), "{err}");
    }

    #[test]
    fn validate_rejects_record_id_without_zone_id() {
        let err = missing_fields(ConfigLayer {
            record_id: Some("r1".to_string()),
            ..token_layer()
        });
        assert!(err.contains("Missing required configuration: DDNS_ZONE_ID."), "{err}");
    }

    #[test]
    fn validate_rejects_subdomain_without_domain() {
        let err = missing_fields(ConfigLayer {
            subdomain: Some("home".to_string()),
            zone_id: Some("z1".to_string()),
            record_id: Some("r1".to_string()),
            ..token_layer()
        });
        assert!(err.contains("Missing required configuration: DDNS_DOMAIN."), "{err}");
    }

    #[test]
    fn validate_ignores_ids_when_domain_names_the_record() {
        let config = DdnsConfig::from_layer(ConfigLayer {
            domain: Some("example.com".to_string()),
            zone_id: Some("z1".to_string()),
            ..token_layer()
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_short_ttl() {
        let config = DdnsConfig::from_layer(ConfigLayer {
            api_token: Some("t".to_string()),
            ttl: Some(30),
            ..Default::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn all_redacts_token() {
        let config = DdnsConfig::from_layer(ConfigLayer {
            api_token: Some("abcdefghijklmnop".to_string()),
            domain: Some("example.com".to_string()),
            subdomain: Some("home".to_string()),
            ..Default::default()
        });
        let token = config.get("DDNS_API_TOKEN").unwrap();
        assert_eq!(token, "****mnop");
        assert_eq!(config.get("DDNS_FQDN").as_deref(), Some("home.example.com"));
        assert!(!format!("{:?}", config).contains("abcdefghijklmnop"));
    }

    #[test]
    fn file_layer_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let layer = ConfigLayer {
            api_token: Some("t".to_string()),
            domain: Some("example.com".to_string()),
            proxied: Some(true),
            ..Default::default()
        };

        layer.save(&path).unwrap();
        assert_eq!(ConfigLayer::from_file(&path).unwrap(), layer);
    }

    #[test]
    fn missing_file_is_an_empty_layer() {
        let dir = tempfile::tempdir().unwrap();
        let layer = ConfigLayer::from_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(layer, ConfigLayer::default());
    }
}
