// # IP echo service catalog
//
// Each service answers a GET with the caller's address, in one of three shapes:
//
// - JSON object with an `ip` field: `{"ip":"203.0.113.5"}`
// - Plain text: `203.0.113.5\n`
// - Key/value trace lines: `...\nip=203.0.113.5\n...`
//
// The parser only extracts a candidate string; IPv4 validation happens afterwards.

/// Response body shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// JSON object with an `ip` string field
    Json,
    /// The body is the address
    Text,
    /// `key=value` lines; the address is on the `ip=` line
    Trace,
}

impl ResponseFormat {
    /// Extract the candidate address from a response body
    pub fn extract(self, body: &str) -> Option<String> {
        match self {
            ResponseFormat::Json => serde_json::from_str::<serde_json::Value>(body)
                .ok()?
                .get("ip")?
                .as_str()
                .map(|ip| ip.trim().to_string()),
            ResponseFormat::Text => {
                let ip = body.trim();
                (!ip.is_empty()).then(|| ip.to_string())
            }
            ResponseFormat::Trace => body
                .lines()
                .find_map(|line| line.trim().strip_prefix("ip="))
                .map(|ip| ip.trim().to_string()),
        }
    }
}

/// Known IP echo services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpProvider {
    Ipify,
    Ipinfo,
    Icanhazip,
    Ifconfig,
    Cloudflare,
    Seeip,
}

impl IpProvider {
    /// Every known provider
    pub const ALL: [IpProvider; 6] = [
        IpProvider::Ipify,
        IpProvider::Ipinfo,
        IpProvider::Icanhazip,
        IpProvider::Ifconfig,
        IpProvider::Cloudflare,
        IpProvider::Seeip,
    ];

    /// Providers used when none are configured
    pub const DEFAULTS: [IpProvider; 4] = [
        IpProvider::Ipify,
        IpProvider::Ipinfo,
        IpProvider::Icanhazip,
        IpProvider::Ifconfig,
    ];

    /// Configuration name
    pub fn name(self) -> &'static str {
        match self {
            IpProvider::Ipify => "ipify",
            IpProvider::Ipinfo => "ipinfo",
            IpProvider::Icanhazip => "icanhazip",
            IpProvider::Ifconfig => "ifconfig",
            IpProvider::Cloudflare => "cloudflare",
            IpProvider::Seeip => "seeip",
        }
    }

    pub fn url(self) -> &'static str {
        match self {
            IpProvider::Ipify => "https://api.ipify.org?format=json",
            IpProvider::Ipinfo => "https://ipinfo.io/json",
            IpProvider::Icanhazip => "https://ipv4.icanhazip.com",
            IpProvider::Ifconfig => "https://ifconfig.me/ip",
            IpProvider::Cloudflare => "https://1.1.1.1/cdn-cgi/trace",
            IpProvider::Seeip => "https://api.seeip.org/jsonip",
        }
    }

    pub fn format(self) -> ResponseFormat {
        match self {
            IpProvider::Ipify | IpProvider::Ipinfo | IpProvider::Seeip => ResponseFormat::Json,
            IpProvider::Icanhazip | IpProvider::Ifconfig => ResponseFormat::Text,
            IpProvider::Cloudflare => ResponseFormat::Trace,
        }
    }

    /// Look up a provider by its configuration name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|provider| provider.name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for IpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Last-resort service used by `fallback_detect`
pub const FALLBACK_URL: &str = "https://checkip.amazonaws.com";
