// # HTTP Client Trait
//
// The single seam through which every outbound HTTP call is made, both to the IP echo
// services and to the DNS provider API. Production code uses the reqwest-backed
// `ReqwestHttpClient`; tests substitute a scripted client.
//
// Non-2xx statuses are NOT errors at this layer: the response is returned as-is and
// the caller decides. Only transport failures (connect, timeout, unreadable body)
// become `Error::Http`.

use async_trait::async_trait;
use std::collections::HashMap;

/// HTTP method subset used by the updater
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        })
    }
}

/// An outbound request
#[derive(Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    /// Sent as `Authorization: Bearer <token>`
    /// ⚠️ NEVER log this value
    pub bearer_token: Option<String>,
    /// Sent as a JSON body
    pub body: Option<serde_json::Value>,
}

// Custom Debug implementation that hides the bearer token
impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "<REDACTED>"),
            )
            .field("body", &self.body)
            .finish()
    }
}

impl HttpRequest {
    /// Plain unauthenticated GET
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            bearer_token: None,
            body: None,
        }
    }

    /// Request with bearer authorization
    pub fn authorized(method: HttpMethod, url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            bearer_token: Some(token.into()),
            body: None,
        }
    }

    /// Attach a JSON body
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A received response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Header names are lower-cased
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Add a header (name is lower-cased)
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for HTTP transports
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute one request, bounded by the client's own timeout
    ///
    /// # Returns
    ///
    /// - `Ok(HttpResponse)`: Any status, including 4xx/5xx
    /// - `Err(Error::Http)`: Transport failure
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, crate::Error>;
}
