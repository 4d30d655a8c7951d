// # Cloudflare API client
//
// Issues authorized requests against `{api_url}/{version}{path}` and turns non-2xx
// answers into `Error::Api`.
//
// ## API drift
//
// A 404 on a `/zones...` path is read as an endpoint or version mismatch. The client
// then tries, in order:
//
// 1. The other versions in `API_VERSIONS` (the first that answers becomes the working
//    version for every later request)
// 2. For DNS record paths, the other spellings in `RECORD_PATH_SPELLINGS` (the first
//    that answers becomes the working spelling, the same way)
//
// Callers always spell record paths `/dns_records`; the client rewrites them.
//
// If nothing answers, the original 404 is returned unchanged.

use ddns_core::traits::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use ddns_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, RwLock};

use crate::types::{CloudflareResponse, join_errors};

/// Version candidates, in the order they are tried
pub const API_VERSIONS: [&str; 3] = ["v4", "v5", "v3"];

/// Known spellings of the DNS records collection, canonical first
const RECORD_PATH_SPELLINGS: [&str; 3] = ["dns_records", "dns-records", "records"];

const RECORDS_SEGMENT: &str = "/dns_records";

/// Lightweight endpoint that answers for any valid token
pub const TOKEN_VERIFY_PATH: &str = "/user/tokens/verify";

pub struct ApiClient {
    http: Arc<dyn HttpClient>,

    /// ⚠️ NEVER log this value
    api_token: String,

    /// Base URL without the version segment
    api_url: String,

    /// Working version; written only by drift recovery and version detection
    version: RwLock<String>,

    /// Working spelling of the records collection; written only by drift recovery
    records_segment: RwLock<&'static str>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_token", &"<REDACTED>")
            .field("api_url", &self.api_url)
            .field("version", &self.version())
            .field("records_segment", &self.records_segment())
            .finish()
    }
}

impl ApiClient {
    pub fn new(
        http: Arc<dyn HttpClient>,
        api_token: impl Into<String>,
        api_url: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_token: api_token.into(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            version: RwLock::new(version.into()),
            records_segment: RwLock::new(RECORD_PATH_SPELLINGS[0]),
        }
    }

    /// Version currently used for requests
    pub fn version(&self) -> String {
        match self.version.read() {
            Ok(version) => version.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_version(&self, version: &str) {
        match self.version.write() {
            Ok(mut current) => *current = version.to_string(),
            Err(poisoned) => *poisoned.into_inner() = version.to_string(),
        }
    }

    /// Spelling of the records collection currently used for requests
    pub fn records_segment(&self) -> &'static str {
        match self.records_segment.read() {
            Ok(segment) => *segment,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn set_records_segment(&self, segment: &'static str) {
        match self.records_segment.write() {
            Ok(mut current) => *current = segment,
            Err(poisoned) => *poisoned.into_inner() = segment,
        }
    }

    /// Issue a request and decode the response envelope
    ///
    /// A 2xx answer whose envelope reports `success: false` is returned as-is; the
    /// caller decides what that means.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<CloudflareResponse<T>> {
        let version = self.version();
        let path = respell(path, self.records_segment());

        let response = match self.send(method, &version, &path, body.clone()).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() && path.starts_with("/zones") => {
                match self.recover_from_drift(method, &version, &path, body).await {
                    Some(response) => response,
                    None => return Err(e),
                }
            }
            Err(e) => return Err(e),
        };

        Ok(serde_json::from_str(&response.body)?)
    }

    async fn recover_from_drift(
        &self,
        method: HttpMethod,
        failed_version: &str,
        path: &str,
        body: Option<Value>,
    ) -> Option<HttpResponse> {
        tracing::debug!("{} {} returned 404, trying alternatives", method, path);

        for candidate in API_VERSIONS.iter().filter(|v| **v != failed_version) {
            if let Ok(response) = self.send(method, candidate, path, body.clone()).await {
                tracing::warn!(
                    "Cloudflare API {} did not answer {}; switching to {}",
                    failed_version,
                    path,
                    candidate
                );
                self.set_version(candidate);
                return Some(response);
            }
        }

        let current = self.records_segment();
        let canonical = respell(path, RECORD_PATH_SPELLINGS[0]);
        if canonical.contains(RECORDS_SEGMENT) {
            for spelling in RECORD_PATH_SPELLINGS.into_iter().filter(|s| *s != current) {
                let alternative = respell(&canonical, spelling);
                if let Ok(response) = self
                    .send(method, failed_version, &alternative, body.clone())
                    .await
                {
                    tracing::warn!("Cloudflare API answered on {} instead of {}", alternative, path);
                    self.set_records_segment(spelling);
                    return Some(response);
                }
            }
        }

        None
    }

    /// Look for a working API version
    ///
    /// Keeps the current version when no candidate answers.
    pub async fn detect_version(&self) {
        for candidate in API_VERSIONS {
            let answered = match self.send(HttpMethod::Get, candidate, TOKEN_VERIFY_PATH, None).await {
                Ok(response) => serde_json::from_str::<CloudflareResponse<Value>>(&response.body)
                    .map(|envelope| envelope.success)
                    .unwrap_or(false),
                Err(_) => false,
            };

            if answered {
                tracing::debug!("Using Cloudflare API {}", candidate);
                self.set_version(candidate);
                return;
            }
        }

        tracing::warn!(
            "Could not detect a working Cloudflare API version, keeping {}",
            self.version()
        );
    }

    /// One request at one version; non-2xx becomes `Error::Api`
    async fn send(
        &self,
        method: HttpMethod,
        version: &str,
        path: &str,
        body: Option<Value>,
    ) -> Result<HttpResponse> {
        let url = format!("{}/{}{}", self.api_url, version, path);
        tracing::debug!("{} {}", method, url);

        let mut request = HttpRequest::authorized(method, url, self.api_token.clone());
        if let Some(body) = body {
            request = request.with_body(body);
        }

        let response = self.http.execute(request).await?;
        if response.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .header("retry-after")
            .and_then(|value| value.trim().parse::<u64>().ok());

        Err(Error::api(response.status, error_message(&response), retry_after))
    }
}

/// Rewrite the records collection of a `/zones/{id}/...` path to `segment`
///
/// Any known spelling is recognized; other paths are returned unchanged.
fn respell(path: &str, segment: &str) -> String {
    let Some(rest) = path.strip_prefix("/zones/") else {
        return path.to_string();
    };
    let start = "/zones/".len() + rest.find(['/', '?']).unwrap_or(rest.len());
    let tail = &path[start..];

    for known in RECORD_PATH_SPELLINGS {
        let Some(after) = tail.strip_prefix('/').and_then(|t| t.strip_prefix(known)) else {
            continue;
        };
        if after.is_empty() || after.starts_with(['/', '?']) {
            return format!("{}/{}{}", &path[..start], segment, after);
        }
    }
    path.to_string()
}

/// Best description of a failed response: envelope errors, else the raw body
fn error_message(response: &HttpResponse) -> String {
    if let Ok(envelope) = serde_json::from_str::<CloudflareResponse<Value>>(&response.body)
        && !envelope.errors.is_empty()
    {
        return join_errors(&envelope.errors);
    }

    let body = response.body.trim();
    if body.is_empty() {
        format!("HTTP {}", response.status)
    } else {
        body.chars().take(200).collect()
    }
}
