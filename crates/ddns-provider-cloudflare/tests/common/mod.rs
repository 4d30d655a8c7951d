//! Scripted Cloudflare API for integration tests
//!
//! Routes match on HTTP method and URL suffix (so the version segment is part of the
//! match). Each route plays back its responses in order, repeating the last one.
//! Anything unrouted answers 404 with a Cloudflare error envelope.

#![allow(dead_code)]

use ddns_core::config::{CloudflareConfig, RetryConfig};
use ddns_core::traits::{HttpClient, HttpMethod, HttpRequest, HttpResponse, IpSource};
use ddns_core::{Error, Result};
use ddns_provider_cloudflare::CloudflareProvider;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

pub const API_URL: &str = "https://cf.test/client";

/// One request seen by the scripted API
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: HttpMethod,
    pub url: String,
    pub bearer_token: Option<String>,
    pub body: Option<Value>,
    pub at: Instant,
}

struct Route {
    method: HttpMethod,
    suffix: String,
    responses: VecDeque<HttpResponse>,
}

#[derive(Clone, Default)]
pub struct ScriptedApi {
    routes: Arc<Mutex<Vec<Route>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `method` requests whose URL ends with `suffix`
    pub fn on(&self, method: HttpMethod, suffix: &str, response: HttpResponse) -> &Self {
        let mut routes = self.routes.lock().unwrap();
        match routes
            .iter_mut()
            .find(|route| route.method == method && route.suffix == suffix)
        {
            Some(route) => route.responses.push_back(response),
            None => routes.push(Route {
                method,
                suffix: suffix.to_string(),
                responses: VecDeque::from([response]),
            }),
        }
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests of `method` whose URL ends with `suffix`
    pub fn matching(&self, method: HttpMethod, suffix: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.url.ends_with(suffix))
            .collect()
    }

    pub fn count(&self, method: HttpMethod, suffix: &str) -> usize {
        self.matching(method, suffix).len()
    }

    pub fn was_requested(&self, fragment: &str) -> bool {
        self.requests().iter().any(|r| r.url.contains(fragment))
    }
}

#[async_trait::async_trait]
impl HttpClient for ScriptedApi {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(Recorded {
            method: request.method,
            url: request.url.clone(),
            bearer_token: request.bearer_token.clone(),
            body: request.body.clone(),
            at: Instant::now(),
        });

        let mut routes = self.routes.lock().unwrap();
        let route = routes
            .iter_mut()
            .find(|route| route.method == request.method && request.url.ends_with(&route.suffix));

        Ok(match route {
            Some(route) if route.responses.len() > 1 => route.responses.pop_front().unwrap(),
            Some(route) => route.responses.front().cloned().unwrap(),
            None => not_found(),
        })
    }
}

/// 200 with a successful envelope
pub fn ok(result: Value) -> HttpResponse {
    HttpResponse::new(
        200,
        json!({ "success": true, "errors": [], "messages": [], "result": result }).to_string(),
    )
}

/// One page of a list endpoint
pub fn ok_page(result: Value, page: u32, total_pages: u32) -> HttpResponse {
    HttpResponse::new(
        200,
        json!({
            "success": true,
            "errors": [],
            "result": result,
            "result_info": { "page": page, "per_page": 50, "total_pages": total_pages }
        })
        .to_string(),
    )
}

/// 200 with `success: false`
pub fn rejected(code: i64, message: &str) -> HttpResponse {
    HttpResponse::new(
        200,
        json!({
            "success": false,
            "errors": [{ "code": code, "message": message }],
            "result": null
        })
        .to_string(),
    )
}

/// Non-2xx with a Cloudflare error envelope
pub fn status(code: u16, message: &str) -> HttpResponse {
    HttpResponse::new(
        code,
        json!({
            "success": false,
            "errors": [{ "code": 1000 + i64::from(code), "message": message }],
            "result": null
        })
        .to_string(),
    )
}

pub fn not_found() -> HttpResponse {
    status(404, "Could not route to the requested path")
}

pub fn zone(id: &str, name: &str) -> Value {
    json!({ "id": id, "name": name, "status": "active" })
}

pub fn a_record(id: &str, name: &str, content: &str) -> Value {
    json!({ "id": id, "type": "A", "name": name, "content": content, "ttl": 120, "proxied": false })
}

/// A configuration with version detection off (tests opt in)
pub fn config() -> CloudflareConfig {
    let mut config = CloudflareConfig::new("cf-test-token-abcdef");
    config.api_url = API_URL.to_string();
    config.auto_detect_api = false;
    config
}

pub fn retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        delay_ms: 5_000,
    }
}

pub fn provider(api: &ScriptedApi, config: CloudflareConfig) -> CloudflareProvider {
    CloudflareProvider::new(config, retry(), Arc::new(api.clone())).unwrap()
}

/// IpSource with a fixed answer (or a fixed failure)
pub struct FixedIp(pub Option<Ipv4Addr>);

#[async_trait::async_trait]
impl IpSource for FixedIp {
    async fn detect(&self) -> Result<Ipv4Addr> {
        self.0.ok_or_else(|| Error::detection_failed(Vec::new()))
    }
}
