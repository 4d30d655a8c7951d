//! Cloudflare API types

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Common response envelope
#[derive(Debug, Deserialize)]
pub struct CloudflareResponse<T> {
    pub success: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub errors: Vec<CloudflareError>,
    /// Present on list endpoints
    #[serde(default)]
    pub result_info: Option<ResultInfo>,
}

impl<T> CloudflareResponse<T> {
    /// Joined error messages, for logs
    pub fn error_messages(&self) -> String {
        join_errors(&self.errors)
    }
}

/// Pagination details of a list response
#[derive(Debug, Clone, Deserialize)]
pub struct ResultInfo {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudflareError {
    #[serde(default)]
    pub code: i64,
    pub message: String,
}

pub(crate) fn join_errors(errors: &[CloudflareError]) -> String {
    if errors.is_empty() {
        return "no error details".to_string();
    }
    errors
        .iter()
        .map(|e| format!("[{}] {}", e.code, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudflareZone {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudflareDnsRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub record_type: String,
    #[serde(default)]
    pub content: String,
}

impl CloudflareDnsRecord {
    pub fn is_wildcard(&self) -> bool {
        self.name.starts_with('*')
    }
}

/// Body for creating or replacing an A record
#[derive(Debug, Clone, Serialize)]
pub struct DnsRecordPayload {
    #[serde(rename = "type")]
    pub record_type: &'static str,
    pub name: String,
    pub content: String,
    pub ttl: u32,
    pub proxied: bool,
}

impl DnsRecordPayload {
    pub fn a(name: impl Into<String>, ip: Ipv4Addr, ttl: u32, proxied: bool) -> Self {
        Self {
            record_type: "A",
            name: name.into(),
            content: ip.to_string(),
            ttl,
            proxied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_serializes_with_type_key() {
        let payload = DnsRecordPayload::a("home.example.com", Ipv4Addr::new(198, 51, 100, 10), 120, false);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "A",
                "name": "home.example.com",
                "content": "198.51.100.10",
                "ttl": 120,
                "proxied": false
            })
        );
    }

    #[test]
    fn envelope_without_errors_field_parses() {
        let response: CloudflareResponse<Vec<CloudflareZone>> =
            serde_json::from_str(r#"{"success":true,"result":[{"id":"z1","name":"example.com","status":"active"}]}"#)
                .unwrap();
        assert!(response.success);
        assert_eq!(response.result.unwrap()[0].name, "example.com");
        assert!(response.errors.is_empty());
        assert!(response.result_info.is_none());
    }

    #[test]
    fn list_envelope_carries_page_count() {
        let response: CloudflareResponse<Vec<CloudflareZone>> = serde_json::from_str(
            r#"{"success":true,"result":[],"result_info":{"page":1,"per_page":50,"total_pages":3,"count":50,"total_count":120}}"#,
        )
        .unwrap();
        let info = response.result_info.unwrap();
        assert_eq!(info.page, 1);
        assert_eq!(info.total_pages, 3);
    }

    #[test]
    fn error_messages_are_joined() {
        let response: CloudflareResponse<serde_json::Value> = serde_json::from_str(
            r#"{"success":false,"result":null,"errors":[{"code":9106,"message":"Missing X-Auth-Key"},{"code":1000,"message":"Invalid token"}]}"#,
        )
        .unwrap();
        assert_eq!(
            response.error_messages(),
            "[9106] Missing X-Auth-Key; [1000] Invalid token"
        );
    }
}
