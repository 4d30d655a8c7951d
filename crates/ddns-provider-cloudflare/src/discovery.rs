// # Zone and record discovery
//
// Fills in whatever the configuration leaves out, in this order:
//
// 1. Working API version (optional check)
// 2. Zone: configured id, the only visible zone, the zone named like the domain, or
//    (no domain configured) the first zone
// 3. Record name from domain + subdomain
// 4. Record name from a configured record id
// 5. Record id from the record name, creating the record when it does not exist
// 6. With nothing but a token: a non-apex, non-wildcard A record in the zone
//
// A configured name that matches nothing in a multi-zone account, or a configured
// record name that was not found, never falls through to "pick something".

use ddns_core::config::CloudflareConfig;
use ddns_core::traits::{HttpMethod, IpSource, ResolvedTarget, split_fqdn};
use ddns_core::{Error, Result};

use crate::api::ApiClient;
use crate::types::{CloudflareDnsRecord, CloudflareZone, DnsRecordPayload};

/// Largest page the zones endpoint serves
const ZONES_PAGE_SIZE: u32 = 50;

const ACCEPTED_COMBINATIONS: &str = "token + domain + subdomain; \
     token + domain (the full record name); token + zone id + record id";

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub(crate) async fn discover(
    api: &ApiClient,
    config: &CloudflareConfig,
    ip_source: &dyn IpSource,
) -> Result<ResolvedTarget> {
    if config.auto_detect_api {
        api.detect_version().await;
    }

    let mut domain = present(&config.domain);
    let mut subdomain = present(&config.subdomain);
    let mut record_id = present(&config.record_id);
    let mut zone_name = None;

    let zone_id = match present(&config.zone_id) {
        Some(zone_id) => zone_id,
        None => {
            let zone = select_zone(api, domain.as_deref()).await?;
            zone_name = Some(zone.name);
            zone.id
        }
    };

    let mut fqdn = match (domain.as_deref(), subdomain.as_deref()) {
        (Some(domain), Some(subdomain)) => Some(format!("{subdomain}.{domain}")),
        (Some(domain), None) => Some(domain.to_string()),
        _ => None,
    };
    let name_configured = fqdn.is_some();

    if fqdn.is_none()
        && let Some(id) = record_id.as_deref()
    {
        let record = fetch_record(api, &zone_id, id).await?;
        tracing::info!("Record {} is {}", id, record.name);
        let (sub, dom) = split_fqdn(&record.name);
        subdomain = sub;
        domain = Some(dom);
        fqdn = Some(record.name);
    }

    if record_id.is_none()
        && let Some(name) = fqdn.as_deref()
    {
        let id = match find_record_by_name(api, &zone_id, name).await? {
            Some(record) => {
                tracing::info!("Found existing A record for {}", name);
                record.id
            }
            None => create_record(api, config, &zone_id, name, ip_source).await?,
        };
        record_id = Some(id);
    }

    if record_id.is_none() && !name_configured {
        if zone_name.is_none() {
            zone_name = fetch_zone_name(api, &zone_id).await;
        }
        if let Some(record) = pick_record(api, &zone_id, zone_name.as_deref()).await? {
            let (sub, dom) = split_fqdn(&record.name);
            subdomain = sub;
            domain = Some(dom);
            fqdn = Some(record.name);
            record_id = Some(record.id);
        }
    }

    match (record_id, fqdn) {
        (Some(record_id), Some(fqdn)) => Ok(ResolvedTarget {
            zone_id,
            record_id,
            fqdn,
            domain,
            subdomain,
        }),
        _ => Err(Error::discovery(format!(
            "Could not determine which DNS record to update. Accepted configurations: {}",
            ACCEPTED_COMBINATIONS
        ))),
    }
}

/// Every zone visible to the token, following `result_info.total_pages`
async fn list_zones(api: &ApiClient) -> Result<Vec<CloudflareZone>> {
    let mut zones = Vec::new();
    let mut page = 1;

    loop {
        let path = if page == 1 {
            format!("/zones?per_page={ZONES_PAGE_SIZE}")
        } else {
            format!("/zones?per_page={ZONES_PAGE_SIZE}&page={page}")
        };
        let response = api
            .request::<Vec<CloudflareZone>>(HttpMethod::Get, &path, None)
            .await?;

        let total_pages = response.result_info.as_ref().map_or(1, |info| info.total_pages);
        let batch = response.result.unwrap_or_default();
        let empty = batch.is_empty();
        zones.extend(batch);

        if empty || page >= total_pages {
            return Ok(zones);
        }
        page += 1;
    }
}

async fn select_zone(api: &ApiClient, domain: Option<&str>) -> Result<CloudflareZone> {
    let mut zones = list_zones(api).await?;

    match zones.len() {
        0 => Err(Error::discovery("No zones are visible to this API token")),
        1 => {
            let zone = zones.remove(0);
            tracing::info!("Using the only visible zone: {}", zone.name);
            Ok(zone)
        }
        count => match domain {
            Some(domain) => {
                let position = zones
                    .iter()
                    .position(|zone| zone.name.eq_ignore_ascii_case(domain))
                    .ok_or_else(|| {
                        Error::discovery(format!(
                            "None of the {count} zones visible to this token is named {domain}"
                        ))
                    })?;
                let zone = zones.swap_remove(position);
                tracing::info!("Using zone {} matching the configured domain", zone.name);
                Ok(zone)
            }
            None => {
                let zone = zones.remove(0);
                tracing::warn!(
                    "{} zones visible and no domain configured, defaulting to the first: {}",
                    count,
                    zone.name
                );
                Ok(zone)
            }
        },
    }
}

async fn fetch_zone_name(api: &ApiClient, zone_id: &str) -> Option<String> {
    match api
        .request::<CloudflareZone>(HttpMethod::Get, &format!("/zones/{zone_id}"), None)
        .await
    {
        Ok(response) => response.result.map(|zone| zone.name),
        Err(e) => {
            tracing::debug!("Could not look up zone {}: {}", zone_id, e);
            None
        }
    }
}

async fn fetch_record(api: &ApiClient, zone_id: &str, record_id: &str) -> Result<CloudflareDnsRecord> {
    let path = format!("/zones/{zone_id}/dns_records/{record_id}");
    let response = api
        .request::<CloudflareDnsRecord>(HttpMethod::Get, &path, None)
        .await?;

    match response.result {
        Some(record) if response.success => Ok(record),
        _ => Err(Error::discovery(format!(
            "Record {} could not be read: {}",
            record_id,
            response.error_messages()
        ))),
    }
}

async fn find_record_by_name(
    api: &ApiClient,
    zone_id: &str,
    name: &str,
) -> Result<Option<CloudflareDnsRecord>> {
    let path = format!(
        "/zones/{zone_id}/dns_records?type=A&name={}",
        urlencoding::encode(name)
    );
    let records = api
        .request::<Vec<CloudflareDnsRecord>>(HttpMethod::Get, &path, None)
        .await?
        .result
        .unwrap_or_default();

    Ok(records
        .into_iter()
        .find(|record| record.name.eq_ignore_ascii_case(name)))
}

async fn create_record(
    api: &ApiClient,
    config: &CloudflareConfig,
    zone_id: &str,
    name: &str,
    ip_source: &dyn IpSource,
) -> Result<String> {
    let ip = ip_source.detect().await.map_err(|e| {
        Error::discovery(format!("Cannot create A record {name} without a current IP: {e}"))
    })?;

    tracing::info!("No A record for {}, creating one pointing at {}", name, ip);
    let payload = DnsRecordPayload::a(name, ip, config.ttl, config.proxied);
    let body = serde_json::to_value(&payload)?;

    let response = api
        .request::<CloudflareDnsRecord>(
            HttpMethod::Post,
            &format!("/zones/{zone_id}/dns_records"),
            Some(body),
        )
        .await?;

    match response.result {
        Some(record) if response.success => {
            tracing::info!("Created A record {} ({})", name, record.id);
            Ok(record.id)
        }
        _ => Err(Error::discovery(format!(
            "Failed to create A record {}: {}",
            name,
            response.error_messages()
        ))),
    }
}

/// Prefer a subdomain record over the apex and wildcards
async fn pick_record(
    api: &ApiClient,
    zone_id: &str,
    zone_name: Option<&str>,
) -> Result<Option<CloudflareDnsRecord>> {
    let path = format!("/zones/{zone_id}/dns_records?type=A");
    let mut records = api
        .request::<Vec<CloudflareDnsRecord>>(HttpMethod::Get, &path, None)
        .await?
        .result
        .unwrap_or_default();

    let is_apex = |record: &CloudflareDnsRecord| {
        zone_name.is_some_and(|zone| record.name.eq_ignore_ascii_case(zone))
    };

    if let Some(position) = records
        .iter()
        .position(|record| !is_apex(record) && !record.is_wildcard())
    {
        let record = records.swap_remove(position);
        tracing::info!("Auto-selected A record {}", record.name);
        return Ok(Some(record));
    }

    if records.is_empty() {
        return Ok(None);
    }

    let record = records.remove(0);
    tracing::warn!("No subdomain A record found, defaulting to {}", record.name);
    Ok(Some(record))
}
