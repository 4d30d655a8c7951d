//! IPv4 validation
//!
//! Providers and the last-IP file hand us free-form strings. An address is accepted only
//! when it is exactly four dot-separated groups of one to three ASCII digits, each in
//! `0..=255`. Leading zeros are allowed (`010.0.0.1` is accepted and normalized to
//! `10.0.0.1`), which is why this does not defer to `Ipv4Addr::from_str`.

use std::net::Ipv4Addr;

/// Parse a string under the strict four-octet rule
pub fn parse_ipv4(candidate: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    let mut groups = candidate.split('.');

    for octet in &mut octets {
        let group = groups.next()?;
        if group.is_empty() || group.len() > 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value: u16 = group.parse().ok()?;
        *octet = u8::try_from(value).ok()?;
    }

    if groups.next().is_some() {
        return None;
    }

    Some(Ipv4Addr::from(octets))
}

/// Check a string under the strict four-octet rule
pub fn is_valid_ipv4(candidate: &str) -> bool {
    parse_ipv4(candidate).is_some()
}
