//! Address and network block allocation for MockConnector
//!
//! Picks the lowest free address or block, like the appliance does for
//! `func:nextavailable*` requests.

use std::net::Ipv4Addr;

/// Parse "a.b.c.d/len" into the masked network address and prefix length
pub fn parse_cidr(cidr: &str) -> Option<(u32, u8)> {
    let (address, prefix_len) = cidr.split_once('/')?;
    let address: Ipv4Addr = address.parse().ok()?;
    let prefix_len: u8 = prefix_len.parse().ok()?;
    if prefix_len > 32 {
        return None;
    }
    Some((u32::from(address) & mask(prefix_len), prefix_len))
}

fn mask(prefix_len: u8) -> u32 {
    if prefix_len == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix_len))
    }
}

/// Inclusive address range covered by a network
fn range(network: u32, prefix_len: u8) -> (u32, u32) {
    (network, network | !mask(prefix_len))
}

/// Lowest host address in `cidr` not present in `used`
///
/// Network and broadcast addresses are skipped for prefixes shorter than /31.
pub fn next_free_address(cidr: &str, used: &[Ipv4Addr]) -> Option<Ipv4Addr> {
    let (network, prefix_len) = parse_cidr(cidr)?;
    let (first, last) = range(network, prefix_len);
    let (first, last) = if prefix_len < 31 { (first + 1, last - 1) } else { (first, last) };

    (first..=last)
        .map(Ipv4Addr::from)
        .find(|candidate| !used.contains(candidate))
}

/// Lowest `/prefix_len` block inside `parent` overlapping none of `used`
pub fn next_free_network(parent: &str, prefix_len: u8, used: &[String]) -> Option<String> {
    let (parent_network, parent_len) = parse_cidr(parent)?;
    if prefix_len < parent_len || prefix_len > 32 {
        return None;
    }

    let taken: Vec<(u32, u32)> = used
        .iter()
        .filter(|cidr| cidr.as_str() != parent)
        .filter_map(|cidr| parse_cidr(cidr))
        .map(|(network, len)| range(network, len))
        .collect();

    let (_, parent_last) = range(parent_network, parent_len);
    let step = 1u64 << (32 - u32::from(prefix_len));
    let mut start = u64::from(parent_network);
    while start <= u64::from(parent_last) {
        let candidate = u32::try_from(start).ok()?;
        let (first, last) = range(candidate, prefix_len);
        if !taken.iter().any(|&(lo, hi)| first <= hi && lo <= last) {
            return Some(format!("{}/{}", Ipv4Addr::from(candidate), prefix_len));
        }
        start += step;
    }
    None
}
