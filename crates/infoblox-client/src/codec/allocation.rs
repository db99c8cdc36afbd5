//! Allocation tokens
//!
//! The appliance accepts a function call in place of a literal field value,
//! e.g. `func:nextavailableip:10.0.0.0/24,default` in `ipv4addr`. It then
//! performs the allocation itself and the returned reference carries the
//! concrete address or network it picked.

use serde::Serialize;
use std::fmt;

const NEXT_AVAILABLE_IP: &str = "func:nextavailableip:";
const NEXT_AVAILABLE_NETWORK: &str = "func:nextavailablenetwork:";

/// Field value asking the appliance to allocate instead of storing a literal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AllocationToken(String);

impl AllocationToken {
    /// Next free address in `cidr` within `view`
    pub fn next_available_ip(cidr: &str, view: &str) -> Self {
        Self(format!("{NEXT_AVAILABLE_IP}{cidr},{view}"))
    }

    /// Next free `/prefix_len` block inside `cidr` within `view`
    pub fn next_available_network(cidr: &str, view: &str, prefix_len: u8) -> Self {
        Self(format!("{NEXT_AVAILABLE_NETWORK}{cidr},{view},{prefix_len}"))
    }

    /// Token text as sent in the field
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Token text, consuming the token
    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether a field value is a function call rather than a literal
    pub fn is_token(value: &str) -> bool {
        value.starts_with("func:")
    }
}

impl fmt::Display for AllocationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<AllocationToken> for String {
    fn from(token: AllocationToken) -> Self {
        token.0
    }
}

/// Decoded form of an allocation token, as the appliance reads it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationRequest {
    /// `func:nextavailableip:<cidr>,<view>`
    NextAvailableIp {
        /// Network to allocate from
        cidr: String,
        /// Network view of `cidr`
        view: String,
    },
    /// `func:nextavailablenetwork:<cidr>,<view>,<prefix_len>`
    NextAvailableNetwork {
        /// Container to carve the block out of
        cidr: String,
        /// Network view of `cidr`
        view: String,
        /// Prefix length of the allocated block
        prefix_len: u8,
    },
}

impl AllocationRequest {
    /// Decode a field value; `None` when it is not a well-formed token
    pub fn parse(value: &str) -> Option<Self> {
        if let Some(args) = value.strip_prefix(NEXT_AVAILABLE_IP) {
            let (cidr, view) = args.split_once(',')?;
            if cidr.is_empty() || view.is_empty() {
                return None;
            }
            return Some(Self::NextAvailableIp {
                cidr: cidr.to_string(),
                view: view.to_string(),
            });
        }

        let args = value.strip_prefix(NEXT_AVAILABLE_NETWORK)?;
        let (rest, prefix_len) = args.rsplit_once(',')?;
        let (cidr, view) = rest.split_once(',')?;
        if cidr.is_empty() || view.is_empty() {
            return None;
        }
        Some(Self::NextAvailableNetwork {
            cidr: cidr.to_string(),
            view: view.to_string(),
            prefix_len: prefix_len.parse().ok()?,
        })
    }
}
