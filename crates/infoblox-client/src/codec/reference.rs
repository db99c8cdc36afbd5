//! Reference string grammars
//!
//! A reference has the shape `<object-type>/<opaque-id>:<discriminator>`.
//! Each object type with a structured discriminator gets one named grammar
//! rule below. Parsers return `None` when the reference does not match,
//! including when the type prefix belongs to another object type.
//!
//! Examples of references returned by the appliance:
//!
//! ```text
//! networkview/ZG5zLm5ldHdvcmtfdmlldyQyMw:global_view/false
//! network/ZG5zLm5ldHdvcmskODkuMC4wLjAvMjQvMjU:89.0.0.0/24/global_view
//! fixedaddress/ZG5zLmJpbmRfY25h:12.0.10.1/external
//! ```

use regex::{Captures, Regex};
use std::net::Ipv4Addr;
use std::sync::OnceLock;
use tracing::debug;

/// Network or network container identity decoded from a reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRef {
    /// Dotted quad plus prefix length, e.g. "10.0.0.0/24"
    pub cidr: String,
    /// Owning network view, taken verbatim (may contain `/`)
    pub view: String,
}

/// A named grammar rule for one reference shape
struct Grammar {
    name: &'static str,
    pattern: &'static str,
    regex: OnceLock<Regex>,
}

impl Grammar {
    const fn new(name: &'static str, pattern: &'static str) -> Self {
        Self {
            name,
            pattern,
            regex: OnceLock::new(),
        }
    }

    #[allow(clippy::expect_used, reason = "patterns are constants covered by test_every_grammar_compiles")]
    fn captures<'r>(&self, reference: &'r str) -> Option<Captures<'r>> {
        let regex = self
            .regex
            .get_or_init(|| Regex::new(self.pattern).expect("Invalid reference grammar"));
        let captures = regex.captures(reference);
        if captures.is_none() {
            debug!("Reference {} does not match the {} grammar", reference, self.name);
        }
        captures
    }
}

static NETWORK_VIEW: Grammar = Grammar::new(
    "networkview",
    r"^networkview/\w+:([^/]+)/(?:true|false)$",
);

// CIDR first, then everything up to the end of the string is the view name.
static NETWORK: Grammar = Grammar::new(
    "network",
    r"^network/\w+:([0-9]+\.[0-9]+\.[0-9]+\.[0-9]+/[0-9]+)/(.+)$",
);

static NETWORK_CONTAINER: Grammar = Grammar::new(
    "networkcontainer",
    r"^networkcontainer/\w+:([0-9]+\.[0-9]+\.[0-9]+\.[0-9]+/[0-9]+)/(.+)$",
);

static FIXED_ADDRESS: Grammar = Grammar::new(
    "fixedaddress",
    r"^fixedaddress/\w+:([0-9]+\.[0-9]+\.[0-9]+\.[0-9]+)/.+$",
);

/// Extract the view name from a network view reference
pub fn parse_network_view_reference(reference: &str) -> Option<String> {
    let captures = NETWORK_VIEW.captures(reference)?;
    Some(captures[1].to_string())
}

/// Extract CIDR and view name from a network reference
pub fn parse_network_reference(reference: &str) -> Option<NetworkRef> {
    network_ref(&NETWORK, reference)
}

/// Extract CIDR and view name from a network container reference
pub fn parse_network_container_reference(reference: &str) -> Option<NetworkRef> {
    network_ref(&NETWORK_CONTAINER, reference)
}

/// Extract the IPv4 address from a fixed address reference
pub fn parse_fixed_address_ip(reference: &str) -> Option<Ipv4Addr> {
    let captures = FIXED_ADDRESS.captures(reference)?;
    captures[1].parse().ok()
}

fn network_ref(grammar: &Grammar, reference: &str) -> Option<NetworkRef> {
    let captures = grammar.captures(reference)?;
    let cidr = &captures[1];
    if !is_valid_cidr(cidr) {
        debug!("Reference {} carries an invalid CIDR {}", reference, cidr);
        return None;
    }
    Some(NetworkRef {
        cidr: cidr.to_string(),
        view: captures[2].to_string(),
    })
}

fn is_valid_cidr(cidr: &str) -> bool {
    let Some((address, prefix_len)) = cidr.split_once('/') else {
        return false;
    };
    address.parse::<Ipv4Addr>().is_ok() && prefix_len.parse::<u8>().is_ok_and(|len| len <= 32)
}
