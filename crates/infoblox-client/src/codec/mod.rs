//! Reference codec
//!
//! Parses the appliance's compound reference strings back into structured
//! identifiers and builds the `func:` allocation tokens it accepts on create.

pub mod allocation;
pub mod reference;

pub use allocation::{AllocationRequest, AllocationToken};
pub use reference::{
    parse_fixed_address_ip, parse_network_container_reference, parse_network_reference,
    parse_network_view_reference, NetworkRef,
};
