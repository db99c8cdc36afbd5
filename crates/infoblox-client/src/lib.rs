//! Infoblox WAPI object manager
//!
//! A Rust library for managing IPAM objects on an Infoblox appliance through
//! its object API (WAPI). Provides typed models for network views, networks,
//! network containers, fixed addresses and extensible attribute definitions,
//! and the codec for the appliance's reference strings and allocation tokens.
//!
//! # Example
//!
//! ```no_run
//! use infoblox_client::{Connector, ObjectManager, ObjectManagerConfig};
//! use std::sync::Arc;
//!
//! # async fn example(connector: Arc<dyn Connector>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = ObjectManagerConfig::from_env()?;
//! let manager = ObjectManager::new(connector, config);
//!
//! // Bootstrap the global and local network views
//! let (_global, _local) = manager.ensure_default_network_views("default", "local").await?;
//!
//! // Carve a /24 out of a container and take the first free address in it
//! let network = manager.allocate_network("local", "10.0.0.0/16", 24).await?;
//! let address = manager
//!     .allocate_ip("local", &network.cidr, Some("aa:bb:cc:dd:ee:ff"), Some("vm-42"))
//!     .await?;
//!
//! // Give it back
//! manager.release_ip("local", &address.ipv4addr).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Reference codec**: Decode `network/<id>:10.0.0.0/24/default` style references
//! - **Allocation tokens**: `func:nextavailableip` / `func:nextavailablenetwork`
//! - **Tenant tagging**: Every created object carries ownership and tenant attributes
//! - **Mocking**: `MockConnector` (feature `test-util`) for tests without an appliance

pub mod codec;
pub mod config;
#[path = "trait.rs"]
pub mod connector;
pub mod error;
pub mod models;
pub mod object_manager;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

#[cfg(test)]
mod object_manager_test;

pub use codec::{AllocationRequest, AllocationToken, NetworkRef};
pub use config::ObjectManagerConfig;
pub use connector::Connector;
pub use error::{InfobloxError, Result};
pub use models::*;
pub use object_manager::{ObjectManager, VM_ID_NOT_APPLICABLE, ZERO_MAC};
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockConnector;
