//! Object manager
//!
//! High-level operations on network views, networks and fixed addresses.
//! Every operation builds a template object, hands it to the connector and
//! maps the reply back into a typed entity:
//!
//! - **create** sends a populated template (with tenant attributes) and
//!   attaches the returned reference
//! - **query** sends a sparse template with only the lookup keys and returns
//!   the first match, or `None` when nothing matches
//! - **delete** removes an object by reference and returns that reference
//!
//! Get-or-create sequences such as [`ObjectManager::ensure_default_network_views`]
//! are a query followed by a create with no locking in between. Concurrent
//! callers can both observe a missing view and both create it; resolving the
//! duplicate is left to the appliance's own uniqueness rules.

use crate::codec::{self, AllocationToken};
use crate::config::ObjectManagerConfig;
use crate::connector::Connector;
use crate::error::{InfobloxError, Result};
use crate::models::*;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// MAC recorded on fixed addresses reserved without a device
pub const ZERO_MAC: &str = "00:00:00:00:00:00";
/// "VM ID" value recorded when no VM is bound to an address
pub const VM_ID_NOT_APPLICABLE: &str = "N/A";

/// Manages appliance objects on behalf of one tenant
#[derive(Clone)]
pub struct ObjectManager {
    connector: Arc<dyn Connector>,
    config: ObjectManagerConfig,
}

impl ObjectManager {
    /// Create a new object manager
    ///
    /// # Arguments
    /// * `connector` - Connector to the appliance
    /// * `config` - Tenant identity and default view names
    pub fn new(connector: Arc<dyn Connector>, config: ObjectManagerConfig) -> Self {
        Self { connector, config }
    }

    /// Configuration this manager was built with
    pub fn config(&self) -> &ObjectManagerConfig {
        &self.config
    }

    /// Tenant stamped on created objects
    pub fn tenant_id(&self) -> &str {
        &self.config.tenant_id
    }

    /// Baseline attributes stamped on every object this manager creates
    pub fn basic_attributes(&self, cloud_api_owned: bool) -> ExtensibleAttributes {
        let mut ea = ExtensibleAttributes::new();
        ea.insert(EA_CLOUD_API_OWNED, cloud_api_owned);
        ea.insert(EA_CMP_TYPE, self.config.cmp_type.as_str());
        ea.insert(EA_TENANT_ID, self.config.tenant_id.as_str());
        ea
    }

    async fn create_object<T: WapiObject>(&self, object: &T) -> Result<String> {
        let body = serde_json::to_value(object)?;
        self.connector.create_object(T::OBJECT_TYPE, body).await
    }

    async fn find_first<T: WapiObject>(&self, template: &T) -> Result<Option<T>> {
        let search = serde_json::to_value(template)?;
        let results = self
            .connector
            .get_object(T::OBJECT_TYPE, search, T::RETURN_FIELDS)
            .await?;

        if results.len() > 1 {
            debug!("{} {} objects matched, using the first", results.len(), T::OBJECT_TYPE);
        }

        match results.into_iter().next() {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Create a network view
    ///
    /// No existence check is made; see [`ObjectManager::ensure_network_view`].
    pub async fn create_network_view(&self, name: &str) -> Result<NetworkView> {
        let mut view = NetworkView {
            name: name.to_string(),
            ea: self.basic_attributes(false),
            ..Default::default()
        };

        view.reference = self.create_object(&view).await?;
        info!("Created network view {} ({})", name, view.reference);
        Ok(view)
    }

    /// Look up a network view by name
    pub async fn get_network_view(&self, name: &str) -> Result<Option<NetworkView>> {
        debug!("Querying network view {}", name);
        self.find_first(&NetworkView {
            name: name.to_string(),
            ..Default::default()
        })
        .await
    }

    /// Return the named network view, creating it when absent
    pub async fn ensure_network_view(&self, name: &str) -> Result<NetworkView> {
        if let Some(existing) = self.get_network_view(name).await? {
            debug!("Network view {} already exists ({})", name, existing.reference);
            return Ok(existing);
        }
        self.create_network_view(name).await
    }

    /// Make sure the global and local network views exist
    ///
    /// Returns the references of both views. Not atomic: if the local view
    /// fails, a global view created by this call is left in place.
    pub async fn ensure_default_network_views(
        &self,
        global_view: &str,
        local_view: &str,
    ) -> Result<(String, String)> {
        let global = self.ensure_network_view(global_view).await?;
        let local = self.ensure_network_view(local_view).await?;
        Ok((global.reference, local.reference))
    }

    /// [`ObjectManager::ensure_default_network_views`] with the configured view names
    pub async fn ensure_configured_default_views(&self) -> Result<(String, String)> {
        self.ensure_default_network_views(
            &self.config.global_network_view,
            &self.config.local_network_view,
        )
        .await
    }

    /// Create a network with a literal CIDR
    pub async fn create_network(&self, view: &str, cidr: &str) -> Result<Network> {
        let mut network = Network {
            network_view: view.to_string(),
            cidr: cidr.to_string(),
            ea: self.basic_attributes(true),
            ..Default::default()
        };

        network.reference = self.create_object(&network).await?;
        info!("Created network {} in view {}", cidr, view);
        Ok(network)
    }

    /// Create a network container with a literal CIDR
    pub async fn create_network_container(&self, view: &str, cidr: &str) -> Result<NetworkContainer> {
        let mut container = NetworkContainer {
            network_view: view.to_string(),
            cidr: cidr.to_string(),
            ea: self.basic_attributes(true),
            ..Default::default()
        };

        container.reference = self.create_object(&container).await?;
        info!("Created network container {} in view {}", cidr, view);
        Ok(container)
    }

    /// Look up a network by view and CIDR
    pub async fn get_network(&self, view: &str, cidr: &str) -> Result<Option<Network>> {
        debug!("Querying network {} in view {}", cidr, view);
        self.find_first(&Network {
            network_view: view.to_string(),
            cidr: cidr.to_string(),
            ..Default::default()
        })
        .await
    }

    /// Look up a network container by view and CIDR
    pub async fn get_network_container(&self, view: &str, cidr: &str) -> Result<Option<NetworkContainer>> {
        debug!("Querying network container {} in view {}", cidr, view);
        self.find_first(&NetworkContainer {
            network_view: view.to_string(),
            cidr: cidr.to_string(),
            ..Default::default()
        })
        .await
    }

    /// Allocate the next free `/prefix_len` network inside `cidr`
    ///
    /// The CIDR and view of the result are decoded from the returned
    /// reference, since the appliance picks the block. If that reference does
    /// not decode, the result carries the reference with an empty CIDR and view.
    pub async fn allocate_network(&self, view: &str, cidr: &str, prefix_len: u8) -> Result<Network> {
        let request = Network {
            network_view: view.to_string(),
            cidr: AllocationToken::next_available_network(cidr, view, prefix_len).into_string(),
            ea: self.basic_attributes(true),
            ..Default::default()
        };

        let reference = self.create_object(&request).await?;
        match Network::from_reference(&reference) {
            Some(network) => {
                info!("Allocated network {} from {} in view {}", network.cidr, cidr, view);
                Ok(network)
            }
            None => {
                warn!("Network allocated from {} returned an undecodable reference {}", cidr, reference);
                Ok(Network {
                    reference,
                    ..Default::default()
                })
            }
        }
    }

    /// Allocate the next free address in `cidr`
    ///
    /// # Arguments
    /// * `view` - Network view name
    /// * `cidr` - Network to allocate from
    /// * `mac` - Device MAC; the zero MAC reserves the address without a device
    /// * `vm_id` - VM bound to the address; recorded as "N/A" when absent
    ///
    /// # Returns
    /// The created fixed address. `ipv4addr` is decoded from the returned
    /// reference and is left empty when the reference does not decode, even
    /// though the object was created; callers must check for that.
    pub async fn allocate_ip(
        &self,
        view: &str,
        cidr: &str,
        mac: Option<&str>,
        vm_id: Option<&str>,
    ) -> Result<FixedAddress> {
        let mac = mac.filter(|m| !m.is_empty()).unwrap_or(ZERO_MAC);
        let vm_id = vm_id.filter(|v| !v.is_empty()).unwrap_or(VM_ID_NOT_APPLICABLE);

        let mut ea = self.basic_attributes(true);
        ea.insert(EA_VM_ID, vm_id);

        let mut address = FixedAddress {
            network_view: view.to_string(),
            cidr: cidr.to_string(),
            ipv4addr: AllocationToken::next_available_ip(cidr, view).into_string(),
            mac: mac.to_string(),
            ea,
            ..Default::default()
        };

        address.reference = self.create_object(&address).await?;
        match codec::parse_fixed_address_ip(&address.reference) {
            Some(ip) => {
                address.ipv4addr = ip.to_string();
                info!("Allocated {} from {} in view {} for {}", ip, cidr, view, mac);
            }
            None => {
                address.ipv4addr.clear();
                warn!("Fixed address allocated from {} returned an undecodable reference {}", cidr, address.reference);
            }
        }
        Ok(address)
    }

    /// Look up a fixed address by view and IP
    pub async fn get_fixed_address(&self, view: &str, ip: &str) -> Result<Option<FixedAddress>> {
        debug!("Querying fixed address {} in view {}", ip, view);
        self.find_first(&FixedAddress {
            network_view: view.to_string(),
            ipv4addr: ip.to_string(),
            ..Default::default()
        })
        .await
    }

    /// Release a fixed address
    ///
    /// Returns the deleted reference, or `InfobloxError::NotFound` without
    /// deleting anything when no fixed address matches.
    pub async fn release_ip(&self, view: &str, ip: &str) -> Result<String> {
        let address = self.get_fixed_address(view, ip).await?.ok_or_else(|| {
            InfobloxError::NotFound(format!("Fixed address {} in network view {}", ip, view))
        })?;

        let deleted = self.connector.delete_object(&address.reference).await?;
        info!("Released {} in view {}", ip, view);
        Ok(deleted)
    }

    /// Delete a network only if it belongs to `local_view`
    ///
    /// Returns `Ok(None)` without deleting when the reference does not decode
    /// or names a different view.
    pub async fn delete_local_network(&self, reference: &str, local_view: &str) -> Result<Option<String>> {
        match codec::parse_network_reference(reference) {
            Some(network) if network.view == local_view => {
                let deleted = self.connector.delete_object(reference).await?;
                info!("Deleted network {} from view {}", network.cidr, local_view);
                Ok(Some(deleted))
            }
            Some(network) => {
                warn!(
                    "Not deleting network {}: it belongs to view {}, not {}",
                    network.cidr, network.view, local_view
                );
                Ok(None)
            }
            None => {
                warn!("Not deleting {}: not a network reference", reference);
                Ok(None)
            }
        }
    }

    /// Look up an extensible attribute definition by name
    pub async fn get_ea_definition(&self, name: &str) -> Result<Option<EADefinition>> {
        debug!("Querying EA definition {}", name);
        self.find_first(&EADefinition {
            name: name.to_string(),
            ..Default::default()
        })
        .await
    }

    /// Create an extensible attribute definition
    pub async fn create_ea_definition(&self, definition: EADefinition) -> Result<EADefinition> {
        let mut definition = EADefinition {
            reference: String::new(),
            ..definition
        };

        definition.reference = self.create_object(&definition).await?;
        info!("Created EA definition {}", definition.name);
        Ok(definition)
    }
}
