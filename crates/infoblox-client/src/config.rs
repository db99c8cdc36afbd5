//! Object manager configuration
//!
//! The tenant identity is fixed for the lifetime of an `ObjectManager`; it is
//! stamped on every object the manager creates.

use crate::error::{InfobloxError, Result};
use std::env;

/// CMP type recorded on managed objects when none is configured
pub const DEFAULT_CMP_TYPE: &str = "Docker";
/// Network view shared by all tenants
pub const DEFAULT_GLOBAL_NETWORK_VIEW: &str = "default";
/// Network view holding networks local to this integration
pub const DEFAULT_LOCAL_NETWORK_VIEW: &str = "local";

/// Identity and defaults of an `ObjectManager`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectManagerConfig {
    /// Tenant identifier written to the "Tenant ID" attribute
    pub tenant_id: String,
    /// Integration name written to the "CMP Type" attribute
    pub cmp_type: String,
    /// Network view shared by all tenants
    pub global_network_view: String,
    /// Network view holding this integration's networks
    pub local_network_view: String,
}

impl ObjectManagerConfig {
    /// Configuration for `tenant_id` with default CMP type and view names
    pub fn new(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            cmp_type: DEFAULT_CMP_TYPE.to_string(),
            global_network_view: DEFAULT_GLOBAL_NETWORK_VIEW.to_string(),
            local_network_view: DEFAULT_LOCAL_NETWORK_VIEW.to_string(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// * `IPAM_TENANT_ID` - required
    /// * `IPAM_CMP_TYPE` - defaults to "Docker"
    /// * `IPAM_GLOBAL_VIEW` - defaults to "default"
    /// * `IPAM_LOCAL_VIEW` - defaults to "local"
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let tenant_id = lookup("IPAM_TENANT_ID")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                InfobloxError::InvalidRequest("IPAM_TENANT_ID environment variable is required".to_string())
            })?;

        let mut config = Self::new(tenant_id);
        if let Some(cmp_type) = lookup("IPAM_CMP_TYPE") {
            config.cmp_type = cmp_type;
        }
        if let Some(view) = lookup("IPAM_GLOBAL_VIEW") {
            config.global_network_view = view;
        }
        if let Some(view) = lookup("IPAM_LOCAL_VIEW") {
            config.local_network_view = view;
        }
        Ok(config)
    }
}
