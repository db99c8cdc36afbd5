//! Object manager errors

use thiserror::Error;

/// Errors that can occur when managing objects on the appliance
#[derive(Debug, Error)]
pub enum InfobloxError {
    /// Transport failure reported by the connector
    #[error("Connector error: {0}")]
    Connector(String),

    /// The appliance rejected the request
    #[error("WAPI error: {0}")]
    Api(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Object not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request (e.g., malformed allocation token, missing configuration)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, InfobloxError>;
