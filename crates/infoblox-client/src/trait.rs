//! Connector trait
//!
//! The connector performs the authenticated calls against the appliance and
//! owns the wire protocol. The object manager only sees JSON object bodies and
//! reference strings, which keeps it testable against an in-memory mock.

use crate::error::InfobloxError;

/// Trait for the appliance object store
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    /// Create an object and return the reference assigned to it
    async fn create_object(&self, object_type: &str, body: serde_json::Value) -> Result<String, InfobloxError>;

    /// Return every object of `object_type` matching the fields set in `search`
    async fn get_object(
        &self,
        object_type: &str,
        search: serde_json::Value,
        return_fields: &[&str],
    ) -> Result<Vec<serde_json::Value>, InfobloxError>;

    /// Delete an object and return the reference that was deleted
    async fn delete_object(&self, reference: &str) -> Result<String, InfobloxError>;
}
