//! Mock connector for unit testing
//!
//! This module provides an in-memory implementation of `Connector` that can be
//! used in tests without a running appliance. It behaves like the appliance
//! where the object manager depends on it:
//! - references have the appliance shape (`network/<id>:10.0.0.0/24/default`)
//! - `func:nextavailableip` / `func:nextavailablenetwork` tokens allocate the
//!   lowest free address or block
//! - queries match every field set in the search template
//!
//! The mock is organized into:
//! - `ipam.rs` - address and network block allocation
//! - `helpers.rs` - reference generation and template matching

mod helpers;
mod ipam;

use crate::codec::{AllocationRequest, AllocationToken};
use crate::connector::Connector;
use crate::error::InfobloxError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Calls received by the mock, in order
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    /// `(object_type, body)` of every create
    pub creates: Vec<(String, Value)>,
    /// `(object_type, search)` of every query
    pub queries: Vec<(String, Value)>,
    /// Reference of every delete
    pub deletes: Vec<String>,
}

/// Mock connector for testing
///
/// Stores objects in memory keyed by reference and records every call so
/// tests can assert on what was sent.
#[derive(Clone, Default)]
pub struct MockConnector {
    pub(crate) objects: Arc<Mutex<BTreeMap<String, Value>>>,
    pub(crate) calls: Arc<Mutex<CallLog>>,
    pub(crate) next_id: Arc<Mutex<u64>>,
    // Calls left before the failure fires (1 = next call), and its message
    pub(crate) fail_next: Arc<Mutex<Option<(usize, String)>>>,
    // Reference returned by the next create instead of a generated one
    pub(crate) next_create_reference: Arc<Mutex<Option<String>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockConnector {
    /// Create a new, empty mock connector
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object without recording a create call (for test setup)
    ///
    /// Returns the generated reference.
    pub fn seed(&self, object_type: &str, body: Value) -> String {
        let id = self.next_id();
        let reference = helpers::make_reference(object_type, id, &body);
        self.store(reference.clone(), body);
        reference
    }

    /// Make the next call fail with `InfobloxError::Api(message)`
    pub fn fail_next_call(&self, message: impl Into<String>) {
        self.fail_call(1, message);
    }

    /// Make the `nth` call from now fail with `InfobloxError::Api(message)`
    ///
    /// Calls are counted across create, query and delete; `nth = 1` is the
    /// next call.
    pub fn fail_call(&self, nth: usize, message: impl Into<String>) {
        *lock(&self.fail_next) = Some((nth.max(1), message.into()));
    }

    /// Make the next create return `reference` verbatim
    pub fn respond_to_next_create_with(&self, reference: impl Into<String>) {
        *lock(&self.next_create_reference) = Some(reference.into());
    }

    /// Snapshot of the calls received so far
    pub fn calls(&self) -> CallLog {
        lock(&self.calls).clone()
    }

    /// Number of create calls received
    pub fn create_count(&self) -> usize {
        lock(&self.calls).creates.len()
    }

    /// Number of delete calls received
    pub fn delete_count(&self) -> usize {
        lock(&self.calls).deletes.len()
    }

    /// Body of the most recent create call
    pub fn last_create_body(&self) -> Option<Value> {
        lock(&self.calls).creates.last().map(|(_, body)| body.clone())
    }

    /// Stored object by reference
    pub fn object(&self, reference: &str) -> Option<Value> {
        lock(&self.objects).get(reference).cloned()
    }

    /// Number of stored objects of `object_type`
    pub fn count(&self, object_type: &str) -> usize {
        lock(&self.objects)
            .keys()
            .filter(|reference| helpers::object_type_of(reference) == object_type)
            .count()
    }

    pub(crate) fn next_id(&self) -> u64 {
        let mut id = lock(&self.next_id);
        *id += 1;
        *id
    }

    fn store(&self, reference: String, mut body: Value) {
        if let Some(fields) = body.as_object_mut() {
            fields.insert("_ref".to_string(), Value::String(reference.clone()));
        }
        lock(&self.objects).insert(reference, body);
    }

    fn take_failure(&self) -> Result<(), InfobloxError> {
        let mut pending = lock(&self.fail_next);
        let Some((remaining, _)) = pending.as_mut() else {
            return Ok(());
        };
        if *remaining > 1 {
            *remaining -= 1;
            return Ok(());
        }
        match pending.take() {
            Some((_, message)) => Err(InfobloxError::Api(message)),
            None => Ok(()),
        }
    }

    /// Stored bodies of `object_type` in `view`
    fn objects_in_view(&self, object_type: &str, view: &str) -> Vec<Value> {
        lock(&self.objects)
            .iter()
            .filter(|(reference, body)| {
                helpers::object_type_of(reference) == object_type
                    && helpers::str_field(body, "network_view") == Some(view)
            })
            .map(|(_, body)| body.clone())
            .collect()
    }

    /// Replace an allocation token in `field` with the value the appliance would pick
    fn resolve_allocation(&self, object_type: &str, field: &str, body: &mut Value) -> Result<(), InfobloxError> {
        let Some(value) = helpers::str_field(body, field) else {
            return Ok(());
        };
        if !AllocationToken::is_token(value) {
            return Ok(());
        }

        let resolved = match AllocationRequest::parse(value) {
            Some(AllocationRequest::NextAvailableIp { cidr, view }) if object_type == "fixedaddress" => {
                let used: Vec<Ipv4Addr> = self
                    .objects_in_view("fixedaddress", &view)
                    .iter()
                    .filter_map(|b| helpers::str_field(b, "ipv4addr"))
                    .filter_map(|ip| ip.parse().ok())
                    .collect();
                ipam::next_free_address(&cidr, &used)
                    .ok_or_else(|| InfobloxError::Api(format!("No available IPs in {cidr}")))?
                    .to_string()
            }
            Some(AllocationRequest::NextAvailableNetwork { cidr, view, prefix_len })
                if object_type == "network" || object_type == "networkcontainer" =>
            {
                let used: Vec<String> = self
                    .objects_in_view(object_type, &view)
                    .iter()
                    .filter_map(|b| helpers::str_field(b, "network"))
                    .map(str::to_string)
                    .collect();
                ipam::next_free_network(&cidr, prefix_len, &used)
                    .ok_or_else(|| InfobloxError::Api(format!("No available /{prefix_len} networks in {cidr}")))?
            }
            _ => {
                return Err(InfobloxError::InvalidRequest(format!(
                    "Invalid function call {value} in {object_type}.{field}"
                )));
            }
        };

        if let Some(fields) = body.as_object_mut() {
            fields.insert(field.to_string(), Value::String(resolved));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Connector for MockConnector {
    async fn create_object(&self, object_type: &str, mut body: Value) -> Result<String, InfobloxError> {
        lock(&self.calls)
            .creates
            .push((object_type.to_string(), body.clone()));
        self.take_failure()?;

        if let Some(reference) = lock(&self.next_create_reference).take() {
            self.store(reference.clone(), body);
            return Ok(reference);
        }

        match object_type {
            "fixedaddress" => self.resolve_allocation(object_type, "ipv4addr", &mut body)?,
            "network" | "networkcontainer" => self.resolve_allocation(object_type, "network", &mut body)?,
            _ => {}
        }

        let id = self.next_id();
        let reference = helpers::make_reference(object_type, id, &body);
        self.store(reference.clone(), body);
        Ok(reference)
    }

    async fn get_object(
        &self,
        object_type: &str,
        search: Value,
        _return_fields: &[&str],
    ) -> Result<Vec<Value>, InfobloxError> {
        lock(&self.calls)
            .queries
            .push((object_type.to_string(), search.clone()));
        self.take_failure()?;

        Ok(lock(&self.objects)
            .iter()
            .filter(|(reference, body)| {
                helpers::object_type_of(reference) == object_type && helpers::matches_template(body, &search)
            })
            .map(|(_, body)| body.clone())
            .collect())
    }

    async fn delete_object(&self, reference: &str) -> Result<String, InfobloxError> {
        lock(&self.calls).deletes.push(reference.to_string());
        self.take_failure()?;

        match lock(&self.objects).remove(reference) {
            Some(_) => Ok(reference.to_string()),
            None => Err(InfobloxError::Api(format!("Reference {reference} not found"))),
        }
    }
}
