//! WAPI object models
//!
//! These models match the appliance's object payloads. Field names follow the
//! WAPI wire names; empty fields are left out of serialized templates so the
//! same struct doubles as a sparse search template.

use crate::codec;
use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Extensible attribute carrying the ownership flag
pub const EA_CLOUD_API_OWNED: &str = "Cloud API Owned";
/// Extensible attribute naming the managing integration
pub const EA_CMP_TYPE: &str = "CMP Type";
/// Extensible attribute carrying the tenant identifier
pub const EA_TENANT_ID: &str = "Tenant ID";
/// Extensible attribute carrying the VM bound to a fixed address
pub const EA_VM_ID: &str = "VM ID";

/// A typed object stored on the appliance
pub trait WapiObject: Serialize + DeserializeOwned + Send + Sync {
    /// WAPI object type, also the prefix of every reference of this type
    const OBJECT_TYPE: &'static str;

    /// Fields requested when querying objects of this type
    const RETURN_FIELDS: &'static [&'static str];

    /// Reference assigned by the appliance (empty for unsaved templates)
    fn reference(&self) -> &str;
}

/// Value of a single extensible attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EaValue {
    /// Boolean, sent as "True" / "False"
    Bool(bool),
    /// String value; booleans read back from the appliance arrive as strings
    Str(String),
    /// Integer value
    Int(i64),
    /// Multi-value attribute
    List(Vec<EaValue>),
    /// Any other value (fractional number, null, object), kept verbatim
    Other(serde_json::Value),
}

impl EaValue {
    fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::String(s) => Self::Str(s),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Other(serde_json::Value::Number(n)),
            },
            serde_json::Value::Array(items) => Self::List(items.into_iter().map(Self::from_json).collect()),
            other => Self::Other(other),
        }
    }
}

impl From<bool> for EaValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for EaValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for EaValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for EaValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

// The appliance stores boolean attributes as the strings "True" / "False".
impl Serialize for EaValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(true) => serializer.serialize_str("True"),
            Self::Bool(false) => serializer.serialize_str("False"),
            Self::Str(s) => serializer.serialize_str(s),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::List(items) => serializer.collect_seq(items),
            Self::Other(value) => value.serialize(serializer),
        }
    }
}

// Never rejects a value: attributes written by other integrations must not
// break lookups of the objects carrying them.
impl<'de> Deserialize<'de> for EaValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from_json)
    }
}

#[derive(Serialize)]
struct EaEntryRef<'a> {
    value: &'a EaValue,
}

#[derive(Deserialize)]
struct EaEntry {
    value: EaValue,
}

/// Extensible attributes attached to an object, keyed by attribute name
///
/// Serialized in the nested WAPI form `{"<name>": {"value": <v>}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensibleAttributes(BTreeMap<String, EaValue>);

impl ExtensibleAttributes {
    /// Empty attribute set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, replacing any previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<EaValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Raw value of an attribute
    pub fn get(&self, name: &str) -> Option<&EaValue> {
        self.0.get(name)
    }

    /// String value of an attribute, if present and a string
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(EaValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Boolean value of an attribute
    ///
    /// Accepts a boolean or the strings "True" / "False" the appliance
    /// stores booleans as.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.0.get(name)? {
            EaValue::Bool(b) => Some(*b),
            EaValue::Str(s) if s == "True" => Some(true),
            EaValue::Str(s) if s == "False" => Some(false),
            _ => None,
        }
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no attribute is set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Attributes in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &EaValue)> {
        self.0.iter()
    }
}

impl Serialize for ExtensibleAttributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, &EaEntryRef { value })?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ExtensibleAttributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<String, EaEntry>::deserialize(deserializer)?;
        Ok(Self(
            entries
                .into_iter()
                .map(|(name, entry)| (name, entry.value))
                .collect(),
        ))
    }
}

/// Network view: a namespace partitioning overlapping address spaces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkView {
    /// Appliance reference (`_ref`), empty until created
    #[serde(rename = "_ref", default, skip_serializing_if = "String::is_empty")]
    pub reference: String,
    /// Object name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Extensible attributes (`extattrs`)
    #[serde(rename = "extattrs", default, skip_serializing_if = "ExtensibleAttributes::is_empty")]
    pub ea: ExtensibleAttributes,
}

impl NetworkView {
    /// Build a network view from its reference, if the reference decodes
    pub fn from_reference(reference: &str) -> Option<Self> {
        codec::parse_network_view_reference(reference).map(|name| Self {
            reference: reference.to_string(),
            name,
            ea: ExtensibleAttributes::default(),
        })
    }
}

impl WapiObject for NetworkView {
    const OBJECT_TYPE: &'static str = "networkview";
    const RETURN_FIELDS: &'static [&'static str] = &["extattrs", "name"];

    fn reference(&self) -> &str {
        &self.reference
    }
}

/// IPv4 network inside a network view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Network {
    /// Appliance reference (`_ref`), empty until created
    #[serde(rename = "_ref", default, skip_serializing_if = "String::is_empty")]
    pub reference: String,
    /// Owning network view
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network_view: String,
    /// CIDR, or an allocation token on create
    #[serde(rename = "network", default, skip_serializing_if = "String::is_empty")]
    pub cidr: String,
    /// Extensible attributes (`extattrs`)
    #[serde(rename = "extattrs", default, skip_serializing_if = "ExtensibleAttributes::is_empty")]
    pub ea: ExtensibleAttributes,
}

impl Network {
    /// Build a network from its reference, if the reference decodes
    pub fn from_reference(reference: &str) -> Option<Self> {
        codec::parse_network_reference(reference).map(|parsed| Self {
            reference: reference.to_string(),
            network_view: parsed.view,
            cidr: parsed.cidr,
            ea: ExtensibleAttributes::default(),
        })
    }
}

impl WapiObject for Network {
    const OBJECT_TYPE: &'static str = "network";
    const RETURN_FIELDS: &'static [&'static str] = &["extattrs", "network", "network_view"];

    fn reference(&self) -> &str {
        &self.reference
    }
}

/// Supernet grouping networks inside a network view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkContainer {
    /// Appliance reference (`_ref`), empty until created
    #[serde(rename = "_ref", default, skip_serializing_if = "String::is_empty")]
    pub reference: String,
    /// Owning network view
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network_view: String,
    /// CIDR (`network`)
    #[serde(rename = "network", default, skip_serializing_if = "String::is_empty")]
    pub cidr: String,
    /// Extensible attributes (`extattrs`)
    #[serde(rename = "extattrs", default, skip_serializing_if = "ExtensibleAttributes::is_empty")]
    pub ea: ExtensibleAttributes,
}

impl NetworkContainer {
    /// Build a network container from its reference, if the reference decodes
    pub fn from_reference(reference: &str) -> Option<Self> {
        codec::parse_network_container_reference(reference).map(|parsed| Self {
            reference: reference.to_string(),
            network_view: parsed.view,
            cidr: parsed.cidr,
            ea: ExtensibleAttributes::default(),
        })
    }
}

impl WapiObject for NetworkContainer {
    const OBJECT_TYPE: &'static str = "networkcontainer";
    const RETURN_FIELDS: &'static [&'static str] = &["extattrs", "network", "network_view"];

    fn reference(&self) -> &str {
        &self.reference
    }
}

/// Fixed address: one IPv4 address bound to one MAC within a view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixedAddress {
    /// Appliance reference (`_ref`), empty until created
    #[serde(rename = "_ref", default, skip_serializing_if = "String::is_empty")]
    pub reference: String,
    /// Owning network view
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network_view: String,
    /// CIDR (`network`)
    #[serde(rename = "network", default, skip_serializing_if = "String::is_empty")]
    pub cidr: String,
    /// IPv4 literal, or an allocation token on create
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ipv4addr: String,
    /// MAC address
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mac: String,
    /// Extensible attributes (`extattrs`)
    #[serde(rename = "extattrs", default, skip_serializing_if = "ExtensibleAttributes::is_empty")]
    pub ea: ExtensibleAttributes,
}

impl WapiObject for FixedAddress {
    const OBJECT_TYPE: &'static str = "fixedaddress";
    const RETURN_FIELDS: &'static [&'static str] = &["extattrs", "ipv4addr", "mac", "network_view"];

    fn reference(&self) -> &str {
        &self.reference
    }
}

/// Allowed value of a list-typed extensible attribute definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EaListValue {
    /// One allowed value
    pub value: String,
}

/// Schema entry describing an allowed extensible attribute
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EADefinition {
    /// Appliance reference (`_ref`), empty until created
    #[serde(rename = "_ref", default, skip_serializing_if = "String::is_empty")]
    pub reference: String,
    /// Attribute name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Attribute type, e.g. "STRING", "ENUM", "INTEGER"
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub ea_type: String,
    /// Free-text description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
    /// Definition flags as the appliance encodes them
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub flags: String,
    /// Allowed values of an ENUM attribute
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub list_values: Vec<EaListValue>,
    /// Object types the attribute may be set on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_object_types: Vec<String>,
}

impl WapiObject for EADefinition {
    const OBJECT_TYPE: &'static str = "extensibleattributedef";
    const RETURN_FIELDS: &'static [&'static str] = &[
        "allowed_object_types",
        "comment",
        "flags",
        "list_values",
        "name",
        "type",
    ];

    fn reference(&self) -> &str {
        &self.reference
    }
}
