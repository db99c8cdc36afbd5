//! Helper functions for appliance-shaped references and template matching

use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use serde_json::Value;

/// Helper to read a string field from an object body
pub fn str_field<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str)
}

/// Object type prefix of a reference
pub fn object_type_of(reference: &str) -> &str {
    reference
        .split_once('/')
        .map_or(reference, |(object_type, _)| object_type)
}

/// Helper to build a reference the way the appliance does
///
/// The opaque part is the base64 of an internal `dns.<kind>$<id>` key, the
/// discriminator depends on the object type.
pub fn make_reference(object_type: &str, id: u64, body: &Value) -> String {
    let kind: String = match object_type {
        "networkview" => "network_view".to_string(),
        "networkcontainer" => "network_container".to_string(),
        "fixedaddress" => "fixed_address".to_string(),
        "extensibleattributedef" => "extensible_attribute_def".to_string(),
        other => other.chars().filter(char::is_ascii_alphanumeric).collect(),
    };
    let opaque = STANDARD_NO_PAD.encode(format!("dns.{kind}${id}"));

    let field = |key| str_field(body, key).unwrap_or_default();
    let discriminator = match object_type {
        "networkview" => format!("{}/false", field("name")),
        "network" | "networkcontainer" => format!("{}/{}", field("network"), field("network_view")),
        "fixedaddress" => format!("{}/{}", field("ipv4addr"), field("network_view")),
        "extensibleattributedef" => field("name").to_string(),
        _ => "object".to_string(),
    };

    format!("{object_type}/{opaque}:{discriminator}")
}

/// Whether `body` carries every field set in the search template
pub fn matches_template(body: &Value, search: &Value) -> bool {
    match search.as_object() {
        Some(fields) => fields.iter().all(|(key, value)| body.get(key) == Some(value)),
        None => search.is_null(),
    }
}
