use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One service registered in the identity service catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(rename = "type", default)]
    pub service_type: String,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(rename = "tenantId", default, skip_serializing_if = "Option::is_none", deserialize_with = "tenant_id")]
    pub tenant_id: Option<String>,
    /// publicURL, region, internalURL, ... kept as sent
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl CatalogEntry {
    pub fn new(name: &str, service_type: &str, endpoints: Vec<Endpoint>) -> Self {
        Self { name: name.to_owned(), service_type: service_type.to_owned(), endpoints }
    }
}

impl Endpoint {
    pub fn for_tenant(tenant_id: &str) -> Self {
        Self { tenant_id: Some(tenant_id.to_owned()), attributes: Map::new() }
    }
}

// some deployments send numeric tenant ids
fn tenant_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!("unexpected tenantId {}", other))),
    }
}
