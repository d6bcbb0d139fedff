use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use super::JSONAPI_VERSION;
use crate::error::ApiError;

/// Parse a wire id (`"12"`) into a store id
pub fn parse_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// The primary resource of a create or update request
#[derive(Debug, Clone, PartialEq)]
pub struct InputResource {
    pub type_name: String,
    pub id: Option<String>,
    pub attributes: Map<String, Value>,
    pub relationships: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputDocument {
    pub data: InputResource,
}

impl InputDocument {
    /// Parse a request body into a single-resource document
    pub fn parse(body: &[u8]) -> Result<Self, ApiError> {
        let root = parse_object_body(body)?;
        let data = match root.get("data") {
            Some(Value::Object(data)) => data,
            Some(_) => return Err(ApiError::invalid_field("/data", "data must be a resource object")),
            None => return Err(ApiError::invalid_field("/data", "data is required")),
        };

        let type_name = match data.get("type") {
            Some(Value::String(t)) if !t.is_empty() => t.clone(),
            _ => return Err(ApiError::invalid_field("/data/type", "type must be a non-empty string")),
        };

        let id = match data.get("id") {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) => Some(id.clone()),
            Some(_) => return Err(ApiError::invalid_field("/data/id", "id must be a string")),
        };

        let attributes = object_member(data, "attributes", "/data/attributes")?;
        let relationships = object_member(data, "relationships", "/data/relationships")?;

        Ok(Self {
            data: InputResource { type_name, id, attributes, relationships },
        })
    }

    /// A document whose type names another resource is a conflict
    pub fn expect_type(&self, type_name: &str) -> Result<(), ApiError> {
        if self.data.type_name != type_name {
            return Err(ApiError::conflict(format!(
                "type '{}' does not match endpoint type '{}'",
                self.data.type_name, type_name
            )));
        }
        Ok(())
    }
}

/// Parse a relationship update body (`{"data": ...}`) and return its `data` member
pub fn parse_linkage_body(body: &[u8]) -> Result<Value, ApiError> {
    let mut root = parse_object_body(body)?;
    root.remove("data")
        .ok_or_else(|| ApiError::invalid_field("/data", "data is required"))
}

/// Read to-one linkage (`null` or `{"type", "id"}`) and resolve it to a store id
pub fn to_one_linkage(data: &Value, pointer: &str, expected_type: &str) -> Result<Option<i64>, ApiError> {
    match data {
        Value::Null => Ok(None),
        Value::Object(identifier) => {
            match identifier.get("type") {
                Some(Value::String(t)) if t == expected_type => {}
                _ => {
                    return Err(ApiError::invalid_field(
                        format!("{}/type", pointer),
                        format!("type must be '{}'", expected_type),
                    ))
                }
            }
            match identifier.get("id") {
                Some(Value::String(raw)) => parse_id(raw).map(Some).ok_or_else(|| {
                    ApiError::invalid_field(format!("{}/id", pointer), format!("'{}' is not a valid id", raw))
                }),
                _ => Err(ApiError::invalid_field(format!("{}/id", pointer), "id must be a string")),
            }
        }
        _ => Err(ApiError::invalid_field(pointer, "linkage must be null or a resource identifier")),
    }
}

/// Read the `data` member of a relationship object inside a resource document
pub fn relationship_data<'a>(relationship: &'a Value, pointer: &str) -> Result<&'a Value, ApiError> {
    relationship
        .as_object()
        .and_then(|r| r.get("data"))
        .ok_or_else(|| ApiError::invalid_field(format!("{}/data", pointer), "relationship data is required"))
}

fn parse_object_body(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(ApiError::invalid_json("Request body is empty"));
    }
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::invalid_json(format!("Malformed JSON: {}", e)))?;
    match value {
        Value::Object(root) => Ok(root),
        _ => Err(ApiError::invalid_field("", "document must be a JSON object")),
    }
}

fn object_member(data: &Map<String, Value>, key: &str, pointer: &str) -> Result<Map<String, Value>, ApiError> {
    match data.get(key) {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(m)) => Ok(m.clone()),
        Some(_) => Err(ApiError::invalid_field(pointer, format!("{} must be an object", key))),
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub type_name: String,
    pub id: String,
}

impl ResourceIdentifier {
    pub fn new(type_name: &str, id: i64) -> Self {
        Self { type_name: type_name.to_string(), id: id.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Linkage {
    One(Option<ResourceIdentifier>),
    Many(Vec<ResourceIdentifier>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub related: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipObject {
    pub links: RelationshipLinks,
    pub data: Linkage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceLinks {
    #[serde(rename = "self")]
    pub self_link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceObject {
    #[serde(rename = "type")]
    pub type_name: String,
    pub id: String,
    pub attributes: Map<String, Value>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, RelationshipObject>,
    pub links: ResourceLinks,
}

impl ResourceObject {
    pub fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier { type_name: self.type_name.clone(), id: self.id.clone() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PrimaryData {
    Resource(Option<ResourceObject>),
    Collection(Vec<ResourceObject>),
    Linkage(Linkage),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonApiObject {
    pub version: &'static str,
}

/// A top-level response document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub data: PrimaryData,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<ResourceObject>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
    pub jsonapi: JsonApiObject,
}

impl Document {
    fn new(data: PrimaryData) -> Self {
        Self {
            data,
            included: vec![],
            links: BTreeMap::new(),
            meta: Map::new(),
            jsonapi: JsonApiObject { version: JSONAPI_VERSION },
        }
    }

    pub fn single(resource: ResourceObject) -> Self {
        Self::new(PrimaryData::Resource(Some(resource)))
    }

    pub fn collection(resources: Vec<ResourceObject>) -> Self {
        Self::new(PrimaryData::Collection(resources))
    }

    pub fn linkage(linkage: Linkage) -> Self {
        Self::new(PrimaryData::Linkage(linkage))
    }

    /// Attach included resources, dropping duplicates and anything already primary
    pub fn with_included(mut self, resources: Vec<ResourceObject>) -> Self {
        let mut seen: Vec<ResourceIdentifier> = match &self.data {
            PrimaryData::Resource(Some(r)) => vec![r.identifier()],
            PrimaryData::Collection(rs) => rs.iter().map(ResourceObject::identifier).collect(),
            _ => vec![],
        };
        for resource in resources {
            let identifier = resource.identifier();
            if !seen.contains(&identifier) {
                seen.push(identifier);
                self.included.push(resource);
            }
        }
        self
    }

    pub fn with_link(mut self, name: &str, href: impl Into<String>) -> Self {
        self.links.insert(name.to_string(), href.into());
        self
    }

    pub fn with_links(mut self, links: BTreeMap<String, String>) -> Self {
        self.links.extend(links);
        self
    }

    pub fn with_meta(mut self, key: &str, value: Value) -> Self {
        self.meta.insert(key.to_string(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_create_document() {
        let body = json!({
            "data": {
                "type": "contacts",
                "attributes": { "name_first": "Joe" }
            }
        });
        let doc = InputDocument::parse(body.to_string().as_bytes()).unwrap();
        assert_eq!(doc.data.type_name, "contacts");
        assert!(doc.data.id.is_none());
        assert_eq!(doc.data.attributes["name_first"], "Joe");
        assert!(doc.data.relationships.is_empty());
    }

    #[test]
    fn malformed_body_is_invalid_json() {
        let err = InputDocument::parse(b"{not json").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_JSON");
        let err = InputDocument::parse(b"").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_JSON");
    }

    #[test]
    fn missing_data_points_at_data() {
        let err = InputDocument::parse(br#"{"meta": {}}"#).unwrap_err();
        assert_eq!(err.field_errors()[0], crate::error::FieldError::pointer("/data", "data is required"));
    }

    #[test]
    fn type_mismatch_is_conflict() {
        let doc = InputDocument::parse(br#"{"data": {"type": "people"}}"#).unwrap();
        assert_eq!(doc.expect_type("contacts").unwrap_err().status_code(), 409);
    }

    #[test]
    fn reads_to_one_linkage() {
        let data = json!({ "type": "contacts", "id": "12" });
        assert_eq!(to_one_linkage(&data, "/data", "contacts").unwrap(), Some(12));
        assert_eq!(to_one_linkage(&Value::Null, "/data", "contacts").unwrap(), None);
        assert!(to_one_linkage(&json!({ "type": "contacts", "id": "x" }), "/data", "contacts").is_err());
        assert!(to_one_linkage(&json!({ "type": "people", "id": "1" }), "/data", "contacts").is_err());
    }

    #[test]
    fn parse_id_accepts_only_digits() {
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id("-1"), None);
        assert_eq!(parse_id("4 2"), None);
        assert_eq!(parse_id(""), None);
    }

    #[test]
    fn included_skips_primary_and_duplicates() {
        let obj = |t: &str, id: &str| ResourceObject {
            type_name: t.into(),
            id: id.into(),
            attributes: Map::new(),
            relationships: BTreeMap::new(),
            links: ResourceLinks { self_link: format!("/{}/{}", t, id) },
        };
        let doc = Document::collection(vec![obj("contacts", "1")])
            .with_included(vec![obj("contacts", "1"), obj("phone_numbers", "1"), obj("phone_numbers", "1")]);
        assert_eq!(doc.included.len(), 1);
        assert_eq!(doc.included[0].type_name, "phone_numbers");
    }

    #[test]
    fn document_serializes_jsonapi_member() {
        let v = serde_json::to_value(Document::linkage(Linkage::Many(vec![]))).unwrap();
        assert_eq!(v, json!({ "data": [], "jsonapi": { "version": "1.0" } }));
    }
}
