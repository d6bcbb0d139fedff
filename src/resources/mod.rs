//! Resource exposure: which attributes, relationships and filters each
//! resource type makes addressable, and the typed structs that enforce it at
//! the serialization and deserialization boundaries.

pub mod contact;
pub mod phone_number;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, FieldError};

pub use contact::ContactResource;
pub use phone_number::PhoneNumberResource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

impl Cardinality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::One => "one",
            Cardinality::Many => "many",
        }
    }

    /// Whether `data` has the linkage shape for this side: an identifier or
    /// null for to-one, an array for to-many
    pub fn accepts(&self, data: &Value) -> bool {
        match self {
            Cardinality::One => matches!(data, Value::Object(_) | Value::Null),
            Cardinality::Many => data.is_array(),
        }
    }
}

#[derive(Debug)]
pub struct RelationshipDef {
    pub name: &'static str,
    /// Type name of the related resource
    pub target: &'static str,
    pub cardinality: Cardinality,
    pub writable: bool,
}

#[derive(Debug)]
pub struct FilterDef {
    /// Name as it appears in `filter[<name>]`
    pub name: &'static str,
    /// Store column compared for exact equality
    pub column: &'static str,
}

/// Static exposure contract of one resource type
#[derive(Debug)]
pub struct ResourceDef {
    pub type_name: &'static str,
    pub attributes: &'static [&'static str],
    pub relationships: &'static [RelationshipDef],
    pub filters: &'static [FilterDef],
}

impl ResourceDef {
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains(&name)
    }

    pub fn relationship(&self, name: &str) -> Option<&'static RelationshipDef> {
        self.relationships.iter().find(|r| r.name == name)
    }

    pub fn filter(&self, name: &str) -> Option<&'static FilterDef> {
        self.filters.iter().find(|f| f.name == name)
    }

    /// Attribute or relationship name, as accepted by `fields[<type>]`
    pub fn has_field(&self, name: &str) -> bool {
        self.has_attribute(name) || self.relationship(name).is_some()
    }

    /// Store column for a sort key; `id` and every attribute are sortable
    pub fn sort_column(&self, key: &str) -> Option<&'static str> {
        if key == "id" {
            return Some("id");
        }
        self.attributes.iter().copied().find(|a| *a == key)
    }

    /// Every field a read can expose, in declaration order
    pub fn fields(&self) -> Vec<&'static str> {
        self.attributes
            .iter()
            .copied()
            .chain(self.relationships.iter().map(|r| r.name))
            .collect()
    }

    /// Reject undeclared attributes and relationships in a write,
    /// relationships that cannot be written from this side, and linkage
    /// whose shape does not match the relationship's cardinality.
    pub fn check_write(&self, attributes: &Map<String, Value>, relationships: &Map<String, Value>) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        for name in attributes.keys() {
            if !self.has_attribute(name) {
                errors.push(FieldError::pointer(
                    format!("/data/attributes/{}", name),
                    format!("{} is not a valid attribute of {}", name, self.type_name),
                ));
            }
        }
        for (name, value) in relationships {
            match self.relationship(name) {
                Some(rel) if rel.writable => {
                    if let Some(data) = value.get("data") {
                        if !rel.cardinality.accepts(data) {
                            let expected = match rel.cardinality {
                                Cardinality::One => "a single resource identifier or null",
                                Cardinality::Many => "an array of resource identifiers",
                            };
                            errors.push(FieldError::pointer(
                                format!("/data/relationships/{}/data", name),
                                format!("{} linkage must be {} of type {}", name, expected, rel.target),
                            ));
                        }
                    }
                }
                Some(_) => errors.push(FieldError::pointer(
                    format!("/data/relationships/{}", name),
                    format!("{} cannot be written through {}", name, self.type_name),
                )),
                None => errors.push(FieldError::pointer(
                    format!("/data/relationships/{}", name),
                    format!("{} is not a valid relationship of {}", name, self.type_name),
                )),
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error(
                format!("Invalid fields for {}", self.type_name),
                errors,
            ))
        }
    }
}

/// Every exposed resource type
pub static RESOURCES: &[&ResourceDef] = &[&contact::DEFINITION, &phone_number::DEFINITION];

pub fn lookup(type_name: &str) -> Option<&'static ResourceDef> {
    RESOURCES.iter().copied().find(|d| d.type_name == type_name)
}

/// Exposure contract of one resource type as a JSON description
pub fn describe(def: &ResourceDef) -> Value {
    let relationships: Map<String, Value> = def
        .relationships
        .iter()
        .map(|rel| {
            let described = serde_json::json!({
                "type": rel.target,
                "cardinality": rel.cardinality.as_str(),
                "writable": rel.writable,
            });
            (rel.name.to_string(), described)
        })
        .collect();

    serde_json::json!({
        "attributes": def.attributes,
        "relationships": relationships,
        "filters": def.filters.iter().map(|f| f.name).collect::<Vec<_>>(),
    })
}

/// Serialize a typed attributes struct into an attributes member
pub(crate) fn to_attribute_map<T: Serialize>(attributes: &T) -> Map<String, Value> {
    match serde_json::to_value(attributes) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Deserialize checked attributes into a typed input struct, mapping serde
/// failures to a validation error on the offending attribute.
pub(crate) fn decode_attributes<T: DeserializeOwned>(attributes: Map<String, Value>) -> Result<T, ApiError> {
    for (name, value) in &attributes {
        if !matches!(value, Value::String(_) | Value::Null) {
            return Err(ApiError::invalid_field(
                format!("/data/attributes/{}", name),
                format!("{} must be a string or null", name),
            ));
        }
    }
    serde_json::from_value(Value::Object(attributes))
        .map_err(|e| ApiError::invalid_field("/data/attributes", e.to_string()))
}

/// Distinguishes an absent attribute (`None`) from an explicit null (`Some(None)`)
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
