use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{decode_attributes, present, Cardinality, FilterDef, RelationshipDef, ResourceDef};
use crate::api::document::{relationship_data, to_one_linkage, RelationshipLinks, ResourceLinks};
use crate::api::{InputResource, LinkBuilder, Linkage, RelationshipObject, ResourceIdentifier, ResourceObject};
use crate::database::models::{NewPhoneNumber, PhoneNumber, PhoneNumberChanges};
use crate::error::ApiError;

pub const TYPE_NAME: &str = "phone_numbers";

const CONTACT_POINTER: &str = "/data/relationships/contact";

pub static DEFINITION: ResourceDef = ResourceDef {
    type_name: TYPE_NAME,
    attributes: &["name", "phone_number"],
    relationships: &[RelationshipDef {
        name: "contact",
        target: super::contact::TYPE_NAME,
        cardinality: Cardinality::One,
        writable: true,
    }],
    filters: &[FilterDef { name: "contact", column: "contact_id" }],
};

#[derive(Debug, Serialize)]
pub struct PhoneNumberAttributes<'a> {
    pub name: &'a Option<String>,
    pub phone_number: &'a Option<String>,
}

impl<'a> From<&'a PhoneNumber> for PhoneNumberAttributes<'a> {
    fn from(p: &'a PhoneNumber) -> Self {
        Self { name: &p.name, phone_number: &p.phone_number }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhoneNumberAttributesInput {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub phone_number: Option<Option<String>>,
}

/// Exposure and input rules for phone numbers. Creation is additionally
/// gated by `auth::PhoneNumberPolicy`.
pub struct PhoneNumberResource;

impl PhoneNumberResource {
    pub fn to_object(phone: &PhoneNumber, fieldset: Option<&[String]>, links: &LinkBuilder) -> ResourceObject {
        let mut attributes = super::to_attribute_map(&PhoneNumberAttributes::from(phone));
        if let Some(fields) = fieldset {
            attributes.retain(|k, _| fields.iter().any(|f| f == k));
        }

        let mut relationships = BTreeMap::new();
        if fieldset.map_or(true, |f| f.iter().any(|n| n == "contact")) {
            relationships.insert(
                "contact".to_string(),
                RelationshipObject {
                    links: RelationshipLinks {
                        self_link: links.relationship(TYPE_NAME, phone.id, "contact"),
                        related: links.related(TYPE_NAME, phone.id, "contact"),
                    },
                    data: Self::contact_linkage(phone),
                },
            );
        }

        ResourceObject {
            type_name: TYPE_NAME.to_string(),
            id: phone.id.to_string(),
            attributes,
            relationships,
            links: ResourceLinks { self_link: links.resource(TYPE_NAME, phone.id) },
        }
    }

    pub fn contact_linkage(phone: &PhoneNumber) -> Linkage {
        Linkage::One(Some(ResourceIdentifier::new(super::contact::TYPE_NAME, phone.contact_id)))
    }

    /// Candidate record for a create; the contact relationship is required
    pub fn new_from_input(input: InputResource) -> Result<NewPhoneNumber, ApiError> {
        DEFINITION.check_write(&input.attributes, &input.relationships)?;
        let contact_id = match input.relationships.get("contact") {
            Some(rel) => Self::contact_from_linkage(relationship_data(rel, CONTACT_POINTER)?, CONTACT_POINTER)?,
            None => return Err(ApiError::invalid_field(CONTACT_POINTER, "contact is required")),
        };
        let attrs: PhoneNumberAttributesInput = decode_attributes(input.attributes)?;
        Ok(NewPhoneNumber {
            contact_id,
            name: attrs.name.flatten(),
            phone_number: attrs.phone_number.flatten(),
        })
    }

    pub fn changes_from_input(input: InputResource) -> Result<PhoneNumberChanges, ApiError> {
        DEFINITION.check_write(&input.attributes, &input.relationships)?;
        let contact_id = match input.relationships.get("contact") {
            Some(rel) => Some(Self::contact_from_linkage(relationship_data(rel, CONTACT_POINTER)?, CONTACT_POINTER)?),
            None => None,
        };
        let attrs: PhoneNumberAttributesInput = decode_attributes(input.attributes)?;
        Ok(PhoneNumberChanges { contact_id, name: attrs.name, phone_number: attrs.phone_number })
    }

    /// Resolve to-one contact linkage; a phone number always belongs to a contact
    pub fn contact_from_linkage(data: &serde_json::Value, pointer: &str) -> Result<i64, ApiError> {
        let data_pointer = format!("{}/data", pointer);
        to_one_linkage(data, &data_pointer, super::contact::TYPE_NAME)?
            .ok_or_else(|| ApiError::invalid_field(data_pointer, "contact cannot be null"))
    }
}
