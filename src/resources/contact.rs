use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{decode_attributes, present, Cardinality, RelationshipDef, ResourceDef};
use crate::api::document::{RelationshipLinks, ResourceLinks};
use crate::api::{InputResource, LinkBuilder, Linkage, RelationshipObject, ResourceIdentifier, ResourceObject};
use crate::database::models::{Contact, ContactChanges, NewContact};
use crate::error::ApiError;

pub const TYPE_NAME: &str = "contacts";

pub static DEFINITION: ResourceDef = ResourceDef {
    type_name: TYPE_NAME,
    attributes: &["name_first", "name_last", "email", "twitter"],
    relationships: &[RelationshipDef {
        name: "phone_numbers",
        target: super::phone_number::TYPE_NAME,
        cardinality: Cardinality::Many,
        writable: false,
    }],
    filters: &[],
};

/// Attributes a contact exposes on read
#[derive(Debug, Serialize)]
pub struct ContactAttributes<'a> {
    pub name_first: &'a Option<String>,
    pub name_last: &'a Option<String>,
    pub email: &'a Option<String>,
    pub twitter: &'a Option<String>,
}

impl<'a> From<&'a Contact> for ContactAttributes<'a> {
    fn from(c: &'a Contact) -> Self {
        Self {
            name_first: &c.name_first,
            name_last: &c.name_last,
            email: &c.email,
            twitter: &c.twitter,
        }
    }
}

/// Attributes a contact accepts on write
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContactAttributesInput {
    #[serde(default, deserialize_with = "present")]
    pub name_first: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub name_last: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub twitter: Option<Option<String>>,
}

/// Exposure and input rules for contacts
pub struct ContactResource;

impl ContactResource {
    pub fn to_object(
        contact: &Contact,
        phone_number_ids: &[i64],
        fieldset: Option<&[String]>,
        links: &LinkBuilder,
    ) -> ResourceObject {
        let mut attributes = super::to_attribute_map(&ContactAttributes::from(contact));
        if let Some(fields) = fieldset {
            attributes.retain(|k, _| fields.iter().any(|f| f == k));
        }

        let mut relationships = BTreeMap::new();
        if fieldset.map_or(true, |f| f.iter().any(|n| n == "phone_numbers")) {
            relationships.insert(
                "phone_numbers".to_string(),
                RelationshipObject {
                    links: RelationshipLinks {
                        self_link: links.relationship(TYPE_NAME, contact.id, "phone_numbers"),
                        related: links.related(TYPE_NAME, contact.id, "phone_numbers"),
                    },
                    data: Self::phone_numbers_linkage(phone_number_ids),
                },
            );
        }

        ResourceObject {
            type_name: TYPE_NAME.to_string(),
            id: contact.id.to_string(),
            attributes,
            relationships,
            links: ResourceLinks { self_link: links.resource(TYPE_NAME, contact.id) },
        }
    }

    pub fn phone_numbers_linkage(phone_number_ids: &[i64]) -> Linkage {
        Linkage::Many(
            phone_number_ids
                .iter()
                .map(|id| ResourceIdentifier::new(super::phone_number::TYPE_NAME, *id))
                .collect(),
        )
    }

    pub fn new_from_input(input: InputResource) -> Result<NewContact, ApiError> {
        DEFINITION.check_write(&input.attributes, &input.relationships)?;
        let attrs: ContactAttributesInput = decode_attributes(input.attributes)?;
        Ok(NewContact {
            name_first: attrs.name_first.flatten(),
            name_last: attrs.name_last.flatten(),
            email: attrs.email.flatten(),
            twitter: attrs.twitter.flatten(),
        })
    }

    pub fn changes_from_input(input: InputResource) -> Result<ContactChanges, ApiError> {
        DEFINITION.check_write(&input.attributes, &input.relationships)?;
        let attrs: ContactAttributesInput = decode_attributes(input.attributes)?;
        Ok(ContactChanges {
            name_first: attrs.name_first,
            name_last: attrs.name_last,
            email: attrs.email,
            twitter: attrs.twitter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn joe() -> Contact {
        Contact {
            id: 1,
            name_first: Some("Joe".into()),
            name_last: Some("Bloggs".into()),
            email: Some("joe@example.com".into()),
            twitter: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn input(attributes: serde_json::Value, relationships: serde_json::Value) -> InputResource {
        InputResource {
            type_name: TYPE_NAME.into(),
            id: None,
            attributes: attributes.as_object().cloned().unwrap_or_default(),
            relationships: relationships.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn exposes_only_declared_fields() {
        let obj = ContactResource::to_object(&joe(), &[7, 8], None, &LinkBuilder::default());
        let v = serde_json::to_value(&obj).unwrap();
        let mut keys: Vec<_> = v["attributes"].as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["email", "name_first", "name_last", "twitter"]);
        assert_eq!(v["id"], "1");
        assert_eq!(v["attributes"]["twitter"], serde_json::Value::Null);
        assert_eq!(
            v["relationships"]["phone_numbers"]["data"],
            json!([{ "type": "phone_numbers", "id": "7" }, { "type": "phone_numbers", "id": "8" }])
        );
        assert_eq!(
            v["relationships"]["phone_numbers"]["links"]["related"],
            "/contacts/1/phone_numbers"
        );
        assert_eq!(v["links"]["self"], "/contacts/1");
    }

    #[test]
    fn sparse_fieldset_limits_output() {
        let fields = vec!["email".to_string()];
        let obj = ContactResource::to_object(&joe(), &[], Some(&fields), &LinkBuilder::default());
        assert_eq!(obj.attributes.len(), 1);
        assert!(obj.relationships.is_empty());
    }

    #[test]
    fn builds_new_contact() {
        let new = ContactResource::new_from_input(input(
            json!({ "name_first": "Joe", "name_last": "Bloggs", "email": null }),
            json!({}),
        ))
        .unwrap();
        assert_eq!(new.name_first.as_deref(), Some("Joe"));
        assert_eq!(new.email, None);
        assert_eq!(new.twitter, None);
    }

    #[test]
    fn changes_distinguish_null_from_absent() {
        let changes =
            ContactResource::changes_from_input(input(json!({ "twitter": null, "email": "j@x.io" }), json!({})))
                .unwrap();
        assert_eq!(changes.twitter, Some(None));
        assert_eq!(changes.email, Some(Some("j@x.io".into())));
        assert_eq!(changes.name_first, None);
    }

    #[test]
    fn rejects_undeclared_attribute() {
        let err = ContactResource::new_from_input(input(json!({ "notes": "x" }), json!({}))).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(
            err.field_errors()[0].source,
            crate::error::ErrorSource::Pointer("/data/attributes/notes".into())
        );
    }

    #[test]
    fn rejects_phone_numbers_linkage_write() {
        let err = ContactResource::changes_from_input(input(
            json!({}),
            json!({ "phone_numbers": { "data": [] } }),
        ))
        .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
