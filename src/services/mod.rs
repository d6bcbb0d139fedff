//! Resource operations: validate, authorize, check references, then write.
//! Each service returns finished response documents.

pub mod contact_service;
pub mod phone_number_service;

use std::collections::{BTreeMap, BTreeSet};

use crate::api::document::parse_id;
use crate::api::{InputDocument, QueryParams, ResourceObject};
use crate::auth::{Actor, CreatePolicy, Decision};
use crate::database::models::{Contact, PhoneNumber};
use crate::database::Store;
use crate::error::ApiError;
use crate::resources::{ContactResource, PhoneNumberResource};
use crate::state::AppState;

pub use contact_service::ContactService;
pub use phone_number_service::PhoneNumberService;

/// Primary resource objects plus whatever `include` pulled in
pub(crate) struct Rendered {
    pub primary: Vec<ResourceObject>,
    pub included: Vec<ResourceObject>,
}

/// Phone number ids owned by each contact, in id order
async fn phone_numbers_by_contact(
    store: &dyn Store,
    contact_ids: &[i64],
) -> Result<(BTreeMap<i64, Vec<i64>>, Vec<PhoneNumber>), ApiError> {
    let phones = store.phone_numbers_for_contacts(contact_ids).await?;
    let mut owned: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
    for phone in &phones {
        owned.entry(phone.contact_id).or_default().push(phone.id);
    }
    Ok((owned, phones))
}

pub(crate) async fn render_contacts(
    state: &AppState,
    contacts: &[Contact],
    params: &QueryParams,
) -> Result<Rendered, ApiError> {
    let ids: Vec<i64> = contacts.iter().map(|c| c.id).collect();
    let (owned, phones) = phone_numbers_by_contact(state.store.as_ref(), &ids).await?;

    let primary = contacts
        .iter()
        .map(|c| {
            let phone_ids = owned.get(&c.id).map(Vec::as_slice).unwrap_or(&[]);
            ContactResource::to_object(c, phone_ids, params.fieldset("contacts"), &state.links)
        })
        .collect();

    let included = if params.includes("phone_numbers") {
        phones
            .iter()
            .map(|p| PhoneNumberResource::to_object(p, params.fieldset("phone_numbers"), &state.links))
            .collect()
    } else {
        vec![]
    };

    Ok(Rendered { primary, included })
}

pub(crate) async fn render_phone_numbers(
    state: &AppState,
    phones: &[PhoneNumber],
    params: &QueryParams,
) -> Result<Rendered, ApiError> {
    let primary = phones
        .iter()
        .map(|p| PhoneNumberResource::to_object(p, params.fieldset("phone_numbers"), &state.links))
        .collect();

    let mut included = vec![];
    if params.includes("contact") {
        let contact_ids: Vec<i64> = phones
            .iter()
            .map(|p| p.contact_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let contacts = state.store.find_contacts(&contact_ids).await?;
        let (owned, _) = phone_numbers_by_contact(state.store.as_ref(), &contact_ids).await?;
        included = contacts
            .iter()
            .map(|c| {
                let phone_ids = owned.get(&c.id).map(Vec::as_slice).unwrap_or(&[]);
                ContactResource::to_object(c, phone_ids, params.fieldset("contacts"), &state.links)
            })
            .collect();
    }

    Ok(Rendered { primary, included })
}

/// Parse a create body: endpoint type must match, client ids are refused
pub(crate) fn parse_create(body: &[u8], type_name: &str) -> Result<InputDocument, ApiError> {
    let doc = InputDocument::parse(body)?;
    doc.expect_type(type_name)?;
    if doc.data.id.is_some() {
        return Err(ApiError::forbidden("Client-generated ids are not supported"));
    }
    Ok(doc)
}

/// Parse an update body: endpoint type must match and `data.id` must name the URL's resource
pub(crate) fn parse_update(body: &[u8], type_name: &str, id: i64) -> Result<InputDocument, ApiError> {
    let doc = InputDocument::parse(body)?;
    doc.expect_type(type_name)?;
    match doc.data.id.as_deref() {
        None => return Err(ApiError::invalid_field("/data/id", "id is required")),
        Some(raw) if parse_id(raw) != Some(id) => {
            return Err(ApiError::conflict(format!("id '{}' does not match endpoint id '{}'", raw, id)))
        }
        Some(_) => {}
    }
    Ok(doc)
}

/// Run a create policy, turning a denial into 403
pub(crate) fn authorize<R>(
    policy: &dyn CreatePolicy<R>,
    candidate: &R,
    actor: &Actor,
    type_name: &str,
) -> Result<(), ApiError> {
    match policy.authorize_create(candidate, actor) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => {
            tracing::warn!("Denied {} create for {}: {}", type_name, actor.name, reason);
            Err(ApiError::forbidden(reason))
        }
    }
}

pub(crate) fn not_found(type_name: &str, id: i64) -> ApiError {
    ApiError::not_found(format!("{} {} does not exist", type_name, id))
}
