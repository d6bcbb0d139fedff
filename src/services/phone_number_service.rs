use tracing::{info, warn};

use super::{authorize, not_found, parse_create, parse_update, render_contacts, render_phone_numbers};
use crate::api::document::parse_linkage_body;
use crate::api::{Document, QueryParams};
use crate::auth::RequestContext;
use crate::database::models::PhoneNumberChanges;
use crate::error::ApiError;
use crate::resources::phone_number::TYPE_NAME;
use crate::resources::{contact, PhoneNumberResource};
use crate::state::AppState;

pub struct PhoneNumberService<'a> {
    state: &'a AppState,
}

impl<'a> PhoneNumberService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Supports `filter[contact]`
    pub async fn list(&self, params: &QueryParams) -> Result<Document, ApiError> {
        let page = self.state.store.list_phone_numbers(params.to_filter_data()).await?;
        let rendered = render_phone_numbers(self.state, &page.records, params).await?;

        Ok(Document::collection(rendered.primary)
            .with_included(rendered.included)
            .with_links(params.page_links(&self.state.links.collection(TYPE_NAME), page.total))
            .with_meta("record_count", page.total.into()))
    }

    pub async fn show(&self, id: i64, params: &QueryParams) -> Result<Document, ApiError> {
        let phone = self
            .state
            .store
            .find_phone_number(id)
            .await?
            .ok_or_else(|| not_found(TYPE_NAME, id))?;
        let mut rendered = render_phone_numbers(self.state, std::slice::from_ref(&phone), params).await?;

        Ok(Document::single(rendered.primary.remove(0))
            .with_included(rendered.included)
            .with_link("self", self.state.links.resource(TYPE_NAME, id)))
    }

    /// Validate, authorize, confirm the owning contact, then insert
    pub async fn create(&self, ctx: &RequestContext, body: &[u8]) -> Result<Document, ApiError> {
        let doc = parse_create(body, TYPE_NAME)?;
        let candidate = PhoneNumberResource::new_from_input(doc.data)?;
        authorize(self.state.policies.phone_numbers.as_ref(), &candidate, &ctx.actor, TYPE_NAME)?;
        self.require_contact(candidate.contact_id).await?;

        let phone = self.state.store.create_phone_number(candidate).await?;
        info!("{} created phone number {} for contact {}", ctx.actor.name, phone.id, phone.contact_id);

        let object = PhoneNumberResource::to_object(&phone, None, &self.state.links);
        Ok(Document::single(object).with_link("self", self.state.links.resource(TYPE_NAME, phone.id)))
    }

    pub async fn update(&self, ctx: &RequestContext, id: i64, body: &[u8]) -> Result<Document, ApiError> {
        if self.state.store.find_phone_number(id).await?.is_none() {
            return Err(not_found(TYPE_NAME, id));
        }
        let doc = parse_update(body, TYPE_NAME, id)?;
        let changes = PhoneNumberResource::changes_from_input(doc.data)?;
        if let Some(contact_id) = changes.contact_id {
            self.require_contact(contact_id).await?;
        }

        let phone = self
            .state
            .store
            .update_phone_number(id, changes)
            .await?
            .ok_or_else(|| not_found(TYPE_NAME, id))?;
        info!("{} updated phone number {}", ctx.actor.name, id);

        let object = PhoneNumberResource::to_object(&phone, None, &self.state.links);
        Ok(Document::single(object).with_link("self", self.state.links.resource(TYPE_NAME, id)))
    }

    pub async fn delete(&self, ctx: &RequestContext, id: i64) -> Result<(), ApiError> {
        if !self.state.store.delete_phone_number(id).await? {
            return Err(not_found(TYPE_NAME, id));
        }
        info!("{} deleted phone number {}", ctx.actor.name, id);
        Ok(())
    }

    /// `GET /phone_numbers/:id/contact`
    pub async fn contact(&self, id: i64, params: &QueryParams) -> Result<Document, ApiError> {
        let phone = self
            .state
            .store
            .find_phone_number(id)
            .await?
            .ok_or_else(|| not_found(TYPE_NAME, id))?;
        let owner = self
            .state
            .store
            .find_contact(phone.contact_id)
            .await?
            .ok_or_else(|| not_found(contact::TYPE_NAME, phone.contact_id))?;
        let mut rendered = render_contacts(self.state, std::slice::from_ref(&owner), params).await?;

        Ok(Document::single(rendered.primary.remove(0))
            .with_included(rendered.included)
            .with_link("self", self.state.links.related(TYPE_NAME, id, "contact")))
    }

    /// `GET /phone_numbers/:id/relationships/contact`
    pub async fn contact_relationship(&self, id: i64) -> Result<Document, ApiError> {
        let phone = self
            .state
            .store
            .find_phone_number(id)
            .await?
            .ok_or_else(|| not_found(TYPE_NAME, id))?;

        Ok(Document::linkage(PhoneNumberResource::contact_linkage(&phone))
            .with_link("self", self.state.links.relationship(TYPE_NAME, id, "contact"))
            .with_link("related", self.state.links.related(TYPE_NAME, id, "contact")))
    }

    /// `PATCH /phone_numbers/:id/relationships/contact`
    pub async fn replace_contact(&self, ctx: &RequestContext, id: i64, body: &[u8]) -> Result<(), ApiError> {
        if self.state.store.find_phone_number(id).await?.is_none() {
            return Err(not_found(TYPE_NAME, id));
        }
        let data = parse_linkage_body(body)?;
        let contact_id = PhoneNumberResource::contact_from_linkage(&data, "")?;
        self.require_contact(contact_id).await?;

        let changes = PhoneNumberChanges { contact_id: Some(contact_id), ..Default::default() };
        self.state
            .store
            .update_phone_number(id, changes)
            .await?
            .ok_or_else(|| not_found(TYPE_NAME, id))?;
        info!("{} moved phone number {} to contact {}", ctx.actor.name, id, contact_id);
        Ok(())
    }

    async fn require_contact(&self, contact_id: i64) -> Result<(), ApiError> {
        if self.state.store.find_contact(contact_id).await?.is_none() {
            warn!("Phone number write names missing contact {}", contact_id);
            return Err(not_found(contact::TYPE_NAME, contact_id));
        }
        Ok(())
    }
}
