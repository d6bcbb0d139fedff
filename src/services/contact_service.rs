use tracing::info;

use super::{authorize, not_found, parse_create, parse_update, render_contacts, render_phone_numbers};
use crate::api::{Document, QueryParams};
use crate::auth::RequestContext;
use crate::error::ApiError;
use crate::filter::{FieldValue, FilterWhereInfo};
use crate::resources::contact::TYPE_NAME;
use crate::resources::ContactResource;
use crate::state::AppState;

pub struct ContactService<'a> {
    state: &'a AppState,
}

impl<'a> ContactService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub async fn list(&self, params: &QueryParams) -> Result<Document, ApiError> {
        let page = self.state.store.list_contacts(params.to_filter_data()).await?;
        let rendered = render_contacts(self.state, &page.records, params).await?;

        Ok(Document::collection(rendered.primary)
            .with_included(rendered.included)
            .with_links(params.page_links(&self.state.links.collection(TYPE_NAME), page.total))
            .with_meta("record_count", page.total.into()))
    }

    pub async fn show(&self, id: i64, params: &QueryParams) -> Result<Document, ApiError> {
        let contact = self.state.store.find_contact(id).await?.ok_or_else(|| not_found(TYPE_NAME, id))?;
        let mut rendered = render_contacts(self.state, std::slice::from_ref(&contact), params).await?;
        let primary = rendered.primary.remove(0);

        Ok(Document::single(primary)
            .with_included(rendered.included)
            .with_link("self", self.state.links.resource(TYPE_NAME, id)))
    }

    pub async fn create(&self, ctx: &RequestContext, body: &[u8]) -> Result<Document, ApiError> {
        let doc = parse_create(body, TYPE_NAME)?;
        let candidate = ContactResource::new_from_input(doc.data)?;
        authorize(self.state.policies.contacts.as_ref(), &candidate, &ctx.actor, TYPE_NAME)?;

        let contact = self.state.store.create_contact(candidate).await?;
        info!("{} created contact {}", ctx.actor.name, contact.id);

        let object = ContactResource::to_object(&contact, &[], None, &self.state.links);
        Ok(Document::single(object).with_link("self", self.state.links.resource(TYPE_NAME, contact.id)))
    }

    pub async fn update(&self, ctx: &RequestContext, id: i64, body: &[u8]) -> Result<Document, ApiError> {
        if self.state.store.find_contact(id).await?.is_none() {
            return Err(not_found(TYPE_NAME, id));
        }
        let doc = parse_update(body, TYPE_NAME, id)?;
        let changes = ContactResource::changes_from_input(doc.data)?;

        let contact = self
            .state
            .store
            .update_contact(id, changes)
            .await?
            .ok_or_else(|| not_found(TYPE_NAME, id))?;
        info!("{} updated contact {}", ctx.actor.name, id);

        let mut rendered = render_contacts(self.state, std::slice::from_ref(&contact), &QueryParams::default())
            .await?;
        Ok(Document::single(rendered.primary.remove(0))
            .with_link("self", self.state.links.resource(TYPE_NAME, id)))
    }

    pub async fn delete(&self, ctx: &RequestContext, id: i64) -> Result<(), ApiError> {
        if !self.state.store.delete_contact(id).await? {
            return Err(not_found(TYPE_NAME, id));
        }
        info!("{} deleted contact {} and its phone numbers", ctx.actor.name, id);
        Ok(())
    }

    /// `GET /contacts/:id/phone_numbers`
    pub async fn phone_numbers(&self, id: i64, params: &QueryParams) -> Result<Document, ApiError> {
        if self.state.store.find_contact(id).await?.is_none() {
            return Err(not_found(TYPE_NAME, id));
        }

        let mut query = params.to_filter_data();
        query.where_clause.push(FilterWhereInfo::equals_any("contact_id", vec![FieldValue::Int(id)]));
        let page = self.state.store.list_phone_numbers(query).await?;
        let rendered = render_phone_numbers(self.state, &page.records, params).await?;

        Ok(Document::collection(rendered.primary)
            .with_included(rendered.included)
            .with_links(params.page_links(&self.state.links.related(TYPE_NAME, id, "phone_numbers"), page.total))
            .with_meta("record_count", page.total.into()))
    }

    /// `GET /contacts/:id/relationships/phone_numbers`
    pub async fn phone_numbers_relationship(&self, id: i64) -> Result<Document, ApiError> {
        if self.state.store.find_contact(id).await?.is_none() {
            return Err(not_found(TYPE_NAME, id));
        }
        let phones = self.state.store.phone_numbers_for_contacts(&[id]).await?;
        let ids: Vec<i64> = phones.iter().map(|p| p.id).collect();

        Ok(Document::linkage(ContactResource::phone_numbers_linkage(&ids))
            .with_link("self", self.state.links.relationship(TYPE_NAME, id, "phone_numbers"))
            .with_link("related", self.state.links.related(TYPE_NAME, id, "phone_numbers")))
    }
}
