use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Extension, Path, Query, State},
};

use super::resource_id;
use crate::api::QueryParams;
use crate::auth::RequestContext;
use crate::middleware::{JsonApiResponse, JsonApiResult};
use crate::resources::contact::{DEFINITION, TYPE_NAME};
use crate::resources::phone_number;
use crate::services::ContactService;
use crate::state::AppState;

/// GET /contacts
pub async fn list(
    State(state): State<AppState>,
    Query(raw): Query<HashMap<String, String>>,
) -> JsonApiResult {
    let params = QueryParams::for_collection(&raw, &DEFINITION, &state.config.api)?;
    let doc = ContactService::new(&state).list(&params).await?;
    Ok(JsonApiResponse::success(doc))
}

/// POST /contacts
pub async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    body: Bytes,
) -> JsonApiResult {
    let doc = ContactService::new(&state).create(&ctx, &body).await?;
    let location = primary_self_link(&doc);
    Ok(JsonApiResponse::created(doc, location))
}

/// GET /contacts/:id
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(raw): Query<HashMap<String, String>>,
) -> JsonApiResult {
    let id = resource_id(&id, TYPE_NAME)?;
    let params = QueryParams::for_resource(&raw, &DEFINITION)?;
    let doc = ContactService::new(&state).show(id, &params).await?;
    Ok(JsonApiResponse::success(doc))
}

/// PATCH /contacts/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> JsonApiResult {
    let id = resource_id(&id, TYPE_NAME)?;
    let doc = ContactService::new(&state).update(&ctx, id, &body).await?;
    Ok(JsonApiResponse::success(doc))
}

/// DELETE /contacts/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> JsonApiResult {
    let id = resource_id(&id, TYPE_NAME)?;
    ContactService::new(&state).delete(&ctx, id).await?;
    Ok(JsonApiResponse::no_content())
}

/// GET /contacts/:id/phone_numbers
pub async fn phone_numbers(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(raw): Query<HashMap<String, String>>,
) -> JsonApiResult {
    let id = resource_id(&id, TYPE_NAME)?;
    let params = QueryParams::for_collection(&raw, &phone_number::DEFINITION, &state.config.api)?;
    let doc = ContactService::new(&state).phone_numbers(id, &params).await?;
    Ok(JsonApiResponse::success(doc))
}

/// GET /contacts/:id/relationships/phone_numbers
pub async fn phone_numbers_relationship(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> JsonApiResult {
    let id = resource_id(&id, TYPE_NAME)?;
    let doc = ContactService::new(&state).phone_numbers_relationship(id).await?;
    Ok(JsonApiResponse::success(doc))
}

pub(super) fn primary_self_link(doc: &crate::api::Document) -> String {
    match &doc.data {
        crate::api::PrimaryData::Resource(Some(resource)) => resource.links.self_link.clone(),
        _ => String::new(),
    }
}
