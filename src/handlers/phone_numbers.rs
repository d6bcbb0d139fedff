use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Extension, Path, Query, State},
};

use super::contacts::primary_self_link;
use super::resource_id;
use crate::api::QueryParams;
use crate::auth::RequestContext;
use crate::middleware::{JsonApiResponse, JsonApiResult};
use crate::resources::contact;
use crate::resources::phone_number::{DEFINITION, TYPE_NAME};
use crate::services::PhoneNumberService;
use crate::state::AppState;

/// GET /phone_numbers
pub async fn list(
    State(state): State<AppState>,
    Query(raw): Query<HashMap<String, String>>,
) -> JsonApiResult {
    let params = QueryParams::for_collection(&raw, &DEFINITION, &state.config.api)?;
    let doc = PhoneNumberService::new(&state).list(&params).await?;
    Ok(JsonApiResponse::success(doc))
}

/// POST /phone_numbers
pub async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    body: Bytes,
) -> JsonApiResult {
    let doc = PhoneNumberService::new(&state).create(&ctx, &body).await?;
    let location = primary_self_link(&doc);
    Ok(JsonApiResponse::created(doc, location))
}

/// GET /phone_numbers/:id
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(raw): Query<HashMap<String, String>>,
) -> JsonApiResult {
    let id = resource_id(&id, TYPE_NAME)?;
    let params = QueryParams::for_resource(&raw, &DEFINITION)?;
    let doc = PhoneNumberService::new(&state).show(id, &params).await?;
    Ok(JsonApiResponse::success(doc))
}

/// PATCH /phone_numbers/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> JsonApiResult {
    let id = resource_id(&id, TYPE_NAME)?;
    let doc = PhoneNumberService::new(&state).update(&ctx, id, &body).await?;
    Ok(JsonApiResponse::success(doc))
}

/// DELETE /phone_numbers/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> JsonApiResult {
    let id = resource_id(&id, TYPE_NAME)?;
    PhoneNumberService::new(&state).delete(&ctx, id).await?;
    Ok(JsonApiResponse::no_content())
}

/// GET /phone_numbers/:id/contact
pub async fn contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(raw): Query<HashMap<String, String>>,
) -> JsonApiResult {
    let id = resource_id(&id, TYPE_NAME)?;
    let params = QueryParams::for_resource(&raw, &contact::DEFINITION)?;
    let doc = PhoneNumberService::new(&state).contact(id, &params).await?;
    Ok(JsonApiResponse::success(doc))
}

/// GET /phone_numbers/:id/relationships/contact
pub async fn contact_relationship(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> JsonApiResult {
    let id = resource_id(&id, TYPE_NAME)?;
    let doc = PhoneNumberService::new(&state).contact_relationship(id).await?;
    Ok(JsonApiResponse::success(doc))
}

/// PATCH /phone_numbers/:id/relationships/contact
pub async fn replace_contact(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> JsonApiResult {
    let id = resource_id(&id, TYPE_NAME)?;
    PhoneNumberService::new(&state).replace_contact(&ctx, id, &body).await?;
    Ok(JsonApiResponse::no_content())
}
