use axum::{extract::State, http::StatusCode};
use serde_json::{json, Value};

use crate::api::JSONAPI_VERSION;
use crate::middleware::{JsonApiResponse, JsonApiResult};
use crate::resources::{describe, RESOURCES};
use crate::state::AppState;

/// GET / - service info
pub async fn index(State(state): State<AppState>) -> JsonApiResult<Value> {
    let mut links = serde_json::Map::new();
    let mut resources = serde_json::Map::new();
    for def in RESOURCES {
        links.insert(def.type_name.to_string(), Value::String(state.links.collection(def.type_name)));
        resources.insert(def.type_name.to_string(), describe(def));
    }

    Ok(JsonApiResponse::success(json!({
        "meta": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "store": state.store.backend(),
            "resources": resources,
        },
        "links": links,
        "jsonapi": { "version": JSONAPI_VERSION },
    })))
}

/// GET /health - 200 when the store answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> JsonApiResult<Value> {
    let backend = state.store.backend();
    match state.store.health_check().await {
        Ok(()) => Ok(JsonApiResponse::success(json!({
            "meta": { "status": "ok", "store": backend },
            "jsonapi": { "version": JSONAPI_VERSION },
        }))),
        Err(e) => {
            tracing::error!("Health check failed for {} store: {}", backend, e);
            Ok(JsonApiResponse::success(json!({
                "meta": { "status": "unavailable", "store": backend },
                "jsonapi": { "version": JSONAPI_VERSION },
            }))
            .with_status(StatusCode::SERVICE_UNAVAILABLE))
        }
    }
}
