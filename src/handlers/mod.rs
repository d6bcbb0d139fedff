// handlers/mod.rs - HTTP endpoints
//
// Public (no actor) → root info and health
// Resource (actor resolved by middleware) → /contacts, /phone_numbers
pub mod contacts;
pub mod phone_numbers;
pub mod root;

use crate::api::document::parse_id;
use crate::error::ApiError;

/// Path ids that are not store ids cannot name a resource
fn resource_id(raw: &str, type_name: &str) -> Result<i64, ApiError> {
    parse_id(raw).ok_or_else(|| ApiError::not_found(format!("{} {} does not exist", type_name, raw)))
}
