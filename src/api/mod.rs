//! JSON:API wire format: query parameters, input documents, and response documents.

pub mod document;
pub mod links;
pub mod query;

pub use document::{
    Document, InputDocument, InputResource, Linkage, PrimaryData, RelationshipObject,
    ResourceIdentifier, ResourceObject,
};
pub use links::LinkBuilder;
pub use query::{Pagination, QueryParams};

/// Media type for every request and response document
pub const JSONAPI_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Version advertised in the top-level `jsonapi` member
pub const JSONAPI_VERSION: &str = "1.0";
