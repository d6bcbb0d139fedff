pub mod context;
pub mod response;

pub use context::request_context_middleware;
pub use response::{JsonApiResponse, JsonApiResult};
