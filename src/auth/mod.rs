pub mod policy;

use axum::http::HeaderMap;

use crate::config::SecurityConfig;
use crate::error::ApiError;

pub use policy::{AllowAll, CreatePolicy, Decision, PhoneNumberPolicy, Policies};

/// The identity a request acts as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub name: String,
}

impl Actor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Per-request context handed to the service layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub actor: Actor,
}

/// Resolves the acting identity for a request
pub trait ContextProvider: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> Result<Actor, ApiError>;
}

/// Always answers with the same configured actor
#[derive(Debug, Clone)]
pub struct StaticContextProvider {
    actor: Actor,
}

impl StaticContextProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self { actor: Actor::new(name) }
    }
}

impl ContextProvider for StaticContextProvider {
    fn resolve(&self, _headers: &HeaderMap) -> Result<Actor, ApiError> {
        Ok(self.actor.clone())
    }
}

/// Reads the actor name from a request header
#[derive(Debug, Clone)]
pub struct HeaderContextProvider {
    header: String,
}

impl HeaderContextProvider {
    pub fn new(header: impl Into<String>) -> Self {
        Self { header: header.into().to_ascii_lowercase() }
    }
}

impl ContextProvider for HeaderContextProvider {
    fn resolve(&self, headers: &HeaderMap) -> Result<Actor, ApiError> {
        let value = headers
            .get(self.header.as_str())
            .ok_or_else(|| ApiError::unauthorized(format!("Missing {} header", self.header)))?;
        let name = value
            .to_str()
            .map_err(|_| ApiError::unauthorized(format!("Invalid {} header", self.header)))?
            .trim();
        if name.is_empty() {
            return Err(ApiError::unauthorized(format!("Empty {} header", self.header)));
        }
        Ok(Actor::new(name))
    }
}

/// Provider selected by configuration: header-based when `actor_header` is set
pub fn provider_from_config(security: &SecurityConfig) -> Box<dyn ContextProvider> {
    match &security.actor_header {
        Some(header) => Box::new(HeaderContextProvider::new(header.clone())),
        None => Box::new(StaticContextProvider::new(security.default_actor.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn static_provider_ignores_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-actor", HeaderValue::from_static("Mallory"));
        let actor = StaticContextProvider::new("Joe").resolve(&headers).unwrap();
        assert_eq!(actor, Actor::new("Joe"));
    }

    #[test]
    fn header_provider_reads_actor() {
        let mut headers = HeaderMap::new();
        headers.insert("x-actor", HeaderValue::from_static(" Jane "));
        let actor = HeaderContextProvider::new("X-Actor").resolve(&headers).unwrap();
        assert_eq!(actor.name, "Jane");
    }

    #[test]
    fn header_provider_requires_header() {
        let provider = HeaderContextProvider::new("x-actor");
        assert_eq!(provider.resolve(&HeaderMap::new()).unwrap_err().status_code(), 401);

        let mut headers = HeaderMap::new();
        headers.insert("x-actor", HeaderValue::from_static("  "));
        assert_eq!(provider.resolve(&headers).unwrap_err().status_code(), 401);
    }

    #[test]
    fn config_selects_provider() {
        let mut security = crate::config::AppConfig::development().security;
        let provider = provider_from_config(&security);
        assert_eq!(provider.resolve(&HeaderMap::new()).unwrap().name, "Joe");

        security.actor_header = Some("x-actor".into());
        let provider = provider_from_config(&security);
        assert!(provider.resolve(&HeaderMap::new()).is_err());
    }
}
