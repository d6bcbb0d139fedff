#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use peeps_api::auth::{ContextProvider, Policies, StaticContextProvider};
use peeps_api::config::AppConfig;
use peeps_api::database::MemoryStore;
use peeps_api::{app, AppState};

pub const JSONAPI: &str = "application/vnd.api+json";

/// Router over a fresh in-memory store, driven in-process
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// `source.pointer` / `source.parameter` of every error object
    pub fn error_sources(&self) -> Vec<String> {
        self.body["errors"]
            .as_array()
            .map(|errors| {
                errors
                    .iter()
                    .filter_map(|e| {
                        e["source"]["pointer"]
                            .as_str()
                            .or_else(|| e["source"]["parameter"].as_str())
                            .map(str::to_string)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn error_code(&self) -> &str {
        self.body["errors"][0]["code"].as_str().unwrap_or_default()
    }
}

impl TestApp {
    /// Acting as the stub identity, Joe
    pub fn new() -> Self {
        Self::with_config(AppConfig::development())
    }

    pub fn as_actor(name: &str) -> Self {
        Self::with_provider(AppConfig::development(), Arc::new(StaticContextProvider::new(name)))
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), config);
        Self { router: app(state), store }
    }

    pub fn with_provider(config: AppConfig, provider: Arc<dyn ContextProvider>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), config).with_context_provider(provider);
        Self { router: app(state), store }
    }

    pub fn with_policies(policies: Policies) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), AppConfig::development()).with_policies(policies);
        Self { router: app(state), store }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|e| panic!("non-JSON body ({}): {:?}", e, bytes))
        };
        TestResponse { status, headers, body }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, JSONAPI)
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None).await
    }

    /// Create a contact and return its id
    pub async fn create_contact(&self, first: &str, last: &str) -> String {
        let res = self.post("/contacts", contact_doc(first, last)).await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
        res.body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Create a phone number for `contact_id` and return its id
    pub async fn create_phone_number(&self, contact_id: &str, name: &str, number: &str) -> String {
        let res = self.post("/phone_numbers", phone_number_doc(contact_id, name, number)).await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
        res.body["data"]["id"].as_str().unwrap().to_string()
    }
}

pub fn contact_doc(first: &str, last: &str) -> Value {
    json!({
        "data": {
            "type": "contacts",
            "attributes": { "name_first": first, "name_last": last }
        }
    })
}

pub fn phone_number_doc(contact_id: &str, name: &str, number: &str) -> Value {
    json!({
        "data": {
            "type": "phone_numbers",
            "attributes": { "name": name, "phone_number": number },
            "relationships": {
                "contact": { "data": { "type": "contacts", "id": contact_id } }
            }
        }
    })
}

/// Sorted keys of a JSON object
pub fn keys(value: &Value) -> Vec<String> {
    let mut keys: Vec<String> = value
        .as_object()
        .map(|o| o.keys().cloned().collect())
        .unwrap_or_default();
    keys.sort();
    keys
}

/// A real listener on an unused port, for clients that speak HTTP
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;
        let router = app(AppState::new(Arc::new(MemoryStore::new()), AppConfig::development()));
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self { port, base_url };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}
