use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers;
use crate::middleware::request_context_middleware;
use crate::state::AppState;

/// Full application router over `state`
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(handlers::root::index))
        .route("/health", get(handlers::root::health))
        // Resources (actor resolved per request)
        .merge(resource_routes(state.clone()))
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes))
        .layer(TraceLayer::new_for_http());

    let router = match cors_layer(&state.config.security) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.with_state(state)
}

fn resource_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(contact_routes())
        .merge(phone_number_routes())
        .route_layer(middleware::from_fn_with_state(state, request_context_middleware))
}

fn contact_routes() -> Router<AppState> {
    use handlers::contacts;

    Router::new()
        .route("/contacts", get(contacts::list).post(contacts::create))
        .route(
            "/contacts/:id",
            get(contacts::show).patch(contacts::update).delete(contacts::delete),
        )
        .route("/contacts/:id/phone_numbers", get(contacts::phone_numbers))
        .route(
            "/contacts/:id/relationships/phone_numbers",
            get(contacts::phone_numbers_relationship),
        )
}

fn phone_number_routes() -> Router<AppState> {
    use handlers::phone_numbers;

    Router::new()
        .route("/phone_numbers", get(phone_numbers::list).post(phone_numbers::create))
        .route(
            "/phone_numbers/:id",
            get(phone_numbers::show)
                .patch(phone_numbers::update)
                .delete(phone_numbers::delete),
        )
        .route("/phone_numbers/:id/contact", get(phone_numbers::contact))
        .route(
            "/phone_numbers/:id/relationships/contact",
            get(phone_numbers::contact_relationship).patch(phone_numbers::replace_contact),
        )
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }
    if security.cors_origins.iter().any(|o| o == "*") {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}
