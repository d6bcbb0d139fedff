use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::RequestContext;
use crate::error::ApiError;
use crate::state::AppState;

/// Resolves the acting identity and injects a `RequestContext` into the request
pub async fn request_context_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let actor = state.context.resolve(request.headers()).map_err(|e| {
        tracing::warn!("Rejected {} {}: {}", request.method(), request.uri().path(), e);
        e
    })?;

    tracing::debug!("Request acting as {}", actor.name);
    request.extensions_mut().insert(RequestContext { actor });

    Ok(next.run(request).await)
}
