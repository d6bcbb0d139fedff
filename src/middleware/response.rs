use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::api::{Document, JSONAPI_MEDIA_TYPE};
use crate::error::ApiError;

/// Response carrying a JSON:API document with the JSON:API media type
#[derive(Debug)]
pub struct JsonApiResponse<T: Serialize = Document> {
    pub body: Option<T>,
    pub status_code: StatusCode,
    pub location: Option<String>,
}

impl<T: Serialize> JsonApiResponse<T> {
    /// 200 OK
    pub fn success(body: T) -> Self {
        Self { body: Some(body), status_code: StatusCode::OK, location: None }
    }

    /// 201 Created, pointing `Location` at the new resource
    pub fn created(body: T, location: impl Into<String>) -> Self {
        Self {
            body: Some(body),
            status_code: StatusCode::CREATED,
            location: Some(location.into()),
        }
    }

    /// 204 No Content
    pub fn no_content() -> Self {
        Self { body: None, status_code: StatusCode::NO_CONTENT, location: None }
    }

    pub fn with_status(mut self, status_code: StatusCode) -> Self {
        self.status_code = status_code;
        self
    }
}

impl<T: Serialize> IntoResponse for JsonApiResponse<T> {
    fn into_response(self) -> Response {
        let body = match self.body {
            Some(body) => body,
            None => return self.status_code.into_response(),
        };

        let bytes = match serde_json::to_vec(&body) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("Failed to serialize response document: {}", e);
                return ApiError::internal_server_error("Failed to serialize response document").into_response();
            }
        };

        let mut response = (self.status_code, bytes).into_response();
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JSONAPI_MEDIA_TYPE));
        if let Some(location) = self.location {
            match HeaderValue::from_str(&location) {
                Ok(value) => {
                    headers.insert(header::LOCATION, value);
                }
                Err(e) => tracing::warn!("Dropping invalid Location '{}': {}", location, e),
            }
        }
        response
    }
}

pub type JsonApiResult<T = Document> = Result<JsonApiResponse<T>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn created_sets_location_and_media_type() {
        let response = JsonApiResponse::created(json!({ "data": null }), "/contacts/1").into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::LOCATION], "/contacts/1");
        assert_eq!(response.headers()[header::CONTENT_TYPE], JSONAPI_MEDIA_TYPE);
    }

    #[test]
    fn no_content_has_no_body_headers() {
        let response = JsonApiResponse::<Document>::no_content().into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    }
}
