// src/error.rs
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Body, Response, StatusCode};
use serde_json::json;

/// Request-level failures surfaced by the API.
///
/// Probe failures are not errors here; they travel inside a
/// `NormalizedStatus`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    #[error("Not found")]
    RouteNotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ServiceNotFound(_) | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            ApiError::ServiceNotFound(_) => "Service not found",
            ApiError::RouteNotFound => "Not found",
            ApiError::MethodNotAllowed => "Method not allowed",
        }
    }
}

impl From<ApiError> for Response<Body> {
    fn from(err: ApiError) -> Self {
        let body = json!({ "error": err.public_message() }).to_string();
        let mut response = Response::new(Body::from(body));
        *response.status_mut() = err.status_code();
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }
}
