// src/server/handler.rs
use crate::error::ApiError;
use crate::health::HealthChecker;
use crate::metrics::MetricsCollector;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Body, Method, Request, Response, StatusCode};
use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;
use tower::Service;
use tracing::Instrument;
use uuid::Uuid;

const SERVICES_PATH: &str = "/api/services";
const HEALTH_PREFIX: &str = "/api/health/";

/// Routes the dashboard API. Every request gets a JSON response.
#[derive(Clone)]
pub struct RequestHandler {
    checker: Arc<HealthChecker>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl RequestHandler {
    pub fn new(checker: Arc<HealthChecker>, metrics: Option<Arc<MetricsCollector>>) -> Self {
        Self { checker, metrics }
    }

    pub async fn handle(&self, req: Request<Body>) -> Response<Body> {
        let start = Instant::now();
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        drop(req);

        let (route, response) = self.route(&method, &path).await;

        tracing::info!(
            route,
            status = response.status().as_u16(),
            elapsed = ?start.elapsed(),
            "request served"
        );
        if let Some(metrics) = &self.metrics {
            metrics.record_request(route, response.status().as_u16(), start.elapsed());
        }

        response
    }

    async fn route(&self, method: &Method, path: &str) -> (&'static str, Response<Body>) {
        if path == SERVICES_PATH {
            if *method != Method::GET {
                return ("services", ApiError::MethodNotAllowed.into());
            }
            let catalog = self.checker.registry().catalog();
            return ("services", json_response(StatusCode::OK, &catalog));
        }

        if let Some(key) = path.strip_prefix(HEALTH_PREFIX) {
            if *method != Method::GET {
                return ("health", ApiError::MethodNotAllowed.into());
            }
            if key.is_empty() || key.contains('/') {
                return ("health", ApiError::RouteNotFound.into());
            }
            let key = match percent_decode_str(key).decode_utf8() {
                Ok(key) => key,
                Err(_) => return ("health", ApiError::ServiceNotFound(key.to_string()).into()),
            };
            let response = match self.checker.check(&key).await {
                Ok(status) => json_response(status.http_status(), &status),
                Err(err) => {
                    tracing::debug!(%err, "health lookup rejected");
                    err.into()
                }
            };
            return ("health", response);
        }

        ("other", ApiError::RouteNotFound.into())
    }
}

fn json_response<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Response<Body> {
    let (status, body) = match serde_json::to_vec(value) {
        Ok(body) => (status, body),
        Err(err) => {
            tracing::error!(%err, "failed to encode response");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                br#"{"status":"DOWN","error":"Failed to encode response"}"#.to_vec(),
            )
        }
    };

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

impl Service<Request<Body>> for RequestHandler {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let handler = self.clone();
        let span = tracing::info_span!(
            "request",
            request_id = %Uuid::new_v4(),
            method = %req.method(),
            path = %req.uri().path(),
        );
        Box::pin(async move { Ok(handler.handle(req).await) }.instrument(span))
    }
}
