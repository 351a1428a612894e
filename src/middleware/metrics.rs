//! # Request Metrics Middleware
//!
//! Counts every request, times it, records the outcome against a
//! normalized endpoint key in [`AppState`], and emits one structured log
//! line per completed request.

use crate::state::AppState;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    time::Instant,
};

/// Metrics key for a request. Trailing slashes are stripped so
/// `GET /api/v1/health/` and `GET /api/v1/health` count as one endpoint
/// instead of splitting the counters.
fn endpoint_key(method: &str, path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    let path = if trimmed.is_empty() { "/" } else { trimmed };
    format!("{} {}", method, path)
}

pub struct RequestMetrics;

impl<S, B> Transform<S, ServiceRequest> for RequestMetrics
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestMetricsService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestMetricsService { service }))
    }
}

pub struct RequestMetricsService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestMetricsService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let started = Instant::now();
        let endpoint = endpoint_key(req.method().as_str(), req.uri().path());

        if let Some(app_state) = req.app_data::<web::Data<AppState>>() {
            app_state.increment_request_count();
        }

        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;
            let duration_ms = started.elapsed().as_millis() as u64;

            let response = match result {
                Ok(response) => response,
                // Extractor/handler errors never reach here with a state
                // handle, so only the total error counter would apply; the
                // error is returned as-is and actix renders it.
                Err(err) => return Err(err),
            };

            let is_error =
                response.status().is_client_error() || response.status().is_server_error();

            tracing::debug!(
                endpoint = %endpoint,
                status = %response.status().as_u16(),
                duration_ms,
                "Request completed"
            );

            if let Some(app_state) = response.request().app_data::<web::Data<AppState>>() {
                app_state.record_endpoint_request(&endpoint, duration_ms, is_error);
                if is_error {
                    app_state.increment_error_count();
                }
            }

            Ok(response)
        })
    }
}
