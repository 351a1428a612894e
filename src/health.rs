//! # Health and Metrics Endpoints
//!
//! `health_check` reports whether the service can actually transcribe right
//! now: the engine must be present, the audio decoder linked, and at least
//! one language model on disk. A running process with no usable model
//! answers `"limited"`, not `"healthy"`, so orchestrators can tell the
//! difference between "up" and "useful".

use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde_json::json;

pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let metrics = state.get_metrics_snapshot();
    let health = state.pipeline.health();
    let uptime_seconds = state.get_uptime_seconds();

    let status = if health.ready { "healthy" } else { "limited" };

    HttpResponse::Ok().json(json!({
        "status": status,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds,
        "service": {
            "name": "voicescribe-backend",
            "version": env!("CARGO_PKG_VERSION"),
            "host": state.config.server.host,
            "port": state.config.server.port
        },
        "recognition": {
            "engine": state.pipeline.engine_name(),
            "engine_available": health.engine_available,
            "decoder_available": health.decoder_available,
            "models_available": health.models_available,
            "default_language": state.pipeline.default_language(),
            "ready": health.ready
        },
        "metrics": {
            "total_requests": metrics.request_count,
            "total_errors": metrics.error_count,
            "error_rate": if metrics.request_count > 0 {
                metrics.error_count as f64 / metrics.request_count as f64
            } else {
                0.0
            },
            "active_transcriptions": metrics.active_transcriptions
        }
    }))
}

pub async fn detailed_metrics(state: web::Data<AppState>) -> HttpResponse {
    let metrics = state.get_metrics_snapshot();
    let uptime_seconds = state.get_uptime_seconds();

    let mut endpoint_stats = Vec::new();
    for (endpoint, metric) in metrics.endpoint_metrics.iter() {
        endpoint_stats.push(json!({
            "endpoint": endpoint,
            "request_count": metric.request_count,
            "error_count": metric.error_count,
            "error_rate": metric.error_rate(),
            "average_duration_ms": metric.average_duration_ms(),
            "total_duration_ms": metric.total_duration_ms
        }));
    }

    HttpResponse::Ok().json(json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds,
        "overall": {
            "total_requests": metrics.request_count,
            "total_errors": metrics.error_count,
            "error_rate": if metrics.request_count > 0 {
                metrics.error_count as f64 / metrics.request_count as f64
            } else {
                0.0
            },
            "active_transcriptions": metrics.active_transcriptions,
            "requests_per_second": if uptime_seconds > 0 {
                metrics.request_count as f64 / uptime_seconds as f64
            } else {
                0.0
            }
        },
        "endpoints": endpoint_stats
    }))
}
