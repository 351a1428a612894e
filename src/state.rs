//! # Application State Management
//!
//! Shared state handed to every HTTP request handler: the immutable
//! configuration, the transcription pipeline, and the mutable request
//! metrics.
//!
//! ## Sharing Pattern:
//! - Configuration and pipeline are read-only after startup, so plain
//!   `Arc<T>` is enough.
//! - Metrics are updated by every request, so they live behind
//!   `Arc<RwLock<AppMetrics>>`: many concurrent readers, one writer.

use crate::config::AppConfig;
use crate::transcription::TranscriptionPipeline;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pipeline: Arc<TranscriptionPipeline>,
    pub metrics: Arc<RwLock<AppMetrics>>,
    pub start_time: Instant,
}

/// Counters collected across all HTTP requests since server start.
#[derive(Debug, Default)]
pub struct AppMetrics {
    pub request_count: u64,
    pub error_count: u64,
    /// Transcriptions currently running on the blocking pool.
    pub active_transcriptions: u32,
    /// Per-endpoint statistics, keyed by "METHOD /path".
    pub endpoint_metrics: HashMap<String, EndpointMetric>,
}

/// Per-endpoint request statistics.
#[derive(Debug, Default, Clone)]
pub struct EndpointMetric {
    pub request_count: u64,
    pub total_duration_ms: u64,
    pub error_count: u64,
}

impl AppState {
    pub fn new(config: AppConfig, pipeline: TranscriptionPipeline) -> Self {
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            metrics: Arc::new(RwLock::new(AppMetrics::default())),
            start_time: Instant::now(),
        }
    }

    pub fn increment_request_count(&self) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.request_count += 1;
    }

    pub fn increment_error_count(&self) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.error_count += 1;
    }

    /// Record one finished request against its endpoint counters.
    pub fn record_endpoint_request(&self, endpoint: &str, duration_ms: u64, is_error: bool) {
        let mut metrics = self.metrics.write().unwrap();
        let endpoint_metric = metrics
            .endpoint_metrics
            .entry(endpoint.to_string())
            .or_default();

        endpoint_metric.request_count += 1;
        endpoint_metric.total_duration_ms += duration_ms;
        if is_error {
            endpoint_metric.error_count += 1;
        }
    }

    /// Count one in-flight transcription for as long as the returned guard
    /// lives. The decrement runs in the guard's `Drop`, so the gauge comes
    /// back down even when the request future is dropped mid-await (client
    /// disconnect cancels the handler without running code after the await).
    pub fn track_transcription(&self) -> ActiveTranscription {
        self.metrics.write().unwrap().active_transcriptions += 1;
        ActiveTranscription {
            metrics: Arc::clone(&self.metrics),
        }
    }

    /// Clone the current metrics so no lock is held while serializing.
    pub fn get_metrics_snapshot(&self) -> AppMetrics {
        let metrics = self.metrics.read().unwrap();
        AppMetrics {
            request_count: metrics.request_count,
            error_count: metrics.error_count,
            active_transcriptions: metrics.active_transcriptions,
            endpoint_metrics: metrics.endpoint_metrics.clone(),
        }
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// RAII handle for one in-flight transcription; see
/// [`AppState::track_transcription`].
pub struct ActiveTranscription {
    metrics: Arc<RwLock<AppMetrics>>,
}

impl Drop for ActiveTranscription {
    fn drop(&mut self) {
        let mut metrics = self.metrics.write().unwrap();
        // Guard against underflow if the counter was ever reset externally
        if metrics.active_transcriptions > 0 {
            metrics.active_transcriptions -= 1;
        }
    }
}

impl EndpointMetric {
    pub fn average_duration_ms(&self) -> f64 {
        if self.request_count > 0 {
            self.total_duration_ms as f64 / self.request_count as f64
        } else {
            0.0
        }
    }

    /// Error rate in [0.0, 1.0].
    pub fn error_rate(&self) -> f64 {
        if self.request_count > 0 {
            self.error_count as f64 / self.request_count as f64
        } else {
            0.0
        }
    }
}
