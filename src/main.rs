//! # VoiceScribe Backend - Main Application Entry Point
//!
//! An offline speech-to-text HTTP service: audio uploads are normalized to
//! canonical PCM, streamed through a per-language recognition model, and
//! returned as formatted transcript text.
//!
//! ## Application Architecture:
//! - **config**: layered configuration (defaults, config.toml, environment)
//! - **error**: pipeline and transport error types
//! - **state**: shared state and request metrics
//! - **audio**: decoding, resampling, and canonical PCM artifacts
//! - **transcription**: models, registry, sessions, and the orchestrator
//! - **health**: readiness and metrics endpoints
//! - **middleware**: per-request metrics collection
//! - **handlers**: the transcription and language-listing endpoints

mod audio;
mod config;
mod error;
mod handlers;
mod health;
mod middleware;
mod state;
mod transcription;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Result;
use config::AppConfig;
use state::AppState;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transcription::{EngineCapability, LanguageCode, TranscriptionPipeline};

/// Global shutdown flag, set by the signal handler task.
static SHUTDOWN_SIGNAL: AtomicBool = AtomicBool::new(false);

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    init_tracing()?;

    let config = AppConfig::load()?;
    config.validate()?;

    info!("Starting voicescribe-backend v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded: {}:{}",
        config.server.host, config.server.port
    );

    // Validation already guaranteed the code parses
    let default_language = LanguageCode::parse(&config.models.default_language)
        .ok_or_else(|| anyhow::anyhow!("default language failed validation"))?;

    let capability = EngineCapability::probe();
    let pipeline = TranscriptionPipeline::new(
        capability,
        &config.model_dir(),
        default_language,
        config.limits.chunk_frames,
    );

    let health = pipeline.health();
    info!(
        engine_available = health.engine_available,
        ready = health.ready,
        "Recognition capability probed"
    );

    let max_upload_bytes = config.limits.max_upload_bytes;
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let app_state = AppState::new(config, pipeline);

    setup_signal_handlers();

    info!("Starting HTTP server on {}", bind_addr);

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(
                actix_multipart::form::MultipartFormConfig::default()
                    .total_limit(max_upload_bytes)
                    .memory_limit(2 * 1024 * 1024),
            )
            .wrap(cors)
            .wrap(TracingLogger::default())
            .wrap(middleware::RequestMetrics)
            .service(
                web::scope("/api/v1")
                    .route("/health", web::get().to(health::health_check))
                    .route("/metrics", web::get().to(health::detailed_metrics))
                    .route("/languages", web::get().to(handlers::list_languages))
                    .route("/transcribe", web::post().to(handlers::transcribe_audio)),
            )
            // Health check at root level for load balancers
            .route("/health", web::get().to(health::health_check))
    })
    .bind(&bind_addr)?
    .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    tokio::select! {
        result = server_task => {
            match result {
                Ok(server_result) => {
                    if let Err(e) = server_result {
                        error!("Server error: {}", e);
                    }
                }
                Err(e) => {
                    error!("Server task error: {}", e);
                }
            }
        }
        _ = wait_for_shutdown() => {
            info!("Shutdown signal received, stopping server...");
            server_handle.stop(true).await;
        }
    }

    info!("Server stopped gracefully");
    Ok(())
}

/// Set up structured logging, honoring `RUST_LOG` when present.
fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voicescribe_backend=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}

/// Listen for SIGTERM/SIGINT and flip the shutdown flag.
fn setup_signal_handlers() {
    tokio::spawn(async {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler");
        let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
            .expect("Failed to install SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
            }
        }

        SHUTDOWN_SIGNAL.store(true, Ordering::SeqCst);
    });
}

/// Poll the shutdown flag without blocking the runtime.
async fn wait_for_shutdown() {
    while !SHUTDOWN_SIGNAL.load(Ordering::SeqCst) {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }
}
