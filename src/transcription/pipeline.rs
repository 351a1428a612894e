//! # Transcription Orchestrator
//!
//! Drives one upload through the whole pipeline: resolve the requested
//! language, fetch the model from the registry, normalize the audio, feed
//! the chunk stream into a recognition session, aggregate the fragments,
//! and post-process the transcript.
//!
//! ## Error Surface:
//! `transcribe` never returns `Err`. Every failure inside the pipeline is
//! folded into a [`TranscriptionResult`] with `success == false` and the
//! error message filled in, so the transport layer always has one shape to
//! serialize.
//!
//! ## Ordering:
//! The model is resolved before any audio is decoded. A request for a
//! missing model fails fast without paying for decoding, and a corrupt
//! upload never triggers a model load.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use serde::Serialize;

use crate::audio::{normalize, AudioInput, TARGET_SAMPLE_RATE};
use crate::error::TranscriptionError;
use crate::transcription::language::{LanguageCode, RequestedLanguage};
use crate::transcription::model::{
    decoder_available, model_catalog, EngineCapability, ModelDescriptor,
};
use crate::transcription::postprocess::post_process;
use crate::transcription::registry::ModelRegistry;
use crate::transcription::session::RecognitionSession;

/// Confidence reported for every successful transcription.
///
/// The recognizer does not expose a calibrated utterance-level confidence,
/// so the service reports this fixed value rather than inventing one from
/// word-level scores.
pub const PLACEHOLDER_CONFIDENCE: f32 = 0.8;

/// The outcome of one transcription, successful or not.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptionResult {
    pub success: bool,
    pub text: String,
    /// The concrete language the audio was recognized against, after the
    /// `auto` sentinel was resolved.
    pub language: LanguageCode,
    pub confidence: f32,
    pub error: Option<String>,
    /// Duration of the canonical audio in seconds. Zero when the upload
    /// never decoded.
    pub audio_duration: f64,
    pub processing_time_ms: u64,
}

/// Readiness of the pipeline's building blocks, reported by health checks.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub engine_available: bool,
    pub decoder_available: bool,
    /// Per-language on-disk model presence at the time of the check.
    pub models_available: BTreeMap<LanguageCode, bool>,
    /// The service can transcribe at least one language right now.
    pub ready: bool,
}

enum EngineState {
    Ready(ModelRegistry),
    Degraded { reason: String },
}

pub struct TranscriptionPipeline {
    state: EngineState,
    catalog: BTreeMap<LanguageCode, ModelDescriptor>,
    default_language: LanguageCode,
    chunk_frames: usize,
}

impl TranscriptionPipeline {
    pub fn new(
        capability: EngineCapability,
        model_dir: &Path,
        default_language: LanguageCode,
        chunk_frames: usize,
    ) -> Self {
        let catalog = model_catalog(model_dir);
        let state = match capability {
            EngineCapability::Ready(engine) => {
                EngineState::Ready(ModelRegistry::new(engine, catalog.clone()))
            }
            EngineCapability::Degraded { reason } => {
                tracing::warn!("Running degraded: {}", reason);
                EngineState::Degraded { reason }
            }
        };
        Self {
            state,
            catalog,
            default_language,
            chunk_frames,
        }
    }

    /// Transcribe one audio upload. Infallible at the signature level; see
    /// the module docs for the error surface.
    pub fn transcribe(
        &self,
        input: AudioInput,
        requested: RequestedLanguage,
    ) -> TranscriptionResult {
        let started = Instant::now();
        let language = requested.resolve(self.default_language);

        let outcome = self.run(input, language);
        let processing_time_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok((text, audio_duration)) => {
                tracing::info!(
                    language = %language,
                    audio_duration,
                    processing_time_ms,
                    "Transcription complete"
                );
                TranscriptionResult {
                    success: true,
                    text,
                    language,
                    confidence: PLACEHOLDER_CONFIDENCE,
                    error: None,
                    audio_duration,
                    processing_time_ms,
                }
            }
            Err(err) => {
                tracing::error!(language = %language, error = %err, "Transcription failed");
                TranscriptionResult {
                    success: false,
                    text: String::new(),
                    language,
                    confidence: 0.0,
                    error: Some(err.to_string()),
                    audio_duration: 0.0,
                    processing_time_ms,
                }
            }
        }
    }

    fn run(
        &self,
        input: AudioInput,
        language: LanguageCode,
    ) -> Result<(String, f64), TranscriptionError> {
        let registry = match &self.state {
            EngineState::Ready(registry) => registry,
            EngineState::Degraded { reason } => {
                return Err(TranscriptionError::EngineUnavailable(reason.clone()));
            }
        };

        // Model first: a missing model must fail before decoding starts.
        let model = registry.resolve(language)?;

        let audio = normalize(input)?;
        let duration = audio.duration_seconds();

        let mut session = RecognitionSession::open(&model, TARGET_SAMPLE_RATE)?;
        let mut fragments: Vec<String> = Vec::new();
        for chunk in audio.chunks(self.chunk_frames)? {
            if let Some(fragment) = session.feed(&chunk?)? {
                fragments.push(fragment.text);
            }
        }
        if let Some(fragment) = session.finalize()? {
            fragments.push(fragment.text);
        }

        let raw = fragments.join(" ");
        Ok((post_process(raw.trim()), duration))
    }

    /// Languages whose models are present on disk, code → display name.
    pub fn available_languages(&self) -> BTreeMap<LanguageCode, &'static str> {
        self.catalog
            .iter()
            .filter(|(_, descriptor)| descriptor.is_available())
            .map(|(&language, descriptor)| (language, descriptor.display_name))
            .collect()
    }

    pub fn default_language(&self) -> LanguageCode {
        self.default_language
    }

    /// Engine name for reporting, `None` when running degraded.
    pub fn engine_name(&self) -> Option<&'static str> {
        match &self.state {
            EngineState::Ready(registry) => Some(registry.engine_name()),
            EngineState::Degraded { .. } => None,
        }
    }

    /// Snapshot the readiness of every pipeline building block.
    pub fn health(&self) -> HealthReport {
        let engine_available = matches!(self.state, EngineState::Ready(_));
        let decoder_available = decoder_available();
        let models_available: BTreeMap<LanguageCode, bool> = self
            .catalog
            .iter()
            .map(|(&language, descriptor)| (language, descriptor.is_available()))
            .collect();
        let any_model = models_available.values().any(|&present| present);

        HealthReport {
            engine_available,
            decoder_available,
            models_available,
            ready: engine_available && decoder_available && any_model,
        }
    }
}
