//! # Speech Transcription Module
//!
//! Everything between canonical PCM and formatted transcript text:
//!
//! - **language**: the enumerated language codes and the `auto` sentinel
//! - **model**: model locations on disk and the engine seam (engine,
//!   loaded model, streaming recognizer)
//! - **registry**: lazy, single-flight model loading with a process-wide
//!   cache
//! - **session**: one single-use streaming recognition pass over a chunk
//!   stream
//! - **pipeline**: the orchestrator tying normalization, registry, session
//!   and post-processing into one transcription, and the health report
//! - **postprocess**: sentence capitalization and trailing punctuation
//!
//! The `vosk` feature gates the concrete engine; without it the pipeline
//! runs degraded and every transcription reports the engine as unavailable.

pub mod language;
pub mod model;
pub mod pipeline;
pub mod postprocess;
pub mod registry;
pub mod session;

#[cfg(feature = "vosk")]
pub mod vosk;

#[cfg(test)]
pub mod testing;

pub use language::{LanguageCode, RequestedLanguage};
pub use model::{model_catalog, EngineCapability, ModelDescriptor, SpeechEngine, SpeechModel};
pub use pipeline::{HealthReport, TranscriptionPipeline, TranscriptionResult};
pub use registry::ModelRegistry;
