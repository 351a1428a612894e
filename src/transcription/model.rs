//! # Speech Model Management
//!
//! Defines where models live on disk, the engine seam the rest of the
//! pipeline is written against, and the startup capability probe.
//!
//! ## The Engine Seam:
//! - [`SpeechEngine`]: loads a model directory into memory. Loading is the
//!   expensive path (reads acoustic + language model files from disk).
//! - [`SpeechModel`]: an immutable loaded model, safe for concurrent
//!   recognizer creation; cached by the registry for the process lifetime.
//! - [`Recognizer`]: a mutable, single-owner streaming decoder created per
//!   transcription from one model.
//!
//! ## Capability:
//! Whether an engine exists at all is decided once at startup by
//! [`EngineCapability::probe`] and never re-checked per request. A build
//! without the `vosk` feature runs degraded: health reports the engine as
//! unavailable and every transcription short-circuits.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::TranscriptionError;
use crate::transcription::language::LanguageCode;

/// Static mapping from a language to its model location and display name.
///
/// Availability is a property of the filesystem, checked at call time, not
/// of whether the model has ever been loaded.
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    pub language: LanguageCode,
    pub path: PathBuf,
    pub display_name: &'static str,
}

impl ModelDescriptor {
    /// Model directory name for a language, matching the published small
    /// Vosk model archives.
    fn dir_name(language: LanguageCode) -> &'static str {
        match language {
            LanguageCode::En => "vosk-model-small-en-us-0.15",
            LanguageCode::Ru => "vosk-model-small-ru-0.22",
            LanguageCode::Kz => "vosk-model-small-kz-0.15",
        }
    }

    /// True iff the model directory exists on disk right now.
    pub fn is_available(&self) -> bool {
        self.path.exists()
    }
}

/// Build the descriptor set for every enumerated language under `model_dir`.
pub fn model_catalog(model_dir: &Path) -> BTreeMap<LanguageCode, ModelDescriptor> {
    LanguageCode::ALL
        .iter()
        .map(|&language| {
            (
                language,
                ModelDescriptor {
                    language,
                    path: model_dir.join(ModelDescriptor::dir_name(language)),
                    display_name: language.display_name(),
                },
            )
        })
        .collect()
}

/// A speech recognition engine capable of loading language models.
pub trait SpeechEngine: Send + Sync {
    /// Engine name for health reporting and logs.
    fn name(&self) -> &'static str;

    /// Load the model at `descriptor.path` into memory. Expensive; the
    /// registry guarantees this runs at most once per language.
    fn load_model(
        &self,
        descriptor: &ModelDescriptor,
    ) -> Result<Arc<dyn SpeechModel>, TranscriptionError>;
}

/// A loaded model: immutable, shared read-only across concurrent sessions.
pub trait SpeechModel: Send + Sync {
    /// Create a fresh streaming recognizer bound to this model.
    fn new_recognizer(&self, sample_rate: u32) -> Result<Box<dyn Recognizer>, TranscriptionError>;
}

/// A stateful streaming decoder. Single-owner, single transcription.
pub trait Recognizer: Send {
    /// Accept one chunk of 16-bit PCM. Returns settled text when the engine
    /// judges an utterance boundary was reached inside this chunk, `None`
    /// while decoding is still running.
    fn accept_pcm(&mut self, pcm: &[i16]) -> Result<Option<String>, TranscriptionError>;

    /// Flush any buffered audio into a final settled text. Called exactly
    /// once, after the last chunk.
    fn flush(&mut self) -> Result<Option<String>, TranscriptionError>;
}

/// Engine availability, determined once at startup.
pub enum EngineCapability {
    Ready(Arc<dyn SpeechEngine>),
    Degraded { reason: String },
}

impl EngineCapability {
    /// Probe for a usable engine in this build.
    #[cfg(feature = "vosk")]
    pub fn probe() -> Self {
        EngineCapability::Ready(Arc::new(crate::transcription::vosk::VoskEngine::new()))
    }

    /// Probe for a usable engine in this build.
    #[cfg(not(feature = "vosk"))]
    pub fn probe() -> Self {
        EngineCapability::Degraded {
            reason: "service was built without the vosk feature".to_string(),
        }
    }
}

/// Whether the audio decoding backend is present.
///
/// Symphonia is linked statically, so a running process always has it;
/// the flag is kept separate because the health contract reports the
/// engine and the decoder independently.
pub fn decoder_available() -> bool {
    true
}
