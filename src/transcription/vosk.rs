//! # Vosk Engine Backend
//!
//! Implements the engine seam on top of libvosk's Kaldi recognizer.
//! Compiled in only with the `vosk` cargo feature; the rest of the
//! pipeline never names these types directly.

use std::sync::Arc;

use vosk::{CompleteResult, DecodingState};

use crate::error::TranscriptionError;
use crate::transcription::model::{ModelDescriptor, Recognizer, SpeechEngine, SpeechModel};

pub struct VoskEngine;

impl VoskEngine {
    pub fn new() -> Self {
        VoskEngine
    }
}

impl SpeechEngine for VoskEngine {
    fn name(&self) -> &'static str {
        "vosk"
    }

    fn load_model(
        &self,
        descriptor: &ModelDescriptor,
    ) -> Result<Arc<dyn SpeechModel>, TranscriptionError> {
        tracing::info!(
            "Loading vosk model for {} from {}",
            descriptor.language,
            descriptor.path.display()
        );
        let model = vosk::Model::new(descriptor.path.to_string_lossy()).ok_or_else(|| {
            TranscriptionError::ModelNotFound(format!(
                "vosk could not load the model at {}",
                descriptor.path.display()
            ))
        })?;
        Ok(Arc::new(VoskModel { inner: model }))
    }
}

struct VoskModel {
    inner: vosk::Model,
}

impl SpeechModel for VoskModel {
    fn new_recognizer(&self, sample_rate: u32) -> Result<Box<dyn Recognizer>, TranscriptionError> {
        let recognizer = vosk::Recognizer::new(&self.inner, sample_rate as f32).ok_or_else(|| {
            TranscriptionError::Recognition("failed to create vosk recognizer".to_string())
        })?;
        Ok(Box::new(VoskRecognizer { inner: recognizer }))
    }
}

struct VoskRecognizer {
    inner: vosk::Recognizer,
}

fn settled_text(result: CompleteResult) -> String {
    match result {
        CompleteResult::Single(single) => single.text.to_string(),
        CompleteResult::Multiple(multiple) => multiple
            .alternatives
            .first()
            .map(|alt| alt.text.to_string())
            .unwrap_or_default(),
    }
}

impl Recognizer for VoskRecognizer {
    fn accept_pcm(&mut self, pcm: &[i16]) -> Result<Option<String>, TranscriptionError> {
        let state = self
            .inner
            .accept_waveform(pcm)
            .map_err(|e| TranscriptionError::Recognition(format!("accept_waveform: {:?}", e)))?;
        match state {
            DecodingState::Finalized => Ok(Some(settled_text(self.inner.result()))),
            DecodingState::Running => Ok(None),
            DecodingState::Failed => Err(TranscriptionError::Recognition(
                "vosk decoder entered a failed state".to_string(),
            )),
        }
    }

    fn flush(&mut self) -> Result<Option<String>, TranscriptionError> {
        Ok(Some(settled_text(self.inner.final_result())))
    }
}
