//! # Recognition Session
//!
//! Wraps one loaded model into a stateful, single-use streaming recognizer.
//! The orchestrator feeds it successive PCM chunks; the session emits a
//! settled [`TranscriptFragment`] whenever the engine judges an utterance
//! boundary was reached, and one final fragment at finalization.
//!
//! ## Single-use contract:
//! `finalize` takes the session by value. Feeding after finalization is a
//! compile error, not a runtime condition to check for.
//!
//! ## Empty fragments:
//! Fragments that are empty or whitespace-only are suppressed, never
//! emitted. Silence between utterances must not inject separators into the
//! aggregated transcript.

use std::sync::Arc;

use crate::error::TranscriptionError;
use crate::transcription::model::{Recognizer, SpeechModel};

/// One unit of settled recognized text, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptFragment {
    pub text: String,
}

impl TranscriptFragment {
    /// Wrap engine output, suppressing empty/whitespace-only text.
    fn settle(text: String) -> Option<Self> {
        if text.trim().is_empty() {
            None
        } else {
            Some(TranscriptFragment { text })
        }
    }
}

pub struct RecognitionSession {
    recognizer: Box<dyn Recognizer>,
}

impl RecognitionSession {
    /// Open a session bound to `model` at a fixed sample rate.
    pub fn open(
        model: &Arc<dyn SpeechModel>,
        sample_rate: u32,
    ) -> Result<Self, TranscriptionError> {
        let recognizer = model.new_recognizer(sample_rate)?;
        Ok(Self { recognizer })
    }

    /// Feed one PCM chunk. Returns a fragment when this chunk crossed an
    /// utterance boundary and the settled text was non-empty.
    pub fn feed(&mut self, chunk: &[i16]) -> Result<Option<TranscriptFragment>, TranscriptionError> {
        match self.recognizer.accept_pcm(chunk)? {
            Some(text) => Ok(TranscriptFragment::settle(text)),
            None => Ok(None),
        }
    }

    /// Flush buffered audio into one final fragment (possibly suppressed).
    /// Consumes the session; it cannot be fed afterwards.
    pub fn finalize(mut self) -> Result<Option<TranscriptFragment>, TranscriptionError> {
        match self.recognizer.flush()? {
            Some(text) => Ok(TranscriptFragment::settle(text)),
            None => Ok(None),
        }
    }
}
