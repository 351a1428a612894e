//! Scriptable stub engine for pipeline, registry, and session tests.
//!
//! The stub "recognizes" by handing out a fixed script of fragments, one
//! per fed chunk, with the remainder settled at flush. It also counts
//! model loads so tests can assert the registry's single-flight behavior.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::TranscriptionError;
use crate::transcription::model::{ModelDescriptor, Recognizer, SpeechEngine, SpeechModel};

pub struct StubEngine {
    pub loads: AtomicUsize,
    script: Vec<String>,
    load_delay: Option<Duration>,
    fail_load: bool,
}

impl StubEngine {
    /// An engine whose recognizers never emit text (pure silence).
    pub fn silent() -> Self {
        Self::scripted(Vec::<&str>::new())
    }

    /// An engine whose recognizers emit `fragments` in order: one per fed
    /// chunk, and whatever remains (joined) at flush.
    pub fn scripted<S: Into<String>>(fragments: Vec<S>) -> Self {
        StubEngine {
            loads: AtomicUsize::new(0),
            script: fragments.into_iter().map(Into::into).collect(),
            load_delay: None,
            fail_load: false,
        }
    }

    /// Make every load take this long, to widen single-flight races.
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = Some(delay);
        self
    }

    /// Make every load fail.
    pub fn failing() -> Self {
        let mut engine = Self::silent();
        engine.fail_load = true;
        engine
    }
}

impl SpeechEngine for StubEngine {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn load_model(
        &self,
        descriptor: &ModelDescriptor,
    ) -> Result<Arc<dyn SpeechModel>, TranscriptionError> {
        if let Some(delay) = self.load_delay {
            std::thread::sleep(delay);
        }
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail_load {
            return Err(TranscriptionError::ModelNotFound(format!(
                "stub refused to load {}",
                descriptor.path.display()
            )));
        }
        Ok(Arc::new(StubModel {
            script: self.script.clone(),
        }))
    }
}

struct StubModel {
    script: Vec<String>,
}

impl SpeechModel for StubModel {
    fn new_recognizer(&self, _sample_rate: u32) -> Result<Box<dyn Recognizer>, TranscriptionError> {
        Ok(Box::new(StubRecognizer {
            pending: self.script.clone().into(),
        }))
    }
}

struct StubRecognizer {
    pending: VecDeque<String>,
}

impl Recognizer for StubRecognizer {
    fn accept_pcm(&mut self, _pcm: &[i16]) -> Result<Option<String>, TranscriptionError> {
        if self.pending.len() > 1 {
            Ok(self.pending.pop_front())
        } else {
            // Keep the last fragment for the flush
            Ok(None)
        }
    }

    fn flush(&mut self) -> Result<Option<String>, TranscriptionError> {
        if self.pending.is_empty() {
            // Mirrors a real engine settling silence to empty text
            Ok(Some(String::new()))
        } else {
            let rest: Vec<String> = self.pending.drain(..).collect();
            Ok(Some(rest.join(" ")))
        }
    }
}
