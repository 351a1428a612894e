//! # Audio Processing Module
//!
//! Converts uploaded audio into the canonical PCM format the recognition
//! engine requires and exposes it as a chunked sample stream.
//!
//! ## Canonical Format:
//! - **Sample Rate**: 16 kHz
//! - **Bit Depth**: 16-bit PCM
//! - **Channels**: Mono (1 channel)
//!
//! ## Key Components:
//! - **Normalizer**: decodes any supported container/codec (symphonia),
//!   downmixes and resamples (rubato), and materializes the result as a
//!   temporary WAV artifact that is deleted when its owner is dropped
//! - **PCM utilities**: sample format conversions and the lazy chunk
//!   iterator the orchestrator feeds into a recognition session

pub mod normalizer;
pub mod pcm;

pub use normalizer::{normalize, AudioInput, CanonicalAudio, TARGET_SAMPLE_RATE};
pub use pcm::PcmChunks;
