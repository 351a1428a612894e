//! # HTTP Request Handlers
//!
//! The transcription upload endpoint and the language listing.

pub mod languages;
pub mod transcribe;

pub use languages::list_languages;
pub use transcribe::transcribe_audio;
