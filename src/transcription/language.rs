//! # Language Codes
//!
//! The finite set of languages the service can transcribe, plus the `auto`
//! sentinel. `auto` is not a detector: it always resolves to the configured
//! default language before any model lookup happens.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A concrete language with a dedicated speech model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    En,
    Ru,
    Kz,
}

impl LanguageCode {
    /// All enumerated languages, in stable order.
    pub const ALL: [LanguageCode; 3] = [LanguageCode::En, LanguageCode::Ru, LanguageCode::Kz];

    /// Parse a concrete language code. Returns `None` for `auto` and for
    /// anything outside the enumerated set; the caller layer rejects those.
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "en" => Some(LanguageCode::En),
            "ru" => Some(LanguageCode::Ru),
            "kz" => Some(LanguageCode::Kz),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::En => "en",
            LanguageCode::Ru => "ru",
            LanguageCode::Kz => "kz",
        }
    }

    /// Human-readable name shown in the available-languages listing.
    pub fn display_name(&self) -> &'static str {
        match self {
            LanguageCode::En => "English",
            LanguageCode::Ru => "Russian",
            LanguageCode::Kz => "Kazakh",
        }
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the caller asked for: a concrete language or the `auto` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedLanguage {
    Auto,
    Exact(LanguageCode),
}

impl RequestedLanguage {
    /// Parse a request string. `None` means the code is neither `auto` nor
    /// in the enumerated set and must be rejected by the caller.
    pub fn parse(code: &str) -> Option<Self> {
        if code == "auto" {
            Some(RequestedLanguage::Auto)
        } else {
            LanguageCode::parse(code).map(RequestedLanguage::Exact)
        }
    }

    /// Resolve to a concrete language; `auto` maps to `default`.
    pub fn resolve(&self, default: LanguageCode) -> LanguageCode {
        match self {
            RequestedLanguage::Auto => default,
            RequestedLanguage::Exact(code) => *code,
        }
    }
}
