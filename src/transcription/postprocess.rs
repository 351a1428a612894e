//! # Text Post-Processor
//!
//! Light formatting of the aggregated transcript: sentence-boundary
//! capitalization and trailing-period normalization. Pure and
//! deterministic, no I/O.

/// Format a raw aggregated transcript.
///
/// Splits on the literal `". "` delimiter, capitalizes the first character
/// of each segment (the rest is left untouched, never re-lowercased),
/// rejoins, and appends a trailing period when the non-empty result lacks
/// one. Empty input stays empty.
pub fn post_process(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut text = raw
        .split(". ")
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(". ");

    if !text.is_empty() && !text.ends_with('.') {
        text.push('.');
    }

    text
}

fn capitalize_first(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
