// Text extraction: PDF résumés and job-posting web pages.
// Both extractors report failure as an `ExtractionFailure` value, never a panic,
// so the HTTP layer can choose the user-facing status.

pub mod pdf;
pub mod web;

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Normalized, non-blank text produced by an extractor (or returned by the LLM).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExtractedText(String);

impl ExtractedText {
    /// Returns `None` for empty or whitespace-only input.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why an extractor produced no usable text.
#[derive(Debug, Error)]
pub enum ExtractionFailure {
    #[error("document could not be parsed: {0}")]
    Unparseable(String),

    #[error("no extractable text")]
    NoText,

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("unsupported URL: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Fetch(String),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("response exceeds {limit} bytes")]
    TooLarge { limit: usize },
}
