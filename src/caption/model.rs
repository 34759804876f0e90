use serde::{Deserialize, Serialize};

use crate::foundation::error::{CaptionError, CaptionResult};

/// Opaque caption identifier, unique and stable across edits.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaptionId(pub String);

impl CaptionId {
    /// Wrap an identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CaptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One timed text segment. Times are seconds on the source video's timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    /// Stable identifier.
    pub id: CaptionId,
    /// Caption text as written.
    pub text: String,
    /// Start time in seconds (inclusive).
    pub start: f64,
    /// End time in seconds (inclusive).
    pub end: f64,
}

impl Caption {
    /// Build a caption.
    pub fn new(id: impl Into<String>, text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            id: CaptionId::new(id),
            text: text.into(),
            start,
            end,
        }
    }

    /// `start <= t <= end`. NaN never matches.
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t <= self.end
    }

    /// Length in seconds (zero for inverted bounds).
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Whitespace-delimited, non-empty words.
    pub fn words(&self) -> Vec<&str> {
        self.text.split_whitespace().collect()
    }

    /// Check the bounds a well-formed caption has. The render path tolerates violations.
    pub fn validate(&self) -> CaptionResult<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(CaptionError::validation(format!(
                "caption '{}' has non-finite bounds",
                self.id
            )));
        }
        if self.start < 0.0 {
            return Err(CaptionError::validation(format!(
                "caption '{}' starts before 0",
                self.id
            )));
        }
        if self.end < self.start {
            return Err(CaptionError::validation(format!(
                "caption '{}' ends before it starts",
                self.id
            )));
        }
        Ok(())
    }
}
