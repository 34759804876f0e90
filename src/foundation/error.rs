use std::time::Duration;

/// Convenience result type used across captionfx.
pub type CaptionResult<T> = Result<T, CaptionError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum CaptionError {
    /// Invalid user-provided caption, style or option data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Source video duration or dimensions never resolved.
    #[error("metadata load failure: {0}")]
    MetadataLoad(String),

    /// The offscreen drawing surface could not be created.
    #[error("surface creation failure: {0}")]
    SurfaceCreation(String),

    /// The encoder rejected its configuration or a frame write.
    #[error("encoding failure: {0}")]
    Encoding(String),

    /// A step-driven seek never produced a settled frame.
    #[error("seek to {time_secs:.3}s did not settle within {timeout:?}")]
    SeekTimeout {
        /// Requested source time in seconds.
        time_secs: f64,
        /// Timeout that elapsed.
        timeout: Duration,
    },

    /// Another preview or export already holds the session render lock.
    #[error("session is busy: another render is in progress")]
    SessionBusy,

    /// The external transcription collaborator failed.
    #[error("transcription failed: {0}")]
    Transcription(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CaptionError {
    /// Build a [`CaptionError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CaptionError::MetadataLoad`] value.
    pub fn metadata(msg: impl Into<String>) -> Self {
        Self::MetadataLoad(msg.into())
    }

    /// Build a [`CaptionError::SurfaceCreation`] value.
    pub fn surface(msg: impl Into<String>) -> Self {
        Self::SurfaceCreation(msg.into())
    }

    /// Build a [`CaptionError::Encoding`] value.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Build a [`CaptionError::SeekTimeout`] value.
    pub fn seek_timeout(time_secs: f64, timeout: Duration) -> Self {
        Self::SeekTimeout { time_secs, timeout }
    }

    /// Build a [`CaptionError::Transcription`] value.
    pub fn transcription(msg: impl Into<String>) -> Self {
        Self::Transcription(msg.into())
    }

    /// Build a [`CaptionError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether this error aborts an export attempt (no retry, driver goes to `Failed`).
    pub fn is_fatal_to_export(&self) -> bool {
        matches!(
            self,
            Self::MetadataLoad(_)
                | Self::SurfaceCreation(_)
                | Self::Encoding(_)
                | Self::SeekTimeout { .. }
        )
    }
}

impl From<serde_json::Error> for CaptionError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
