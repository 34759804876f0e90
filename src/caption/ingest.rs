use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::caption::model::{Caption, CaptionId};
use crate::foundation::error::{CaptionError, CaptionResult};

/// User-visible message for any transcription failure.
pub const TRANSCRIPTION_FAILED_MESSAGE: &str =
    "Video transcription failed. Check the file size or the network connection.";

/// A `{text, start, end}` triple as returned by the transcription collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    /// Spoken text.
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
}

/// External speech-to-text collaborator.
///
/// Implementations call out to whatever service produces timed text; the core only consumes the
/// returned records.
pub trait Transcriber {
    /// Produce timed records for the video at `video`.
    fn transcribe(&mut self, video: &Path) -> anyhow::Result<Vec<TranscriptRecord>>;
}

/// Wrap transcript records with generated ids `caption-{index}-{stamp}`.
pub fn captions_from_records(records: Vec<TranscriptRecord>, stamp: u64) -> Vec<Caption> {
    records
        .into_iter()
        .enumerate()
        .map(|(i, r)| Caption {
            id: CaptionId(format!("caption-{i}-{stamp}")),
            text: r.text,
            start: r.start,
            end: r.end,
        })
        .collect()
}

/// Parse a JSON array of transcript records. An empty body is treated as no records.
pub fn parse_transcript_json(body: &str) -> CaptionResult<Vec<TranscriptRecord>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(body).map_err(|e| CaptionError::serde(format!("transcript json: {e}")))
}

/// Run a transcriber and reduce any failure to the single user-visible message.
pub fn transcribe_captions(
    transcriber: &mut dyn Transcriber,
    video: &Path,
    stamp: u64,
) -> CaptionResult<Vec<Caption>> {
    match transcriber.transcribe(video) {
        Ok(records) => Ok(captions_from_records(records, stamp)),
        Err(e) => {
            tracing::error!(error = %e, video = %video.display(), "transcription failed");
            Err(CaptionError::transcription(TRANSCRIPTION_FAILED_MESSAGE))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/caption/ingest.rs"]
mod tests;
