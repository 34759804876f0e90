use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::backend::FrameRGBA;

/// Output container and codec pairing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    /// MP4 with H.264 video.
    #[default]
    Mp4,
    /// WebM with VP9 video at 16 Mbit/s.
    Webm,
}

impl Container {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
        }
    }
}

impl std::str::FromStr for Container {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp4" => Ok(Self::Mp4),
            "webm" => Ok(Self::Webm),
            other => Err(format!("unknown container \"{other}\" (expected mp4 or webm)")),
        }
    }
}

/// Everything a sink needs before the first frame.
#[derive(Clone, Debug, PartialEq)]
pub struct SinkConfig {
    /// Frame size.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// Container and codec.
    pub container: Container,
    /// File to write. Sinks that keep frames in memory ignore it.
    pub path: PathBuf,
}

/// Receives composited frames in presentation order.
pub trait FrameSink {
    /// Open the output.
    fn begin(&mut self, cfg: &SinkConfig) -> CaptionResult<()>;

    /// Append one frame.
    fn push_frame(&mut self, frame: &FrameRGBA) -> CaptionResult<()>;

    /// Flush and close the output.
    fn end(&mut self) -> CaptionResult<()>;

    /// Release the output without finishing it. Called on failure paths.
    fn abort(&mut self) {}
}

/// Collects frames in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemorySink {
    /// Configuration passed to the last `begin`.
    pub config: Option<SinkConfig>,
    /// Frames received since `begin`.
    pub frames: Vec<FrameRGBA>,
    /// Whether `end` completed.
    pub finished: bool,
    /// Whether `abort` was called.
    pub aborted: bool,
}

impl InMemorySink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: &SinkConfig) -> CaptionResult<()> {
        *self = Self {
            config: Some(cfg.clone()),
            ..Self::default()
        };
        Ok(())
    }

    fn push_frame(&mut self, frame: &FrameRGBA) -> CaptionResult<()> {
        let Some(cfg) = &self.config else {
            return Err(CaptionError::encoding("push_frame before begin"));
        };
        if frame.width != cfg.canvas.width || frame.height != cfg.canvas.height {
            return Err(CaptionError::encoding(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.canvas.width, cfg.canvas.height
            )));
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> CaptionResult<()> {
        self.finished = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
