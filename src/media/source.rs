use std::time::Duration;

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::backend::FrameRGBA;

/// Longest source the export driver accepts, one week.
pub const MAX_DURATION_SECS: f64 = 7.0 * 24.0 * 3600.0;

/// What the export driver needs to know about a source before sizing its surface.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Native frame rate, when the container reports one.
    pub fps: Option<Fps>,
}

impl VideoMetadata {
    /// Reject metadata that cannot drive an export (zero size, or a duration that is
    /// not finite, empty or longer than [`MAX_DURATION_SECS`]).
    pub fn validate(&self) -> CaptionResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CaptionError::metadata(format!(
                "video dimensions {}x{} are not usable",
                self.width, self.height
            )));
        }
        if !self.duration_secs.is_finite()
            || self.duration_secs <= 0.0
            || self.duration_secs > MAX_DURATION_SECS
        {
            return Err(CaptionError::metadata(format!(
                "video duration {} is not usable",
                self.duration_secs
            )));
        }
        Ok(())
    }

    /// Output surface for this source.
    pub fn canvas(&self) -> CaptionResult<Canvas> {
        Canvas::new(self.width, self.height).map_err(|e| CaptionError::metadata(e.to_string()))
    }
}

/// A seekable video the export driver draws captions onto.
pub trait VideoSource {
    /// Resolve dimensions and duration, failing with [`CaptionError::MetadataLoad`] when they do
    /// not arrive within `timeout`.
    fn load_metadata(&mut self, timeout: Duration) -> CaptionResult<VideoMetadata>;

    /// Hint that upcoming [`VideoSource::frame_at`] calls step through time at `fps`.
    fn set_step_rate(&mut self, _fps: Fps) {}

    /// Seek to `t` seconds and return the settled frame. Fails with
    /// [`CaptionError::SeekTimeout`] when no frame settles within `timeout`.
    fn frame_at(&mut self, t: f64, timeout: Duration) -> CaptionResult<FrameRGBA>;
}

impl<S: VideoSource + ?Sized> VideoSource for &mut S {
    fn load_metadata(&mut self, timeout: Duration) -> CaptionResult<VideoMetadata> {
        (**self).load_metadata(timeout)
    }

    fn set_step_rate(&mut self, fps: Fps) {
        (**self).set_step_rate(fps);
    }

    fn frame_at(&mut self, t: f64, timeout: Duration) -> CaptionResult<FrameRGBA> {
        (**self).frame_at(t, timeout)
    }
}

/// A clip of one solid color, for burning captions without an input video.
#[derive(Clone, Debug)]
pub struct SolidVideoSource {
    metadata: VideoMetadata,
    rgb: [u8; 3],
}

impl SolidVideoSource {
    /// A `width` x `height` clip lasting `duration_secs`.
    pub fn new(width: u32, height: u32, duration_secs: f64, rgb: [u8; 3]) -> Self {
        Self {
            metadata: VideoMetadata {
                width,
                height,
                duration_secs,
                fps: None,
            },
            rgb,
        }
    }
}

impl VideoSource for SolidVideoSource {
    fn load_metadata(&mut self, _timeout: Duration) -> CaptionResult<VideoMetadata> {
        self.metadata.validate()?;
        Ok(self.metadata.clone())
    }

    fn frame_at(&mut self, _t: f64, _timeout: Duration) -> CaptionResult<FrameRGBA> {
        FrameRGBA::solid(self.metadata.width, self.metadata.height, self.rgb)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/source.rs"]
mod tests;
