use crate::foundation::core::Canvas;
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::plan::{CaptionDrawList, plan_caption};
use crate::style::model::CaptionStyle;
use crate::timing::frame::RenderFrame;

/// A video frame as RGBA8 pixels.
///
/// Decoded video is opaque, so straight and premultiplied bytes coincide; the flag records what
/// the compositor may assume once translucent pixels are involved.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Wrap decoded bytes, checking they match `width * height * 4`.
    pub fn from_bytes(width: u32, height: u32, data: Vec<u8>) -> CaptionResult<Self> {
        let expected = byte_len(width, height)?;
        if data.len() != expected {
            return Err(CaptionError::validation(format!(
                "frame buffer has {} bytes, expected {expected} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
            premultiplied: true,
        })
    }

    /// A frame filled with one opaque color.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> CaptionResult<Self> {
        let px = [rgb[0], rgb[1], rgb[2], 255];
        let data = px.repeat(byte_len(width, height)? / 4);
        Self::from_bytes(width, height, data)
    }

    /// Surface size of this frame.
    pub fn canvas(&self) -> CaptionResult<Canvas> {
        Canvas::new(self.width, self.height)
    }

    /// RGBA bytes of pixel `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }
}

pub(crate) fn byte_len(width: u32, height: u32) -> CaptionResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| CaptionError::validation("frame buffer size overflow"))
}

/// Draws a planned caption onto video frames.
///
/// The pixel compositor implements this; the export driver only talks to the trait.
pub trait FrameCompositor {
    /// Prepare drawing resources for frames of `canvas` size.
    ///
    /// Fails with [`CaptionError::SurfaceCreation`] when the surface cannot exist.
    fn prepare(&mut self, canvas: Canvas) -> CaptionResult<()>;

    /// Composite every pass of `list` onto `frame`, in order.
    fn composite(&mut self, frame: &mut FrameRGBA, list: &CaptionDrawList) -> CaptionResult<()>;

    /// Plan and composite `render` onto `frame`. Frames with nothing on screen are left
    /// untouched.
    fn render_caption(
        &mut self,
        frame: &mut FrameRGBA,
        render: &RenderFrame,
        style: &CaptionStyle,
    ) -> CaptionResult<Option<CaptionDrawList>> {
        let Some(list) = plan_caption(render, style, frame.canvas()?) else {
            return Ok(None);
        };
        self.composite(frame, &list)?;
        Ok(Some(list))
    }
}
