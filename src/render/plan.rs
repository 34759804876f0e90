use crate::foundation::core::{Canvas, Point, Vec2};
use crate::style::color::Rgba8;
use crate::style::model::CaptionStyle;
use crate::timing::frame::RenderFrame;

/// Padding of the background box around the text, in reference pixels (x, y).
pub const BACKGROUND_PADDING: (f64, f64) = (24.0, 8.0);
/// Corner radius of the background box, in reference pixels.
pub const BACKGROUND_RADIUS: f64 = 8.0;
/// Line height relative to the font size.
pub const LINE_HEIGHT: f64 = 1.1;

/// Role of a pass in the fixed layering order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PassKind {
    /// Drop shadow.
    Shadow,
    /// One of the two glow passes.
    Glow,
    /// Outline.
    Stroke,
    /// Final solid fill.
    Fill,
}

/// Geometry operation used to paint the glyphs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PaintOp {
    /// Fill glyph outlines.
    Fill,
    /// Stroke glyph outlines with round joins.
    Stroke {
        /// Line width in output pixels.
        width_px: f64,
    },
}

/// Canvas-style shadow attached to a pass: a blurred, offset copy drawn beneath the glyphs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowSpec {
    /// Shadow color.
    pub color: Rgba8,
    /// Blur radius in output pixels (Gaussian sigma is half of it).
    pub blur_px: f64,
    /// Offset in output pixels.
    pub offset: Vec2,
}

/// One layer of decorated text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawPass {
    /// Pass role.
    pub kind: PassKind,
    /// Fill or stroke.
    pub op: PaintOp,
    /// Glyph paint color.
    pub color: Rgba8,
    /// Decoration opacity before the animation factor (`shadowOpacity`, `glowOpacity`, or 1).
    pub opacity: f64,
    /// Optional shadow drawn with this pass.
    pub shadow: Option<ShadowSpec>,
}

/// Rounded box drawn behind the text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackgroundBox {
    /// Box color.
    pub color: Rgba8,
    /// Box opacity before the animation factor.
    pub opacity: f64,
    /// Padding around the text bounds in output pixels.
    pub padding: Vec2,
    /// Corner radius in output pixels.
    pub corner_radius: f64,
}

/// Resolved drawing decisions for one caption at one instant.
///
/// This is the single description both the pixel compositor and the preview markup are built
/// from.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptionDrawList {
    /// Text to draw.
    pub text: String,
    /// Point the text is centered on (horizontal center, vertical middle).
    pub anchor: Point,
    /// Output height / 720.
    pub resolution_scale: f64,
    /// Effective font size in output pixels, including the animation scale.
    pub font_size_px: f64,
    /// Numeric font weight (900 or 500).
    pub font_weight: u16,
    /// Requested font family.
    pub font_family: String,
    /// Animation opacity; multiplies every pass.
    pub opacity: f64,
    /// Optional background box, drawn before all passes.
    pub background: Option<BackgroundBox>,
    /// Passes in drawing order.
    pub passes: Vec<DrawPass>,
}

impl CaptionDrawList {
    /// Effective alpha of a pass (`pass.opacity * opacity`).
    pub fn pass_alpha(&self, pass: &DrawPass) -> f64 {
        (pass.opacity * self.opacity).clamp(0.0, 1.0)
    }

    /// Effective alpha of the background box.
    pub fn background_alpha(&self) -> f64 {
        self.background
            .map(|b| (b.opacity * self.opacity).clamp(0.0, 1.0))
            .unwrap_or(0.0)
    }
}

/// Compute the text anchor for `canvas`.
///
/// Horizontal: center plus `offsetX` percent of the width. Vertical: the position band, plus
/// `offsetY` and the animation's downward offset, both scaled by the resolution factor.
pub fn anchor_point(canvas: Canvas, style: &CaptionStyle, y_offset: f64) -> Point {
    let scale = canvas.resolution_scale();
    let width = f64::from(canvas.width);
    let height = f64::from(canvas.height);
    let x = canvas.center_x() + (style.offset_x / 100.0) * width;
    let y = style.position.height_fraction() * height + style.offset_y * scale + y_offset * scale;
    Point::new(x, y)
}

/// Resolve every drawing decision for `frame` on `canvas`. `None` when nothing is on screen.
pub fn plan_caption(
    frame: &RenderFrame,
    style: &CaptionStyle,
    canvas: Canvas,
) -> Option<CaptionDrawList> {
    if frame.is_empty() {
        return None;
    }
    let rs = canvas.resolution_scale();
    let anim = frame.anim;

    let mut passes = Vec::with_capacity(5);
    if style.shadow_opacity > 0.0 {
        passes.push(DrawPass {
            kind: PassKind::Shadow,
            op: PaintOp::Fill,
            color: style.shadow_color,
            opacity: style.shadow_opacity,
            shadow: Some(ShadowSpec {
                color: style.shadow_color,
                blur_px: style.shadow_blur * rs,
                offset: Vec2::new(style.shadow_offset_x * rs, style.shadow_offset_y * rs),
            }),
        });
    }
    if style.glow_intensity > 0.0 {
        let glow = DrawPass {
            kind: PassKind::Glow,
            op: PaintOp::Fill,
            color: style.color,
            opacity: style.glow_opacity,
            shadow: Some(ShadowSpec {
                color: style.glow_color,
                blur_px: style.glow_intensity * rs,
                offset: Vec2::ZERO,
            }),
        };
        // Two passes reinforce the glow.
        passes.push(glow);
        passes.push(glow);
    }
    if style.stroke_width > 0.0 {
        passes.push(DrawPass {
            kind: PassKind::Stroke,
            op: PaintOp::Stroke {
                width_px: style.stroke_width * rs * 2.0,
            },
            color: style.stroke_color,
            opacity: 1.0,
            shadow: None,
        });
    }
    passes.push(DrawPass {
        kind: PassKind::Fill,
        op: PaintOp::Fill,
        color: style.color,
        opacity: 1.0,
        shadow: None,
    });

    let background = (style.background_opacity > 0.0).then(|| BackgroundBox {
        color: style.background_color,
        opacity: style.background_opacity,
        padding: Vec2::new(
            BACKGROUND_PADDING.0 * rs * anim.scale,
            BACKGROUND_PADDING.1 * rs * anim.scale,
        ),
        corner_radius: BACKGROUND_RADIUS * rs * anim.scale,
    });

    Some(CaptionDrawList {
        text: frame.active_text.clone(),
        anchor: anchor_point(canvas, style, anim.y_offset),
        resolution_scale: rs,
        font_size_px: style.font_size * rs * anim.scale,
        font_weight: style.font_weight(),
        font_family: style.font_family.clone(),
        opacity: anim.opacity.clamp(0.0, 1.0),
        background,
        passes,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
