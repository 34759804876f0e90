use vello_cpu::kurbo::Shape as _;

use crate::foundation::core::{Canvas, Point, Rect};
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::backend::{FrameCompositor, FrameRGBA};
use crate::render::blur::{BlurScratch, PixelRect, blur_region_premul, radius_for_sigma};
use crate::render::composite::over_region;
use crate::render::fonts::{FontBook, ShapedText, TextLayoutEngine};
use crate::render::plan::{CaptionDrawList, PaintOp};
use crate::style::color::Rgba8;

/// Extra margin around the line box, relative to the font size, for glyph overhang.
const OVERHANG: f64 = 0.25;

struct CpuSurface {
    width: u16,
    height: u16,
    layer: vello_cpu::Pixmap,
}

/// Pixel compositor: rasterizes each pass with `vello_cpu` into a transparent layer and blends
/// it over the video frame.
///
/// Shadows follow 2D-canvas semantics: the glyphs are drawn once more in the shadow color at the
/// shadow offset, Gaussian-blurred with sigma `blur / 2`, and blended beneath the pass at the
/// pass's alpha.
pub struct CpuCompositor {
    text: TextLayoutEngine,
    surface: Option<CpuSurface>,
    blur: BlurScratch,
}

impl std::fmt::Debug for CpuCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuCompositor")
            .field("fonts", self.text.book())
            .field(
                "surface",
                &self.surface.as_ref().map(|s| (s.width, s.height)),
            )
            .finish()
    }
}

impl CpuCompositor {
    /// Create a compositor drawing with the faces in `fonts`.
    pub fn new(fonts: FontBook) -> Self {
        Self {
            text: TextLayoutEngine::new(fonts),
            surface: None,
            blur: BlurScratch::default(),
        }
    }

    /// Fonts available to this compositor.
    pub fn font_book(&self) -> &FontBook {
        self.text.book()
    }

    fn surface_mut(&mut self) -> CaptionResult<&mut CpuSurface> {
        self.surface
            .as_mut()
            .ok_or_else(|| CaptionError::surface("compositor surface was not prepared"))
    }

    /// Rasterize `shaped` at `origin` into the cleared layer.
    fn paint_layer(
        &mut self,
        shaped: &ShapedText,
        origin: Point,
        op: PaintOp,
        color: Rgba8,
    ) -> CaptionResult<()> {
        let surface = self.surface_mut()?;
        let mut ctx = vello_cpu::RenderContext::new(surface.width, surface.height);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        if let PaintOp::Stroke { width_px } = op {
            ctx.set_stroke(
                vello_cpu::kurbo::Stroke::new(width_px).with_join(vello_cpu::kurbo::Join::Round),
            );
        }
        for run in &shaped.runs {
            let glyphs = run.glyphs.iter().copied();
            let builder = ctx.glyph_run(&run.font).font_size(run.font_size);
            match op {
                PaintOp::Fill => builder.fill_glyphs(glyphs),
                PaintOp::Stroke { .. } => builder.stroke_glyphs(glyphs),
            }
        }
        ctx.flush();
        surface.layer.data_as_u8_slice_mut().fill(0);
        ctx.render_to_pixmap(&mut surface.layer);
        Ok(())
    }

    fn paint_box(&mut self, rect: Rect, radius: f64, color: Rgba8) -> CaptionResult<()> {
        let surface = self.surface_mut()?;
        let mut ctx = vello_cpu::RenderContext::new(surface.width, surface.height);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        let shape =
            vello_cpu::kurbo::RoundedRect::new(rect.x0, rect.y0, rect.x1, rect.y1, radius);
        ctx.fill_path(&shape.to_path(0.1));
        ctx.flush();
        surface.layer.data_as_u8_slice_mut().fill(0);
        ctx.render_to_pixmap(&mut surface.layer);
        Ok(())
    }

    /// Blend the layer's `area` over `frame`, blurring it first when `sigma > 0`.
    fn blend_layer(
        &mut self,
        frame: &mut FrameRGBA,
        area: Rect,
        sigma: f32,
        alpha: f64,
    ) -> CaptionResult<()> {
        let Some(region) = PixelRect::covering(area, frame.width, frame.height) else {
            return Ok(());
        };
        let Self { surface, blur, .. } = self;
        let surface = surface
            .as_mut()
            .ok_or_else(|| CaptionError::surface("compositor surface was not prepared"))?;
        let layer = surface.layer.data_as_u8_slice_mut();
        if sigma > 0.0 {
            blur_region_premul(layer, frame.width, region, sigma, blur)?;
        }
        over_region(&mut frame.data, layer, frame.width, region, alpha as f32)
    }
}

impl FrameCompositor for CpuCompositor {
    fn prepare(&mut self, canvas: Canvas) -> CaptionResult<()> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(CaptionError::surface("surface width/height must be > 0"));
        }
        let width: u16 = canvas.width.try_into().map_err(|_| {
            CaptionError::surface(format!("surface width {} exceeds u16", canvas.width))
        })?;
        let height: u16 = canvas.height.try_into().map_err(|_| {
            CaptionError::surface(format!("surface height {} exceeds u16", canvas.height))
        })?;
        if self.text.book().is_empty() {
            return Err(CaptionError::validation(
                "no fonts registered; add a font file or directory",
            ));
        }

        let fits = self
            .surface
            .as_ref()
            .is_some_and(|s| s.width == width && s.height == height);
        if !fits {
            tracing::debug!(width, height, "allocating compositor surface");
            self.surface = Some(CpuSurface {
                width,
                height,
                layer: vello_cpu::Pixmap::new(width, height),
            });
        }
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip_all, fields(text = %list.text))]
    fn composite(&mut self, frame: &mut FrameRGBA, list: &CaptionDrawList) -> CaptionResult<()> {
        self.prepare(frame.canvas()?)?;
        let shaped = self.text.shape(
            &list.text,
            &list.font_family,
            list.font_weight,
            list.font_size_px as f32,
        )?;

        // Horizontally centered, vertically middle-anchored.
        let origin = Point::new(
            list.anchor.x - shaped.width / 2.0,
            list.anchor.y - shaped.height / 2.0,
        );
        let line_box = Rect::new(
            origin.x,
            origin.y,
            origin.x + shaped.width,
            origin.y + shaped.height,
        );
        let overhang = list.font_size_px * OVERHANG;

        if let Some(bg) = list.background {
            let alpha = list.background_alpha();
            if alpha > 0.0 {
                let rect = line_box.inflate(bg.padding.x, bg.padding.y);
                self.paint_box(rect, bg.corner_radius, bg.color)?;
                self.blend_layer(frame, rect.inflate(1.0, 1.0), 0.0, alpha)?;
            }
        }

        for pass in &list.passes {
            let alpha = list.pass_alpha(pass);
            if alpha <= 0.0 {
                continue;
            }
            let stroke_pad = match pass.op {
                PaintOp::Fill => 0.0,
                PaintOp::Stroke { width_px } => width_px / 2.0,
            };
            let glyph_area = line_box.inflate(overhang + stroke_pad, overhang + stroke_pad);

            if let Some(shadow) = pass.shadow
                && shadow.color.a > 0
            {
                let sigma = (shadow.blur_px / 2.0) as f32;
                let spread = f64::from(radius_for_sigma(sigma));
                self.paint_layer(&shaped, origin + shadow.offset, pass.op, shadow.color)?;
                let area = (glyph_area + shadow.offset).inflate(spread, spread);
                self.blend_layer(frame, area, sigma, alpha)?;
            }

            self.paint_layer(&shaped, origin, pass.op, pass.color)?;
            self.blend_layer(frame, glyph_area, 0.0, alpha)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
