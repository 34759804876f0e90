use crate::foundation::error::{CaptionError, CaptionResult};
use crate::foundation::math::mul_div255_u8;
use crate::render::blur::PixelRect;

pub(crate) type PremulRgba8 = [u8; 4];

/// Porter-Duff source-over for premultiplied pixels, with the source scaled by `opacity`.
pub(crate) fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Composite the `region` of `src` over the same region of `dst`. Both buffers are
/// `width`-wide premultiplied RGBA8.
pub(crate) fn over_region(
    dst: &mut [u8],
    src: &[u8],
    width: u32,
    region: PixelRect,
    opacity: f32,
) -> CaptionResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(CaptionError::validation(
            "over_region expects equal-length rgba8 buffers",
        ));
    }
    let row_bytes = (width as usize) * 4;
    if region.x1 > width || row_bytes * (region.y1 as usize) > dst.len() {
        return Err(CaptionError::validation(
            "composite region exceeds buffer bounds",
        ));
    }
    if opacity <= 0.0 {
        return Ok(());
    }

    for y in region.y0..region.y1 {
        let start = (y as usize) * row_bytes + (region.x0 as usize) * 4;
        let end = (y as usize) * row_bytes + (region.x1 as usize) * 4;
        for (d, s) in dst[start..end]
            .chunks_exact_mut(4)
            .zip(src[start..end].chunks_exact(4))
        {
            if s[3] == 0 {
                continue;
            }
            let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
            d.copy_from_slice(&out);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
