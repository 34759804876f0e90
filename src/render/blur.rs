use crate::foundation::core::Rect;
use crate::foundation::error::{CaptionError, CaptionResult};

/// Integer pixel rectangle, half-open on the far edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    /// Round `rect` outward and clip it to a `width` x `height` surface.
    pub fn covering(rect: Rect, width: u32, height: u32) -> Option<Self> {
        if !rect.is_finite() {
            return None;
        }
        let clip = |v: f64, max: u32| v.clamp(0.0, f64::from(max)) as u32;
        let r = Self {
            x0: clip(rect.x0.floor(), width),
            y0: clip(rect.y0.floor(), height),
            x1: clip(rect.x1.ceil(), width),
            y1: clip(rect.y1.ceil(), height),
        };
        (r.x1 > r.x0 && r.y1 > r.y0).then_some(r)
    }

    pub fn width(self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(self) -> u32 {
        self.y1 - self.y0
    }
}

/// Reusable buffers for [`blur_region_premul`].
#[derive(Default)]
pub(crate) struct BlurScratch {
    region: Vec<u8>,
    tmp: Vec<u8>,
    kernel: Option<(u32, u32, Vec<u32>)>,
}

fn cached_kernel(
    slot: &mut Option<(u32, u32, Vec<u32>)>,
    radius: u32,
    sigma: f32,
) -> CaptionResult<&[u32]> {
    let stale = !matches!(slot, Some((r, s, _)) if (*r, *s) == (radius, sigma.to_bits()));
    if stale {
        *slot = Some((radius, sigma.to_bits(), gaussian_kernel_q16(radius, sigma)?));
    }
    Ok(slot.as_ref().map(|(_, _, k)| k.as_slice()).unwrap_or(&[]))
}

/// Kernel radius covering three standard deviations.
pub(crate) fn radius_for_sigma(sigma: f32) -> u32 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return 0;
    }
    (sigma * 3.0).ceil() as u32
}

/// Gaussian-blur the premultiplied pixels inside `region` of a `width`-wide buffer in place.
///
/// Pixels outside the region are neither read nor written; callers pad the region by the kernel
/// radius so the blur has transparent margin to spread into.
pub(crate) fn blur_region_premul(
    buf: &mut [u8],
    width: u32,
    region: PixelRect,
    sigma: f32,
    scratch: &mut BlurScratch,
) -> CaptionResult<()> {
    let radius = radius_for_sigma(sigma);
    if radius == 0 {
        return Ok(());
    }
    let row_bytes = (width as usize) * 4;
    let needed_rows = region.y1 as usize;
    if region.x1 > width || buf.len() < row_bytes * needed_rows {
        return Err(CaptionError::validation("blur region exceeds buffer bounds"));
    }

    let BlurScratch {
        region: px,
        tmp,
        kernel,
    } = scratch;
    let (rw, rh) = (region.width(), region.height());
    let region_len = (rw as usize) * (rh as usize) * 4;
    px.resize(region_len, 0);
    tmp.resize(region_len, 0);

    let x_off = (region.x0 as usize) * 4;
    let span = (rw as usize) * 4;
    for (row, y) in (region.y0..region.y1).enumerate() {
        let src = (y as usize) * row_bytes + x_off;
        px[row * span..(row + 1) * span].copy_from_slice(&buf[src..src + span]);
    }

    let k = cached_kernel(kernel, radius, sigma)?;
    horizontal_pass(px, tmp, rw, rh, k);
    vertical_pass(tmp, px, rw, rh, k);

    for (row, y) in (region.y0..region.y1).enumerate() {
        let dst = (y as usize) * row_bytes + x_off;
        buf[dst..dst + span].copy_from_slice(&px[row * span..(row + 1) * span]);
    }
    Ok(())
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> CaptionResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(CaptionError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(CaptionError::validation("gaussian kernel sum is zero"));
    }

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();
    // Push the rounding residue into the center tap so the kernel sums to exactly 1.0 in q16.
    let acc: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }
    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
