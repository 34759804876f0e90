use crate::foundation::error::{CaptionError, CaptionResult};

pub use kurbo::{Point, Rect, Vec2};

/// Logical frame height that all pixel-valued style parameters are designed against.
pub const REFERENCE_HEIGHT: f64 = 720.0;

/// Output surface size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a canvas, rejecting zero-sized surfaces.
    pub fn new(width: u32, height: u32) -> CaptionResult<Self> {
        if width == 0 || height == 0 {
            return Err(CaptionError::validation("canvas width/height must be > 0"));
        }
        Ok(Self { width, height })
    }

    /// Scale factor from the 720-line design reference to this canvas.
    pub fn resolution_scale(self) -> f64 {
        f64::from(self.height) / REFERENCE_HEIGHT
    }

    /// Horizontal center in pixels.
    pub fn center_x(self) -> f64 {
        f64::from(self.width) / 2.0
    }
}

/// Rational frames-per-second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator.
    pub num: u32,
    /// Denominator (must be > 0).
    pub den: u32,
}

impl Fps {
    /// Create a validated frame rate.
    pub fn new(num: u32, den: u32) -> CaptionResult<Self> {
        if den == 0 {
            return Err(CaptionError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(CaptionError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Frames per second as a float.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Time of step `n`, computed from the integer index so no error accumulates.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * f64::from(self.den) / f64::from(self.num)
    }

    /// Number of steps `n >= 0` whose time `frames_to_secs(n)` is strictly below `duration_secs`.
    pub fn steps_before(self, duration_secs: f64) -> u64 {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return 0;
        }
        let mut n = (duration_secs * self.as_f64()).ceil().max(0.0) as u64;
        // Correct for rounding on either side of the exact product.
        while n > 0 && self.frames_to_secs(n - 1) >= duration_secs {
            n -= 1;
        }
        while n < u64::MAX && self.frames_to_secs(n) < duration_secs {
            n += 1;
        }
        n
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

impl std::str::FromStr for Fps {
    type Err = CaptionError;

    /// Parses `30` or a rational rate such as `30000/1001`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (num, den) = match s.split_once('/') {
            Some((n, d)) => (n.trim(), d.trim()),
            None => (s, "1"),
        };
        let num = num
            .parse::<u32>()
            .map_err(|_| CaptionError::validation(format!("invalid fps numerator '{num}'")))?;
        let den = den
            .parse::<u32>()
            .map_err(|_| CaptionError::validation(format!("invalid fps denominator '{den}'")))?;
        Self::new(num, den)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
