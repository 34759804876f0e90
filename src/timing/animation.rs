use crate::style::model::AnimationKind;

/// Visual parameters derived from an entry animation at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimFactors {
    /// Multiplier on the font size.
    pub scale: f64,
    /// Multiplier on every pass's alpha.
    pub opacity: f64,
    /// Downward offset in reference pixels (added to Y in a downward-positive axis).
    pub y_offset: f64,
}

impl AnimFactors {
    /// The settled state: no scaling, fully opaque, no offset.
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        opacity: 1.0,
        y_offset: 0.0,
    };
}

impl Default for AnimFactors {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Fixed timing window plus the interpolation over normalized progress `p` in `[0, 1)`.
#[derive(Clone, Copy, Debug)]
pub struct AnimationSpec {
    /// Window length in seconds. At or after it the factors are [`AnimFactors::IDENTITY`].
    pub window_secs: f64,
    /// Factors at progress `p = elapsed / window_secs`.
    pub sample: fn(f64) -> AnimFactors,
}

const POP: AnimationSpec = AnimationSpec {
    window_secs: 0.25,
    sample: pop,
};

const FADE: AnimationSpec = AnimationSpec {
    window_secs: 0.15,
    sample: fade,
};

const SLIDE_UP: AnimationSpec = AnimationSpec {
    window_secs: 0.2,
    sample: slide_up,
};

/// Vertical travel of `slide-up`, in reference pixels.
pub const SLIDE_UP_DISTANCE: f64 = 20.0;

impl AnimationKind {
    /// Timing table entry; `None` for kinds without an animated window.
    pub fn spec(self) -> Option<&'static AnimationSpec> {
        match self {
            Self::None => None,
            Self::Pop => Some(&POP),
            Self::Fade => Some(&FADE),
            Self::SlideUp => Some(&SLIDE_UP),
        }
    }
}

/// Factors for `kind` at `elapsed` seconds after the segment became active.
///
/// Negative or NaN elapsed times are treated as zero.
pub fn evaluate(kind: AnimationKind, elapsed: f64) -> AnimFactors {
    let elapsed = if elapsed.is_nan() { 0.0 } else { elapsed.max(0.0) };
    match kind.spec() {
        Some(spec) if elapsed < spec.window_secs => (spec.sample)(elapsed / spec.window_secs),
        _ => AnimFactors::IDENTITY,
    }
}

fn pop(p: f64) -> AnimFactors {
    // 0.7 -> 1.1 over the first 70%, then settle 1.1 -> 1.0.
    let scale = if p < 0.7 {
        0.7 + (p / 0.7) * 0.4
    } else {
        1.1 - ((p - 0.7) / 0.3) * 0.1
    };
    AnimFactors {
        scale,
        ..AnimFactors::IDENTITY
    }
}

fn fade(p: f64) -> AnimFactors {
    AnimFactors {
        opacity: p.min(1.0),
        ..AnimFactors::IDENTITY
    }
}

fn slide_up(p: f64) -> AnimFactors {
    AnimFactors {
        scale: 1.0,
        opacity: p,
        y_offset: SLIDE_UP_DISTANCE * (1.0 - p),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/animation.rs"]
mod tests;
