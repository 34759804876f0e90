use serde::{Deserialize, Serialize};

use crate::foundation::error::{CaptionError, CaptionResult};
use crate::style::color::Rgba8;

/// Letter casing applied to displayed text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextCasing {
    /// Leave text as written.
    #[default]
    None,
    /// Full uppercase.
    Uppercase,
    /// Full lowercase.
    Lowercase,
    /// Lowercase, then capitalize the first letter of each word.
    Titlecase,
}

/// How much of the active caption is on screen at once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    /// One word at a time.
    #[default]
    Word,
    /// Even-aligned word pairs.
    TwoWords,
    /// The full caption text.
    Sentence,
}

/// Entry animation applied when a segment becomes active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationKind {
    /// No animation.
    None,
    /// Overshooting scale-in.
    #[default]
    Pop,
    /// Opacity ramp.
    Fade,
    /// Fade in while sliding up from below.
    SlideUp,
}

/// Vertical anchor band.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalPosition {
    /// 15% from the top.
    Top,
    /// Frame center.
    Middle,
    /// 85% from the top.
    #[default]
    Bottom,
}

impl VerticalPosition {
    /// Fraction of the frame height where the text's vertical middle sits.
    pub fn height_fraction(self) -> f64 {
        match self {
            Self::Top => 0.15,
            Self::Middle => 0.5,
            Self::Bottom => 0.85,
        }
    }
}

/// Caption styling configuration, supplied by value to every render call.
///
/// Field names follow the JSON style documents (`fontSize`, `shadowOffsetX`, ...). Every field
/// is optional on input and falls back to [`CaptionStyle::default`]. Pixel values are authored
/// against a 720-pixel-high frame and scaled to the output resolution at render time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptionStyle {
    /// Fill color.
    pub color: Rgba8,
    /// Font size in reference pixels.
    pub font_size: f64,
    /// Font family name, resolved through the render adapter's font book.
    pub font_family: String,
    /// Heavy (900) weight when set, medium (500) otherwise.
    pub is_bold: bool,
    /// Casing rule.
    pub casing: TextCasing,
    /// Strip `. , ? ! : ;` before display.
    pub remove_punctuation: bool,

    /// Outline color.
    pub stroke_color: Rgba8,
    /// Outline width in reference pixels.
    pub stroke_width: f64,
    /// Drop shadow color.
    pub shadow_color: Rgba8,
    /// Drop shadow blur in reference pixels.
    pub shadow_blur: f64,
    /// Drop shadow opacity in `[0, 1]`; zero disables the shadow pass.
    pub shadow_opacity: f64,
    /// Drop shadow horizontal offset in reference pixels.
    pub shadow_offset_x: f64,
    /// Drop shadow vertical offset in reference pixels.
    pub shadow_offset_y: f64,
    /// Glow color.
    pub glow_color: Rgba8,
    /// Glow blur radius in reference pixels; zero disables the glow passes.
    pub glow_intensity: f64,
    /// Glow opacity in `[0, 1]`.
    pub glow_opacity: f64,

    /// Background box color.
    pub background_color: Rgba8,
    /// Background box opacity in `[0, 1]`; zero disables the box.
    pub background_opacity: f64,

    /// Vertical anchor band.
    pub position: VerticalPosition,
    /// Horizontal offset in percent of the frame width.
    pub offset_x: f64,
    /// Vertical offset in reference pixels.
    pub offset_y: f64,
    /// Segmenting mode.
    pub display_mode: DisplayMode,
    /// Entry animation.
    pub animation: AnimationKind,
    /// Caption timing shift in seconds. Positive values delay the text.
    pub timing_offset: f64,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            color: Rgba8::WHITE,
            font_size: 56.0,
            font_family: "Montserrat".to_owned(),
            is_bold: true,
            casing: TextCasing::Uppercase,
            remove_punctuation: true,
            stroke_color: Rgba8::BLACK,
            stroke_width: 2.5,
            shadow_color: Rgba8::BLACK,
            shadow_blur: 10.0,
            shadow_opacity: 0.6,
            shadow_offset_x: 4.0,
            shadow_offset_y: 4.0,
            glow_color: Rgba8::WHITE,
            glow_intensity: 0.0,
            glow_opacity: 0.8,
            background_color: Rgba8::BLACK,
            background_opacity: 0.0,
            position: VerticalPosition::Bottom,
            offset_x: 0.0,
            offset_y: 0.0,
            display_mode: DisplayMode::Word,
            animation: AnimationKind::Pop,
            timing_offset: 0.0,
        }
    }
}

impl CaptionStyle {
    /// Reject values no renderer can honor (non-finite numbers, negative sizes).
    pub fn validate(&self) -> CaptionResult<()> {
        let finite = [
            ("fontSize", self.font_size),
            ("strokeWidth", self.stroke_width),
            ("shadowBlur", self.shadow_blur),
            ("shadowOpacity", self.shadow_opacity),
            ("shadowOffsetX", self.shadow_offset_x),
            ("shadowOffsetY", self.shadow_offset_y),
            ("glowIntensity", self.glow_intensity),
            ("glowOpacity", self.glow_opacity),
            ("backgroundOpacity", self.background_opacity),
            ("offsetX", self.offset_x),
            ("offsetY", self.offset_y),
            ("timingOffset", self.timing_offset),
        ];
        for (name, v) in finite {
            if !v.is_finite() {
                return Err(CaptionError::validation(format!("{name} must be finite")));
            }
        }
        if self.font_size <= 0.0 {
            return Err(CaptionError::validation("fontSize must be > 0"));
        }
        for (name, v) in [
            ("strokeWidth", self.stroke_width),
            ("shadowBlur", self.shadow_blur),
            ("glowIntensity", self.glow_intensity),
        ] {
            if v < 0.0 {
                return Err(CaptionError::validation(format!("{name} must be >= 0")));
            }
        }
        for (name, v) in [
            ("shadowOpacity", self.shadow_opacity),
            ("glowOpacity", self.glow_opacity),
            ("backgroundOpacity", self.background_opacity),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(CaptionError::validation(format!("{name} must be in [0, 1]")));
            }
        }
        Ok(())
    }

    /// CSS-style numeric font weight.
    pub fn font_weight(&self) -> u16 {
        if self.is_bold { 900 } else { 500 }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/model.rs"]
mod tests;
