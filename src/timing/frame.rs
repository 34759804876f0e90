use crate::caption::index::find_active;
use crate::caption::model::Caption;
use crate::style::model::CaptionStyle;
use crate::style::text::transform_text;
use crate::timing::animation::{AnimFactors, evaluate};
use crate::timing::segment::select_segment;

/// Everything the compositors need to know about one instant. Recomputed every tick.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderFrame {
    /// Transformed text to draw; empty when nothing is on screen.
    pub active_text: String,
    /// Time the current segment became active (caption timeline).
    pub segment_anchor_time: f64,
    /// Seconds since the segment became active, never negative.
    pub elapsed_in_segment: f64,
    /// Animation factors at `elapsed_in_segment`.
    pub anim: AnimFactors,
    /// Diff key of the displayed segment, `None` when nothing is on screen.
    pub key: Option<String>,
}

impl RenderFrame {
    /// A frame with nothing on screen.
    pub fn empty() -> Self {
        Self {
            active_text: String::new(),
            segment_anchor_time: 0.0,
            elapsed_in_segment: 0.0,
            anim: AnimFactors::IDENTITY,
            key: None,
        }
    }

    /// Run index → segment → transform → animation for playback time `t`.
    ///
    /// `style.timing_offset` shifts the caption timeline: captions are looked up at
    /// `t - timing_offset`.
    pub fn at(captions: &[Caption], style: &CaptionStyle, t: f64) -> Self {
        let query = t - style.timing_offset;
        let Some(caption) = find_active(captions, query) else {
            return Self::empty();
        };

        let segment = select_segment(caption, style.display_mode, query);
        let elapsed = (query - segment.anchor_time).max(0.0);
        let text = transform_text(&segment.text, style);
        if text.trim().is_empty() {
            return Self::empty();
        }

        Self {
            active_text: text,
            segment_anchor_time: segment.anchor_time,
            elapsed_in_segment: elapsed,
            anim: evaluate(style.animation, elapsed),
            key: Some(segment.key(caption)),
        }
    }

    /// Whether there is anything to draw.
    pub fn is_empty(&self) -> bool {
        self.active_text.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/frame.rs"]
mod tests;
