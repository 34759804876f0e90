use crate::caption::model::Caption;
use crate::style::model::DisplayMode;

/// Which words of the caption a segment covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SegmentSpan {
    /// The whole caption.
    Sentence,
    /// The single word at this index.
    Word(usize),
    /// The pair starting at this (even) index.
    Pair(usize),
}

/// The sub-span of a caption on screen at a given time.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    /// Raw (untransformed) segment text.
    pub text: String,
    /// Time at which this segment became active; drives animation timing.
    pub anchor_time: f64,
    /// Covered word span.
    pub span: SegmentSpan,
}

impl Segment {
    /// Stable key for diffing rendered nodes: changes exactly when the displayed span changes.
    pub fn key(&self, caption: &Caption) -> String {
        match self.span {
            SegmentSpan::Sentence => caption.id.to_string(),
            SegmentSpan::Word(i) => format!("{}-w-{i}", caption.id),
            SegmentSpan::Pair(i) => format!("{}-p-{i}", caption.id),
        }
    }
}

/// Pick the segment of `caption` that is on screen at `t`.
///
/// Word timing divides the caption evenly; the word index is clamped so times at or past `end`
/// (or before `start`) still land on a real word.
pub fn select_segment(caption: &Caption, mode: DisplayMode, t: f64) -> Segment {
    let sentence = || Segment {
        text: caption.text.clone(),
        anchor_time: caption.start,
        span: SegmentSpan::Sentence,
    };

    if mode == DisplayMode::Sentence {
        return sentence();
    }
    let words = caption.words();
    if words.is_empty() {
        return sentence();
    }

    let count = words.len();
    let word_duration = (caption.end - caption.start) / count as f64;
    let index = clamped_word_index(t - caption.start, word_duration, count);

    match mode {
        DisplayMode::Word => Segment {
            text: words[index].to_owned(),
            anchor_time: caption.start + index as f64 * word_duration,
            span: SegmentSpan::Word(index),
        },
        DisplayMode::TwoWords => {
            let pair = (index / 2) * 2;
            let end = (pair + 2).min(count);
            Segment {
                text: words[pair..end].join(" "),
                anchor_time: caption.start + pair as f64 * word_duration,
                span: SegmentSpan::Pair(pair),
            }
        }
        DisplayMode::Sentence => sentence(),
    }
}

fn clamped_word_index(offset: f64, word_duration: f64, count: usize) -> usize {
    let max = (count - 1) as f64;
    let raw = if word_duration > 0.0 && word_duration.is_finite() {
        (offset / word_duration).floor()
    } else {
        0.0
    };
    if raw.is_nan() {
        return 0;
    }
    raw.clamp(0.0, max) as usize
}

#[cfg(test)]
#[path = "../../tests/unit/timing/segment.rs"]
mod tests;
