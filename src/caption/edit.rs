use serde::{Deserialize, Serialize};

use crate::caption::model::{Caption, CaptionId};
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::foundation::math::round_centis;

/// Which bound of a caption an edit targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeField {
    /// `start`.
    Start,
    /// `end`.
    End,
}

/// Ordered caption list with the editing operations collaborators apply to it.
///
/// The render core only ever reads `as_slice()`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaptionTrack {
    captions: Vec<Caption>,
}

impl CaptionTrack {
    /// Wrap an existing list, preserving its order.
    pub fn new(captions: Vec<Caption>) -> Self {
        Self { captions }
    }

    /// Borrow the captions in list order.
    pub fn as_slice(&self) -> &[Caption] {
        &self.captions
    }

    /// Number of captions.
    pub fn len(&self) -> usize {
        self.captions.len()
    }

    /// Whether there are no captions.
    pub fn is_empty(&self) -> bool {
        self.captions.is_empty()
    }

    /// Drop every caption.
    pub fn clear(&mut self) {
        self.captions.clear();
    }

    /// Consume the track.
    pub fn into_inner(self) -> Vec<Caption> {
        self.captions
    }

    fn position(&self, id: &CaptionId) -> CaptionResult<usize> {
        self.captions
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| CaptionError::validation(format!("unknown caption id '{id}'")))
    }

    /// Replace a caption's text.
    pub fn set_text(&mut self, id: &CaptionId, text: impl Into<String>) -> CaptionResult<()> {
        let i = self.position(id)?;
        self.captions[i].text = text.into();
        Ok(())
    }

    /// Move one bound of a caption, keeping chained neighbors attached.
    ///
    /// The value is clamped to `>= 0` and rounded to hundredths. Moving `end` also moves the next
    /// caption's `start`; moving `start` also moves the previous caption's `end`.
    pub fn set_time(&mut self, id: &CaptionId, field: TimeField, value: f64) -> CaptionResult<()> {
        if !value.is_finite() {
            return Err(CaptionError::validation("caption time must be finite"));
        }
        let i = self.position(id)?;
        let v = round_centis(value.max(0.0));
        match field {
            TimeField::End => {
                self.captions[i].end = v;
                if let Some(next) = self.captions.get_mut(i + 1) {
                    next.start = v;
                }
            }
            TimeField::Start => {
                self.captions[i].start = v;
                if i > 0 {
                    self.captions[i - 1].end = v;
                }
            }
        }
        Ok(())
    }

    /// Remove a caption. Neighbors keep their bounds.
    pub fn remove(&mut self, id: &CaptionId) -> CaptionResult<Caption> {
        let i = self.position(id)?;
        Ok(self.captions.remove(i))
    }

    /// Replace every multi-word caption with one caption per word.
    ///
    /// Word bounds divide the caption evenly and are rounded to hundredths. New ids have the form
    /// `split-{id}-{word}-{stamp}`.
    pub fn split_to_words(&mut self, stamp: u64) {
        let mut out = Vec::with_capacity(self.captions.len());
        for c in self.captions.drain(..) {
            let words: Vec<&str> = c.text.split_whitespace().collect();
            if words.len() <= 1 {
                out.push(c);
                continue;
            }
            let word_dur = (c.end - c.start) / words.len() as f64;
            for (i, word) in words.iter().enumerate() {
                out.push(Caption {
                    id: CaptionId(format!("split-{}-{i}-{stamp}", c.id)),
                    text: (*word).to_owned(),
                    start: round_centis(c.start + i as f64 * word_dur),
                    end: round_centis(c.start + (i + 1) as f64 * word_dur),
                });
            }
        }
        self.captions = out;
    }
}

impl From<Vec<Caption>> for CaptionTrack {
    fn from(captions: Vec<Caption>) -> Self {
        Self::new(captions)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/caption/edit.rs"]
mod tests;
