use crate::caption::model::Caption;

/// First caption in list order whose inclusive `[start, end]` contains `t`.
///
/// Captions are conventionally sorted by start but may overlap or leave gaps; the scan is linear
/// and always picks the earliest listed match.
pub fn find_active(captions: &[Caption], t: f64) -> Option<&Caption> {
    captions.iter().find(|c| c.contains(t))
}

/// Index form of [`find_active`].
pub fn find_active_index(captions: &[Caption], t: f64) -> Option<usize> {
    captions.iter().position(|c| c.contains(t))
}

#[cfg(test)]
#[path = "../../tests/unit/caption/index.rs"]
mod tests;
