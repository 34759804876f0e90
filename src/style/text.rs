use std::borrow::Cow;

use crate::style::model::{CaptionStyle, TextCasing};

/// Characters removed by `removePunctuation`. Nothing else is stripped.
pub const STRIPPED_PUNCTUATION: [char; 6] = ['.', ',', '?', '!', ':', ';'];

/// Apply punctuation stripping, then casing, in that fixed order.
pub fn transform_text(text: &str, style: &CaptionStyle) -> String {
    let stripped: Cow<'_, str> = if style.remove_punctuation {
        Cow::Owned(text.replace(STRIPPED_PUNCTUATION, ""))
    } else {
        Cow::Borrowed(text)
    };
    apply_casing(&stripped, style.casing)
}

/// Unicode-aware casing (`š` ↔ `Š`, `đ` ↔ `Đ`, ...).
pub fn apply_casing(text: &str, casing: TextCasing) -> String {
    match casing {
        TextCasing::None => text.to_owned(),
        TextCasing::Uppercase => text.to_uppercase(),
        TextCasing::Lowercase => text.to_lowercase(),
        TextCasing::Titlecase => title_case(text),
    }
}

fn title_case(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut at_word_start = true;
    for ch in lower.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            out.push(ch);
        } else if at_word_start {
            at_word_start = false;
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/style/text.rs"]
mod tests;
