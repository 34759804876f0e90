use super::*;
use crate::style::model::{AnimationKind, DisplayMode, TextCasing};

fn captions() -> Vec<Caption> {
    vec![Caption::new("c0", "Zdravo svete", 0.0, 2.0)]
}

fn style(mode: DisplayMode) -> CaptionStyle {
    CaptionStyle {
        display_mode: mode,
        casing: TextCasing::None,
        remove_punctuation: false,
        animation: AnimationKind::Pop,
        ..CaptionStyle::default()
    }
}

#[test]
fn end_to_end_word_mode_lookup() {
    let f = RenderFrame::at(&captions(), &style(DisplayMode::Word), 1.0);
    assert_eq!(f.active_text, "svete");
    assert_eq!(f.segment_anchor_time, 1.0);
    assert_eq!(f.elapsed_in_segment, 0.0);
    assert!((f.anim.scale - 0.7).abs() < 1e-9);
    assert_eq!(f.key.as_deref(), Some("c0-w-1"));
}

#[test]
fn no_active_caption_is_empty() {
    let f = RenderFrame::at(&captions(), &style(DisplayMode::Word), 2.5);
    assert!(f.is_empty());
    assert_eq!(f, RenderFrame::empty());
}

#[test]
fn elapsed_is_measured_from_segment_anchor() {
    let f = RenderFrame::at(&captions(), &style(DisplayMode::Sentence), 1.3);
    assert_eq!(f.active_text, "Zdravo svete");
    assert!((f.elapsed_in_segment - 1.3).abs() < 1e-12);
    assert_eq!(f.anim.scale, 1.0);
}

#[test]
fn timing_offset_delays_captions() {
    let s = CaptionStyle {
        timing_offset: 0.5,
        ..style(DisplayMode::Word)
    };
    assert!(RenderFrame::at(&captions(), &s, 2.2).key.is_some());
    assert_eq!(RenderFrame::at(&captions(), &s, 1.2).active_text, "Zdravo");
    assert!(RenderFrame::at(&captions(), &s, 2.6).is_empty());
}

#[test]
fn text_that_transforms_to_nothing_is_not_drawn() {
    let caps = vec![Caption::new("c0", "... !!!", 0.0, 1.0)];
    let s = CaptionStyle {
        remove_punctuation: true,
        display_mode: DisplayMode::Sentence,
        ..CaptionStyle::default()
    };
    assert!(RenderFrame::at(&caps, &s, 0.5).is_empty());
}

#[test]
fn transforms_apply_to_selected_segment() {
    let caps = vec![Caption::new("c0", "dobar dan, svete!", 0.0, 3.0)];
    let s = CaptionStyle {
        display_mode: DisplayMode::TwoWords,
        casing: TextCasing::Uppercase,
        remove_punctuation: true,
        ..CaptionStyle::default()
    };
    assert_eq!(RenderFrame::at(&caps, &s, 0.1).active_text, "DOBAR DAN");
    assert_eq!(RenderFrame::at(&caps, &s, 2.9).active_text, "SVETE");
}
