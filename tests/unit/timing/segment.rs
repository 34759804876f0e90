use super::*;

fn cap(text: &str, start: f64, end: f64) -> Caption {
    Caption::new("c1", text, start, end)
}

#[test]
fn sentence_mode_returns_full_text_anchored_at_start() {
    let c = cap("Zdravo svete", 1.0, 3.0);
    let s = select_segment(&c, DisplayMode::Sentence, 2.5);
    assert_eq!(s.text, "Zdravo svete");
    assert_eq!(s.anchor_time, 1.0);
    assert_eq!(s.key(&c), "c1");
}

#[test]
fn word_mode_picks_word_by_even_division() {
    let c = cap("Zdravo svete", 0.0, 2.0);
    let s = select_segment(&c, DisplayMode::Word, 1.0);
    assert_eq!(s.text, "svete");
    assert_eq!(s.span, SegmentSpan::Word(1));
    assert_eq!(s.anchor_time, 1.0);

    let s = select_segment(&c, DisplayMode::Word, 0.99);
    assert_eq!(s.text, "Zdravo");
    assert_eq!(s.anchor_time, 0.0);
}

#[test]
fn word_index_stays_in_bounds_at_and_past_end() {
    let c = cap("a b c d e f g", 0.1, 0.8);
    for i in 0..=1000 {
        let t = 0.1 + 0.7 * (i as f64) / 1000.0;
        let s = select_segment(&c, DisplayMode::Word, t);
        let SegmentSpan::Word(idx) = s.span else {
            panic!("expected word span");
        };
        assert!(idx < 7, "t={t} idx={idx}");
    }
    let at_end = select_segment(&c, DisplayMode::Word, 0.8);
    assert_eq!(at_end.text, "g");
    let past_end = select_segment(&c, DisplayMode::Word, 5.0);
    assert_eq!(past_end.text, "g");
    let before = select_segment(&c, DisplayMode::Word, -1.0);
    assert_eq!(before.text, "a");
}

#[test]
fn two_words_pairs_are_even_aligned_and_stable() {
    let c = cap("jedan dva tri cetiri pet", 0.0, 5.0);
    let first = select_segment(&c, DisplayMode::TwoWords, 0.2);
    let second = select_segment(&c, DisplayMode::TwoWords, 1.7);
    assert_eq!(first.text, "jedan dva");
    assert_eq!(first, second);
    assert_eq!(first.key(&c), "c1-p-0");

    let mid = select_segment(&c, DisplayMode::TwoWords, 3.5);
    assert_eq!(mid.span, SegmentSpan::Pair(2));
    assert_eq!(mid.text, "tri cetiri");
    assert_eq!(mid.anchor_time, 2.0);

    // Odd word count: the last pair holds a single word.
    let last = select_segment(&c, DisplayMode::TwoWords, 5.0);
    assert_eq!(last.span, SegmentSpan::Pair(4));
    assert_eq!(last.text, "pet");
}

#[test]
fn all_pair_indices_are_even() {
    let c = cap("a b c d e f g h i", 0.0, 1.0);
    for i in 0..=200 {
        let t = i as f64 / 200.0;
        let SegmentSpan::Pair(p) = select_segment(&c, DisplayMode::TwoWords, t).span else {
            panic!("expected pair span");
        };
        assert_eq!(p % 2, 0);
    }
}

#[test]
fn single_word_behaves_the_same_in_every_mode() {
    let c = cap("Ćao", 0.0, 1.0);
    for mode in [DisplayMode::Word, DisplayMode::TwoWords, DisplayMode::Sentence] {
        let s = select_segment(&c, mode, 0.7);
        assert_eq!(s.text, "Ćao");
        assert_eq!(s.anchor_time, 0.0);
    }
}

#[test]
fn blank_text_degrades_to_sentence() {
    let c = cap("   ", 0.0, 1.0);
    let s = select_segment(&c, DisplayMode::Word, 0.5);
    assert_eq!(s.span, SegmentSpan::Sentence);
}

#[test]
fn zero_length_caption_does_not_divide_by_zero() {
    let c = cap("a b", 1.0, 1.0);
    let s = select_segment(&c, DisplayMode::Word, 1.0);
    assert_eq!(s.text, "a");
    assert_eq!(s.anchor_time, 1.0);
}

#[test]
fn whitespace_runs_do_not_create_empty_words() {
    let c = cap("  prva   druga  ", 0.0, 2.0);
    assert_eq!(select_segment(&c, DisplayMode::Word, 1.5).text, "druga");
    assert_eq!(select_segment(&c, DisplayMode::TwoWords, 0.0).text, "prva druga");
}
