use super::*;

fn track() -> CaptionTrack {
    CaptionTrack::new(vec![
        Caption::new("a", "Dobro jutro", 0.0, 1.0),
        Caption::new("b", "Kako ste", 1.0, 2.0),
        Caption::new("c", "Hvala", 2.0, 3.0),
    ])
}

#[test]
fn set_end_moves_next_start() {
    let mut t = track();
    t.set_time(&CaptionId::new("a"), TimeField::End, 1.234).unwrap();
    assert_eq!(t.as_slice()[0].end, 1.23);
    assert_eq!(t.as_slice()[1].start, 1.23);
    assert_eq!(t.as_slice()[1].end, 2.0);
}

#[test]
fn set_start_moves_previous_end_and_clamps_negative() {
    let mut t = track();
    t.set_time(&CaptionId::new("c"), TimeField::Start, 1.876).unwrap();
    assert_eq!(t.as_slice()[2].start, 1.88);
    assert_eq!(t.as_slice()[1].end, 1.88);

    t.set_time(&CaptionId::new("a"), TimeField::Start, -4.0).unwrap();
    assert_eq!(t.as_slice()[0].start, 0.0);
}

#[test]
fn edge_captions_have_no_neighbor_to_move() {
    let mut t = track();
    t.set_time(&CaptionId::new("c"), TimeField::End, 9.0).unwrap();
    t.set_time(&CaptionId::new("a"), TimeField::Start, 0.5).unwrap();
    assert_eq!(t.as_slice()[2].end, 9.0);
    assert_eq!(t.as_slice()[0].start, 0.5);
    assert_eq!(t.len(), 3);
}

#[test]
fn unknown_id_and_nan_are_rejected() {
    let mut t = track();
    assert!(t.set_text(&CaptionId::new("zzz"), "x").is_err());
    assert!(
        t.set_time(&CaptionId::new("a"), TimeField::End, f64::NAN)
            .is_err()
    );
}

#[test]
fn remove_keeps_neighbor_bounds() {
    let mut t = track();
    let removed = t.remove(&CaptionId::new("b")).unwrap();
    assert_eq!(removed.text, "Kako ste");
    assert_eq!(t.len(), 2);
    assert_eq!(t.as_slice()[0].end, 1.0);
    assert_eq!(t.as_slice()[1].start, 2.0);
}

#[test]
fn split_to_words_divides_evenly_and_keeps_single_words() {
    let mut t = CaptionTrack::new(vec![
        Caption::new("a", "jedan dva tri", 0.0, 1.0),
        Caption::new("b", "sam", 1.0, 2.0),
    ]);
    t.split_to_words(42);
    let c = t.as_slice();
    assert_eq!(c.len(), 4);
    assert_eq!(c[0].id.as_str(), "split-a-0-42");
    assert_eq!(c[0].text, "jedan");
    assert_eq!((c[0].start, c[0].end), (0.0, 0.33));
    assert_eq!((c[1].start, c[1].end), (0.33, 0.67));
    assert_eq!((c[2].start, c[2].end), (0.67, 1.0));
    assert_eq!(c[3].id.as_str(), "b");
}

#[test]
fn set_text_replaces_text() {
    let mut t = track();
    t.set_text(&CaptionId::new("c"), "Hvala vam").unwrap();
    assert_eq!(t.as_slice()[2].text, "Hvala vam");
}
