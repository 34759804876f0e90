use super::*;

const FONT_CANDIDATES: [&str; 5] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
];

fn any_font() -> Option<&'static Path> {
    FONT_CANDIDATES
        .iter()
        .map(Path::new)
        .find(|p| p.is_file())
}

#[test]
fn empty_book_cannot_resolve() {
    let book = FontBook::new();
    assert!(book.is_empty());
    let err = book.resolve_family("Montserrat").unwrap_err();
    assert!(matches!(err, CaptionError::Validation(_)));
}

#[test]
fn garbage_bytes_register_nothing() {
    let mut book = FontBook::new();
    assert!(book.add_font_bytes(b"not a font".to_vec()).is_err());
    assert!(book.is_empty());
}

#[test]
fn missing_font_file_is_a_validation_error() {
    let mut book = FontBook::new();
    let err = book
        .add_font_file(Path::new("/definitely/not/here.ttf"))
        .unwrap_err();
    assert!(matches!(err, CaptionError::Validation(_)));
}

#[test]
fn resolves_case_insensitively_and_falls_back() {
    let Some(path) = any_font() else {
        eprintln!("skipping: no system font found");
        return;
    };
    let mut book = FontBook::new();
    let names = book.add_font_file(path).unwrap();
    let family = names[0].clone();

    assert_eq!(book.resolve_family(&family.to_uppercase()).unwrap(), family);
    assert_eq!(book.resolve_family("No Such Family").unwrap(), family);
}

#[test]
fn shaping_produces_glyphs_and_scales_with_size() {
    let Some(path) = any_font() else {
        eprintln!("skipping: no system font found");
        return;
    };
    let mut book = FontBook::new();
    book.add_font_file(path).unwrap();
    let mut engine = TextLayoutEngine::new(book);

    let small = engine.shape("HELLO", "whatever", 900, 20.0).unwrap();
    let large = engine.shape("HELLO", "whatever", 900, 40.0).unwrap();
    let glyphs: usize = small.runs.iter().map(|r| r.glyphs.len()).sum();
    assert_eq!(glyphs, 5);
    assert!(large.width > small.width * 1.8);
    assert!(large.height > small.height);

    let again = engine.shape("HELLO", "whatever", 900, 40.0).unwrap();
    assert_eq!(again.width, large.width);
}

#[test]
fn line_box_follows_the_preview_line_height() {
    let Some(path) = any_font() else {
        eprintln!("skipping: no system font found");
        return;
    };
    let mut book = FontBook::new();
    book.add_font_file(path).unwrap();
    let mut engine = TextLayoutEngine::new(book);

    for size in [40.0, 96.0] {
        let shaped = engine.shape("Hg", "whatever", 700, size).unwrap();
        let expected = f64::from(size) * LINE_HEIGHT;
        assert!(
            (shaped.height - expected).abs() < 1.0,
            "size {size}: height {} expected {expected}",
            shaped.height
        );
    }
}

#[test]
fn shaping_rejects_bad_sizes() {
    let mut engine = TextLayoutEngine::new(FontBook::new());
    assert!(engine.shape("HI", "x", 500, 0.0).is_err());
    assert!(engine.shape("HI", "x", 500, f32::NAN).is_err());
}
