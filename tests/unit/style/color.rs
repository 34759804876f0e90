use super::*;
use serde_json::json;

#[test]
fn parses_short_long_and_alpha_hex() {
    let c: Rgba8 = serde_json::from_value(json!("#ff0000")).unwrap();
    assert_eq!(c, Rgba8::rgb(255, 0, 0));

    let c: Rgba8 = serde_json::from_value(json!("#F80")).unwrap();
    assert_eq!(c, Rgba8::rgb(255, 136, 0));

    let c: Rgba8 = serde_json::from_value(json!("#0000ff80")).unwrap();
    assert_eq!(c.b, 255);
    assert_eq!(c.a, 128);
}

#[test]
fn parses_object_and_array() {
    let c: Rgba8 = serde_json::from_value(json!({"r": 1, "g": 2, "b": 3})).unwrap();
    assert_eq!(c, Rgba8::rgb(1, 2, 3));

    let c: Rgba8 = serde_json::from_value(json!([1, 2, 3, 4])).unwrap();
    assert_eq!(c, Rgba8 { r: 1, g: 2, b: 3, a: 4 });

    assert!(serde_json::from_value::<Rgba8>(json!([1, 2])).is_err());
}

#[test]
fn rejects_malformed_hex() {
    assert!("#12345".parse::<Rgba8>().is_err());
    assert!("#gg0000".parse::<Rgba8>().is_err());
    assert!("#ééé".parse::<Rgba8>().is_err());
}

#[test]
fn serializes_to_hex_and_back() {
    for c in [Rgba8::rgb(251, 191, 36), Rgba8 { r: 0, g: 0, b: 0, a: 10 }] {
        let v = serde_json::to_value(c).unwrap();
        let back: Rgba8 = serde_json::from_value(v).unwrap();
        assert_eq!(back, c);
    }
    assert_eq!(Rgba8::WHITE.to_hex(), "#ffffff");
}

#[test]
fn css_rgba_scales_alpha() {
    assert_eq!(Rgba8::BLACK.css_rgba(0.6), "rgba(0, 0, 0, 0.6)");
    assert_eq!(Rgba8::WHITE.css_rgba(1.0), "rgba(255, 255, 255, 1)");
    assert_eq!(Rgba8::WHITE.css_rgba(0.0), "rgba(255, 255, 255, 0)");
}

#[test]
fn premul_halves_channels_at_half_alpha() {
    let c = Rgba8 { r: 255, g: 0, b: 100, a: 128 };
    assert_eq!(c.to_premul(), [128, 0, 50, 128]);
}
