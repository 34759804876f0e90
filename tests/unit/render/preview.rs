use super::*;
use crate::style::color::Rgba8;
use crate::timing::animation::AnimFactors;

fn frame(text: &str, key: &str) -> RenderFrame {
    RenderFrame {
        active_text: text.to_owned(),
        segment_anchor_time: 0.0,
        elapsed_in_segment: 1.0,
        anim: AnimFactors::IDENTITY,
        key: Some(key.to_owned()),
    }
}

fn viewport() -> Canvas {
    Canvas::new(1280, 720).unwrap()
}

#[test]
fn nothing_on_screen_builds_no_node() {
    assert!(preview_node(&RenderFrame::empty(), &CaptionStyle::default(), viewport()).is_none());
}

#[test]
fn default_style_declarations() {
    let node = preview_node(&frame("HELLO", "c0-w-0"), &CaptionStyle::default(), viewport())
        .unwrap();
    assert_eq!(node.key, "c0-w-0");
    assert_eq!(node.text, "HELLO");
    assert_eq!(node.declaration("left"), Some("640px"));
    assert_eq!(node.declaration("top"), Some("612px"));
    assert_eq!(node.declaration("font-size"), Some("56px"));
    assert_eq!(node.declaration("font-weight"), Some("900"));
    assert_eq!(
        node.declaration("font-family"),
        Some("'Montserrat', sans-serif")
    );
    assert_eq!(node.declaration("color"), Some("rgba(255, 255, 255, 1)"));
    assert_eq!(
        node.declaration("-webkit-text-stroke"),
        Some("5px rgba(0, 0, 0, 1)")
    );
    assert_eq!(
        node.declaration("text-shadow"),
        Some("4px 4px 10px rgba(0, 0, 0, 0.6)")
    );
    assert_eq!(node.declaration("background-color"), None);
}

#[test]
fn glow_contributes_two_shadows() {
    let style = CaptionStyle {
        shadow_opacity: 0.0,
        glow_intensity: 8.0,
        glow_color: Rgba8::rgb(255, 0, 0),
        glow_opacity: 0.5,
        ..CaptionStyle::default()
    };
    let node = preview_node(&frame("HI", "k"), &style, viewport()).unwrap();
    assert_eq!(
        node.declaration("text-shadow"),
        Some("0px 0px 8px rgba(255, 0, 0, 0.5), 0px 0px 8px rgba(255, 0, 0, 0.5)")
    );
}

#[test]
fn animation_shows_up_as_size_and_opacity() {
    let mut f = frame("HI", "k");
    f.anim = AnimFactors {
        scale: 0.5,
        opacity: 0.25,
        y_offset: 20.0,
    };
    let node = preview_node(&f, &CaptionStyle::default(), viewport()).unwrap();
    assert_eq!(node.declaration("font-size"), Some("28px"));
    assert_eq!(node.declaration("opacity"), Some("0.25"));
    assert_eq!(node.declaration("top"), Some("632px"));
}

#[test]
fn background_box_maps_to_padding_and_radius() {
    let style = CaptionStyle {
        background_opacity: 0.5,
        ..CaptionStyle::default()
    };
    let node = preview_node(&frame("HI", "k"), &style, viewport()).unwrap();
    assert_eq!(
        node.declaration("background-color"),
        Some("rgba(0, 0, 0, 0.5)")
    );
    assert_eq!(node.declaration("padding"), Some("8px 24px"));
    assert_eq!(node.declaration("border-radius"), Some("8px"));
}

#[test]
fn html_escapes_text_and_attributes() {
    let style = CaptionStyle {
        font_family: "A\"B".to_owned(),
        ..CaptionStyle::default()
    };
    let node = preview_node(&frame("<b>&</b>", "k"), &style, viewport()).unwrap();
    let html = node.to_html();
    assert!(html.contains("&lt;b&gt;&amp;&lt;/b&gt;"));
    assert!(html.contains("A&quot;B"));
    assert!(!html.contains("<b>"));
}
