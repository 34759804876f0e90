use super::*;
use crate::style::model::{AnimationKind, VerticalPosition};
use crate::timing::animation::AnimFactors;

fn frame(text: &str, anim: AnimFactors) -> RenderFrame {
    RenderFrame {
        active_text: text.to_owned(),
        segment_anchor_time: 0.0,
        elapsed_in_segment: 1.0,
        anim,
        key: Some("c-w-0".to_owned()),
    }
}

fn canvas_1080p() -> Canvas {
    Canvas::new(1920, 1080).unwrap()
}

fn kinds(list: &CaptionDrawList) -> Vec<PassKind> {
    list.passes.iter().map(|p| p.kind).collect()
}

#[test]
fn empty_frame_plans_nothing() {
    let style = CaptionStyle::default();
    assert!(plan_caption(&RenderFrame::empty(), &style, canvas_1080p()).is_none());
}

#[test]
fn default_style_has_shadow_stroke_fill_in_order() {
    let style = CaptionStyle::default();
    let list = plan_caption(&frame("HI", AnimFactors::IDENTITY), &style, canvas_1080p()).unwrap();
    assert_eq!(
        kinds(&list),
        vec![PassKind::Shadow, PassKind::Stroke, PassKind::Fill]
    );
    assert!(list.background.is_none());
}

#[test]
fn glow_adds_two_identical_passes_before_stroke() {
    let style = CaptionStyle {
        glow_intensity: 12.0,
        ..CaptionStyle::default()
    };
    let list = plan_caption(&frame("HI", AnimFactors::IDENTITY), &style, canvas_1080p()).unwrap();
    assert_eq!(
        kinds(&list),
        vec![
            PassKind::Shadow,
            PassKind::Glow,
            PassKind::Glow,
            PassKind::Stroke,
            PassKind::Fill
        ]
    );
    assert_eq!(list.passes[1], list.passes[2]);
    let glow = list.passes[1].shadow.unwrap();
    assert_eq!(glow.blur_px, 18.0);
    assert_eq!(glow.offset, Vec2::ZERO);
    assert_eq!(glow.color, style.glow_color);
    assert_eq!(list.passes[1].color, style.color);
}

#[test]
fn disabled_decorations_leave_only_fill() {
    let style = CaptionStyle {
        shadow_opacity: 0.0,
        stroke_width: 0.0,
        glow_intensity: 0.0,
        ..CaptionStyle::default()
    };
    let list = plan_caption(&frame("HI", AnimFactors::IDENTITY), &style, canvas_1080p()).unwrap();
    assert_eq!(kinds(&list), vec![PassKind::Fill]);
}

#[test]
fn pixel_values_scale_with_output_height() {
    let style = CaptionStyle::default();
    let list = plan_caption(&frame("HI", AnimFactors::IDENTITY), &style, canvas_1080p()).unwrap();
    assert_eq!(list.resolution_scale, 1.5);
    assert_eq!(list.font_size_px, 84.0);
    assert_eq!(list.font_weight, 900);

    let shadow = list.passes[0].shadow.unwrap();
    assert_eq!(shadow.blur_px, 15.0);
    assert_eq!(shadow.offset, Vec2::new(6.0, 6.0));

    let PaintOp::Stroke { width_px } = list.passes[1].op else {
        panic!("expected stroke pass");
    };
    assert_eq!(width_px, 2.5 * 1.5 * 2.0);
}

#[test]
fn anchor_follows_position_band_and_offsets() {
    let style = CaptionStyle {
        position: VerticalPosition::Top,
        offset_x: 10.0,
        offset_y: 20.0,
        ..CaptionStyle::default()
    };
    let anim = AnimFactors {
        scale: 1.0,
        opacity: 1.0,
        y_offset: 10.0,
    };
    let list = plan_caption(&frame("HI", anim), &style, canvas_1080p()).unwrap();
    // x = 960 + 0.1 * 1920; y = 0.15 * 1080 + (20 + 10) * 1.5
    assert!((list.anchor.x - 1152.0).abs() < 1e-9);
    assert!((list.anchor.y - 207.0).abs() < 1e-9);
}

#[test]
fn animation_scale_and_opacity_flow_into_passes() {
    let style = CaptionStyle {
        animation: AnimationKind::Fade,
        ..CaptionStyle::default()
    };
    let anim = AnimFactors {
        scale: 0.5,
        opacity: 0.5,
        y_offset: 0.0,
    };
    let list = plan_caption(&frame("HI", anim), &style, Canvas::new(1280, 720).unwrap()).unwrap();
    assert_eq!(list.font_size_px, 28.0);
    assert_eq!(list.opacity, 0.5);

    let shadow = &list.passes[0];
    assert!((list.pass_alpha(shadow) - 0.3).abs() < 1e-12);
    let stroke = &list.passes[1];
    assert_eq!(list.pass_alpha(stroke), 0.5);
    let fill = list.passes.last().unwrap();
    assert_eq!(list.pass_alpha(fill), 0.5);
}

#[test]
fn background_box_is_drawn_when_opaque_enough() {
    let style = CaptionStyle {
        background_opacity: 0.5,
        ..CaptionStyle::default()
    };
    let list = plan_caption(&frame("HI", AnimFactors::IDENTITY), &style, canvas_1080p()).unwrap();
    let bg = list.background.unwrap();
    assert_eq!(bg.padding, Vec2::new(36.0, 12.0));
    assert_eq!(bg.corner_radius, 12.0);
    assert_eq!(list.background_alpha(), 0.5);
}

#[test]
fn regular_weight_when_not_bold() {
    let style = CaptionStyle {
        is_bold: false,
        ..CaptionStyle::default()
    };
    let list = plan_caption(&frame("HI", AnimFactors::IDENTITY), &style, canvas_1080p()).unwrap();
    assert_eq!(list.font_weight, 500);
}
