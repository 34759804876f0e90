use crate::foundation::core::Canvas;
use crate::render::plan::{CaptionDrawList, PaintOp, PassKind, plan_caption};
use crate::style::color::trim_float;
use crate::style::model::CaptionStyle;
use crate::timing::frame::RenderFrame;

/// Declarative rendering of one caption for an HTML/CSS overlay.
///
/// Built from the same [`CaptionDrawList`] as the pixel compositor, so position, size, weight,
/// decoration and animation match the burned-in export. `key` changes whenever the displayed
/// segment changes, which lets a diffing view restart its entry animation.
#[derive(Clone, Debug, PartialEq)]
pub struct PreviewNode {
    /// Segment diff key (`{id}-w-{i}`, `{id}-p-{i}`, or the caption id).
    pub key: String,
    /// Text content.
    pub text: String,
    /// CSS declarations, in emission order.
    pub declarations: Vec<(&'static str, String)>,
}

impl PreviewNode {
    /// Inline CSS (`prop: value; ...`).
    pub fn css(&self) -> String {
        self.declarations
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Value of one declaration.
    pub fn declaration(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(k, _)| *k == property)
            .map(|(_, v)| v.as_str())
    }

    /// A `<div>` element carrying the styles, with escaped text and attributes.
    pub fn to_html(&self) -> String {
        format!(
            "<div data-key=\"{}\" style=\"{}\">{}</div>",
            escape_html(&self.key),
            escape_html(&self.css()),
            escape_html(&self.text)
        )
    }
}

/// Build the preview node for `frame` on a `viewport`-sized player. `None` when nothing is on
/// screen.
pub fn preview_node(
    frame: &RenderFrame,
    style: &CaptionStyle,
    viewport: Canvas,
) -> Option<PreviewNode> {
    let list = plan_caption(frame, style, viewport)?;
    Some(PreviewNode {
        key: frame.key.clone().unwrap_or_default(),
        text: list.text.clone(),
        declarations: declarations(&list),
    })
}

fn px(v: f64) -> String {
    format!("{}px", trim_float(v))
}

fn declarations(list: &CaptionDrawList) -> Vec<(&'static str, String)> {
    let mut out = vec![
        ("position", "absolute".to_owned()),
        ("left", px(list.anchor.x)),
        ("top", px(list.anchor.y)),
        ("transform", "translate(-50%, -50%)".to_owned()),
        ("white-space", "pre".to_owned()),
        ("text-align", "center".to_owned()),
        ("line-height", trim_float(crate::render::plan::LINE_HEIGHT)),
        ("font-family", format!("'{}', sans-serif", list.font_family)),
        ("font-size", px(list.font_size_px)),
        ("font-weight", list.font_weight.to_string()),
        ("opacity", trim_float(list.opacity)),
    ];

    let mut shadows = Vec::new();
    for pass in &list.passes {
        match (pass.kind, pass.op) {
            (PassKind::Fill, _) => out.push(("color", pass.color.css_rgba(1.0))),
            (PassKind::Stroke, PaintOp::Stroke { width_px }) => {
                // Half of the stroke sits under the fill, as on the canvas.
                out.push((
                    "-webkit-text-stroke",
                    format!("{} {}", px(width_px), pass.color.css_rgba(1.0)),
                ));
                out.push(("paint-order", "stroke fill".to_owned()));
            }
            _ => {}
        }
        if let Some(shadow) = pass.shadow {
            shadows.push(format!(
                "{} {} {} {}",
                px(shadow.offset.x),
                px(shadow.offset.y),
                px(shadow.blur_px),
                shadow.color.css_rgba(pass.opacity)
            ));
        }
    }
    if !shadows.is_empty() {
        out.push(("text-shadow", shadows.join(", ")));
    }

    if let Some(bg) = list.background {
        out.push(("background-color", bg.color.css_rgba(bg.opacity)));
        out.push((
            "padding",
            format!("{} {}", px(bg.padding.y), px(bg.padding.x)),
        ));
        out.push(("border-radius", px(bg.corner_radius)));
    }
    out
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/preview.rs"]
mod tests;
