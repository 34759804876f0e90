use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::plan::LINE_HEIGHT;

/// File extensions picked up by [`FontBook::add_font_dir`].
const FONT_EXTENSIONS: [&str; 4] = ["ttf", "otf", "ttc", "otc"];

/// Font faces available to the pixel compositor.
///
/// Style documents name a family (`"Montserrat"`); the book resolves that name against the
/// registered faces case-insensitively and falls back to the first registered family, the way a
/// browser falls back to its default sans-serif face.
pub struct FontBook {
    font_ctx: parley::FontContext,
    families: Vec<String>,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("families", &self.families)
            .finish_non_exhaustive()
    }
}

impl FontBook {
    /// An empty book.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            families: Vec::new(),
        }
    }

    /// Register every face contained in `bytes`. Returns the family names found.
    pub fn add_font_bytes(&mut self, bytes: Vec<u8>) -> CaptionResult<Vec<String>> {
        let registered = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes), None);
        if registered.is_empty() {
            return Err(CaptionError::validation(
                "no font families registered from font bytes",
            ));
        }

        let mut names = Vec::with_capacity(registered.len());
        for (family_id, _) in registered {
            let Some(name) = self.font_ctx.collection.family_name(family_id) else {
                continue;
            };
            let name = name.to_owned();
            if !self.families.iter().any(|f| f == &name) {
                self.families.push(name.clone());
            }
            names.push(name);
        }
        Ok(names)
    }

    /// Register the faces of one font file.
    pub fn add_font_file(&mut self, path: &Path) -> CaptionResult<Vec<String>> {
        let bytes = std::fs::read(path).map_err(|e| {
            CaptionError::validation(format!("read font '{}': {e}", path.display()))
        })?;
        let names = self.add_font_bytes(bytes)?;
        tracing::debug!(path = %path.display(), families = ?names, "registered font file");
        Ok(names)
    }

    /// Register every font file below `dir`, recursively. Unreadable files are skipped.
    /// Returns the number of files registered.
    pub fn add_font_dir(&mut self, dir: &Path) -> CaptionResult<usize> {
        let mut stack = vec![dir.to_path_buf()];
        let mut count = 0usize;
        while let Some(d) = stack.pop() {
            let entries = std::fs::read_dir(&d).map_err(|e| {
                CaptionError::validation(format!("read font dir '{}': {e}", d.display()))
            })?;
            let mut paths: Vec<_> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
            paths.sort();
            for path in paths {
                if path.is_dir() {
                    stack.push(path);
                    continue;
                }
                let is_font = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| FONT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
                if !is_font {
                    continue;
                }
                match self.add_font_file(&path) {
                    Ok(_) => count += 1,
                    Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping font"),
                }
            }
        }
        Ok(count)
    }

    /// Register fonts from the platform's usual font directories. Returns the number of files
    /// registered; missing directories are ignored.
    pub fn add_system_fonts(&mut self) -> usize {
        let mut count = 0;
        for dir in system_font_dirs() {
            if dir.is_dir() {
                count += self.add_font_dir(&dir).unwrap_or(0);
            }
        }
        tracing::debug!(files = count, families = self.families.len(), "loaded system fonts");
        count
    }

    /// Registered family names, in registration order.
    pub fn families(&self) -> &[String] {
        &self.families
    }

    /// Whether no face has been registered.
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Registered family name to use for `requested`.
    pub fn resolve_family(&self, requested: &str) -> CaptionResult<&str> {
        let requested = requested.trim();
        if let Some(found) = self
            .families
            .iter()
            .find(|f| f.eq_ignore_ascii_case(requested))
        {
            return Ok(found);
        }
        self.families
            .first()
            .map(String::as_str)
            .ok_or_else(|| CaptionError::validation("no fonts registered"))
    }
}

fn system_font_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![
        PathBuf::from("/usr/share/fonts"),
        PathBuf::from("/usr/local/share/fonts"),
        PathBuf::from("/Library/Fonts"),
        PathBuf::from("/System/Library/Fonts"),
        PathBuf::from("C:\\Windows\\Fonts"),
    ];
    if let Some(home) = std::env::var_os("HOME") {
        let home = PathBuf::from(home);
        dirs.push(home.join(".fonts"));
        dirs.push(home.join(".local/share/fonts"));
        dirs.push(home.join("Library/Fonts"));
    }
    dirs
}

#[derive(Clone, Debug, PartialEq)]
struct LayoutKey {
    text: String,
    family: String,
    weight: u16,
    size_bits: u32,
}

/// One run of positioned glyphs sharing a face and size.
#[derive(Clone, Debug)]
pub(crate) struct ShapedRun {
    pub font: vello_cpu::peniko::FontData,
    pub font_size: f32,
    pub glyphs: Vec<vello_cpu::Glyph>,
}

/// A shaped, unwrapped line of text in layout space (origin at the top-left of the line box).
#[derive(Clone, Debug)]
pub(crate) struct ShapedText {
    pub width: f64,
    pub height: f64,
    pub runs: Vec<ShapedRun>,
}

/// Shapes caption text with parley and converts the glyph runs for vello_cpu.
pub(crate) struct TextLayoutEngine {
    book: FontBook,
    layout_ctx: parley::LayoutContext<()>,
    last: Option<(LayoutKey, ShapedText)>,
    faces: HashMap<(u64, u32), vello_cpu::peniko::FontData>,
}

impl TextLayoutEngine {
    pub(crate) fn new(book: FontBook) -> Self {
        Self {
            book,
            layout_ctx: parley::LayoutContext::new(),
            last: None,
            faces: HashMap::new(),
        }
    }

    pub(crate) fn book(&self) -> &FontBook {
        &self.book
    }

    /// Shape a single unwrapped line. Repeated calls with identical input reuse the last result,
    /// which is the common case while a segment's animation has settled.
    pub(crate) fn shape(
        &mut self,
        text: &str,
        family: &str,
        weight: u16,
        size_px: f32,
    ) -> CaptionResult<ShapedText> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(CaptionError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let family_name = self.book.resolve_family(family)?.to_owned();
        let key = LayoutKey {
            text: text.to_owned(),
            family: family_name.clone(),
            weight,
            size_bits: size_px.to_bits(),
        };
        if let Some((k, shaped)) = &self.last
            && *k == key
        {
            return Ok(shaped.clone());
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.book.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(f32::from(weight)),
        ));
        builder.push_default(parley::style::StyleProperty::LineHeight(
            parley::style::LineHeight::FontSizeRelative(LINE_HEIGHT as f32),
        ));
        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);

        let mut runs = Vec::new();
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let font = run.run().font();
                let face = self
                    .faces
                    .entry((font.data.id(), font.index))
                    .or_insert_with(|| {
                        vello_cpu::peniko::FontData::new(
                            vello_cpu::peniko::Blob::from(font.data.data().to_vec()),
                            font.index,
                        )
                    })
                    .clone();
                let glyphs = run
                    .positioned_glyphs()
                    .map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    })
                    .collect();
                runs.push(ShapedRun {
                    font: face,
                    font_size: run.run().font_size(),
                    glyphs,
                });
            }
        }

        let shaped = ShapedText {
            width: f64::from(layout.width()),
            height: f64::from(layout.height()),
            runs,
        };
        self.last = Some((key, shaped.clone()));
        Ok(shaped)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/fonts.rs"]
mod tests;
