use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::caption::model::Caption;
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::style::model::CaptionStyle;

/// A saved project: source video, captions and style.
///
/// ```json
/// { "video": "clip.mp4", "captions": [{"id": "c0", "text": "Zdravo", "start": 0, "end": 1}],
///   "style": { "fontSize": 64, "animation": "fade" } }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    /// Source video. Relative paths are resolved against the project file's directory on load,
    /// so a loaded project always holds an absolute path here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<PathBuf>,
    /// Captions in timeline order.
    #[serde(default)]
    pub captions: Vec<Caption>,
    /// Caption style; missing fields take their defaults.
    #[serde(default)]
    pub style: CaptionStyle,
}

impl ProjectFile {
    /// Parse a project document. `base_dir` anchors a relative `video` path.
    pub fn from_json_str(body: &str, base_dir: Option<&Path>) -> CaptionResult<Self> {
        let mut project: Self = serde_json::from_str(body)?;
        if let (Some(base), Some(video)) = (base_dir, project.video.as_mut())
            && video.is_relative()
        {
            *video = base.join(&*video);
        }
        project.validate()?;
        Ok(project)
    }

    /// Read and parse a project file.
    pub fn load(path: &Path) -> CaptionResult<Self> {
        let body = std::fs::read_to_string(path).map_err(|e| {
            CaptionError::validation(format!("read project '{}': {e}", path.display()))
        })?;
        let base = absolute_dir(path)?;
        Self::from_json_str(&body, Some(&base))
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> CaptionResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the project as pretty JSON. A video under the target's directory is written
    /// relative to it so that [`ProjectFile::load`] resolves it back to the same file.
    pub fn save(&self, path: &Path) -> CaptionResult<()> {
        let base = absolute_dir(path)?;
        let mut stored = self.clone();
        if let Some(video) = stored.video.as_mut()
            && let Ok(abs) = std::path::absolute(&*video)
            && let Ok(rel) = abs.strip_prefix(&base)
        {
            *video = rel.to_path_buf();
        }
        let body = stored.to_json_pretty()?;
        std::fs::write(path, body).map_err(|e| {
            CaptionError::validation(format!("write project '{}': {e}", path.display()))
        })
    }

    /// Check the style and every caption's bounds.
    pub fn validate(&self) -> CaptionResult<()> {
        self.style.validate()?;
        for c in &self.captions {
            c.validate()?;
        }
        Ok(())
    }
}

/// Absolute directory holding the project file at `path`.
fn absolute_dir(path: &Path) -> CaptionResult<PathBuf> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::path::absolute(parent).map_err(|e| {
        CaptionError::validation(format!("resolve project dir '{}': {e}", parent.display()))
    })
}

#[cfg(test)]
#[path = "../tests/unit/project.rs"]
mod tests;
