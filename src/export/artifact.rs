use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::encode::sink::Container;
use crate::foundation::error::{CaptionError, CaptionResult};

/// `{prefix}_{unix_millis}.{ext}`.
pub fn artifact_file_name(prefix: &str, container: Container, unix_millis: u128) -> String {
    format!("{prefix}_{unix_millis}.{}", container.extension())
}

/// Milliseconds since the Unix epoch, or 0 on a clock set before it.
pub(crate) fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Output file being written under a `.partial` name.
///
/// [`PartialArtifact::commit`] renames it into place. Dropping it uncommitted removes whatever
/// was written, so an abandoned or failed export never leaves a file behind.
#[derive(Debug)]
pub(crate) struct PartialArtifact {
    final_path: PathBuf,
    partial_path: PathBuf,
    committed: bool,
}

impl PartialArtifact {
    pub fn new(dir: &Path, prefix: &str, container: Container, unix_millis: u128) -> Self {
        let name = artifact_file_name(prefix, container, unix_millis);
        let final_path = dir.join(&name);
        let partial_path = dir.join(format!("{name}.partial"));
        Self {
            final_path,
            partial_path,
            committed: false,
        }
    }

    pub fn partial_path(&self) -> &Path {
        &self.partial_path
    }

    /// Move the written file into place. `Ok(None)` when the sink wrote no file.
    /// On failure the partial file is still removed when `self` drops.
    pub fn commit(mut self) -> CaptionResult<Option<PathBuf>> {
        if !self.partial_path.exists() {
            self.committed = true;
            return Ok(None);
        }
        std::fs::rename(&self.partial_path, &self.final_path).map_err(|e| {
            CaptionError::encoding(format!(
                "failed to move '{}' into place: {e}",
                self.partial_path.display()
            ))
        })?;
        self.committed = true;
        Ok(Some(self.final_path.clone()))
    }
}

impl Drop for PartialArtifact {
    fn drop(&mut self) {
        if !self.committed
            && self.partial_path.exists()
            && let Err(e) = std::fs::remove_file(&self.partial_path)
        {
            tracing::warn!(
                path = %self.partial_path.display(),
                error = %e,
                "failed to remove partial export"
            );
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/artifact.rs"]
mod tests;
