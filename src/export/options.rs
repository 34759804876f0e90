use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::encode::sink::Container;
use crate::foundation::core::Fps;
use crate::foundation::error::{CaptionError, CaptionResult};

/// How the export loop advances time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// Follow a playback clock; each tick renders whatever time playback has reached.
    Realtime,
    /// Seek to `n / fps` for every step `n`; frame-accurate, not tied to wall-clock time.
    #[default]
    Step,
}

impl std::str::FromStr for ExportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "realtime" | "real-time" => Ok(Self::Realtime),
            "step" => Ok(Self::Step),
            other => Err(format!("unknown export mode \"{other}\" (expected realtime or step)")),
        }
    }
}

/// Export options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOpts {
    /// Loop mode.
    pub mode: ExportMode,
    /// Output frame rate.
    pub fps: Fps,
    /// Directory the artifact is written to.
    pub out_dir: PathBuf,
    /// File name prefix; the artifact is `{prefix}_{unix_millis}.{ext}`.
    pub prefix: String,
    /// Container and codec.
    pub container: Container,
    /// How long a step seek may take to settle.
    #[serde(with = "secs")]
    pub seek_timeout: Duration,
    /// How long source metadata may take to arrive.
    #[serde(with = "secs")]
    pub metadata_timeout: Duration,
}

impl Default for ExportOpts {
    fn default() -> Self {
        Self {
            mode: ExportMode::Step,
            fps: Fps::default(),
            out_dir: PathBuf::from("."),
            prefix: "captions".to_owned(),
            container: Container::Mp4,
            seek_timeout: Duration::from_secs(10),
            metadata_timeout: Duration::from_secs(10),
        }
    }
}

impl ExportOpts {
    /// Reject option combinations no export can run with.
    pub fn validate(&self) -> CaptionResult<()> {
        Fps::new(self.fps.num, self.fps.den)?;
        if self.prefix.trim().is_empty() {
            return Err(CaptionError::validation("export prefix must not be empty"));
        }
        if self
            .prefix
            .chars()
            .any(|c| std::path::is_separator(c) || c == '\0')
        {
            return Err(CaptionError::validation(
                "export prefix must not contain path separators",
            ));
        }
        if self.seek_timeout.is_zero() || self.metadata_timeout.is_zero() {
            return Err(CaptionError::validation("export timeouts must be > 0"));
        }
        Ok(())
    }
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let v = f64::deserialize(d)?;
        Duration::try_from_secs_f64(v).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/options.rs"]
mod tests;
