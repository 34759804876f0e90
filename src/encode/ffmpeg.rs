use std::io::{Read as _, Write as _};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::encode::sink::{Container, FrameSink, SinkConfig};
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::backend::{FrameRGBA, byte_len};

/// VP9 target bitrate for WebM output.
pub const WEBM_BITRATE: &str = "16M";

/// Whether an `ffmpeg` binary can be spawned.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Create the parent directory of `path` when missing.
pub fn ensure_parent_dir(path: &Path) -> CaptionResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Codec arguments for `container`.
fn codec_args(container: Container) -> Vec<&'static str> {
    match container {
        // libx264 with yuv420p needs even dimensions; pad by one pixel when the source is odd.
        Container::Mp4 => vec![
            "-vf",
            "pad=ceil(iw/2)*2:ceil(ih/2)*2",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
            "-f",
            "mp4",
        ],
        Container::Webm => vec![
            "-c:v",
            "libvpx-vp9",
            "-b:v",
            WEBM_BITRATE,
            "-pix_fmt",
            "yuv420p",
            "-f",
            "webm",
        ],
    }
}

struct Running {
    child: Child,
    stdin: Option<ChildStdin>,
    stderr: Option<JoinHandle<String>>,
    width: u32,
    height: u32,
}

/// Encodes frames with the system `ffmpeg` binary, video only.
///
/// Frames are piped as raw RGBA; translucent pixels are flattened over the background color
/// first.
pub struct FfmpegSink {
    bg_rgb: [u8; 3],
    running: Option<Running>,
    scratch: Vec<u8>,
}

impl std::fmt::Debug for FfmpegSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegSink")
            .field("bg_rgb", &self.bg_rgb)
            .field("running", &self.running.is_some())
            .finish()
    }
}

impl Default for FfmpegSink {
    fn default() -> Self {
        Self::new([0, 0, 0])
    }
}

impl FfmpegSink {
    /// A sink flattening translucent pixels over `bg_rgb`.
    pub fn new(bg_rgb: [u8; 3]) -> Self {
        Self {
            bg_rgb,
            running: None,
            scratch: Vec::new(),
        }
    }
}

impl FrameSink for FfmpegSink {
    #[tracing::instrument(level = "debug", skip_all, fields(path = %cfg.path.display()))]
    fn begin(&mut self, cfg: &SinkConfig) -> CaptionResult<()> {
        if self.running.is_some() {
            return Err(CaptionError::encoding("ffmpeg sink is already running"));
        }
        ensure_parent_dir(&cfg.path)?;
        if !is_ffmpeg_on_path() {
            return Err(CaptionError::encoding(
                "ffmpeg is required for encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .args([
                "-y",
                "-loglevel",
                "error",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "-s",
                &format!("{}x{}", cfg.canvas.width, cfg.canvas.height),
                "-r",
                &format!("{}/{}", cfg.fps.num, cfg.fps.den),
                "-i",
                "pipe:0",
                "-an",
            ])
            .args(codec_args(cfg.container))
            .arg(&cfg.path);

        let mut child = cmd.spawn().map_err(|e| {
            CaptionError::encoding(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| CaptionError::encoding("failed to open ffmpeg stdin (unexpected)"))?;
        // Drain stderr continuously so a chatty encoder never blocks on a full pipe.
        let stderr = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut s = String::new();
                let _ = pipe.read_to_string(&mut s);
                s
            })
        });

        self.scratch = vec![0u8; byte_len(cfg.canvas.width, cfg.canvas.height)?];
        self.running = Some(Running {
            child,
            stdin: Some(stdin),
            stderr,
            width: cfg.canvas.width,
            height: cfg.canvas.height,
        });
        Ok(())
    }

    fn push_frame(&mut self, frame: &FrameRGBA) -> CaptionResult<()> {
        let Some(run) = self.running.as_mut() else {
            return Err(CaptionError::encoding("ffmpeg sink is not running"));
        };
        if frame.width != run.width || frame.height != run.height {
            return Err(CaptionError::encoding(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, run.width, run.height
            )));
        }
        flatten_to_opaque_rgba8(&mut self.scratch, &frame.data, frame.premultiplied, self.bg_rgb)?;

        let Some(stdin) = run.stdin.as_mut() else {
            return Err(CaptionError::encoding("ffmpeg encoder is already finalized"));
        };
        stdin.write_all(&self.scratch).map_err(|e| {
            CaptionError::encoding(format!("failed to write frame to ffmpeg stdin: {e}"))
        })
    }

    fn end(&mut self) -> CaptionResult<()> {
        let Some(mut run) = self.running.take() else {
            return Err(CaptionError::encoding("ffmpeg sink is not running"));
        };
        drop(run.stdin.take());
        let status = run
            .child
            .wait()
            .map_err(|e| CaptionError::encoding(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr = run
            .stderr
            .take()
            .and_then(|h| h.join().ok())
            .unwrap_or_default();
        if !status.success() {
            return Err(CaptionError::encoding(format!(
                "ffmpeg exited with status {status}: {}",
                stderr.trim()
            )));
        }
        Ok(())
    }

    fn abort(&mut self) {
        if let Some(mut run) = self.running.take() {
            drop(run.stdin.take());
            let _ = run.child.kill();
            let _ = run.child.wait();
        }
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        self.abort();
    }
}

pub(crate) fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgb: [u8; 3],
) -> CaptionResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(CaptionError::encoding(
            "frame buffer does not match the configured frame size",
        ));
    }
    let bg = bg_rgb.map(u16::from);

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255u16 - a;
        for c in 0..3 {
            let fg = if src_is_premul {
                u16::from(s[c])
            } else {
                mul_div255_u16(u16::from(s[c]), a)
            };
            d[c] = (fg + mul_div255_u16(bg[c], inv)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
