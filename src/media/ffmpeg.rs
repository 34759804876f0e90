use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::foundation::core::Fps;
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::media::source::{VideoMetadata, VideoSource};
use crate::render::backend::{FrameRGBA, byte_len};

/// How far ahead of the decoder a request may land before it restarts at the new position
/// instead of discarding frames, in seconds.
const SKIP_AHEAD_SECS: f64 = 2.0;

/// Run `ffprobe` on `path`, giving up after `timeout`.
#[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn probe_video(path: &Path, timeout: Duration) -> CaptionResult<VideoMetadata> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let mut child = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| CaptionError::metadata(format!("failed to run ffprobe: {e}")))?;

    let stdout = read_in_background(child.stdout.take());
    let stderr = read_in_background(child.stderr.take());
    let bytes = match stdout.recv_timeout(timeout) {
        Ok(bytes) => bytes,
        Err(_) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(CaptionError::metadata(format!(
                "metadata for '{}' did not arrive within {timeout:?}",
                path.display()
            )));
        }
    };
    let status = child
        .wait()
        .map_err(|e| CaptionError::metadata(format!("failed to wait for ffprobe: {e}")))?;
    if !status.success() {
        let msg = stderr.recv_timeout(timeout).unwrap_or_default();
        return Err(CaptionError::metadata(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&msg).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&bytes)
        .map_err(|e| CaptionError::metadata(format!("ffprobe json parse failed: {e}")))?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| CaptionError::metadata("no video stream found"))?;
    let width = video
        .width
        .ok_or_else(|| CaptionError::metadata("missing video width from ffprobe"))?;
    let height = video
        .height
        .ok_or_else(|| CaptionError::metadata("missing video height from ffprobe"))?;
    let duration_secs = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or(video.duration.as_deref())
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| CaptionError::metadata("missing duration from ffprobe"))?;
    let fps = video
        .r_frame_rate
        .as_deref()
        .and_then(|r| r.parse::<Fps>().ok());

    let meta = VideoMetadata {
        width,
        height,
        duration_secs,
        fps,
    };
    meta.validate()?;
    tracing::debug!(width, height, duration_secs, "probed video");
    Ok(meta)
}

fn read_in_background<R>(pipe: Option<R>) -> Receiver<Vec<u8>>
where
    R: std::io::Read + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        let _ = tx.send(buf);
    });
    rx
}

/// One running `ffmpeg` decode, emitting frames at a fixed rate from `start_secs`.
struct DecodeStream {
    child: Child,
    frames: Receiver<Vec<u8>>,
    start_secs: f64,
    rate: Fps,
    next_index: u64,
}

impl DecodeStream {
    fn spawn(
        path: &Path,
        meta: &VideoMetadata,
        start_secs: f64,
        rate: Fps,
    ) -> CaptionResult<Self> {
        let frame_len = byte_len(meta.width, meta.height)?;
        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-ss", &format!("{start_secs:.6}")])
            .arg("-i")
            .arg(path)
            .args([
                "-an",
                "-vf",
                &format!("fps={}/{}", rate.num, rate.den),
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| CaptionError::encoding(format!("failed to spawn ffmpeg decoder: {e}")))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| CaptionError::encoding("failed to open ffmpeg stdout (unexpected)"))?;

        // Bounded so the decoder stays at most a few frames ahead of the render loop.
        let (tx, rx) = mpsc::sync_channel::<Vec<u8>>(4);
        std::thread::spawn(move || {
            loop {
                let mut frame = vec![0u8; frame_len];
                if stdout.read_exact(&mut frame).is_err() || tx.send(frame).is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            child,
            frames: rx,
            start_secs,
            rate,
            next_index: 0,
        })
    }

    fn index_for(&self, t: f64) -> Option<u64> {
        let rel = (t - self.start_secs) * self.rate.as_f64();
        (rel > -0.5).then(|| rel.round().max(0.0) as u64)
    }
}

impl Drop for DecodeStream {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

enum Pull {
    Frame(Vec<u8>),
    Ended,
    TimedOut,
}

/// Video file decoded by the system `ffmpeg`.
///
/// Sequential requests (the step-driven export) are served from one long-running decoder;
/// a request behind the decoder, or far ahead of it, restarts decoding at the requested time.
pub struct FfmpegVideoSource {
    path: PathBuf,
    meta: Option<VideoMetadata>,
    rate: Option<Fps>,
    stream: Option<DecodeStream>,
    last: Option<FrameRGBA>,
}

impl std::fmt::Debug for FfmpegVideoSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegVideoSource")
            .field("path", &self.path)
            .field("meta", &self.meta)
            .field("rate", &self.rate)
            .finish_non_exhaustive()
    }
}

impl FfmpegVideoSource {
    /// Source for the video at `path`. Nothing runs until metadata is requested.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            meta: None,
            rate: None,
            stream: None,
            last: None,
        }
    }

    /// Path of the video file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn pull(stream: &mut DecodeStream, timeout: Duration) -> Pull {
        match stream.frames.recv_timeout(timeout) {
            Ok(bytes) => {
                stream.next_index += 1;
                Pull::Frame(bytes)
            }
            Err(RecvTimeoutError::Disconnected) => Pull::Ended,
            Err(RecvTimeoutError::Timeout) => Pull::TimedOut,
        }
    }
}

impl VideoSource for FfmpegVideoSource {
    fn load_metadata(&mut self, timeout: Duration) -> CaptionResult<VideoMetadata> {
        if let Some(meta) = &self.meta {
            return Ok(meta.clone());
        }
        let meta = probe_video(&self.path, timeout)?;
        self.meta = Some(meta.clone());
        Ok(meta)
    }

    fn set_step_rate(&mut self, fps: Fps) {
        if self.rate != Some(fps) {
            self.rate = Some(fps);
            self.stream = None;
        }
    }

    fn frame_at(&mut self, t: f64, timeout: Duration) -> CaptionResult<FrameRGBA> {
        let meta = self
            .meta
            .clone()
            .ok_or_else(|| CaptionError::metadata("frame requested before metadata was loaded"))?;
        let rate = self.rate.or(meta.fps).unwrap_or_default();
        let t = t.clamp(0.0, meta.duration_secs);

        if let (Some(s), Some(last)) = (&self.stream, &self.last)
            && s.index_for(t).is_some_and(|k| k + 1 == s.next_index)
        {
            return Ok(last.clone());
        }

        let target = self.stream.as_ref().and_then(|s| {
            let k = s.index_for(t)?;
            let ahead = k.checked_sub(s.next_index)?;
            ((ahead as f64) < SKIP_AHEAD_SECS * rate.as_f64()).then_some(k)
        });
        let (mut stream, target) = match (self.stream.take(), target) {
            (Some(s), Some(k)) => (s, k),
            _ => {
                tracing::debug!(t, "starting decoder");
                (DecodeStream::spawn(&self.path, &meta, t, rate)?, 0)
            }
        };

        let mut skipped = None;
        loop {
            match Self::pull(&mut stream, timeout) {
                Pull::Frame(bytes) if stream.next_index > target => {
                    let frame = FrameRGBA::from_bytes(meta.width, meta.height, bytes)?;
                    self.last = Some(frame.clone());
                    self.stream = Some(stream);
                    return Ok(frame);
                }
                Pull::Frame(bytes) => skipped = Some(bytes),
                Pull::Ended => {
                    if let Some(bytes) = skipped {
                        self.last = Some(FrameRGBA::from_bytes(meta.width, meta.height, bytes)?);
                    }
                    let Some(last) = self.last.clone() else {
                        return Err(CaptionError::seek_timeout(t, timeout));
                    };
                    tracing::warn!(t, "decoder ended early; reusing last frame");
                    self.stream = Some(stream);
                    return Ok(last);
                }
                Pull::TimedOut => return Err(CaptionError::seek_timeout(t, timeout)),
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/ffmpeg.rs"]
mod tests;
