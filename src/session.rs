use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, TryLockError};

use crate::caption::edit::CaptionTrack;
use crate::caption::ingest::{Transcriber, transcribe_captions};
use crate::encode::ffmpeg::FfmpegSink;
use crate::encode::sink::FrameSink;
use crate::export::driver::{ExportDriver, ExportObserver, ExportReport};
use crate::export::options::ExportOpts;
use crate::foundation::core::Canvas;
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::media::ffmpeg::FfmpegVideoSource;
use crate::media::source::VideoSource;
use crate::project::ProjectFile;
use crate::render::backend::{FrameCompositor, FrameRGBA};
use crate::render::cpu::CpuCompositor;
use crate::render::fonts::FontBook;
use crate::render::plan::CaptionDrawList;
use crate::render::preview::{PreviewNode, preview_node};
use crate::style::model::CaptionStyle;
use crate::timing::frame::RenderFrame;

/// Proof that the holder is the session's only active render.
#[derive(Debug)]
pub struct RenderLease<'s> {
    _guard: MutexGuard<'s, ()>,
}

/// State for one loaded video: its captions, the style, and the render lock.
///
/// Preview and export both take a [`RenderLease`]; while one is held every other render on the
/// session fails with [`CaptionError::SessionBusy`] instead of interleaving.
#[derive(Debug, Default)]
pub struct CaptionSession {
    video: Option<PathBuf>,
    captions: CaptionTrack,
    style: CaptionStyle,
    render_lock: Mutex<()>,
}

impl CaptionSession {
    /// An empty session with the default style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Session holding a saved project.
    pub fn from_project(project: ProjectFile) -> Self {
        Self {
            video: project.video,
            captions: CaptionTrack::new(project.captions),
            style: project.style,
            render_lock: Mutex::new(()),
        }
    }

    /// Snapshot as a project document.
    pub fn to_project(&self) -> ProjectFile {
        ProjectFile {
            video: self.video.clone(),
            captions: self.captions.as_slice().to_vec(),
            style: self.style.clone(),
        }
    }

    /// Load a new source video. Captions belong to the previous video and are cleared.
    pub fn load_video(&mut self, path: impl Into<PathBuf>) {
        self.video = Some(path.into());
        self.captions.clear();
    }

    /// Loaded video, if any.
    pub fn video(&self) -> Option<&Path> {
        self.video.as_deref()
    }

    /// Captions on the timeline.
    pub fn captions(&self) -> &CaptionTrack {
        &self.captions
    }

    /// Editable captions.
    pub fn captions_mut(&mut self) -> &mut CaptionTrack {
        &mut self.captions
    }

    /// Current style.
    pub fn style(&self) -> &CaptionStyle {
        &self.style
    }

    /// Replace the style after validating it.
    pub fn set_style(&mut self, style: CaptionStyle) -> CaptionResult<()> {
        style.validate()?;
        self.style = style;
        Ok(())
    }

    /// Transcribe the loaded video and replace the captions with the result.
    ///
    /// On failure the video stays loaded with no captions, which is a usable state for a retry.
    pub fn apply_transcript(
        &mut self,
        transcriber: &mut dyn Transcriber,
        stamp: u64,
    ) -> CaptionResult<usize> {
        let video = self
            .video
            .clone()
            .ok_or_else(|| CaptionError::validation("no video loaded"))?;
        self.captions.clear();
        let captions = transcribe_captions(transcriber, &video, stamp)?;
        let n = captions.len();
        self.captions = CaptionTrack::new(captions);
        tracing::info!(captions = n, "transcript applied");
        Ok(n)
    }

    /// Drop the video, captions and style.
    pub fn reset(&mut self) {
        self.video = None;
        self.captions.clear();
        self.style = CaptionStyle::default();
    }

    /// Take the render lock without waiting.
    pub fn try_lease(&self) -> CaptionResult<RenderLease<'_>> {
        match self.render_lock.try_lock() {
            Ok(guard) => Ok(RenderLease { _guard: guard }),
            // A render that panicked leaves nothing behind that needs repair.
            Err(TryLockError::Poisoned(p)) => Ok(RenderLease {
                _guard: p.into_inner(),
            }),
            Err(TryLockError::WouldBlock) => Err(CaptionError::SessionBusy),
        }
    }

    /// What is on screen at playback time `t`.
    pub fn render_frame(&self, t: f64) -> RenderFrame {
        RenderFrame::at(self.captions.as_slice(), &self.style, t)
    }

    /// Live-preview overlay at `t` for a `viewport`-sized player.
    pub fn preview(&self, t: f64, viewport: Canvas) -> CaptionResult<Option<PreviewNode>> {
        let _lease = self.try_lease()?;
        Ok(preview_node(&self.render_frame(t), &self.style, viewport))
    }

    /// Burn the caption at `t` into a single frame.
    pub fn preview_frame(
        &self,
        compositor: &mut dyn FrameCompositor,
        frame: &mut FrameRGBA,
        t: f64,
    ) -> CaptionResult<Option<CaptionDrawList>> {
        let _lease = self.try_lease()?;
        compositor.prepare(frame.canvas()?)?;
        compositor.render_caption(frame, &self.render_frame(t), &self.style)
    }

    /// Export through caller-supplied source, compositor and sink.
    pub fn export_with(
        &self,
        source: &mut dyn VideoSource,
        compositor: &mut dyn FrameCompositor,
        sink: &mut dyn FrameSink,
        opts: &ExportOpts,
        observer: Option<&mut dyn ExportObserver>,
    ) -> CaptionResult<ExportReport> {
        let _lease = self.try_lease()?;
        let mut driver = ExportDriver::new(source, compositor, sink);
        if let Some(obs) = observer {
            driver = driver.with_observer(obs);
        }
        driver.run(self.captions.as_slice(), &self.style, opts)
    }

    /// Export the loaded video with ffmpeg decoding and encoding and the CPU compositor.
    pub fn export(
        &self,
        fonts: FontBook,
        opts: &ExportOpts,
        observer: Option<&mut dyn ExportObserver>,
    ) -> CaptionResult<ExportReport> {
        let video = self
            .video
            .as_deref()
            .ok_or_else(|| CaptionError::validation("no video loaded"))?;
        let mut source = FfmpegVideoSource::new(video);
        let mut compositor = CpuCompositor::new(fonts);
        let mut sink = FfmpegSink::default();
        self.export_with(&mut source, &mut compositor, &mut sink, opts, observer)
    }
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
