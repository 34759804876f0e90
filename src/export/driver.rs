use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::caption::model::Caption;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::export::artifact::{PartialArtifact, unix_millis};
use crate::export::options::{ExportMode, ExportOpts};
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::CaptionResult;
use crate::media::source::VideoSource;
use crate::render::backend::{FrameCompositor, FrameRGBA};
use crate::style::model::CaptionStyle;
use crate::timing::frame::RenderFrame;

/// Export driver lifecycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportState {
    /// Not exporting.
    Idle,
    /// Loading source metadata and sizing the surface.
    Preparing,
    /// Frame loop running.
    Rendering {
        /// `round(100 * t / duration)` of the last processed tick.
        progress: u8,
    },
    /// Flushing the encoder and moving the artifact into place.
    Finalizing,
    /// The attempt failed; the driver returns to `Idle` right after reporting this.
    Failed {
        /// User-visible message.
        message: String,
    },
}

/// Receives export progress. Every method has an empty default.
pub trait ExportObserver {
    /// Called on every state change and after every processed tick.
    fn on_state(&mut self, _state: &ExportState) {}

    /// Called after frame `index` (source time `t`) was handed to the sink.
    fn on_frame(&mut self, _index: u64, _t: f64) {}
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl ExportObserver for NoopObserver {}

/// Playback time source for realtime exports.
pub trait PlaybackClock {
    /// Start playback at time 0.
    fn start(&mut self);

    /// Current playback time in seconds.
    fn now(&self) -> f64;

    /// Block until playback reaches `t` (returns at once when it already has).
    fn wait_until(&mut self, t: f64);
}

/// Playback that advances with wall-clock time.
#[derive(Clone, Debug, Default)]
pub struct WallClock {
    started: Option<Instant>,
}

impl PlaybackClock for WallClock {
    fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    fn now(&self) -> f64 {
        self.started
            .map(|s| s.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn wait_until(&mut self, t: f64) {
        let wait = t - self.now();
        if wait > 0.0 && wait.is_finite() {
            std::thread::sleep(Duration::from_secs_f64(wait));
        }
    }
}

/// Summary of a finished export.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportReport {
    /// Frames handed to the sink.
    pub frames: u64,
    /// Source duration in seconds.
    pub duration_secs: f64,
    /// Output surface size.
    pub canvas: Canvas,
    /// Final artifact path; `None` when the sink wrote no file.
    pub artifact: Option<PathBuf>,
}

/// `round(100 * t / duration)`, clamped to `0..=100`.
pub fn progress_percent(t: f64, duration_secs: f64) -> u8 {
    if duration_secs.is_nan() || duration_secs <= 0.0 || !t.is_finite() {
        return 0;
    }
    (100.0 * t / duration_secs).round().clamp(0.0, 100.0) as u8
}

/// Index of the output slot showing time `t`: the largest `n` with `n / fps <= t`.
fn slot_at(fps: Fps, t: f64) -> u64 {
    let k = fps.steps_before(t);
    if fps.frames_to_secs(k) <= t {
        k
    } else {
        k.saturating_sub(1)
    }
}

/// Drives source → caption compositor → sink over the full source duration.
///
/// Holds the only loop in the engine. Errors during preparation, rendering or finalizing move
/// the driver to [`ExportState::Failed`], abort the sink, remove any partial output and return
/// it to [`ExportState::Idle`], so a new attempt can start from scratch.
pub struct ExportDriver<'a> {
    source: &'a mut dyn VideoSource,
    compositor: &'a mut dyn FrameCompositor,
    sink: &'a mut dyn FrameSink,
    clock: Box<dyn PlaybackClock + 'a>,
    observer: Option<&'a mut dyn ExportObserver>,
    state: ExportState,
}

impl std::fmt::Debug for ExportDriver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportDriver")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

struct Job<'j> {
    captions: &'j [Caption],
    style: &'j CaptionStyle,
    opts: &'j ExportOpts,
    duration: f64,
}

impl<'a> ExportDriver<'a> {
    /// Driver reading from `source`, drawing with `compositor` and writing to `sink`.
    pub fn new(
        source: &'a mut dyn VideoSource,
        compositor: &'a mut dyn FrameCompositor,
        sink: &'a mut dyn FrameSink,
    ) -> Self {
        Self {
            source,
            compositor,
            sink,
            clock: Box::new(WallClock::default()),
            observer: None,
            state: ExportState::Idle,
        }
    }

    /// Use `clock` for realtime exports instead of wall-clock time.
    pub fn with_clock(mut self, clock: impl PlaybackClock + 'a) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Report progress to `observer`.
    pub fn with_observer(mut self, observer: &'a mut dyn ExportObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Current state.
    pub fn state(&self) -> &ExportState {
        &self.state
    }

    fn transition(&mut self, state: ExportState) {
        if !matches!(state, ExportState::Rendering { .. }) {
            tracing::info!(state = ?state, "export state");
        }
        if let Some(obs) = self.observer.as_deref_mut() {
            obs.on_state(&state);
        }
        self.state = state;
    }

    /// Export `captions` burned into the whole source.
    #[tracing::instrument(
        skip_all,
        fields(mode = ?opts.mode, fps = %opts.fps.as_f64(), captions = captions.len())
    )]
    pub fn run(
        &mut self,
        captions: &[Caption],
        style: &CaptionStyle,
        opts: &ExportOpts,
    ) -> CaptionResult<ExportReport> {
        opts.validate()?;
        style.validate()?;

        match self.attempt(captions, style, opts) {
            Ok(report) => {
                self.transition(ExportState::Idle);
                Ok(report)
            }
            Err(e) => {
                tracing::error!(error = %e, "export failed");
                self.transition(ExportState::Failed {
                    message: e.to_string(),
                });
                self.transition(ExportState::Idle);
                Err(e)
            }
        }
    }

    fn attempt(
        &mut self,
        captions: &[Caption],
        style: &CaptionStyle,
        opts: &ExportOpts,
    ) -> CaptionResult<ExportReport> {
        self.transition(ExportState::Preparing);
        let meta = self.source.load_metadata(opts.metadata_timeout)?;
        meta.validate()?;
        let canvas = meta.canvas()?;
        self.compositor.prepare(canvas)?;
        self.source.set_step_rate(opts.fps);

        let artifact =
            PartialArtifact::new(&opts.out_dir, &opts.prefix, opts.container, unix_millis());
        self.sink.begin(&SinkConfig {
            canvas,
            fps: opts.fps,
            container: opts.container,
            path: artifact.partial_path().to_path_buf(),
        })?;

        let job = Job {
            captions,
            style,
            opts,
            duration: meta.duration_secs,
        };
        let frames = match self.encode(&job) {
            Ok(frames) => frames,
            Err(e) => {
                self.sink.abort();
                return Err(e);
            }
        };
        let artifact = artifact.commit()?;
        tracing::info!(frames, artifact = ?artifact, "export finished");

        Ok(ExportReport {
            frames,
            duration_secs: meta.duration_secs,
            canvas,
            artifact,
        })
    }

    fn encode(&mut self, job: &Job<'_>) -> CaptionResult<u64> {
        self.transition(ExportState::Rendering { progress: 0 });
        let frames = match job.opts.mode {
            ExportMode::Step => self.render_steps(job)?,
            ExportMode::Realtime => self.render_realtime(job)?,
        };
        self.transition(ExportState::Finalizing);
        self.sink.end()?;
        Ok(frames)
    }

    /// Step `n` renders time `n / fps` while that time is strictly below the duration, so the
    /// source is never asked for a frame at or past its end.
    fn render_steps(&mut self, job: &Job<'_>) -> CaptionResult<u64> {
        let fps = job.opts.fps;
        let steps = fps.steps_before(job.duration);
        tracing::debug!(steps, duration = job.duration, "step export");
        for n in 0..steps {
            let t = fps.frames_to_secs(n);
            let frame = self.render_tick(job, t)?;
            self.sink.push_frame(&frame)?;
            self.after_tick(n, t, job.duration);
        }
        Ok(steps)
    }

    /// Each tick renders the time playback has actually reached. Output slots that playback
    /// skipped past while a tick was rendering repeat the previous frame, so the encoded stream
    /// keeps its frame rate.
    fn render_realtime(&mut self, job: &Job<'_>) -> CaptionResult<u64> {
        let fps = job.opts.fps;
        let mut next_slot = 0u64;
        let mut last: Option<FrameRGBA> = None;
        let mut pushed = 0u64;

        self.clock.start();
        loop {
            let slot_time = fps.frames_to_secs(next_slot);
            if slot_time >= job.duration {
                break;
            }
            self.clock.wait_until(slot_time);
            let t = self.clock.now().max(slot_time);
            if t >= job.duration {
                break;
            }

            let slot = slot_at(fps, t).max(next_slot);
            if let Some(prev) = &last {
                for _ in next_slot..slot {
                    self.sink.push_frame(prev)?;
                    pushed += 1;
                }
            }
            if slot > next_slot {
                tracing::debug!(dropped = slot - next_slot, t, "playback ran ahead");
            }

            let frame = self.render_tick(job, t)?;
            self.sink.push_frame(&frame)?;
            pushed += 1;
            self.after_tick(slot, t, job.duration);
            last = Some(frame);
            next_slot = slot + 1;
        }
        Ok(pushed)
    }

    fn render_tick(&mut self, job: &Job<'_>, t: f64) -> CaptionResult<FrameRGBA> {
        let mut frame = self.source.frame_at(t, job.opts.seek_timeout)?;
        let render = RenderFrame::at(job.captions, job.style, t);
        self.compositor
            .render_caption(&mut frame, &render, job.style)?;
        tracing::debug!(t, text = %render.active_text, "tick");
        Ok(frame)
    }

    fn after_tick(&mut self, index: u64, t: f64, duration: f64) {
        if let Some(obs) = self.observer.as_deref_mut() {
            obs.on_frame(index, t);
        }
        self.transition(ExportState::Rendering {
            progress: progress_percent(t, duration),
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/driver.rs"]
mod tests;
