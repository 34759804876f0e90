use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::error::CaptionError;
use crate::media::source::VideoMetadata;
use crate::render::plan::CaptionDrawList;
use crate::style::model::{AnimationKind, DisplayMode};

struct FakeSource {
    meta: Option<VideoMetadata>,
    seeks: Vec<f64>,
    fail_at: Option<usize>,
}

impl FakeSource {
    fn new(duration_secs: f64) -> Self {
        Self {
            meta: Some(VideoMetadata {
                width: 8,
                height: 4,
                duration_secs,
                fps: None,
            }),
            seeks: Vec::new(),
            fail_at: None,
        }
    }
}

impl VideoSource for FakeSource {
    fn load_metadata(&mut self, _timeout: Duration) -> CaptionResult<VideoMetadata> {
        self.meta
            .clone()
            .ok_or_else(|| CaptionError::metadata("no metadata"))
    }

    fn frame_at(&mut self, t: f64, timeout: Duration) -> CaptionResult<FrameRGBA> {
        if self.fail_at == Some(self.seeks.len()) {
            return Err(CaptionError::seek_timeout(t, timeout));
        }
        self.seeks.push(t);
        FrameRGBA::solid(8, 4, [0, 0, 0])
    }
}

#[derive(Default)]
struct FakeCompositor {
    drawn: Vec<String>,
}

impl FrameCompositor for FakeCompositor {
    fn prepare(&mut self, _canvas: Canvas) -> CaptionResult<()> {
        Ok(())
    }

    fn composite(&mut self, _frame: &mut FrameRGBA, list: &CaptionDrawList) -> CaptionResult<()> {
        self.drawn.push(list.text.clone());
        Ok(())
    }
}

#[derive(Default)]
struct Recorder {
    states: Vec<ExportState>,
    frames: Vec<(u64, f64)>,
}

impl ExportObserver for Recorder {
    fn on_state(&mut self, state: &ExportState) {
        self.states.push(state.clone());
    }

    fn on_frame(&mut self, index: u64, t: f64) {
        self.frames.push((index, t));
    }
}

/// Playback that jumps to each requested time, then runs `lag` seconds ahead.
struct SteppedClock {
    now: f64,
    lag: f64,
}

impl PlaybackClock for SteppedClock {
    fn start(&mut self) {
        self.now = 0.0;
    }

    fn now(&self) -> f64 {
        self.now
    }

    fn wait_until(&mut self, t: f64) {
        self.now = self.now.max(t) + self.lag;
    }
}

fn style() -> CaptionStyle {
    CaptionStyle {
        display_mode: DisplayMode::Sentence,
        animation: AnimationKind::None,
        ..CaptionStyle::default()
    }
}

fn temp_out(name: &str) -> ExportOpts {
    ExportOpts {
        out_dir: std::env::temp_dir().join(format!("captionfx-{name}-{}", std::process::id())),
        ..ExportOpts::default()
    }
}

#[test]
fn step_mode_processes_ceil_duration_times_fps_steps() {
    let mut source = FakeSource::new(2.0);
    let mut compositor = FakeCompositor::default();
    let mut sink = InMemorySink::new();
    let mut rec = Recorder::default();
    let opts = temp_out("steps");

    let report = ExportDriver::new(&mut source, &mut compositor, &mut sink)
        .with_observer(&mut rec)
        .run(&[], &style(), &opts)
        .unwrap();

    assert_eq!(report.frames, 60);
    assert_eq!(sink.frames.len(), 60);
    assert!(sink.finished);
    assert_eq!(report.artifact, None);
    assert_eq!(source.seeks.len(), 60);
    assert!(source.seeks.iter().all(|&t| t < 2.0));
    for (n, &t) in source.seeks.iter().enumerate() {
        assert_eq!(t, n as f64 / 30.0);
    }

    assert_eq!(rec.states.first(), Some(&ExportState::Preparing));
    assert_eq!(rec.states.last(), Some(&ExportState::Idle));
    let finalizing = rec
        .states
        .iter()
        .position(|s| *s == ExportState::Finalizing)
        .unwrap();
    assert_eq!(
        rec.states[finalizing - 1],
        ExportState::Rendering { progress: 98 }
    );
    assert_eq!(rec.frames.len(), 60);
}

#[test]
fn partial_last_step_is_rendered_but_never_the_end() {
    let mut source = FakeSource::new(1.05);
    let mut compositor = FakeCompositor::default();
    let mut sink = InMemorySink::new();
    let opts = ExportOpts {
        fps: Fps::new(10, 1).unwrap(),
        ..temp_out("partial")
    };
    let report = ExportDriver::new(&mut source, &mut compositor, &mut sink)
        .run(&[], &style(), &opts)
        .unwrap();
    assert_eq!(report.frames, 11);
    assert_eq!(source.seeks.last().copied(), Some(1.0));
}

#[test]
fn caption_bounds_are_inclusive_at_exact_step_times() {
    let captions = vec![Caption::new("c", "hello", 0.5, 1.0)];
    let mut source = FakeSource::new(2.0);
    let mut compositor = FakeCompositor::default();
    let mut sink = InMemorySink::new();
    let opts = ExportOpts {
        fps: Fps::new(2, 1).unwrap(),
        ..temp_out("bounds")
    };
    ExportDriver::new(&mut source, &mut compositor, &mut sink)
        .run(&captions, &style(), &opts)
        .unwrap();
    // Steps at 0.0, 0.5, 1.0 and 1.5; the caption shows at 0.5 and 1.0.
    assert_eq!(compositor.drawn, vec!["HELLO", "HELLO"]);
    assert_eq!(source.seeks, vec![0.0, 0.5, 1.0, 1.5]);
}

#[test]
fn seek_timeout_fails_aborts_sink_and_returns_to_idle() {
    let mut source = FakeSource::new(2.0);
    source.fail_at = Some(3);
    let mut compositor = FakeCompositor::default();
    let mut sink = InMemorySink::new();
    let mut rec = Recorder::default();
    let opts = temp_out("timeout");

    let mut driver =
        ExportDriver::new(&mut source, &mut compositor, &mut sink).with_observer(&mut rec);
    let err = driver.run(&[], &style(), &opts).unwrap_err();
    assert!(matches!(err, CaptionError::SeekTimeout { .. }));
    assert!(err.is_fatal_to_export());
    assert_eq!(driver.state(), &ExportState::Idle);
    drop(driver);

    assert!(sink.aborted);
    assert!(!sink.finished);
    let n = rec.states.len();
    assert!(matches!(rec.states[n - 2], ExportState::Failed { .. }));
    assert_eq!(rec.states[n - 1], ExportState::Idle);
    assert!(!rec.states.contains(&ExportState::Finalizing));
}

#[test]
fn missing_metadata_fails_before_the_sink_opens() {
    let mut source = FakeSource::new(2.0);
    source.meta = None;
    let mut compositor = FakeCompositor::default();
    let mut sink = InMemorySink::new();
    let err = ExportDriver::new(&mut source, &mut compositor, &mut sink)
        .run(&[], &style(), &temp_out("meta"))
        .unwrap_err();
    assert!(matches!(err, CaptionError::MetadataLoad(_)));
    assert!(sink.config.is_none());
}

#[test]
fn zero_duration_is_a_metadata_failure() {
    let mut source = FakeSource::new(0.0);
    let mut compositor = FakeCompositor::default();
    let mut sink = InMemorySink::new();
    let err = ExportDriver::new(&mut source, &mut compositor, &mut sink)
        .run(&[], &style(), &temp_out("zero"))
        .unwrap_err();
    assert!(matches!(err, CaptionError::MetadataLoad(_)));
}

#[test]
fn realtime_on_time_clock_matches_step_count() {
    let mut source = FakeSource::new(1.0);
    let mut compositor = FakeCompositor::default();
    let mut sink = InMemorySink::new();
    let opts = ExportOpts {
        mode: ExportMode::Realtime,
        fps: Fps::new(10, 1).unwrap(),
        ..temp_out("rt")
    };
    let report = ExportDriver::new(&mut source, &mut compositor, &mut sink)
        .with_clock(SteppedClock { now: 0.0, lag: 0.0 })
        .run(&[], &style(), &opts)
        .unwrap();
    assert_eq!(report.frames, 10);
    assert_eq!(sink.frames.len(), 10);
}

#[test]
fn realtime_lagging_clock_repeats_frames_and_stays_before_end() {
    let mut source = FakeSource::new(1.0);
    let mut compositor = FakeCompositor::default();
    let mut sink = InMemorySink::new();
    let opts = ExportOpts {
        mode: ExportMode::Realtime,
        fps: Fps::new(10, 1).unwrap(),
        ..temp_out("rt-lag")
    };
    let report = ExportDriver::new(&mut source, &mut compositor, &mut sink)
        .with_clock(SteppedClock { now: 0.0, lag: 0.1 })
        .run(&[], &style(), &opts)
        .unwrap();
    assert_eq!(report.frames as usize, sink.frames.len());
    assert!(report.frames <= 10);
    assert!(source.seeks.len() < sink.frames.len());
    assert!(source.seeks.iter().all(|&t| t < 1.0));
}

#[test]
fn progress_rounds_and_clamps() {
    assert_eq!(progress_percent(0.0, 2.0), 0);
    assert_eq!(progress_percent(1.0, 2.0), 50);
    assert_eq!(progress_percent(1.99, 2.0), 100);
    assert_eq!(progress_percent(3.0, 2.0), 100);
    assert_eq!(progress_percent(1.0, 0.0), 0);
}
