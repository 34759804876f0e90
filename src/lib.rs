//! captionfx styles timed captions and burns them into video.
//!
//! The engine is a pure function of `(captions, style, t)`:
//!
//! - [`RenderFrame::at`] finds the active caption, the on-screen segment and the entry
//!   animation state for playback time `t`
//! - [`plan_caption`] turns that into a [`CaptionDrawList`], the single source of every drawing
//!   decision
//! - [`CpuCompositor`] rasterizes a draw list over a video frame and [`preview_node`] renders it
//!   as CSS for a live overlay
//! - [`ExportDriver`] steps a [`VideoSource`] through time and streams composited frames into a
//!   [`FrameSink`]
//!
//! [`CaptionSession`] ties one video, its captions and a style together and serializes renders.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod caption;
pub(crate) mod encode;
pub(crate) mod export;
pub(crate) mod media;
pub(crate) mod render;
pub(crate) mod style;
pub(crate) mod timing;

/// Saved project documents.
pub mod project;
/// Session-oriented editing and rendering API.
pub mod session;

pub use crate::foundation::core::{Canvas, Fps, Point, REFERENCE_HEIGHT, Rect, Vec2};
pub use crate::foundation::error::{CaptionError, CaptionResult};

pub use crate::caption::edit::{CaptionTrack, TimeField};
pub use crate::caption::index::{find_active, find_active_index};
pub use crate::caption::ingest::{
    TRANSCRIPTION_FAILED_MESSAGE, Transcriber, TranscriptRecord, captions_from_records,
    parse_transcript_json, transcribe_captions,
};
pub use crate::caption::model::{Caption, CaptionId};

pub use crate::style::color::Rgba8;
pub use crate::style::model::{
    AnimationKind, CaptionStyle, DisplayMode, TextCasing, VerticalPosition,
};
pub use crate::style::text::{STRIPPED_PUNCTUATION, apply_casing, transform_text};

pub use crate::timing::animation::{AnimFactors, AnimationSpec, SLIDE_UP_DISTANCE, evaluate};
pub use crate::timing::frame::RenderFrame;
pub use crate::timing::segment::{Segment, SegmentSpan, select_segment};

pub use crate::render::backend::{FrameCompositor, FrameRGBA};
pub use crate::render::cpu::CpuCompositor;
pub use crate::render::fonts::FontBook;
pub use crate::render::plan::{
    BACKGROUND_PADDING, BACKGROUND_RADIUS, BackgroundBox, CaptionDrawList, DrawPass, LINE_HEIGHT,
    PaintOp, PassKind, ShadowSpec, anchor_point, plan_caption,
};
pub use crate::render::preview::{PreviewNode, preview_node};

pub use crate::media::ffmpeg::{FfmpegVideoSource, probe_video};
pub use crate::media::source::{MAX_DURATION_SECS, SolidVideoSource, VideoMetadata, VideoSource};

pub use crate::encode::ffmpeg::{FfmpegSink, WEBM_BITRATE, is_ffmpeg_on_path};
pub use crate::encode::sink::{Container, FrameSink, InMemorySink, SinkConfig};

pub use crate::export::artifact::artifact_file_name;
pub use crate::export::driver::{
    ExportDriver, ExportObserver, ExportReport, ExportState, NoopObserver, PlaybackClock,
    WallClock, progress_percent,
};
pub use crate::export::options::{ExportMode, ExportOpts};

pub use crate::project::ProjectFile;
pub use crate::session::{CaptionSession, RenderLease};
