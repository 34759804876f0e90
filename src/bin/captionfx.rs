use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use captionfx::{
    Canvas, CaptionSession, Container, CpuCompositor, ExportMode, ExportObserver, ExportOpts,
    ExportState, FfmpegSink, FfmpegVideoSource, FontBook, Fps, FrameRGBA, ProjectFile,
    SolidVideoSource, Transcriber, TranscriptRecord, VideoSource, parse_transcript_json,
    plan_caption,
};

#[derive(Parser, Debug)]
#[command(name = "captionfx", version)]
struct Cli {
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Burn the caption at one time into a single PNG frame.
    Frame(FrameArgs),
    /// Print the live-preview overlay element at one time.
    Preview(PreviewArgs),
    /// Print the resolved frame state and draw list at one time.
    Inspect(InspectArgs),
    /// Export the project video with burned-in captions (requires `ffmpeg` on PATH).
    Export(ExportArgs),
    /// Replace every multi-word caption with one caption per word.
    SplitWords(SplitWordsArgs),
    /// Replace the captions with a transcript JSON file (`[{text, start, end}, ...]`).
    ImportTranscript(ImportTranscriptArgs),
}

#[derive(Args, Debug)]
struct FontArgs {
    /// Extra font file to register (repeatable).
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,

    /// Directory scanned recursively for fonts (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// Skip the platform font directories.
    #[arg(long, default_value_t = false)]
    no_system_fonts: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,

    /// Playback time in seconds.
    #[arg(long)]
    t: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Draw on a black `WxH` frame instead of decoding the project video.
    #[arg(long, value_parser = parse_size)]
    size: Option<(u32, u32)>,

    /// Seconds to wait for metadata and the decoded frame.
    #[arg(long, default_value_t = 10.0)]
    timeout: f64,

    #[command(flatten)]
    fonts: FontArgs,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,

    /// Playback time in seconds.
    #[arg(long)]
    t: f64,

    /// Player size as `WxH`.
    #[arg(long, value_parser = parse_size, default_value = "1280x720")]
    viewport: (u32, u32),
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,

    /// Playback time in seconds.
    #[arg(long)]
    t: f64,

    /// Output size as `WxH`.
    #[arg(long, value_parser = parse_size, default_value = "1280x720")]
    size: (u32, u32),
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,

    /// `step` for frame-accurate seeking or `realtime` to follow the wall clock.
    #[arg(long, default_value = "step")]
    mode: ExportMode,

    /// Output frame rate, `30` or `30000/1001`.
    #[arg(long, default_value = "30")]
    fps: Fps,

    /// Directory receiving the artifact.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Artifact file name prefix.
    #[arg(long, default_value = "captions")]
    prefix: String,

    /// `mp4` or `webm`.
    #[arg(long, default_value = "mp4")]
    container: Container,

    /// Seconds to wait for each seek.
    #[arg(long, default_value_t = 10.0)]
    seek_timeout: f64,

    /// Seconds to wait for the source metadata.
    #[arg(long, default_value_t = 10.0)]
    metadata_timeout: f64,

    /// Export over a black `WxH` clip instead of the project video.
    #[arg(long, value_parser = parse_size, requires = "duration")]
    size: Option<(u32, u32)>,

    /// Length in seconds of the black clip used with `--size`.
    #[arg(long)]
    duration: Option<f64>,

    #[command(flatten)]
    fonts: FontArgs,
}

#[derive(Parser, Debug)]
struct SplitWordsArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,

    /// Write the result here instead of overwriting the project.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ImportTranscriptArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,

    /// Transcript JSON.
    #[arg(long)]
    transcript: PathBuf,

    /// Write the result here instead of overwriting the project.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_json);
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Preview(args) => cmd_preview(args),
        Command::Inspect(args) => cmd_inspect(args),
        Command::Export(args) => cmd_export(args),
        Command::SplitWords(args) => cmd_split_words(args),
        Command::ImportTranscript(args) => cmd_import_transcript(args),
    }
}

fn init_logging(level: &str, json: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    if json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got \"{s}\""))?;
    let w = w.trim().parse::<u32>().map_err(|e| format!("width: {e}"))?;
    let h = h.trim().parse::<u32>().map_err(|e| format!("height: {e}"))?;
    if w == 0 || h == 0 {
        return Err("width and height must be non-zero".to_owned());
    }
    Ok((w, h))
}

fn secs(v: f64, what: &str) -> anyhow::Result<Duration> {
    Duration::try_from_secs_f64(v).with_context(|| format!("invalid {what} '{v}'"))
}

fn load_session(path: &Path) -> anyhow::Result<CaptionSession> {
    let project =
        ProjectFile::load(path).with_context(|| format!("load project '{}'", path.display()))?;
    Ok(CaptionSession::from_project(project))
}

fn save_project(session: &CaptionSession, path: &Path) -> anyhow::Result<()> {
    session
        .to_project()
        .save(path)
        .with_context(|| format!("write project '{}'", path.display()))
}

fn load_fonts(args: &FontArgs) -> anyhow::Result<FontBook> {
    let mut book = FontBook::new();
    for path in &args.fonts {
        book.add_font_file(path)
            .with_context(|| format!("load font '{}'", path.display()))?;
    }
    for dir in &args.font_dirs {
        book.add_font_dir(dir)
            .with_context(|| format!("scan font dir '{}'", dir.display()))?;
    }
    if !args.no_system_fonts {
        book.add_system_fonts();
    }
    if book.is_empty() {
        anyhow::bail!("no fonts found; pass --font or --font-dir");
    }
    tracing::debug!(families = book.families().len(), "fonts loaded");
    Ok(book)
}

fn unix_stamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let session = load_session(&args.project)?;
    let timeout = secs(args.timeout, "timeout")?;

    let mut frame = match (args.size, session.video()) {
        (Some((w, h)), _) => FrameRGBA::solid(w, h, [0, 0, 0])?,
        (None, Some(video)) => {
            let mut source = FfmpegVideoSource::new(video);
            source.load_metadata(timeout)?;
            source.frame_at(args.t, timeout)?
        }
        (None, None) => anyhow::bail!("project has no video; pass --size to draw on a blank frame"),
    };

    let mut compositor = CpuCompositor::new(load_fonts(&args.fonts)?);
    let drawn = session.preview_frame(&mut compositor, &mut frame, args.t)?;
    if drawn.is_none() {
        tracing::info!(t = args.t, "no caption active");
    }

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let session = load_session(&args.project)?;
    let viewport = Canvas::new(args.viewport.0, args.viewport.1)?;
    match session.preview(args.t, viewport)? {
        Some(node) => println!("{}", node.to_html()),
        None => eprintln!("no caption active at {}s", args.t),
    }
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let session = load_session(&args.project)?;
    let canvas = Canvas::new(args.size.0, args.size.1)?;
    let frame = session.render_frame(args.t);
    println!("{frame:#?}");
    if let Some(list) = plan_caption(&frame, session.style(), canvas) {
        println!("{list:#?}");
    }
    Ok(())
}

/// Logs each whole-percent progress change.
#[derive(Default)]
struct ProgressLog {
    last: Option<u8>,
}

impl ExportObserver for ProgressLog {
    fn on_state(&mut self, state: &ExportState) {
        if let ExportState::Rendering { progress } = state {
            if self.last != Some(*progress) && progress % 10 == 0 {
                eprintln!("rendering {progress}%");
            }
            self.last = Some(*progress);
        }
    }
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let session = load_session(&args.project)?;
    let opts = ExportOpts {
        mode: args.mode,
        fps: args.fps,
        out_dir: args.out_dir,
        prefix: args.prefix,
        container: args.container,
        seek_timeout: secs(args.seek_timeout, "seek timeout")?,
        metadata_timeout: secs(args.metadata_timeout, "metadata timeout")?,
    };
    let fonts = load_fonts(&args.fonts)?;
    let mut progress = ProgressLog::default();

    let report = match (args.size, args.duration) {
        (Some((w, h)), Some(duration)) => {
            let mut source = SolidVideoSource::new(w, h, duration, [0, 0, 0]);
            let mut compositor = CpuCompositor::new(fonts);
            let mut sink = FfmpegSink::default();
            session.export_with(
                &mut source,
                &mut compositor,
                &mut sink,
                &opts,
                Some(&mut progress),
            )?
        }
        _ => session.export(fonts, &opts, Some(&mut progress))?,
    };

    match &report.artifact {
        Some(path) => eprintln!("wrote {} ({} frames)", path.display(), report.frames),
        None => eprintln!("rendered {} frames", report.frames),
    }
    Ok(())
}

fn cmd_split_words(args: SplitWordsArgs) -> anyhow::Result<()> {
    let mut session = load_session(&args.project)?;
    let before = session.captions().len();
    session.captions_mut().split_to_words(unix_stamp());
    let out = args.out.as_deref().unwrap_or(&args.project);
    save_project(&session, out)?;
    eprintln!(
        "split {before} captions into {} in {}",
        session.captions().len(),
        out.display()
    );
    Ok(())
}

/// Reads a transcript that was produced ahead of time.
struct TranscriptFile(PathBuf);

impl Transcriber for TranscriptFile {
    fn transcribe(&mut self, _video: &Path) -> anyhow::Result<Vec<TranscriptRecord>> {
        let body = std::fs::read_to_string(&self.0)
            .with_context(|| format!("read transcript '{}'", self.0.display()))?;
        Ok(parse_transcript_json(&body)?)
    }
}

fn cmd_import_transcript(args: ImportTranscriptArgs) -> anyhow::Result<()> {
    let mut session = load_session(&args.project)?;
    if session.video().is_none() {
        anyhow::bail!("project has no video to attach the transcript to");
    }
    let n = session.apply_transcript(&mut TranscriptFile(args.transcript.clone()), unix_stamp())?;
    let out = args.out.as_deref().unwrap_or(&args.project);
    save_project(&session, out)?;
    eprintln!("imported {n} captions into {}", out.display());
    Ok(())
}
