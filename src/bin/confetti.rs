use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use confetti_engine::{
    BurstOptions, Cannon, CannonOpts, CollectSink, FRAME_INTERVAL_MS, FrameIndex, FrameRGBA,
    FrameSink, HeadlessContainer, SurfaceSize,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "confetti", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one frame of a burst as a PNG.
    Frame(FrameArgs),
    /// Render every frame of a burst as a numbered PNG sequence.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct SurfaceArgs {
    /// Burst options JSON (camelCase keys). Defaults apply when omitted.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Viewport width in pixels.
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Seed for the particle generator.
    #[arg(long)]
    seed: Option<u64>,

    /// Flatten frames onto this opaque background (`#rrggbb`) instead of keeping alpha.
    #[arg(long)]
    background: Option<String>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    surface: SurfaceArgs,

    /// Tick to capture (0-based).
    #[arg(long, default_value_t = 0)]
    tick: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    surface: SurfaceArgs,

    /// Output directory; frames are written as `frame_00000.png`, ...
    #[arg(long)]
    out_dir: PathBuf,

    /// Stop after this many frames even if the burst is still running.
    #[arg(long)]
    max_frames: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn read_options(path: Option<&Path>) -> anyhow::Result<BurstOptions> {
    let Some(path) = path else {
        return Ok(BurstOptions::default());
    };
    let f = File::open(path).with_context(|| format!("open options '{}'", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_reader(BufReader::new(f)).with_context(|| "parse options JSON")?;
    Ok(BurstOptions::from_json_value(value)?)
}

fn parse_background(s: Option<&str>) -> anyhow::Result<Option<[u8; 4]>> {
    let Some(s) = s else {
        return Ok(None);
    };
    let rgb = confetti_engine::color::hex_to_rgb(s)
        .with_context(|| format!("invalid background color '{s}'"))?;
    Ok(Some([rgb.r, rgb.g, rgb.b, 255]))
}

fn make_cannon(
    args: &SurfaceArgs,
    sink: impl FrameSink + Clone + 'static,
) -> Cannon<HeadlessContainer> {
    let viewport = SurfaceSize::new(args.width, args.height);
    let container = HeadlessContainer::new(viewport).with_frame_sink(move |_| Box::new(sink.clone()));
    let opts = CannonOpts {
        resize: true,
        ..CannonOpts::default()
    };
    let cannon = Cannon::new(container, opts);
    match args.seed {
        Some(seed) => cannon.with_seed(seed),
        None => cannon,
    }
}

fn write_png(path: &Path, frame: &FrameRGBA, bg: Option<[u8; 4]>) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let frame = match bg {
        Some(bg) => frame.flatten_onto(bg)?,
        None => frame.to_straight(),
    };
    image::save_buffer_with_format(
        path,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let options = read_options(args.surface.in_path.as_deref())?;
    let bg = parse_background(args.surface.background.as_deref())?;

    let sink = CollectSink::latest_only();
    let frames = sink.frames();
    let mut cannon = make_cannon(&args.surface, sink);
    let done = cannon.fire(&options);

    let mut now = 0;
    for _ in 0..=args.tick {
        if done.is_settled() {
            break;
        }
        now += FRAME_INTERVAL_MS;
        cannon.advance(now);
    }

    let captured = frames
        .lock()
        .map_err(|_| anyhow::anyhow!("frame buffer poisoned"))?
        .pop();
    let Some((idx, frame)) = captured else {
        anyhow::bail!("the burst produced no frames");
    };
    write_png(&args.out, &frame, bg)?;
    eprintln!("wrote {} (tick {})", args.out.display(), idx.0);
    Ok(())
}

/// Writes each presented frame straight to disk.
#[derive(Clone)]
struct PngSequenceSink {
    dir: PathBuf,
    background: Option<[u8; 4]>,
    written: Arc<Mutex<u64>>,
}

impl FrameSink for PngSequenceSink {
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> confetti_engine::ConfettiResult<()> {
        let path = self.dir.join(format!("frame_{:05}.png", idx.0));
        write_png(&path, frame, self.background).map_err(confetti_engine::ConfettiError::Other)?;
        if let Ok(mut n) = self.written.lock() {
            *n += 1;
        }
        Ok(())
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let options = read_options(args.surface.in_path.as_deref())?;
    let background = parse_background(args.surface.background.as_deref())?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let written = Arc::new(Mutex::new(0u64));
    let sink = PngSequenceSink {
        dir: args.out_dir.clone(),
        background,
        written: Arc::clone(&written),
    };
    let mut cannon = make_cannon(&args.surface, sink);
    let done = cannon.fire(&options);

    let mut now = 0;
    let mut frames = 0u64;
    while !done.is_settled() {
        if args.max_frames.is_some_and(|max| frames >= max) {
            cannon.reset();
            break;
        }
        now += FRAME_INTERVAL_MS;
        cannon.advance(now);
        frames += 1;
    }

    let written = written
        .lock()
        .map(|n| *n)
        .map_err(|_| anyhow::anyhow!("frame counter poisoned"))?;
    eprintln!("wrote {written} frames to {}", args.out_dir.display());
    Ok(())
}
