use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use smokesim::{
    CloudParams, Controls, EmitterConfig, FfmpegSink, FfmpegSinkOpts, FrameSink, Point, Session,
    SessionOpts, SimulationConfig, SpawnPolicy, TickOutcome, Viewport,
};

#[derive(Parser, Debug)]
#[command(name = "smokesim", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the simulation for a number of ticks and write the three snapshot PNGs.
    Snapshot(SnapshotArgs),
    /// Render an MP4 of the composite (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Write a grayscale cloud noise mask as a PNG.
    CloudMask(CloudMaskArgs),
}

#[derive(Parser, Debug)]
struct SessionArgs {
    /// Media source: an image or video path, or `solid:#RRGGBB[@WxH]`.
    #[arg(long)]
    source: String,

    /// Simulation config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Logical viewport as WxH.
    #[arg(long, default_value = "640x360")]
    viewport: Viewport,

    /// Ticks per second of media time.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Emit at this logical point (X,Y) instead of the bottom centre.
    #[arg(long, value_parser = parse_point)]
    at: Option<Point>,

    /// Add a persistent emitter as X,Y[,COUNT[,LIFETIME_SECS]] (repeatable). COUNT defaults to
    /// the configured particles per tick; without LIFETIME it emits forever.
    #[arg(long = "emit", value_name = "X,Y[,COUNT[,LIFETIME]]", value_parser = parse_emit)]
    emits: Vec<EmitArg>,

    /// Control override as name=value (repeatable), e.g. `--set max-life=4`.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    sets: Vec<String>,

    /// Stop at the end of the media instead of looping.
    #[arg(long)]
    no_loop: bool,
}

#[derive(Parser, Debug)]
struct SnapshotArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Number of ticks to simulate before capturing.
    #[arg(long, default_value_t = 30)]
    ticks: u64,

    /// Output directory.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Number of frames to render.
    #[arg(long, default_value_t = 90)]
    frames: u64,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Also write the smoke layer over black to this MP4 path.
    #[arg(long)]
    mask_out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct CloudMaskArgs {
    /// Mask size in pixels (square).
    #[arg(long, default_value_t = 128)]
    size: u32,

    #[arg(long, default_value_t = 100)]
    seed: u64,

    /// Noise cell size in pixels.
    #[arg(long, default_value_t = 10.0)]
    scale: f64,

    #[arg(long, default_value_t = 1)]
    octaves: u32,

    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Snapshot(args) => cmd_snapshot(args),
        Command::Render(args) => cmd_render(args),
        Command::CloudMask(args) => cmd_cloud_mask(args),
    }
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("point '{s}' must be X,Y"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("x '{x}': {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("y '{y}': {e}"))?;
    Ok(Point::new(x, y))
}

#[derive(Clone, Copy, Debug)]
struct EmitArg {
    origin: Point,
    count: Option<u32>,
    lifetime: Option<f64>,
}

fn parse_emit(s: &str) -> Result<EmitArg, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if !(2..=4).contains(&parts.len()) {
        return Err(format!("emitter '{s}' must be X,Y[,COUNT[,LIFETIME]]"));
    }
    let origin = parse_point(&format!("{},{}", parts[0], parts[1]))?;
    let count = parts
        .get(2)
        .map(|c| c.parse::<u32>().map_err(|e| format!("count '{c}': {e}")))
        .transpose()?;
    let lifetime = parts
        .get(3)
        .map(|l| l.parse::<f64>().map_err(|e| format!("lifetime '{l}': {e}")))
        .transpose()?;
    Ok(EmitArg {
        origin,
        count,
        lifetime,
    })
}

fn build_session(args: &SessionArgs) -> anyhow::Result<Session<Controls>> {
    if args.fps == 0 {
        anyhow::bail!("--fps must be non-zero");
    }
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    for emit in &args.emits {
        let mut emitter =
            EmitterConfig::at(emit.origin, emit.count.unwrap_or(config.particles_per_tick));
        emitter.lifetime = emit.lifetime;
        config.emitters.push(emitter);
    }
    let has_emitters = !config.emitters.is_empty();
    let mut controls = Controls::new(config);
    for set in &args.sets {
        let (name, value) = set
            .split_once('=')
            .with_context(|| format!("--set '{set}' must be NAME=VALUE"))?;
        if !controls.set_by_name(name.trim(), value.trim())? {
            eprintln!("ignored invalid value for {name}: '{value}'");
        }
    }

    let source = smokesim::open_source(&args.source, !args.no_loop)
        .with_context(|| format!("open media source '{}'", args.source))?;
    let mut opts = SessionOpts::new(args.viewport);
    opts.emit_from_bottom_center = args.at.is_none() && !has_emitters;
    let mut session = Session::new(controls, source, opts);

    if let Some(origin) = args.at {
        let count = session.config().particles_per_tick;
        session
            .machine_mut()
            .set_spawn_policy(SpawnPolicy::SpawnAtPoint { origin, count });
    }
    Ok(session)
}

fn cmd_snapshot(args: SnapshotArgs) -> anyhow::Result<()> {
    let mut session = build_session(&args.session)?;
    let dt = 1.0 / f64::from(args.session.fps);

    for _ in 0..args.ticks.max(1) {
        if let TickOutcome::Halted(state) = session.tick(dt)? {
            eprintln!("source {state:?}; stopping early");
            break;
        }
    }

    let paths = session.write_snapshot(&args.out_dir)?;
    for p in [&paths.effect, &paths.blended, &paths.frame] {
        eprintln!("wrote {}", p.display());
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut session = build_session(&args.session)?;

    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&args.out));
    let mut mask_sink = args
        .mask_out
        .as_ref()
        .map(|p| FfmpegSink::new(FfmpegSinkOpts::new(p)));

    let stats = session.render_range(
        args.frames,
        args.session.fps,
        &mut sink,
        mask_sink.as_mut().map(|s| s as &mut dyn FrameSink),
    )?;

    eprintln!("wrote {} ({} frames)", args.out.display(), stats.frames);
    if let Some(p) = &args.mask_out {
        eprintln!("wrote {}", p.display());
    }
    Ok(())
}

fn cmd_cloud_mask(args: CloudMaskArgs) -> anyhow::Result<()> {
    if args.size == 0 {
        anyhow::bail!("--size must be non-zero");
    }
    let params = CloudParams {
        noise_scale: args.scale,
        octaves: args.octaves,
        ..CloudParams::default()
    };
    let mask = smokesim::cloud_mask(args.size, args.size, &params, args.seed);
    let img = image::GrayImage::from_raw(args.size, args.size, mask)
        .context("cloud mask buffer size mismatch")?;

    ensure_parent(&args.out)?;
    img.save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory '{}'", parent.display()))?;
    }
    Ok(())
}
