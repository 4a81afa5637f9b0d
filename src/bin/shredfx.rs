use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "shredfx", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render a numbered PNG sequence.
    Frames(FramesArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Scene config JSON.
    #[arg(long)]
    config: PathBuf,

    /// Time since the first frame, in milliseconds.
    #[arg(long)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Rate at which the animation is stepped up to `--time`.
    #[arg(long, default_value_t = 60)]
    fps: u32,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    /// Scene config JSON.
    #[arg(long)]
    config: PathBuf,

    /// Frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Number of frames to write.
    #[arg(long)]
    count: u64,

    /// Directory receiving `frame_00000.png`, `frame_00001.png`, ...
    #[arg(long)]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Frames(args) => cmd_frames(args),
    }
}

fn open_scene(config_path: &Path) -> anyhow::Result<shredfx::ShredScene> {
    let config = shredfx::SceneConfig::load(config_path)
        .with_context(|| format!("load scene config '{}'", config_path.display()))?;
    let scene = shredfx::ShredScene::load_blocking(config)?;
    if let Some(reason) = scene.failure() {
        anyhow::bail!("source image unusable: {reason}");
    }
    if !scene.is_ready() {
        anyhow::bail!("scene did not become ready after a blocking load");
    }
    Ok(scene)
}

fn frame_step_ms(fps: u32) -> anyhow::Result<f64> {
    if fps == 0 {
        anyhow::bail!("fps must be > 0");
    }
    Ok(1000.0 / f64::from(fps))
}

fn create_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    if !args.time.is_finite() || args.time < 0.0 {
        anyhow::bail!("time must be a finite, non-negative number of ms");
    }
    let step = frame_step_ms(args.fps)?;
    let mut scene = open_scene(&args.config)?;

    // Stages hand over on observed frames, so replay the frame cadence up to `time`.
    let mut t = 0.0;
    while t < args.time {
        scene.update(t);
        t += step;
    }
    let frame = scene.render_frame(args.time);

    create_parent_dir(&args.out)?;
    frame.save_png(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let step = frame_step_ms(args.fps)?;
    let mut scene = open_scene(&args.config)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    for i in 0..args.count {
        let frame = scene.render_frame(i as f64 * step);
        let path = args.out_dir.join(format!("frame_{i:05}.png"));
        frame.save_png(&path)?;
    }

    eprintln!("wrote {} frames to {}", args.count, args.out_dir.display());
    Ok(())
}
