//! SpriteKey - background removal and keyframe smoothing for generated sprites

mod config;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use spritekey_core::{codec, ChromaKey, EasingCurve, LoopMode, PixelBuffer, Rgb, SharedPixelBuffer};
use spritekey_effects::{generate_smooth_animation, ExecutionHost};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "spritekey", version)]
struct Cli {
    /// JSON configuration file. Flags override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (ignores RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Remove the chroma-key background from an image and write a PNG.
    Key(KeyArgs),
    /// Expand keyframes into a smooth animation written as numbered PNGs.
    Animate(AnimateArgs),
}

#[derive(Parser, Debug)]
struct KeyArgs {
    /// Input image.
    input: PathBuf,

    /// Output PNG path.
    output: PathBuf,

    /// Key color: green, magenta or #RRGGBB.
    #[arg(long, value_parser = ChromaKey::parse)]
    key: Option<Rgb>,

    /// Tolerance percentage.
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    fuzz: Option<u8>,

    /// Run on the calling thread instead of the worker.
    #[arg(long, default_value_t = false)]
    cooperative: bool,
}

#[derive(Parser, Debug)]
struct AnimateArgs {
    /// Directory for frame_0000.png, frame_0001.png, ...
    output_dir: PathBuf,

    /// Keyframe images, in order.
    #[arg(required = true, num_args = 1..)]
    frames: Vec<PathBuf>,

    /// In-betweens per keyframe pair.
    #[arg(long)]
    insert: Option<usize>,

    /// linear, ease-in, ease-out or ease-in-out.
    #[arg(long)]
    easing: Option<EasingCurve>,

    /// loop, pingpong or none.
    #[arg(long)]
    loop_mode: Option<LoopMode>,

    /// Derive the in-between count from this playback rate.
    #[arg(long)]
    target_fps: Option<f32>,

    /// Rate the keyframes were drawn for.
    #[arg(long)]
    original_fps: Option<f32>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = AppConfig::load_or_default(cli.config.as_deref())?;
    match cli.cmd {
        Command::Key(args) => cmd_key(args, config),
        Command::Animate(args) => cmd_animate(args, config),
    }
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn cmd_key(args: KeyArgs, mut config: AppConfig) -> anyhow::Result<()> {
    if let Some(key) = args.key {
        config.chroma.key = key;
    }
    if let Some(fuzz) = args.fuzz {
        config.chroma = config.chroma.with_fuzz(fuzz);
    }
    config.force_cooperative |= args.cooperative;

    let buffer = read_image(&args.input)?;
    let host = if config.force_cooperative {
        ExecutionHost::cooperative_only()
    } else {
        ExecutionHost::probe()
    };
    info!(
        input = %args.input.display(),
        width = buffer.width(),
        height = buffer.height(),
        key = %config.chroma.key,
        fuzz = config.chroma.fuzz,
        executor = host.primary_name(),
        "removing background"
    );

    let keyed = host
        .remove_chroma_key(buffer, &config.chroma, |percent| {
            debug!(percent, "chroma key progress");
        })
        .with_context(|| format!("key '{}'", args.input.display()))?;
    host.shutdown();

    write_png(&args.output, &keyed)?;
    info!(output = %args.output.display(), "wrote keyed image");
    Ok(())
}

fn cmd_animate(args: AnimateArgs, mut config: AppConfig) -> anyhow::Result<()> {
    let animation = &mut config.animation;
    if let Some(insert) = args.insert {
        animation.interpolation_frames = insert;
    }
    if let Some(easing) = args.easing {
        animation.easing = easing;
    }
    if let Some(loop_mode) = args.loop_mode {
        animation.loop_mode = loop_mode;
    }
    if let Some(fps) = args.target_fps {
        animation.target_fps = Some(fps);
    }
    if let Some(fps) = args.original_fps {
        animation.original_fps = fps;
    }

    let keyframes = args
        .frames
        .iter()
        .map(|path| read_image(path).map(PixelBuffer::into_shared))
        .collect::<anyhow::Result<Vec<SharedPixelBuffer>>>()?;

    let frames = generate_smooth_animation(&keyframes, &config.animation);

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("create output dir '{}'", args.output_dir.display()))?;
    for (i, frame) in frames.iter().enumerate() {
        write_png(&args.output_dir.join(format!("frame_{i:04}.png")), frame)?;
    }

    info!(
        keyframes = keyframes.len(),
        frames = frames.len(),
        loop_mode = ?config.animation.loop_mode,
        output = %args.output_dir.display(),
        "wrote animation"
    );
    Ok(())
}

fn read_image(path: &Path) -> anyhow::Result<PixelBuffer> {
    let bytes = fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
    codec::decode_image(&bytes).with_context(|| format!("decode '{}'", path.display()))
}

fn write_png(path: &Path, buffer: &PixelBuffer) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let png = codec::encode_png(buffer)?;
    fs::write(path, png).with_context(|| format!("write png '{}'", path.display()))
}
