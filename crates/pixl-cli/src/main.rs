//! pixl - apply raster filter recipes from the command line
//!
//! Works on headerless interleaved sample files; decoding and encoding
//! container formats is left to other tools (e.g. `magick in.png rgb:-`).

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pixl")]
#[command(author, version, about = "Apply 8-bit raster filter recipes to raw sample files")]
#[command(long_about = "
Applies pixl transforms to headerless, interleaved, row-major sample files.
Inputs may be 1 (gray), 2 (gray+alpha), 3 (RGB) or 4 (RGBA) channels of
u8, u16 or f32 samples; alpha is dropped. Output is always u8.

Examples:
  pixl apply in.rgb -W 640 -H 480 -r recipe.yaml -o out.raw
  pixl apply in.gray -W 64 -H 64 -c 1 -r recipe.yaml -o out.raw
  pixl histogram in.rgb -W 640 -H 480 --bins
  pixl blend a.rgb -W 640 -H 480 --other b.rgb --other-width 320 --other-height 240 -o out.raw
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a YAML recipe to a raw image
    #[command(visible_alias = "a")]
    Apply(ApplyArgs),

    /// Print channel and luma histograms
    #[command(visible_alias = "hist")]
    Histogram(HistogramArgs),

    /// Alpha-blend two raw images
    Blend(BlendArgs),
}

/// Sample type of a raw input file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Depth {
    /// 8-bit unsigned
    U8,
    /// 16-bit unsigned, little-endian
    U16,
    /// 32-bit float, little-endian
    F32,
}

/// Geometry and layout of a raw input file.
#[derive(Args, Clone)]
pub struct RawArgs {
    /// Input sample file
    pub input: PathBuf,

    /// Width in pixels
    #[arg(short = 'W', long)]
    pub width: u32,

    /// Height in pixels
    #[arg(short = 'H', long)]
    pub height: u32,

    /// Interleaved channels per pixel (1-4)
    #[arg(short, long, default_value = "3")]
    pub channels: usize,

    /// Sample type
    #[arg(short, long, value_enum, default_value = "u8")]
    pub depth: Depth,
}

#[derive(Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub raw: RawArgs,

    /// Recipe file (YAML)
    #[arg(short, long)]
    pub recipe: PathBuf,

    /// Output file (u8 samples)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Also write the recipe as parsed, with defaults filled in
    #[arg(long)]
    pub dump_recipe: Option<PathBuf>,
}

#[derive(Args)]
pub struct HistogramArgs {
    #[command(flatten)]
    pub raw: RawArgs,

    /// Print all 256 bin counts per channel
    #[arg(long)]
    pub bins: bool,
}

/// Pre-blend equalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Equalize {
    /// Blend the images as they are
    None,
    /// Equalize R, G and B independently
    PerChannel,
    /// Equalize luma and rescale each pixel
    Luminance,
}

#[derive(Args)]
pub struct BlendArgs {
    #[command(flatten)]
    pub raw: RawArgs,

    /// Second image (resized to the first)
    #[arg(long)]
    pub other: PathBuf,

    /// Width of the second image
    #[arg(long)]
    pub other_width: u32,

    /// Height of the second image
    #[arg(long)]
    pub other_height: u32,

    /// Channels of the second image (defaults to --channels)
    #[arg(long)]
    pub other_channels: Option<usize>,

    /// Weight of the first image, clamped to [0, 1]
    #[arg(short, long, default_value = "0.5")]
    pub alpha: f64,

    /// Equalize both images before blending
    #[arg(short, long, value_enum, default_value = "none")]
    pub equalize: Equalize,

    /// Output file (u8 RGB samples)
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Installs the fmt subscriber; `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Apply(args) => commands::apply::run(args, cli.verbose),
        Commands::Histogram(args) => commands::histogram::run(args, cli.verbose),
        Commands::Blend(args) => commands::blend::run(args, cli.verbose),
    }
}
