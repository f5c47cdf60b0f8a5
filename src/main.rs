use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pbsep::assets::ProfileLoader;
use pbsep::models::TargetSize;
use pbsep::rendering::SvgRasterizer;
use pbsep::services::{
    Exporter, MatrixRequest, MatrixRunner, Pipeline, PipelineRequest, PotraceTracer,
};

/// Opacity the matrix summary ranks configurations against
const TARGET_OPACITY_PCT: f64 = 17.0;

#[derive(Parser)]
#[command(name = "pbsep")]
#[command(about = "Convert a photograph to a deterministic 1-bit bitmap and vector outline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one profile against an image
    Process {
        /// Input image (PNG, JPEG, TIFF, ...)
        input: PathBuf,

        /// Base name for output files
        name: String,

        /// Output size: 128 or 256
        #[arg(short, long, default_value = "256")]
        size: TargetSize,

        /// Profile name or path to a YAML profile
        #[arg(short, long, default_value = "medallion")]
        profile: String,

        /// Set mask pixels become ink (default)
        #[arg(long, overrides_with = "no_invert")]
        invert: bool,

        /// Clear mask pixels become ink
        #[arg(long, overrides_with = "invert")]
        no_invert: bool,

        /// Output directory (default: next to the input)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Evaluate the preset configuration matrix and write a comparison gallery
    Matrix {
        /// Input image
        input: PathBuf,

        /// Base name for output files
        name: String,

        /// Output size: 128 or 256
        #[arg(short, long, default_value = "256")]
        size: TargetSize,

        /// Parent directory for `<name>_matrix/` (default: next to the input)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Reference image shown first in the gallery
        #[arg(short, long)]
        reference: Option<PathBuf>,
    },
    /// List built-in profiles
    Profiles,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pbsep=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            input,
            name,
            size,
            profile,
            invert: _,
            no_invert,
            output_dir,
        } => run_process_command(input, name, size, profile, !no_invert, output_dir),
        Commands::Matrix {
            input,
            name,
            size,
            output_dir,
            reference,
        } => run_matrix_command(input, name, size, output_dir, reference),
        Commands::Profiles => {
            run_profiles_command();
            Ok(())
        }
    }
}

fn exporter() -> Exporter {
    Exporter::new(
        Arc::new(PotraceTracer::from_env()),
        Arc::new(SvgRasterizer::new()),
    )
}

fn default_output_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn run_process_command(
    input: PathBuf,
    name: String,
    size: TargetSize,
    profile: String,
    invert: bool,
    output_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let output_dir = output_dir.unwrap_or_else(|| default_output_dir(&input));

    println!("Input: {}", input.display());
    println!("Target size: {size}x{size}");
    if invert {
        println!("Mode: inverted (set mask pixels become ink)");
    }

    let pipeline = Pipeline::new(ProfileLoader::from_env(), exporter());
    let request = PipelineRequest {
        input,
        output_name: name,
        output_dir,
        size: size.pixels(),
        profile,
        invert,
    };
    let result = pipeline.run(&request).context("Pipeline failed")?;

    println!(
        "\nOpaque pixels: {} / {} ({:.1}%)",
        result.opaque_count,
        result.total_pixels,
        result.opacity_pct()
    );
    println!("Bitmap size: {} bytes", result.bitmap.len());
    println!("Processing time: {:.1}ms", result.processing_time_ms);
    println!("\nBitmap: {}", result.paths.bitmap.display());
    println!("Preview SVG: {}", result.paths.svg.display());
    println!("Preview PNG: {}", result.paths.png.display());
    println!("Metadata: {}", result.paths.metadata.display());
    Ok(())
}

fn run_matrix_command(
    input: PathBuf,
    name: String,
    size: TargetSize,
    output_dir: Option<PathBuf>,
    reference: Option<PathBuf>,
) -> anyhow::Result<()> {
    let output_dir = output_dir.unwrap_or_else(|| default_output_dir(&input));
    let runner = MatrixRunner::with_default_presets(exporter())?;

    println!("Input: {}", input.display());
    println!("Target size: {size}x{size}");
    println!(
        "Running matrix configuration ({} variants)...",
        runner.configs().len()
    );

    let request = MatrixRequest {
        input,
        output_name: name,
        output_dir,
        size: size.pixels(),
        reference,
    };
    let report = runner.run(&request).context("Matrix run failed")?;

    println!("\nGenerated {} configurations", report.results.len());
    for failure in &report.failures {
        println!("  #{:02} failed: {}", failure.config_id, failure.error);
    }
    println!("Gallery: {}", report.gallery_path.display());
    println!("Matrix JSON: {}", report.json_path.display());

    println!("\nTop 5 closest to {TARGET_OPACITY_PCT:.0}% target:");
    for result in report.closest_to(TARGET_OPACITY_PCT).into_iter().take(5) {
        println!(
            "  #{:02}: {:5.1}% - {}",
            result.config.id,
            result.opacity_pct,
            result.png_file_name()
        );
    }
    Ok(())
}

fn run_profiles_command() {
    let loader = ProfileLoader::from_env();

    println!("Profiles:");
    for name in loader.list() {
        match loader.load(&name) {
            Ok(profile) => println!(
                "  {:<12} {} ({})",
                name,
                profile.mask.binarize.method,
                if profile.mask.contrast.is_some() {
                    "clahe"
                } else {
                    "no contrast"
                }
            ),
            Err(e) => println!("  {name:<12} error: {e}"),
        }
    }
    println!(
        "\nPROFILES_DIR = {}",
        std::env::var("PROFILES_DIR").unwrap_or_else(|_| "(not set)".to_string())
    );
}
