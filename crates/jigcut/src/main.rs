//! jigcut: cut an image into interlocking jigsaw piece PNGs.
//!
//! Each piece is written as `piece_{row}_{column}.png` on a transparent
//! canvas large enough for its tabs, together with a `manifest.json`
//! describing the grid. Optional outputs preview the grid or the cut
//! lines over the source image, or export the cut lines as SVG.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin jigcut -- [OPTIONS] <IMAGE_PATH>
//! ```
//!
//! Set `RUST_LOG=debug` to log every piece as it is rendered.

#![allow(clippy::print_stderr)]

mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use image::{Rgba, RgbaImage};
use jigcut_core::preview::{self, LineStyle};
use jigcut_core::{
    CancelToken, Dimensions, EdgeStyle, MaskMode, PuzzleConfig, PuzzleError, PuzzlePlan,
};
use tracing_subscriber::EnvFilter;

use crate::output::{Manifest, ManifestPiece, OutputError};

/// Canvas size of the `--reference-tab` diagram.
const REFERENCE_TAB_SIZE: Dimensions = Dimensions::new(800, 400);
/// Blank border around the reference tab.
const REFERENCE_TAB_MARGIN: u32 = 50;

/// Cut an image into interlocking jigsaw pieces.
///
/// Writes one transparent PNG per piece plus a JSON manifest to the
/// output directory.
#[derive(Parser)]
#[command(name = "jigcut", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Directory to write pieces and the manifest into.
    #[arg(short, long, default_value = "pieces")]
    output_dir: PathBuf,

    /// Number of piece rows.
    #[arg(long, default_value_t = PuzzleConfig::DEFAULT_ROWS)]
    rows: u32,

    /// Number of piece columns.
    #[arg(long, default_value_t = PuzzleConfig::DEFAULT_COLUMNS)]
    columns: u32,

    /// Tab size as a fraction of the smaller cell dimension (0.0-0.3).
    #[arg(long, default_value_t = PuzzleConfig::DEFAULT_TAB_FRACTION)]
    tab_fraction: f64,

    /// Seed for the tab/slot pattern.
    #[arg(long, default_value_t = PuzzleConfig::DEFAULT_SEED)]
    seed: u64,

    /// Line segments per sampled curve.
    #[arg(long, default_value_t = PuzzleConfig::DEFAULT_CURVE_STEPS)]
    curve_steps: u32,

    /// Tab shape.
    #[arg(long, value_enum, default_value_t = Style::Arc)]
    edge_style: Style,

    /// Anti-alias piece edges instead of hard 0/255 alpha.
    #[arg(long)]
    antialias: bool,

    /// Fail if the image size does not divide evenly by the grid.
    #[arg(long)]
    strict: bool,

    /// Fill tabs with the neighboring pixels instead of black.
    #[arg(long)]
    bleed: bool,

    /// Full puzzle config as a JSON string.
    ///
    /// When provided, all other puzzle parameter flags are ignored.
    /// The JSON must be a valid `PuzzleConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Write a copy of the image with the cell grid drawn on it.
    #[arg(long, value_name = "PATH")]
    grid_preview: Option<PathBuf>,

    /// Write a copy of the image with every cut line drawn on it.
    #[arg(long, value_name = "PATH")]
    cut_preview: Option<PathBuf>,

    /// Write the cut lines as an SVG document.
    #[arg(long, value_name = "PATH")]
    svg: Option<PathBuf>,

    /// Write a diagram of the Bézier reference tab with its control points.
    #[arg(long, value_name = "PATH")]
    reference_tab: Option<PathBuf>,

    /// Line width in pixels for the previews.
    #[arg(long, default_value_t = 2, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    line_width: u32,
}

/// Tab shape selection.
#[derive(Clone, Copy, ValueEnum)]
enum Style {
    /// Half-circle head joined by straight runs.
    Arc,
    /// Smooth cubic Bézier tab.
    Bezier,
}

/// Errors surfaced to the user.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("error parsing --config-json: {0}")]
    ConfigJson(#[from] serde_json::Error),

    #[error("error reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Puzzle(#[from] PuzzleError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Build a [`PuzzleConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<PuzzleConfig, CliError> {
    if let Some(ref json) = cli.config_json {
        return Ok(serde_json::from_str(json)?);
    }

    Ok(PuzzleConfig {
        rows: cli.rows,
        columns: cli.columns,
        tab_fraction: cli.tab_fraction,
        seed: cli.seed,
        curve_steps: cli.curve_steps,
        edge_style: match cli.edge_style {
            Style::Arc => EdgeStyle::Arc,
            Style::Bezier => EdgeStyle::Bezier,
        },
        mask_mode: if cli.antialias {
            MaskMode::Antialiased
        } else {
            MaskMode::Binary
        },
        strict_divisibility: cli.strict,
        bleed: cli.bleed,
    })
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("jigcut: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = config_from_cli(cli)?;
    // Reject bad parameters before reading or decoding anything.
    config.validate()?;

    let image_bytes = std::fs::read(&cli.image_path).map_err(|source| CliError::Read {
        path: cli.image_path.clone(),
        source,
    })?;
    tracing::info!(
        path = %cli.image_path.display(),
        bytes = image_bytes.len(),
        "loaded image",
    );

    let source = jigcut_core::decode::decode_rgba(&image_bytes)?;
    let dimensions = Dimensions::new(source.width(), source.height());
    let plan = PuzzlePlan::new(&config, dimensions)?;

    let style = LineStyle {
        color: Rgba([255, 0, 0, 255]),
        width: cli.line_width,
    };
    if let Some(path) = &cli.grid_preview {
        let grid = preview::draw_grid(&source, config.rows, config.columns, style);
        save_image(&grid, path)?;
    }
    if let Some(path) = &cli.cut_preview {
        let cuts = preview::draw_cut_lines(&source, &plan.outlines(), style);
        save_image(&cuts, path)?;
    }
    if let Some(path) = &cli.reference_tab {
        let diagram = preview::draw_reference_tab(
            REFERENCE_TAB_SIZE,
            REFERENCE_TAB_MARGIN,
            LineStyle {
                color: Rgba([0, 0, 0, 255]),
                width: cli.line_width,
            },
        );
        save_image(&diagram, path)?;
    }
    if let Some(path) = &cli.svg {
        write_svg(cli, &plan, path)?;
    }

    let pieces = plan.render(&source, &CancelToken::new())?;
    output::write_pieces(&cli.output_dir, &pieces)?;

    let manifest = Manifest {
        source: cli.image_path.display().to_string(),
        dimensions,
        config,
        geometry: *plan.geometry(),
        pieces: pieces.iter().map(ManifestPiece::from_artifact).collect(),
    };
    output::write_manifest(&cli.output_dir, &manifest)?;

    tracing::info!(
        pieces = pieces.len(),
        dir = %cli.output_dir.display(),
        "wrote puzzle",
    );
    Ok(())
}

fn save_image(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    image.save(path).map_err(|source| OutputError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "wrote preview");
    Ok(())
}

fn write_svg(cli: &Cli, plan: &PuzzlePlan, path: &Path) -> Result<(), CliError> {
    let config = plan.config();
    let title = cli
        .image_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("jigcut");
    let description = format!(
        "{}x{} pieces, seed {}, {:?} tabs",
        config.rows, config.columns, config.seed, config.edge_style,
    );
    let config_json = serde_json::to_string(config).map_err(OutputError::Json)?;
    let svg = jigcut_export::to_svg(
        plan,
        &jigcut_export::SvgMetadata {
            title: Some(title),
            description: Some(&description),
            config_json: Some(&config_json),
        },
    );
    std::fs::write(path, &svg).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), bytes = svg.len(), "wrote SVG");
    Ok(())
}
