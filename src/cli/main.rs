//! Mask Refinement CLI Tool
//!
//! Command-line interface for the refinement pipeline. Each subcommand
//! wraps one stage with a uniform contract: PNG paths plus explicit
//! named parameters in, one JSON object on stdout out, and the mask file
//! overwritten in place as a checkpoint so a human or agent can inspect
//! the result between stages. Geometry-critical values (coordinates,
//! row ranges, aggressiveness) are required arguments; nothing about
//! the mask's geometry changes on an implicit default.

use super::report::{
    CompositeReport, DeliveryManifest, DilateReport, EditReport, FailureReport, HardenReport,
    InspectReport, MirrorReport, Report, ReviewReport, ShapeReport, ThresholdReport,
};
use crate::{
    config::{RefineConfig, RefineConfigBuilder, RegionLayout},
    pipeline::RefinePipeline,
    services::ImageIoService,
    stages::{HardenMode, Rect, ThresholdMode},
    tracing_config::{TracingConfig, TracingFormat},
    types::Side,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Mask refinement CLI tool
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "cutout-refine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging on stderr (-v: INFO, -vv: DEBUG, -vvv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliThresholdMode {
    /// Zero sub-threshold alpha, keep surviving pixels untouched
    Soft,
    /// Zero sub-threshold alpha, force survivors opaque with original RGB
    Binary,
}

impl From<CliThresholdMode> for ThresholdMode {
    fn from(mode: CliThresholdMode) -> Self {
        match mode {
            CliThresholdMode::Soft => Self::Soft,
            CliThresholdMode::Binary => Self::Binary,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliSide {
    Left,
    Right,
}

impl From<CliSide> for Side {
    fn from(side: CliSide) -> Self {
        match side {
            CliSide::Left => Self::Left,
            CliSide::Right => Self::Right,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliHardenMode {
    /// Scan left-to-right only
    LeftEdge,
    /// Scan from both sides
    Symmetric,
}

impl From<CliHardenMode> for HardenMode {
    fn from(mode: CliHardenMode) -> Self {
        match mode {
            CliHardenMode::LeftEdge => Self::LeftEdge,
            CliHardenMode::Symmetric => Self::Symmetric,
        }
    }
}

/// One subcommand per refinement tool
#[derive(Subcommand)]
pub enum Command {
    /// Convert probabilistic alpha to a decisive foreground mask
    Threshold {
        /// Mask PNG, overwritten in place
        mask: PathBuf,
        /// Original image (required for binary mode)
        #[arg(long)]
        original: Option<PathBuf>,
        /// Strictness dial, 1-100; higher keeps fewer pixels
        #[arg(long)]
        aggressiveness: u8,
        /// Output mode
        #[arg(long, value_enum, default_value_t = CliThresholdMode::Soft)]
        mode: CliThresholdMode,
    },

    /// Enforce straight body sides and smooth cap/base curvature
    Shape {
        /// Mask PNG, overwritten in place
        mask: PathBuf,
        /// Original image for surviving-pixel colors
        #[arg(long)]
        original: Option<PathBuf>,
        /// Cap region end as a fraction of content height [default: 0.15]
        #[arg(long)]
        cap_end: Option<f32>,
        /// Transition region end [default: 0.20]
        #[arg(long)]
        transition_end: Option<f32>,
        /// Body region end [default: 0.85]
        #[arg(long)]
        body_end: Option<f32>,
        /// Base taper fraction toward center, 0 disables [default: 0.30]
        #[arg(long)]
        base_curve: Option<f32>,
    },

    /// Reflect the clean side's edge onto the damaged side
    Mirror {
        /// Mask PNG, overwritten in place
        mask: PathBuf,
        /// Original image for fill colors
        #[arg(long)]
        original: Option<PathBuf>,
        /// Center axis x-coordinate
        #[arg(long)]
        center: u32,
        /// Side to trust; the opposite side is rewritten
        #[arg(long, value_enum)]
        source: CliSide,
        /// First row to mirror (inclusive; with --row-to)
        #[arg(long)]
        row_from: Option<u32>,
        /// Row to stop before (exclusive; with --row-from)
        #[arg(long)]
        row_to: Option<u32>,
        /// Alpha a source pixel must exceed to count [default: 128]
        #[arg(long)]
        activation: Option<u8>,
    },

    /// Eliminate semi-transparent fringe pixels against the original
    Harden {
        /// Mask PNG, overwritten in place
        mask: PathBuf,
        /// Original image (required: supplies the luminosity reference)
        #[arg(long)]
        original: PathBuf,
        /// Which edges to rewrite
        #[arg(long, value_enum, default_value_t = CliHardenMode::LeftEdge)]
        mode: CliHardenMode,
        /// Luminosity rise marking a light product pixel [default: 15]
        #[arg(long)]
        threshold: Option<f32>,
        /// Luminosity drop marking a dark product pixel [default: 80]
        #[arg(long)]
        dark_band: Option<f32>,
    },

    /// Place a hard edge at x on one side for a row range
    SetEdge {
        /// Mask PNG, overwritten in place
        mask: PathBuf,
        /// Original image for fill colors and the background skip test
        #[arg(long)]
        original: Option<PathBuf>,
        /// Which edge to move
        #[arg(long, value_enum)]
        side: CliSide,
        /// Target edge x-coordinate
        #[arg(long)]
        x: u32,
        /// First row (inclusive)
        #[arg(long)]
        row_from: u32,
        /// Row to stop before (exclusive)
        #[arg(long)]
        row_to: u32,
        /// Pixels past the old edge that fills overwrite [default: 5]
        #[arg(long)]
        blend_zone: Option<u32>,
    },

    /// Fill a rectangular region opaque (background-like pixels skipped)
    FillRect {
        /// Mask PNG, overwritten in place
        mask: PathBuf,
        /// Original image for fill colors and the background skip test
        #[arg(long)]
        original: Option<PathBuf>,
        #[arg(long)]
        x1: u32,
        #[arg(long)]
        y1: u32,
        #[arg(long)]
        x2: u32,
        #[arg(long)]
        y2: u32,
        /// Background color-distance threshold [default: 50]
        #[arg(long)]
        color_distance: Option<f32>,
    },

    /// Clear a rectangular region to transparency
    ClearRect {
        /// Mask PNG, overwritten in place
        mask: PathBuf,
        #[arg(long)]
        x1: u32,
        #[arg(long)]
        y1: u32,
        #[arg(long)]
        x2: u32,
        #[arg(long)]
        y2: u32,
    },

    /// Grow the mask with a circular max-filter (gap recovery)
    Dilate {
        /// Mask PNG, overwritten in place
        mask: PathBuf,
        /// Structuring element radius in pixels (0-20)
        #[arg(long)]
        radius: u32,
    },

    /// Trim, scale, and center onto the final delivery canvas
    Composite {
        /// Mask PNG (source; also the output unless --output is given)
        mask: PathBuf,
        /// Write the delivery canvas here instead of over the mask
        #[arg(long)]
        output: Option<PathBuf>,
        /// Square canvas side length in pixels
        #[arg(long, default_value_t = 1024)]
        size: u32,
        /// Padding fraction per side, [0, 0.5)
        #[arg(long, default_value_t = 0.05)]
        padding: f32,
        /// Product SKU for the delivery manifest
        #[arg(long)]
        sku: Option<String>,
        /// Shot angle for the delivery manifest
        #[arg(long)]
        angle: Option<String>,
        /// Mark the delivery as a thumbnail
        #[arg(long)]
        thumbnail: bool,
    },

    /// Read-only situational report: dimensions, background, content box
    Inspect {
        /// Mask PNG (not modified)
        mask: PathBuf,
        /// Original image for the background model
        #[arg(long)]
        original: Option<PathBuf>,
    },

    /// Render the mask over pure black for visual edge-defect review
    Review {
        /// Mask PNG (not modified)
        mask: PathBuf,
        /// Where to write the review image
        #[arg(long)]
        output: PathBuf,
    },
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose).context("Failed to initialize tracing")?;

    match run(cli.command) {
        Ok(json) => {
            println!("{json}");
            Ok(())
        }
        Err(e) => {
            let failure = FailureReport {
                success: false,
                error: format!("{e:#}"),
            };
            let json = serde_json::to_string(&failure).unwrap_or_else(|_| {
                r#"{"success":false,"error":"failed to serialize error report"}"#.to_string()
            });
            println!("{json}");
            std::process::exit(1);
        }
    }
}

/// Initialize tracing based on verbosity level
fn init_tracing(verbose_count: u8) -> Result<()> {
    TracingConfig::new()
        .with_verbosity(verbose_count)
        .with_format(TracingFormat::Console)
        .init()
        .context("Failed to initialize tracing subscriber")
}

/// Build a config with per-command overrides applied.
fn config_with<F: FnOnce(RefineConfigBuilder) -> RefineConfigBuilder>(
    customize: F,
) -> Result<RefineConfig> {
    Ok(customize(RefineConfig::builder()).build()?)
}

/// Resolve an optional row range, requiring both ends together.
fn row_range(from: Option<u32>, to: Option<u32>) -> Result<Option<std::ops::Range<u32>>> {
    match (from, to) {
        (None, None) => Ok(None),
        (Some(from), Some(to)) => Ok(Some(from..to)),
        _ => anyhow::bail!("--row-from and --row-to must be given together"),
    }
}

/// Execute one subcommand and return its JSON report.
#[allow(clippy::too_many_lines)]
fn run(command: Command) -> Result<String> {
    match command {
        Command::Threshold {
            mask,
            original,
            aggressiveness,
            mode,
        } => {
            let config = RefineConfig::default();
            let pipeline = RefinePipeline::from_files(&mask, original.as_ref(), config)?;
            let mode: ThresholdMode = mode.into();
            let (pipeline, stats) = pipeline.threshold(mode, aggressiveness)?;
            pipeline.save(&mask).context("Failed to write checkpoint")?;
            Ok(Report::ok(ThresholdReport {
                dimensions: pipeline.dimensions(),
                mode: mode.to_string(),
                aggressiveness,
                stats,
            })
            .to_json()?)
        }

        Command::Shape {
            mask,
            original,
            cap_end,
            transition_end,
            body_end,
            base_curve,
        } => {
            let mut regions = RegionLayout::default();
            if let Some(v) = cap_end {
                regions.cap_end = v;
            }
            if let Some(v) = transition_end {
                regions.transition_end = v;
            }
            if let Some(v) = body_end {
                regions.body_end = v;
            }
            let config = config_with(|builder| {
                let builder = builder.regions(regions);
                match base_curve {
                    Some(v) => builder.base_curve(v),
                    None => builder,
                }
            })?;
            let pipeline = RefinePipeline::from_files(&mask, original.as_ref(), config)?;
            let (pipeline, stats) = pipeline.correct_shape()?;
            pipeline.save(&mask).context("Failed to write checkpoint")?;
            Ok(Report::ok(ShapeReport {
                dimensions: pipeline.dimensions(),
                stats,
            })
            .to_json()?)
        }

        Command::Mirror {
            mask,
            original,
            center,
            source,
            row_from,
            row_to,
            activation,
        } => {
            let config = config_with(|builder| match activation {
                Some(v) => builder.activation_threshold(v),
                None => builder,
            })?;
            let rows = row_range(row_from, row_to)?;
            let source: Side = source.into();
            let pipeline = RefinePipeline::from_files(&mask, original.as_ref(), config)?;
            let (pipeline, stats) = pipeline.mirror(center, source, rows)?;
            pipeline.save(&mask).context("Failed to write checkpoint")?;
            Ok(Report::ok(MirrorReport {
                dimensions: pipeline.dimensions(),
                center,
                source: source.to_string(),
                stats,
            })
            .to_json()?)
        }

        Command::Harden {
            mask,
            original,
            mode,
            threshold,
            dark_band,
        } => {
            let config = config_with(|mut builder| {
                if let Some(v) = threshold {
                    builder = builder.luminosity_threshold(v);
                }
                if let Some(v) = dark_band {
                    builder = builder.dark_band(v);
                }
                builder
            })?;
            let pipeline = RefinePipeline::from_files(&mask, Some(&original), config)?;
            let bg_color = pipeline
                .background()
                .map(|bg| bg.mean)
                .unwrap_or_default();
            let mode: HardenMode = mode.into();
            let (pipeline, stats) = pipeline.harden(mode)?;
            pipeline.save(&mask).context("Failed to write checkpoint")?;
            Ok(Report::ok(HardenReport {
                dimensions: pipeline.dimensions(),
                mode: mode.to_string(),
                bg_color,
                stats,
            })
            .to_json()?)
        }

        Command::SetEdge {
            mask,
            original,
            side,
            x,
            row_from,
            row_to,
            blend_zone,
        } => {
            let config = config_with(|builder| match blend_zone {
                Some(v) => builder.blend_zone(v),
                None => builder,
            })?;
            let pipeline = RefinePipeline::from_files(&mask, original.as_ref(), config)?;
            let (pipeline, stats) = pipeline.set_edge(side.into(), x, row_from..row_to)?;
            pipeline.save(&mask).context("Failed to write checkpoint")?;
            Ok(Report::ok(EditReport {
                dimensions: pipeline.dimensions(),
                operation: "set-edge",
                stats,
            })
            .to_json()?)
        }

        Command::FillRect {
            mask,
            original,
            x1,
            y1,
            x2,
            y2,
            color_distance,
        } => {
            let config = config_with(|builder| match color_distance {
                Some(v) => builder.color_distance(v),
                None => builder,
            })?;
            let pipeline = RefinePipeline::from_files(&mask, original.as_ref(), config)?;
            let (pipeline, stats) = pipeline.fill_rect(Rect { x1, y1, x2, y2 })?;
            pipeline.save(&mask).context("Failed to write checkpoint")?;
            Ok(Report::ok(EditReport {
                dimensions: pipeline.dimensions(),
                operation: "fill-rect",
                stats,
            })
            .to_json()?)
        }

        Command::ClearRect { mask, x1, y1, x2, y2 } => {
            let pipeline = RefinePipeline::from_files(&mask, None, RefineConfig::default())?;
            let (pipeline, stats) = pipeline.clear_rect(Rect { x1, y1, x2, y2 })?;
            pipeline.save(&mask).context("Failed to write checkpoint")?;
            Ok(Report::ok(EditReport {
                dimensions: pipeline.dimensions(),
                operation: "clear-rect",
                stats,
            })
            .to_json()?)
        }

        Command::Dilate { mask, radius } => {
            let pipeline = RefinePipeline::from_files(&mask, None, RefineConfig::default())?;
            let (pipeline, stats) = pipeline.dilate(radius)?;
            pipeline.save(&mask).context("Failed to write checkpoint")?;
            Ok(Report::ok(DilateReport {
                dimensions: pipeline.dimensions(),
                stats,
            })
            .to_json()?)
        }

        Command::Composite {
            mask,
            output,
            size,
            padding,
            sku,
            angle,
            thumbnail,
        } => {
            let output = output.unwrap_or_else(|| mask.clone());
            let pipeline = RefinePipeline::from_files(&mask, None, RefineConfig::default())?;
            let (pipeline, stats) = pipeline.composite(size, padding)?;
            pipeline
                .save(&output)
                .context("Failed to write delivery canvas")?;
            Ok(Report::ok(CompositeReport {
                stats,
                output: output.clone(),
                manifest: DeliveryManifest {
                    path: output,
                    sku,
                    angle,
                    thumbnail,
                },
            })
            .to_json()?)
        }

        Command::Inspect { mask, original } => {
            let pipeline =
                RefinePipeline::from_files(&mask, original.as_ref(), RefineConfig::default())?;
            let profile = pipeline.profile(0);
            let content_box = profile.content_rows.map(|(top, bottom)| {
                let (left, right) = profile
                    .left
                    .iter()
                    .zip(&profile.right)
                    .filter_map(|(l, r)| l.zip(*r))
                    .fold((u32::MAX, 0u32), |(min_l, max_r), (l, r)| {
                        (min_l.min(l), max_r.max(r))
                    });
                crate::types::ContentBox {
                    x: left,
                    y: top,
                    width: right - left + 1,
                    height: bottom - top + 1,
                }
            });
            let (opaque, partial) = pipeline.mask().pixels().fold((0u64, 0u64), |acc, p| {
                match p[3] {
                    255 => (acc.0 + 1, acc.1),
                    0 => acc,
                    _ => (acc.0, acc.1 + 1),
                }
            });
            Ok(Report::ok(InspectReport {
                dimensions: pipeline.dimensions(),
                bg_color: pipeline.background().map(|bg| bg.mean),
                bg_luminosity: pipeline.background().map(|bg| bg.luminosity),
                content_box,
                opaque_pixels: opaque,
                partial_pixels: partial,
            })
            .to_json()?)
        }

        Command::Review { mask, output } => {
            let buffer = ImageIoService::load_rgba(&mask)?;
            let review = ImageIoService::compose_over_black(&buffer);
            ImageIoService::save_png_atomic(&review, &output)
                .context("Failed to write review image")?;
            Ok(Report::ok(ReviewReport {
                dimensions: review.dimensions(),
                output,
            })
            .to_json()?)
        }
    }
}
