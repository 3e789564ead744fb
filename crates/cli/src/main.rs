#![deny(unsafe_code)]
//! CLI binary for flowvis.
//!
//! Subcommands:
//! - `lic <field>`: line integral convolution of a noise texture, write PNG
//! - `noise`: write a white-noise texture
//! - `streamline <field>`: trace seeded streamlines, write PNG
//! - `compare <field>`: Euler vs RK4 from one seed
//! - `contour <field>`: marching squares isolines, write PNG
//! - `list`: print available fields, presets and knob schemas

mod error;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use error::CliError;
use flowvis_contour::{grid_lines, ContourConfig};
use flowvis_core::{noise_texture, ColorImage, CoordinateRange, DVec2, DVec4, TransferFunction};
use flowvis_lic::LicConfig;
use flowvis_pipeline::pixel::{colorize, draw_polyline, draw_segment};
use flowvis_pipeline::snapshot::write_png;
use flowvis_pipeline::{ScalarFieldKind, VectorFieldKind};
use flowvis_streamline::{
    compare_methods, grid_seeds, magnitude_weighted_seeds, random_seeds, Bounds, Integrator,
    IntegratorConfig, PlotTransform,
};
use serde_json::{json, Value};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const WHITE: DVec4 = DVec4::new(255.0, 255.0, 255.0, 255.0);
const INK: DVec4 = DVec4::new(0.1, 0.1, 0.1, 1.0);
const EULER_COLOR: DVec4 = DVec4::new(0.85, 0.2, 0.15, 1.0);
const RK4_COLOR: DVec4 = DVec4::new(0.1, 0.3, 0.85, 1.0);
const GRID_COLOR: DVec4 = DVec4::new(0.75, 0.75, 0.75, 1.0);

#[derive(Parser)]
#[command(name = "flowvis", about = "Flow visualization: streamlines, LIC and isocontours")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Placement {
    /// Cell centers of a regular grid.
    Grid,
    /// Uniformly random positions.
    Random,
    /// Random positions favoring fast flow.
    Weighted,
}

#[derive(Subcommand)]
enum Command {
    /// Convolve a noise texture along a vector field and write a PNG.
    Lic {
        /// Vector field name (see `list`).
        field: String,

        /// Field grid width in samples.
        #[arg(short = 'W', long, default_value_t = 32)]
        width: usize,

        /// Field grid height in samples.
        #[arg(short = 'H', long, default_value_t = 32)]
        height: usize,

        /// Texture and output width in pixels.
        #[arg(long, default_value_t = 256)]
        texture_width: usize,

        /// Texture and output height in pixels.
        #[arg(long, default_value_t = 256)]
        texture_height: usize,

        /// Noise texture seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Threshold the noise texture to black and white.
        #[arg(long)]
        bw: bool,

        /// Field parameters as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,

        /// LIC knobs as a JSON string (see `list --json`).
        #[arg(long, default_value = "{}")]
        config: String,

        /// Output file path.
        #[arg(short, long, default_value = "lic.png")]
        output: PathBuf,
    },
    /// Write a white-noise texture.
    Noise {
        #[arg(short = 'W', long, default_value_t = 256)]
        width: usize,

        #[arg(short = 'H', long, default_value_t = 256)]
        height: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Threshold to black and white.
        #[arg(long)]
        bw: bool,

        #[arg(short, long, default_value = "noise.png")]
        output: PathBuf,
    },
    /// Trace streamlines from many seeds and draw them.
    Streamline {
        /// Vector field name (see `list`).
        field: String,

        #[arg(short = 'W', long, default_value_t = 32)]
        width: usize,

        #[arg(short = 'H', long, default_value_t = 32)]
        height: usize,

        /// Seeds per axis for grid placement, total seeds otherwise.
        #[arg(short = 'n', long, default_value_t = 8)]
        seeds: usize,

        #[arg(long, value_enum, default_value_t = Placement::Grid)]
        placement: Placement,

        /// Seed for random placement.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Trace backward as well as forward from every seed.
        #[arg(long)]
        bidirectional: bool,

        #[arg(long, default_value = "{}")]
        params: String,

        /// Integrator knobs as a JSON string (see `list --json`).
        #[arg(long, default_value = "{}")]
        config: String,

        /// Output image size in pixels (square).
        #[arg(long, default_value_t = 512)]
        size: usize,

        #[arg(short, long, default_value = "streamlines.png")]
        output: PathBuf,
    },
    /// Integrate Euler and RK4 side by side from one seed.
    Compare {
        field: String,

        #[arg(short = 'W', long, default_value_t = 32)]
        width: usize,

        #[arg(short = 'H', long, default_value_t = 32)]
        height: usize,

        /// Seed x in grid units (default: domain center).
        #[arg(long)]
        x: Option<f64>,

        /// Seed y in grid units (default: domain center).
        #[arg(long)]
        y: Option<f64>,

        #[arg(long, default_value_t = 0.1)]
        step_size: f64,

        #[arg(short, long, default_value_t = 200)]
        steps: usize,

        #[arg(long, default_value = "{}")]
        params: String,

        /// Also draw both paths to this PNG.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Extract isolines of a scalar field and draw them.
    Contour {
        /// Scalar field name (see `list`).
        field: String,

        #[arg(short = 'W', long, default_value_t = 32)]
        width: usize,

        #[arg(short = 'H', long, default_value_t = 32)]
        height: usize,

        #[arg(long, default_value = "{}")]
        params: String,

        /// Contour knobs as a JSON string (see `list --json`).
        #[arg(long, default_value = "{}")]
        config: String,

        /// Paint the scalar field under the isolines.
        #[arg(long)]
        background: bool,

        /// Draw midpoint and asymptotic isolines together (see `other_color`).
        #[arg(long)]
        both_deciders: bool,

        #[arg(long, default_value_t = 512)]
        size: usize,

        #[arg(short, long, default_value = "contour.png")]
        output: PathBuf,
    },
    /// List available fields, presets and knob schemas.
    List,
}

fn parse_json(flag: &str, raw: &str) -> Result<Value, CliError> {
    serde_json::from_str(raw).map_err(|e| CliError::Input(format!("invalid --{flag} JSON: {e}")))
}

fn report(json_mode: bool, info: Value, summary: String) -> Result<(), CliError> {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        eprintln!("{summary}");
    }
    Ok(())
}

fn blank_canvas(size: usize) -> Result<ColorImage, CliError> {
    Ok(ColorImage::filled(size, size, WHITE)?)
}

fn output_name(path: &Path) -> String {
    path.display().to_string()
}

fn run(cli: Cli) -> Result<(), CliError> {
    let json_mode = cli.json;
    match cli.command {
        Command::List => {
            let vector_fields = VectorFieldKind::list();
            let scalar_fields = ScalarFieldKind::list();
            let presets = ["grayscale", "cool_warm", "rainbow"];
            if json_mode {
                let info = json!({
                    "vector_fields": vector_fields,
                    "scalar_fields": scalar_fields,
                    "transfer_presets": presets,
                    "schemas": {
                        "integrator": IntegratorConfig::param_schema(),
                        "lic": LicConfig::param_schema(),
                        "contour": ContourConfig::param_schema(),
                    },
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Vector fields:");
                for name in vector_fields {
                    println!("  {name}");
                }
                println!("Scalar fields:");
                for name in scalar_fields {
                    println!("  {name}");
                }
                println!("Transfer presets:");
                println!("  {}", presets.join(", "));
            }
        }
        Command::Noise {
            width,
            height,
            seed,
            bw,
            output,
        } => {
            let texture = noise_texture(width, height, seed, bw)?;
            write_png(&texture, &output)?;
            report(
                json_mode,
                json!({
                    "width": width,
                    "height": height,
                    "seed": seed,
                    "black_and_white": bw,
                    "output": output_name(&output),
                }),
                format!("noise {width}x{height} (seed {seed}) -> {}", output.display()),
            )?;
        }
        Command::Lic {
            field,
            width,
            height,
            texture_width,
            texture_height,
            seed,
            bw,
            params,
            config,
            output,
        } => {
            let params = parse_json("params", &params)?;
            let config = LicConfig::from_json(&parse_json("config", &config)?)?;
            let vectors = VectorFieldKind::from_name(&field, &params)?.build(
                width,
                height,
                CoordinateRange::default(),
            )?;
            let texture = noise_texture(texture_width, texture_height, seed, bw)?;
            let image = flowvis_lic::render(&vectors, &texture, &config)?;
            write_png(&image, &output)?;
            report(
                json_mode,
                json!({
                    "field": field,
                    "field_size": [width, height],
                    "texture_size": [texture_width, texture_height],
                    "seed": seed,
                    "config": config,
                    "output": output_name(&output),
                }),
                format!(
                    "{} LIC of {field} ({width}x{height} -> {texture_width}x{texture_height}) -> {}",
                    config.algorithm,
                    output.display()
                ),
            )?;
        }
        Command::Streamline {
            field,
            width,
            height,
            seeds,
            placement,
            seed,
            bidirectional,
            params,
            config,
            size,
            output,
        } => {
            let params = parse_json("params", &params)?;
            let config = IntegratorConfig::from_json(&parse_json("config", &config)?)?;
            let vectors = VectorFieldKind::from_name(&field, &params)?.build(
                width,
                height,
                CoordinateRange::default(),
            )?;
            let bounds = Bounds::of_field(&vectors);
            let starts = match placement {
                Placement::Grid => grid_seeds(bounds, seeds, seeds)?,
                Placement::Random => random_seeds(bounds, seeds, seed)?,
                Placement::Weighted => magnitude_weighted_seeds(&vectors, seeds, seed)?,
            };
            let integrator = Integrator::new(&vectors, config)?;
            let plot = PlotTransform::with_default_margin(width, height)?;

            let mut canvas = blank_canvas(size)?;
            let mut terminations: BTreeMap<&str, usize> = BTreeMap::new();
            let mut total_points = 0;
            for start in &starts {
                let points = if bidirectional {
                    let (back, fwd) = integrator.trace_bidirectional(*start);
                    for t in [back.termination(), fwd.termination()] {
                        *terminations.entry(t.as_str()).or_default() += 1;
                    }
                    let mut points: Vec<DVec2> = back.into_points();
                    points.reverse();
                    points.extend(fwd.points().iter().skip(1));
                    points
                } else {
                    let t = integrator.trace(*start);
                    *terminations.entry(t.termination().as_str()).or_default() += 1;
                    t.into_points()
                };
                total_points += points.len();
                draw_polyline(&mut canvas, &plot.map_points(&points), INK);
            }
            debug!(?terminations, "streamline terminations");
            write_png(&canvas, &output)?;
            report(
                json_mode,
                json!({
                    "field": field,
                    "seeds": starts.len(),
                    "points": total_points,
                    "terminations": terminations,
                    "output": output_name(&output),
                }),
                format!(
                    "{} streamlines of {field} ({total_points} points) -> {}",
                    starts.len(),
                    output.display()
                ),
            )?;
        }
        Command::Compare {
            field,
            width,
            height,
            x,
            y,
            step_size,
            steps,
            params,
            output,
        } => {
            let params = parse_json("params", &params)?;
            let vectors = VectorFieldKind::from_name(&field, &params)?.build(
                width,
                height,
                CoordinateRange::default(),
            )?;
            let center = vectors.domain_max() / 2.0;
            let start = DVec2::new(x.unwrap_or(center.x), y.unwrap_or(center.y));
            let cmp = compare_methods(&vectors, start, step_size, steps)?;
            if let Some(path) = &output {
                let plot = PlotTransform::with_default_margin(width, height)?;
                let mut canvas = blank_canvas(512)?;
                draw_polyline(&mut canvas, &plot.map_points(&cmp.euler), EULER_COLOR);
                draw_polyline(&mut canvas, &plot.map_points(&cmp.rk4), RK4_COLOR);
                write_png(&canvas, path)?;
            }
            report(
                json_mode,
                json!({
                    "field": field,
                    "seed": [start.x, start.y],
                    "step_size": step_size,
                    "steps": steps,
                    "max_deviation": cmp.max_deviation(),
                    "final_deviation": cmp.final_deviation(),
                    "euler_end": cmp.euler.last(),
                    "rk4_end": cmp.rk4.last(),
                }),
                format!(
                    "{field}: {steps} steps of {step_size} from ({}, {}), max deviation {:.6}, final {:.6}",
                    start.x,
                    start.y,
                    cmp.max_deviation(),
                    cmp.final_deviation()
                ),
            )?;
        }
        Command::Contour {
            field,
            width,
            height,
            params,
            config,
            background,
            both_deciders,
            size,
            output,
        } => {
            let params = parse_json("params", &params)?;
            let mut config = ContourConfig::from_json(&parse_json("config", &config)?)?;
            config.both_deciders |= both_deciders;
            let scalars = ScalarFieldKind::from_name(&field, &params)?.build(
                width,
                height,
                CoordinateRange::default(),
            )?;
            let lines = config.isolines(&scalars)?;

            let mut canvas = if background {
                let painted = colorize(&scalars, &TransferFunction::grayscale())?;
                upscale(&painted, size)?
            } else {
                blank_canvas(size)?
            };
            if config.show_grid {
                for seg in grid_lines(width, height)? {
                    draw_segment(&mut canvas, seg.start, seg.end, GRID_COLOR);
                }
            }
            for line in &lines {
                for seg in &line.segments {
                    draw_segment(&mut canvas, seg.start, seg.end, line.color);
                }
            }
            write_png(&canvas, &output)?;

            let segments: usize = lines.iter().map(|l| l.segments.len()).sum();
            report(
                json_mode,
                json!({
                    "field": field,
                    "decider": config.decider_label(),
                    "levels": lines.iter().map(|l| json!({
                        "value": l.value,
                        "segments": l.segments.len(),
                    })).collect::<Vec<_>>(),
                    "output": output_name(&output),
                }),
                format!(
                    "{} isolines of {field} ({segments} segments, {} decider) -> {}",
                    lines.len(),
                    config.decider_label(),
                    output.display()
                ),
            )?;
        }
    }

    Ok(())
}

/// Nearest-neighbor resize of `image` to a `size x size` canvas, flipping
/// rows so field row 0 lands at the bottom like the plotted segments.
fn upscale(image: &ColorImage, size: usize) -> Result<ColorImage, CliError> {
    let (w, h) = image.dims();
    Ok(ColorImage::from_fn(size, size, |x, y| {
        let sx = (x * w / size).min(w - 1);
        let sy = ((size - 1 - y) * h / size).min(h - 1);
        image.get(sx, sy)
    })?)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
