#![deny(unsafe_code)]
//! CLI binary for the wavefield water-surface simulator.
//!
//! Subcommands:
//! - `simulate <surface>`: run a surface N ticks, print height stats, optionally write a PNG
//! - `probe <surface> --at x,z`: run N ticks, then print elevations at points
//! - `list`: print available surfaces
//!
//! Set `RUST_LOG=debug` (or `trace`) for simulation logging.

mod error;

use clap::{Args, Parser, Subcommand};
use error::CliError;
use log::debug;
use std::path::{Path, PathBuf};
use std::process;
use wavefield_core::{DVec2, ImpulseSpec, RunSpec, Simulation, Surface};
use wavefield_surfaces::SurfaceKind;

#[derive(Parser)]
#[command(name = "wavefield", about = "Water-surface simulator CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a surface for N ticks and summarise its heights.
    Simulate {
        #[command(flatten)]
        run: RunArgs,

        /// Write a grayscale PNG heightmap to this path.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run a surface for N ticks, then query elevations.
    Probe {
        #[command(flatten)]
        run: RunArgs,

        /// World point to query, as `x,z`. Repeatable.
        #[arg(long = "at", value_parser = parse_point, required = true)]
        points: Vec<DVec2>,
    },
    /// List available surfaces.
    List,
}

#[derive(Args)]
struct RunArgs {
    /// Surface name (e.g. "relax").
    #[arg(required_unless_present = "spec")]
    surface: Option<String>,

    /// Cells per side.
    #[arg(long, default_value_t = 64)]
    size: usize,

    /// Number of ticks.
    #[arg(short, long, default_value_t = 120)]
    steps: usize,

    /// Seconds per tick.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,

    /// PRNG seed for deterministic output.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Surface parameters as a JSON string.
    #[arg(long, default_value = "{}")]
    params: String,

    /// Impulse applied before the first tick, as `x,z,magnitude`. Repeatable.
    #[arg(long = "impulse", value_parser = parse_impulse)]
    impulses: Vec<ImpulseSpec>,

    /// Load the whole run from a JSON run spec; other run flags are ignored.
    #[arg(long)]
    spec: Option<PathBuf>,
}

impl RunArgs {
    fn to_spec(&self) -> Result<RunSpec, CliError> {
        if let Some(path) = &self.spec {
            return load_spec(path);
        }
        let surface = self
            .surface
            .clone()
            .ok_or_else(|| CliError::Input("missing surface name".into()))?;
        let params: serde_json::Value = serde_json::from_str(&self.params)
            .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
        let mut spec = RunSpec::new(&surface, self.size, self.seed);
        spec.params = params;
        spec.steps = self.steps;
        spec.dt = self.dt;
        spec.impulses = self.impulses.clone();
        Ok(spec)
    }
}

fn load_spec(path: &Path) -> Result<RunSpec, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("reading {}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| CliError::Input(format!("invalid run spec {}: {e}", path.display())))
}

/// Parses `x,z,magnitude`.
fn parse_impulse(s: &str) -> Result<ImpulseSpec, String> {
    match parse_floats(s)?.as_slice() {
        &[x, z, magnitude] => Ok(ImpulseSpec { x, z, magnitude }),
        _ => Err(format!("expected x,z,magnitude, got '{s}'")),
    }
}

/// Parses `x,z`.
fn parse_point(s: &str) -> Result<DVec2, String> {
    match parse_floats(s)?.as_slice() {
        &[x, z] => Ok(DVec2::new(x, z)),
        _ => Err(format!("expected x,z, got '{s}'")),
    }
}

fn parse_floats(s: &str) -> Result<Vec<f64>, String> {
    s.split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|e| format!("'{part}': {e}"))
        })
        .collect()
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let surfaces = SurfaceKind::list_surfaces();
            if cli.json {
                let info = serde_json::json!({ "surfaces": surfaces });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Surfaces:");
                for name in surfaces {
                    println!("  {name}");
                }
            }
        }
        Command::Simulate { run, output } => {
            let spec = run.to_spec()?;
            let surface = SurfaceKind::from_spec(&spec)?;
            let heights = surface.heights();
            let (min, max) = heights.min_max();
            let mean = heights.sum() / heights.data().len() as f64;

            if let Some(path) = &output {
                wavefield_surfaces::snapshot::write_png(heights, path)?;
                debug!("wrote heightmap to {}", path.display());
            }

            if cli.json {
                let info = serde_json::json!({
                    "surface": spec.surface,
                    "size": spec.size,
                    "steps": spec.steps,
                    "dt": spec.dt,
                    "seed": spec.seed,
                    "elapsed": surface.elapsed(),
                    "min": min,
                    "max": max,
                    "mean": mean,
                    "output": output.as_ref().map(|p| p.display().to_string()),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                let size = spec.size;
                println!(
                    "{} ({size}x{size}, {} steps, seed {}): min {min:.4} max {max:.4} mean {mean:.4}",
                    spec.surface, spec.steps, spec.seed
                );
                if let Some(path) = &output {
                    eprintln!("heightmap -> {}", path.display());
                }
            }
        }
        Command::Probe { run, points } => {
            let spec = run.to_spec()?;
            let surface = SurfaceKind::from_spec(&spec)?;
            let samples: Vec<(DVec2, f64)> = points
                .iter()
                .map(|&p| (p, surface.elevation(p.x, p.y)))
                .collect();

            if cli.json {
                let info = serde_json::json!({
                    "surface": spec.surface,
                    "elapsed": surface.elapsed(),
                    "samples": samples
                        .iter()
                        .map(|(p, h)| serde_json::json!({"x": p.x, "z": p.y, "elevation": h}))
                        .collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                for (p, h) in &samples {
                    println!("({}, {}) -> {h:.6}", p.x, p.y);
                }
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
