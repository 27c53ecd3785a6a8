use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "lineglow",
    author,
    version,
    about = "Render the neon line-field background headlessly",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Number of frames to render.
    #[arg(
        long,
        value_name = "N",
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub frames: u32,

    /// Frame rate used to space successive frame timestamps.
    #[arg(long, value_name = "FPS", default_value_t = 60.0, value_parser = parse_fps)]
    pub fps: f64,

    /// Timestamp of the first frame, in seconds.
    #[arg(long, value_name = "SECONDS", default_value_t = 0.0, value_parser = parse_time)]
    pub time: f64,

    /// Logical viewport size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", default_value = "1280x720", value_parser = parse_size)]
    pub size: SurfaceSize,

    /// Device pixel ratio, clamped to the configured bounds.
    #[arg(long, value_name = "RATIO", default_value_t = 1.0)]
    pub pixel_ratio: f64,

    /// Seed for line generation.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Config file; defaults to `config.toml` in the config directory.
    #[arg(long, value_name = "FILE", env = "LINEGLOW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write the JSON frame report here instead of stdout.
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Pretty-print the JSON frame report.
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect the resolved configuration.
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML.
    Show,
    /// Print the config directory and file location.
    Where,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses `WIDTHxHEIGHT`. Zero is accepted and yields an empty viewport.
pub fn parse_size(value: &str) -> Result<SurfaceSize, String> {
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width '{}'", w.trim()))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height '{}'", h.trim()))?;
    Ok(SurfaceSize { width, height })
}

pub fn parse_fps(value: &str) -> Result<f64, String> {
    let fps = value
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid frame rate '{}'", value.trim()))?;
    if !fps.is_finite() || fps <= 0.0 {
        return Err("frame rate must be a positive number".into());
    }
    Ok(fps)
}

pub fn parse_time(value: &str) -> Result<f64, String> {
    let seconds = value
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid time '{}'", value.trim()))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err("time must be a non-negative number of seconds".into());
    }
    Ok(seconds)
}
