use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use fieldconfig::FieldConfig;
use lineglow::BackgroundAnimator;
use rand::rngs::StdRng;
use rand::SeedableRng;
use renderer::{DrawCommand, FrameStats, LineSpec, RecordingCanvas};
use scheduler::manual::ManualFrames;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::RunArgs;
use crate::paths::AppPaths;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// JSON document describing the last rendered frame.
#[derive(Debug, Serialize)]
pub struct FrameReport {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
    pub backing_width: u32,
    pub backing_height: u32,
    pub frames: u64,
    pub time_ms: f64,
    pub stats: FrameStats,
    pub lines: Vec<LineSpec>,
    pub commands: Vec<DrawCommand>,
}

pub fn run(args: RunArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    let config = load_config(args.config.as_deref(), &paths)?;
    let report = render_frames(&args, &config);
    write_report(&report, args.output.as_deref(), args.pretty)
}

/// Reads `explicit` when given, else the config file in the config
/// directory when it exists, else the built-in defaults.
pub fn load_config(explicit: Option<&Path>, paths: &AppPaths) -> Result<FieldConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = paths.config_file();
            if !candidate.is_file() {
                debug!(path = %candidate.display(), "no config file; using defaults");
                return Ok(FieldConfig::default());
            }
            candidate
        }
    };
    let text = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = FieldConfig::from_toml_str(&text)
        .with_context(|| format!("invalid config {}", path.display()))?;
    info!(path = %path.display(), lines = config.render.line_count, "loaded config");
    Ok(config)
}

/// Drives the animator through `args.frames` frames on a manual frame
/// source and captures the draw calls of the final one.
pub fn render_frames(args: &RunArgs, config: &FieldConfig) -> FrameReport {
    let mut animator =
        BackgroundAnimator::new(RecordingCanvas::new(), config, StdRng::seed_from_u64(args.seed));
    animator.resize(
        f64::from(args.size.width),
        f64::from(args.size.height),
        args.pixel_ratio,
    );
    let frames = ManualFrames::new();
    animator.start(frames.clone());

    let start_ms = args.time * 1000.0;
    let interval_ms = 1000.0 / args.fps;
    let mut time_ms = start_ms;
    for index in 0..args.frames {
        time_ms = start_ms + f64::from(index) * interval_ms;
        animator.with_scene_mut(|scene| scene.canvas_mut().take_commands());
        frames.advance(time_ms);
        debug!(
            frame = index,
            time_ms,
            segments = animator.last_stats().segments,
            "frame rendered"
        );
    }
    let rendered = animator.frames();
    animator.stop();

    let viewport = animator.viewport();
    let (backing_width, backing_height) = viewport.backing_size();
    let stats = animator.last_stats();
    info!(
        frames = rendered,
        width = viewport.width(),
        height = viewport.height(),
        pixel_ratio = viewport.pixel_ratio(),
        segments = stats.segments,
        "headless render complete"
    );

    animator.with_scene_mut(|scene| FrameReport {
        width: viewport.width(),
        height: viewport.height(),
        pixel_ratio: viewport.pixel_ratio(),
        backing_width,
        backing_height,
        frames: rendered,
        time_ms,
        stats,
        lines: scene.field().lines().to_vec(),
        commands: scene.canvas_mut().take_commands(),
    })
}

fn write_report(report: &FrameReport, output: Option<&Path>, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    }
    .context("failed to serialise frame report")?;

    match output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("failed to write frame report {}", path.display()))?;
            info!(path = %path.display(), "frame report written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub fn show_config(explicit: Option<&Path>, paths: &AppPaths) -> Result<()> {
    let config = load_config(explicit, paths)?;
    let text = config
        .to_toml_string()
        .context("failed to serialise configuration")?;
    print!("{text}");
    Ok(())
}

pub fn describe_paths(paths: &AppPaths) {
    let file = paths.config_file();
    println!("Configuration:");
    println!("  dir:    {}", paths.config_dir().display());
    println!(
        "  file:   {} ({})",
        file.display(),
        if file.is_file() { "present" } else { "missing" }
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use tempfile::TempDir;

    fn args(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["lineglow"];
        argv.extend_from_slice(extra);
        Cli::try_parse_from(argv).unwrap().run
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let root = TempDir::new().unwrap();
        let paths = AppPaths::from_raw(root.path().join("config"));

        let config = load_config(None, &paths).unwrap();

        assert_eq!(config, FieldConfig::default());
    }

    #[test]
    fn config_dir_file_is_used_when_present() {
        let root = TempDir::new().unwrap();
        let paths = AppPaths::from_raw(root.path().to_path_buf());
        fs::write(
            paths.config_file(),
            "version = 1\n[render]\nline_count = 7\n",
        )
        .unwrap();

        let config = load_config(None, &paths).unwrap();

        assert_eq!(config.render.line_count, 7);
    }

    #[test]
    fn explicit_config_must_exist() {
        let root = TempDir::new().unwrap();
        let paths = AppPaths::from_raw(root.path().to_path_buf());

        let err = load_config(Some(&root.path().join("nope.toml")), &paths).unwrap_err();

        assert!(format!("{err:#}").contains("failed to read config"));
    }

    #[test]
    fn invalid_config_reports_path() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("bad.toml");
        fs::write(&path, "version = 2\n").unwrap();
        let paths = AppPaths::from_raw(root.path().to_path_buf());

        let err = load_config(Some(&path), &paths).unwrap_err();

        assert!(format!("{err:#}").contains("invalid config"));
    }

    #[test]
    fn renders_last_frame_only() {
        let args = args(&["--frames", "3", "--fps", "10", "--time", "2", "--size", "800x600"]);

        let report = render_frames(&args, &FieldConfig::default());

        assert_eq!(report.frames, 3);
        assert_eq!(report.time_ms, 2200.0);
        assert_eq!(report.stats.segments, 42);
        assert_eq!(report.lines.len(), 42);
        let strokes = report
            .commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::StrokeLine { .. }))
            .count();
        assert_eq!(strokes, 42);
        assert!(matches!(report.commands[0], DrawCommand::ClearRect { .. }));
    }

    #[test]
    fn pixel_ratio_scales_backing_size() {
        let args = args(&["--size", "800x600", "--pixel-ratio", "2"]);

        let report = render_frames(&args, &FieldConfig::default());

        assert_eq!((report.backing_width, report.backing_height), (1600, 1200));
        assert_eq!((report.width, report.height), (800.0, 600.0));
    }

    #[test]
    fn same_seed_renders_identical_frames() {
        let args = args(&["--seed", "9", "--time", "12.5"]);
        let config = FieldConfig::default();

        let first = render_frames(&args, &config);
        let second = render_frames(&args, &config);

        assert_eq!(first.commands, second.commands);
        assert_eq!(first.lines, second.lines);
    }

    #[test]
    fn empty_viewport_only_clears() {
        let args = args(&["--size", "0x0"]);

        let report = render_frames(&args, &FieldConfig::default());

        assert_eq!(report.stats.segments, 0);
        assert_eq!(report.commands.len(), 1);
    }
}
