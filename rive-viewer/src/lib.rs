//! # Rive Viewer
//!
//! Headless host for the rive animation runtime.
//!
//! Loads a document, selects an artboard and state machine, routes input
//! writes, trigger fires and clicks through the player, runs a fixed
//! number of frames and optionally writes the last painter frame as PNG.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p rive-viewer -- --file button.json --set hovered=true --fire press --output out.png
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `ViewerConfig` - Resolved playback configuration
//! - `ViewerApp` - Owns the player and the frame sink, runs the frame loop

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod app;

pub use app::{FrameReport, ViewerApp};

use std::path::PathBuf;

use clap::Parser;
use rive_core::PlayerConfig;
use rive_renderer::RenderType;

/// Command-line arguments for rive-viewer.
#[derive(Debug, Clone, Parser)]
#[command(name = "rive-viewer")]
#[command(about = "Headless player for rive animation documents")]
#[command(version)]
pub struct CliArgs {
    /// Document to play
    #[arg(long, env = "RIVE_FILE")]
    pub file: PathBuf,

    /// Artboard index
    #[arg(long)]
    pub artboard: Option<usize>,

    /// State machine name
    #[arg(long)]
    pub state_machine: Option<String>,

    /// Rendering backend (painter, opengl or gpu)
    #[arg(long, default_value = "painter")]
    pub backend: RenderType,

    /// Viewport width in pixels
    #[arg(long, default_value = "512")]
    pub width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value = "512")]
    pub height: u32,

    /// Frames per second of the simulated clock
    #[arg(long, default_value = "60")]
    pub fps: u32,

    /// Number of frames to run
    #[arg(long, default_value = "60")]
    pub frames: u32,

    /// Input write `name=value`; the value is parsed as JSON, falling back to a string
    #[arg(long = "set", value_parser = parse_assignment)]
    pub inputs: Vec<(String, serde_json::Value)>,

    /// Trigger to fire before the first frame
    #[arg(long = "fire")]
    pub triggers: Vec<String>,

    /// Pointer press and release at `x,y` in viewport pixels
    #[arg(long = "click", value_parser = parse_point)]
    pub clicks: Vec<(f32, f32)>,

    /// Ignore pointer input
    #[arg(long)]
    pub non_interactive: bool,

    /// Write the last frame as PNG (painter backend only)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Viewer configuration.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Document path.
    pub file: PathBuf,
    /// Rendering backend.
    pub backend: RenderType,
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,
    /// Simulated frame rate.
    pub fps: u32,
    /// Frames to run.
    pub frames: u32,
    /// Input writes applied after load.
    pub inputs: Vec<(String, serde_json::Value)>,
    /// Triggers fired after load.
    pub triggers: Vec<String>,
    /// Clicks dispatched after load.
    pub clicks: Vec<(f32, f32)>,
    /// PNG output path.
    pub output: Option<PathBuf>,
    /// Player settings.
    pub player: PlayerConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::new(PathBuf::new())
    }
}

impl ViewerConfig {
    /// Configuration for `file` with default values.
    #[must_use]
    pub fn new(file: PathBuf) -> Self {
        Self {
            file,
            backend: RenderType::Painter,
            width: 512,
            height: 512,
            fps: 60,
            frames: 60,
            inputs: Vec::new(),
            triggers: Vec::new(),
            clicks: Vec::new(),
            output: None,
            player: PlayerConfig::default(),
        }
    }
}

impl From<CliArgs> for ViewerConfig {
    #[allow(clippy::cast_precision_loss)] // Viewport dimensions fit in f32
    fn from(args: CliArgs) -> Self {
        let player = PlayerConfig {
            interactive: !args.non_interactive,
            initial_artboard: args.artboard.or(Some(0)),
            initial_state_machine: args.state_machine,
            viewport_width: args.width as f32,
            viewport_height: args.height as f32,
            ..PlayerConfig::default()
        };
        Self {
            file: args.file,
            backend: args.backend,
            width: args.width,
            height: args.height,
            fps: args.fps.max(1),
            frames: args.frames,
            inputs: args.inputs,
            triggers: args.triggers,
            clicks: args.clicks,
            output: args.output,
            player,
        }
    }
}

/// Parse `name=value`, reading the value as JSON and falling back to a
/// plain string.
///
/// # Errors
///
/// Returns an error if there is no `=` or the name is empty.
pub fn parse_assignment(s: &str) -> Result<(String, serde_json::Value), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing input name in '{s}'"));
    }
    let value = serde_json::from_str(value.trim())
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((name.to_string(), value))
}

/// Parse `x,y`.
///
/// # Errors
///
/// Returns an error if either coordinate is missing or not a number.
pub fn parse_point(s: &str) -> Result<(f32, f32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y, got '{s}'"))?;
    let x = x
        .trim()
        .parse()
        .map_err(|e| format!("invalid x in '{s}': {e}"))?;
    let y = y
        .trim()
        .parse()
        .map_err(|e| format!("invalid y in '{s}': {e}"))?;
    Ok((x, y))
}
