//! # AirScribe CLI
//!
//! Host for the AirScribe pipeline. A recorded landmark feed (JSON lines of
//! `FeedEvent`s) is replayed through the tick loop onto a raster canvas, and
//! the resulting document is written out as PNG pages plus a gallery entry.
//!
//! ## Usage
//!
//! ```bash
//! airscribe replay --recording session.jsonl --out ./notes
//! ```
//!
//! ## With a config file and a canvas-space cursor:
//!
//! ```bash
//! airscribe replay --recording session.jsonl --out ./notes \
//!     --config airscribe.json --cursor-space canvas --name "Ward round"
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `ReplayArgs::resolve_config` - File config with CLI overrides applied
//! - `run_replay` - Drives `airscribe_core::TickLoop` with a `ReplayScheduler`

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod replay;

pub use replay::{run_replay, ReplayScheduler, ReplaySummary, FRAME_INTERVAL_MS};

use std::path::PathBuf;

use airscribe_core::{CursorSpace, GestureStrategy, ScribeConfig};
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for airscribe.
#[derive(Debug, Clone, Parser)]
#[command(name = "airscribe")]
#[command(about = "Air-drawing whiteboard driven by hand tracking")]
#[command(version)]
pub struct CliArgs {
    /// What to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Replay a recorded landmark feed and save the drawn document
    Replay(ReplayArgs),
}

/// Arguments of `airscribe replay`.
#[derive(Debug, Clone, clap::Args)]
pub struct ReplayArgs {
    /// JSON-lines recording of feed events
    #[arg(long, env = "AIRSCRIBE_RECORDING")]
    pub recording: PathBuf,

    /// Output directory for page images and the gallery
    #[arg(long, env = "AIRSCRIBE_OUT")]
    pub out: PathBuf,

    /// JSON configuration file
    #[arg(long, env = "AIRSCRIBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Document name
    #[arg(long, default_value = "Untitled")]
    pub name: String,

    /// Canvas width in pixels (overrides the config file)
    #[arg(long)]
    pub width: Option<u32>,

    /// Canvas height in pixels (overrides the config file)
    #[arg(long)]
    pub height: Option<u32>,

    /// Fingertip projection space (overrides the config file)
    #[arg(long, value_enum)]
    pub cursor_space: Option<CursorSpaceArg>,

    /// Gesture strategy (overrides the config file)
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Background image for the first page: a file path or data URI
    #[arg(long)]
    pub background: Option<String>,
}

/// `--cursor-space` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CursorSpaceArg {
    /// Project onto the drawing canvas only
    Canvas,
    /// Project onto the full viewport
    Viewport,
}

impl From<CursorSpaceArg> for CursorSpace {
    fn from(arg: CursorSpaceArg) -> Self {
        match arg {
            CursorSpaceArg::Canvas => Self::Canvas,
            CursorSpaceArg::Viewport => Self::Viewport,
        }
    }
}

/// `--strategy` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Pointing draws, fist erases
    FingerPose,
    /// Thumb/index pinch draws
    Pinch,
}

impl From<StrategyArg> for GestureStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::FingerPose => Self::FingerPose,
            StrategyArg::Pinch => Self::Pinch,
        }
    }
}

impl ReplayArgs {
    /// Apply command-line overrides to `config`.
    #[must_use]
    pub fn overlay(&self, mut config: ScribeConfig) -> ScribeConfig {
        if let Some(width) = self.width {
            config.canvas.width = width;
        }
        if let Some(height) = self.height {
            config.canvas.height = height;
        }
        if let Some(space) = self.cursor_space {
            config.cursor.space = space.into();
        }
        if let Some(strategy) = self.strategy {
            config.gesture.strategy = strategy.into();
        }
        config
    }

    /// Load the config file (or defaults) and apply overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the result is invalid.
    pub async fn resolve_config(&self) -> anyhow::Result<ScribeConfig> {
        let base = match &self.config {
            Some(path) => {
                let json = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                ScribeConfig::from_json_str(&json)
                    .with_context(|| format!("Invalid config {}", path.display()))?
            }
            None => ScribeConfig::default(),
        };
        let config = self.overlay(base);
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replay_args(extra: &[&str]) -> ReplayArgs {
        let mut argv = vec!["airscribe", "replay", "--recording", "in.jsonl", "--out", "out"];
        argv.extend_from_slice(extra);
        match CliArgs::try_parse_from(argv).expect("parse").command {
            Command::Replay(args) => args,
        }
    }

    #[test]
    fn test_parse_minimal_replay() {
        let args = replay_args(&[]);
        assert_eq!(args.recording, PathBuf::from("in.jsonl"));
        assert_eq!(args.out, PathBuf::from("out"));
        assert_eq!(args.name, "Untitled");
        assert!(args.width.is_none());
        assert!(args.cursor_space.is_none());
    }

    #[test]
    fn test_parse_overrides() {
        let args = replay_args(&[
            "--width",
            "640",
            "--height",
            "480",
            "--cursor-space",
            "canvas",
            "--strategy",
            "pinch",
            "--name",
            "Ward round",
        ]);
        assert_eq!(args.width, Some(640));
        assert_eq!(args.cursor_space, Some(CursorSpaceArg::Canvas));
        assert_eq!(args.strategy, Some(StrategyArg::Pinch));
        assert_eq!(args.name, "Ward round");
    }

    #[test]
    fn test_parse_rejects_unknown_space() {
        let result = CliArgs::try_parse_from([
            "airscribe",
            "replay",
            "--recording",
            "a",
            "--out",
            "b",
            "--cursor-space",
            "screen",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overlay_only_touches_given_fields() {
        let args = replay_args(&["--width", "1024", "--cursor-space", "canvas"]);
        let config = args.overlay(ScribeConfig::default());
        assert_eq!(config.canvas.width, 1024);
        assert_eq!(config.canvas.height, ScribeConfig::default().canvas.height);
        assert_eq!(config.cursor.space, CursorSpace::Canvas);
        assert_eq!(config.gesture.strategy, GestureStrategy::FingerPose);
    }

    #[tokio::test]
    async fn test_resolve_config_reads_file_then_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cfg.json");
        let json = r#"{"canvas":{"width":300,"height":200},"mode":{"neutral_timeout_ms":50}}"#;
        std::fs::write(&path, json).expect("write");

        let config_arg = path.to_str().expect("utf8 path");
        let args = replay_args(&["--config", config_arg, "--height", "100"]);
        let config = args.resolve_config().await.expect("config");
        assert_eq!(config.canvas.width, 300);
        assert_eq!(config.canvas.height, 100);
        assert_eq!(config.mode.neutral_timeout_ms, 50);
    }

    #[tokio::test]
    async fn test_resolve_config_rejects_zero_width() {
        let args = replay_args(&["--width", "0"]);
        assert!(args.resolve_config().await.is_err());
    }
}
