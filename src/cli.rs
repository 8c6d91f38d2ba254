//! CLI definitions for WebVision.

use std::path::PathBuf;

use clap::Parser;

/// WebVision AI - drive a Chrome browser with natural-language tasks.
#[derive(Parser, Debug)]
#[command(name = "webvision")]
#[command(about = "Interactive AI agent that automates a Chrome browser")]
#[command(version)]
pub(crate) struct Cli {
    /// Settings file path (TOML)
    #[arg(short, long, env = "WEBVISION_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Directory holding config.json (default: ~/.webvision)
    #[arg(long)]
    pub config_dir: Option<PathBuf>,

    /// Run Chrome without a window
    #[arg(long)]
    pub headless: bool,

    /// Model to use, overriding the settings file
    #[arg(short, long)]
    pub model: Option<String>,
}
