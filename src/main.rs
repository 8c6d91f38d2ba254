//! WebVision AI - interactive browser automation agent.
//!
//! Main entry point: loads configuration, sets up logging and runs the
//! session loop until the user exits.

mod agent;
mod cli;
mod commands;
mod prompt;
mod render;
mod session;
mod theme;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use webvision_config::{ConfigStore, Settings, SettingsLoader, SettingsValidator, webvision_dir};

use crate::agent::BrowserAgent;
use crate::cli::Cli;
use crate::prompt::InquirePrompter;
use crate::render::Renderer;
use crate::session::Session;
use crate::theme::ThemeRegistry;

/// Initialize tracing with console and file output.
///
/// The console only shows warnings so the prompt stays readable; the daily
/// log files under ~/.webvision/logs/ get everything at `info` and above.
fn init_tracing() -> anyhow::Result<()> {
    let log_dir = webvision_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("webvision")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keeps the background writer alive for the whole process.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let file_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(true)
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .init();

    Ok(())
}

/// Load settings and apply CLI overrides.
fn load_settings(cli: &Cli) -> Settings {
    let path = cli
        .settings
        .clone()
        .unwrap_or_else(|| webvision_dir().join("settings.toml"));

    let settings = SettingsLoader::load_or_default(&path);
    let (mut settings, validation) = SettingsValidator::sanitize(settings);
    for warning in &validation.warnings {
        warn!("Settings: {}", warning);
    }

    if cli.headless {
        settings.browser.headless = true;
    }
    if let Some(model) = &cli.model {
        settings.agent.model = model.clone();
    }
    settings
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = load_settings(&cli);
    info!(
        "Starting WebVision v{} (model {}, headless {})",
        env!("CARGO_PKG_VERSION"),
        settings.agent.model,
        settings.browser.headless
    );

    let config_dir: PathBuf = cli.config_dir.clone().unwrap_or_else(webvision_dir);
    let store = Arc::new(ConfigStore::load_in(&config_dir));

    let themes = Arc::new(ThemeRegistry::new());
    if !themes.set_theme(&store.theme()) {
        warn!("Unknown theme '{}' in config, using default", store.theme());
    }

    let renderer = Arc::new(Renderer::stdout(themes.clone()));
    let runner = Arc::new(BrowserAgent::new(&settings));

    let session = Session::new(store, themes, renderer, Arc::new(InquirePrompter), runner)
        .with_fallback_api_key(std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()));

    let interrupt = session.interrupt_handle();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            interrupt.interrupt();
        }
    });

    session.run().await
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };
    let result = runtime.block_on(run(cli));
    // A stdin read abandoned by Ctrl-C never returns; do not wait for it.
    runtime.shutdown_background();

    if let Err(e) = result {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
