use std::path::Path;

use anyhow::{Context, Result};
use threadconfig::{PowerSetting, ThreadsConfig};
use threadfield::dpi::PhysicalSize;
use threadfield::{
    export_png, run_window, GpuPowerPreference, ThreadsOptions, WindowConfig, POINTER_REST,
};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::paths::AppPaths;

pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let window = resolve_window_config(&config, &cli);

    if let Some(path) = &cli.export {
        let size = PhysicalSize::new(window.size.0, window.size.1);
        tracing::debug!(
            width = size.width,
            height = size.height,
            time = cli.time,
            lines = window.threads.line_count,
            "rendering still frame"
        );
        return export_png(path, &window.threads, size, cli.time, POINTER_REST);
    }

    run_window(window)
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// An explicit `--config` must exist; the default location is optional.
fn load_config(cli: &Cli) -> Result<ThreadsConfig> {
    if let Some(path) = &cli.config {
        return load_from(path);
    }

    let paths = AppPaths::discover()?;
    let path = paths.config_file();
    if path.is_file() {
        load_from(&path)
    } else {
        tracing::debug!(path = %path.display(), "no configuration file; using defaults");
        Ok(ThreadsConfig::default())
    }
}

fn load_from(path: &Path) -> Result<ThreadsConfig> {
    let config = ThreadsConfig::load(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Layers command-line overrides on top of the file configuration.
fn resolve_window_config(config: &ThreadsConfig, cli: &Cli) -> WindowConfig {
    let threads = ThreadsOptions {
        amplitude: cli.amplitude.unwrap_or(config.threads.amplitude),
        distance_skew: cli.distance_skew.unwrap_or(config.threads.distance_skew),
        enable_pointer_interaction: cli
            .pointer_override()
            .unwrap_or(config.threads.pointer_interaction),
        line_count: cli.lines.unwrap_or(config.render.line_count),
        max_pixel_ratio: config.render.max_pixel_ratio,
        resize_debounce: config.render.resize_debounce,
    };
    let power = match config.render.power {
        PowerSetting::Low => GpuPowerPreference::Low,
        PowerSetting::High => GpuPowerPreference::High,
    };

    WindowConfig {
        size: cli
            .size
            .unwrap_or((config.window.width, config.window.height)),
        title: config.window.title.clone(),
        power,
        threads,
    }
}
