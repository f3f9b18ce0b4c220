//! Headless autoplayed climber session.
//!
//! Usage: `climber-headless [tuning-file]`. The tuning file (`.ron` or `.json`)
//! is watched and accepted changes apply at the next restart. `CLIMBER_FRAMES`
//! bounds the run; `CLIMBER_SAVE_DIR` persists saves to disk.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use tracing::info;

use climber_core::config::GameOptions;
use climber_core::logging::{init_tracing, TracingConfig};
use climber_core::plugin::ClimberPlugin;

const TICK_RATE: f64 = 60.0;

fn main() -> anyhow::Result<()> {
    init_tracing(&TracingConfig::default());

    let tuning = std::env::args().nth(1).map(PathBuf::from);
    let options = match &tuning {
        Some(path) => GameOptions::load(path)
            .with_context(|| format!("loading tuning from {}", path.display()))?,
        None => GameOptions::default(),
    };
    info!(skin = %options.skin.name, seed = options.seed, "starting headless climber");

    let mut plugin = ClimberPlugin::new(options)?.with_autoplay();
    if let Some(path) = tuning {
        plugin = plugin.with_tuning_file(path);
    }
    if let Ok(dir) = std::env::var("CLIMBER_SAVE_DIR") {
        plugin = plugin.with_save_dir(dir);
    }
    if let Some(frames) = std::env::var("CLIMBER_FRAMES")
        .ok()
        .and_then(|raw| raw.parse().ok())
    {
        plugin = plugin.with_frame_limit(frames);
    }

    let exit = App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(
            Duration::from_secs_f64(1.0 / TICK_RATE),
        )))
        .add_plugins(plugin)
        .run();
    info!(?exit, "headless climber stopped");
    Ok(())
}
