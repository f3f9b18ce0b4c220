//! Bevy integration: the session as a resource ticked every `Update`.

use std::path::PathBuf;

use bevy::prelude::*;
use tracing::{debug, error, info, warn};

use crate::config::{ConfigError, GameOptions};
use crate::headless::{self, AutoPilot, RunSummary};
use crate::hotreload::TuningWatcher;
use crate::save::{FileStore, KeyValueStore, MemoryStore};
use crate::session::{GameEvent, GameSession};

/// Longest step fed to the session; slower frames are simulated as this
const MAX_STEP_SECS: f32 = 1.0 / 30.0;

pub struct ClimberPlugin {
    options: GameOptions,
    tuning_path: Option<PathBuf>,
    save_dir: Option<PathBuf>,
    autoplay: bool,
    frame_limit: Option<u64>,
}

impl ClimberPlugin {
    pub fn new(options: GameOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self {
            options,
            tuning_path: None,
            save_dir: None,
            autoplay: false,
            frame_limit: None,
        })
    }

    /// Watch a tuning file and apply accepted changes at the next restart
    pub fn with_tuning_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.tuning_path = Some(path.into());
        self
    }

    /// Persist saves as JSON files in `dir` instead of in memory
    pub fn with_save_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save_dir = Some(dir.into());
        self
    }

    pub fn with_autoplay(mut self) -> Self {
        self.autoplay = true;
        self
    }

    /// Exit the app once the session has run this many frames
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }
}

impl Plugin for ClimberPlugin {
    fn build(&self, app: &mut App) {
        let store: Box<dyn KeyValueStore> = match &self.save_dir {
            Some(dir) => Box::new(FileStore::new(dir.clone())),
            None => Box::new(MemoryStore::new()),
        };
        let session = match GameSession::new(self.options.clone(), store) {
            Ok(session) => session,
            Err(err) => {
                error!(%err, "climber session rejected its options");
                return;
            }
        };

        app.insert_resource(SessionResource(session))
            .insert_resource(RunStats::default())
            .add_systems(
                Update,
                (
                    reload_tuning_system,
                    session_tick_system,
                    session_events_system,
                    frame_limit_system,
                )
                    .chain(),
            );

        if self.autoplay {
            app.insert_resource(AutoPilotResource(AutoPilot::default()));
        }
        if let Some(frames) = self.frame_limit {
            app.insert_resource(FrameLimit(frames));
        }
        if let Some(path) = &self.tuning_path {
            match TuningWatcher::new(path.clone()) {
                Ok(watcher) => {
                    app.insert_resource(TuningResource(watcher));
                }
                Err(err) => warn!(%err, "tuning hot-reload disabled"),
            }
        }
    }
}

#[derive(Resource)]
pub struct SessionResource(pub GameSession);

#[derive(Resource)]
pub struct AutoPilotResource(pub AutoPilot);

#[derive(Resource)]
pub struct TuningResource(pub TuningWatcher);

/// Event totals since the app started
#[derive(Resource, Default, Debug)]
pub struct RunStats(pub RunSummary);

#[derive(Resource, Debug, Clone, Copy)]
pub struct FrameLimit(pub u64);

fn reload_tuning_system(
    watcher: Option<ResMut<TuningResource>>,
    mut session: ResMut<SessionResource>,
) {
    let Some(mut watcher) = watcher else {
        return;
    };
    if let Some(Ok(options)) = watcher.0.poll() {
        if let Err(err) = session.0.queue_options(options) {
            warn!(%err, "reloaded tuning rejected by the session");
        }
    }
}

fn session_tick_system(
    time: Res<Time>,
    mut session: ResMut<SessionResource>,
    mut pilot: Option<ResMut<AutoPilotResource>>,
) {
    let dt = time.delta_secs().min(MAX_STEP_SECS);
    headless::step(&mut session.0, pilot.as_deref_mut().map(|p| &mut p.0), dt);
}

fn session_events_system(mut session: ResMut<SessionResource>, mut stats: ResMut<RunStats>) {
    for event in session.0.drain_events() {
        stats.0.record(&event);
        match event {
            GameEvent::SessionEnded { score, coins } => {
                info!(score, coins, "run finished")
            }
            GameEvent::SessionRestarted { run } => info!(run, "run restarted"),
            other => debug!(event = ?other, "game event"),
        }
    }
    stats.0.frames += 1;
}

fn frame_limit_system(
    limit: Option<Res<FrameLimit>>,
    stats: Res<RunStats>,
    mut exit: EventWriter<AppExit>,
) {
    let Some(limit) = limit else {
        return;
    };
    if stats.0.frames >= limit.0 {
        info!(
            frames = stats.0.frames,
            runs = stats.0.runs_finished,
            best_floors = stats.0.best_floors,
            coins = stats.0.coins,
            "frame limit reached"
        );
        exit.send(AppExit::Success);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with(plugin: ClimberPlugin) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins).add_plugins(plugin);
        app
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = GameOptions {
            floor_gap: 0.0,
            ..Default::default()
        };
        assert!(ClimberPlugin::new(options).is_err());
    }

    #[test]
    fn test_session_ticks_each_update() {
        let mut app = app_with(ClimberPlugin::new(GameOptions::default()).unwrap());
        for _ in 0..5 {
            app.update();
        }
        let session = &app.world().resource::<SessionResource>().0;
        assert_eq!(session.frame(), 5);
        assert_eq!(app.world().resource::<RunStats>().0.frames, 5);
    }

    #[test]
    fn test_frame_limit_requests_exit() {
        let plugin = ClimberPlugin::new(GameOptions::default())
            .unwrap()
            .with_autoplay()
            .with_frame_limit(3);
        let mut app = app_with(plugin);
        app.update();
        app.update();
        assert!(app.should_exit().is_none());
        app.update();
        assert_eq!(app.should_exit(), Some(AppExit::Success));
        assert!(app.world().contains_resource::<AutoPilotResource>());
    }

    #[test]
    fn test_tuning_watcher_installed() {
        let dir = tempfile::tempdir().unwrap();
        let plugin = ClimberPlugin::new(GameOptions::default())
            .unwrap()
            .with_tuning_file(dir.path().join("climber.ron"))
            .with_save_dir(dir.path().join("saves"));
        let mut app = app_with(plugin);
        app.update();
        assert!(app.world().contains_resource::<TuningResource>());
    }
}
