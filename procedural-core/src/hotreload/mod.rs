//! Tuning file hot-reload
//!
//! Watches the directory of a `.ron`/`.json` tuning file with `notify` and
//! re-parses the file whenever it is modified or recreated:
//! - only events naming the watched file are considered
//! - a file that fails to parse or validate is reported and ignored, so the
//!   last good options stay in effect
//! - accepted options are handed to the session, which applies them at the
//!   next restart

use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Mutex;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ConfigError, GameOptions};

#[derive(Debug, Error)]
pub enum HotReloadError {
    #[error("tuning file {0} has no parent directory to watch")]
    NoParent(PathBuf),
    #[error("file watcher failed: {0}")]
    Watch(#[from] notify::Error),
}

/// Reload bookkeeping, serializable for status reporting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReloadStatus {
    pub watched_file: Option<String>,
    pub reload_count: u32,
    pub last_reload_success: bool,
    pub last_error: Option<String>,
}

pub struct TuningWatcher {
    path: PathBuf,
    _watcher: RecommendedWatcher,
    receiver: Mutex<Receiver<notify::Result<Event>>>,
    status: ReloadStatus,
}

impl TuningWatcher {
    /// Start watching `path`; the file itself does not need to exist yet
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, HotReloadError> {
        let path = path.into();
        let parent = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            Some(_) => PathBuf::from("."),
            None => return Err(HotReloadError::NoParent(path)),
        };

        let (tx, rx) = channel();
        let mut watcher = notify::recommended_watcher(tx)?;
        watcher.watch(&parent, RecursiveMode::NonRecursive)?;
        info!(path = %path.display(), "tuning hot-reload enabled");

        Ok(Self {
            status: ReloadStatus {
                watched_file: Some(path.display().to_string()),
                ..Default::default()
            },
            path,
            _watcher: watcher,
            receiver: Mutex::new(rx),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn status(&self) -> &ReloadStatus {
        &self.status
    }

    /// Drain pending file events; re-reads the file once if any of them touched it.
    ///
    /// Returns `None` when nothing relevant happened.
    pub fn poll(&mut self) -> Option<Result<GameOptions, ConfigError>> {
        let mut touched = false;
        {
            let receiver = match self.receiver.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            while let Ok(result) = receiver.try_recv() {
                match result {
                    Ok(event) => touched |= is_tuning_event(&event, &self.path),
                    Err(err) => warn!(%err, "file watcher error"),
                }
            }
        }
        if !touched {
            return None;
        }

        let result = GameOptions::load(&self.path);
        match &result {
            Ok(_) => {
                self.status.reload_count += 1;
                self.status.last_reload_success = true;
                self.status.last_error = None;
                info!(count = self.status.reload_count, "tuning reloaded");
            }
            Err(err) => {
                self.status.last_reload_success = false;
                self.status.last_error = Some(err.to_string());
                warn!(%err, "tuning reload rejected, keeping previous options");
            }
        }
        Some(result)
    }
}

/// A modify or create event naming the watched file
fn is_tuning_event(event: &Event, watched: &Path) -> bool {
    let relevant = event.kind.is_modify() || matches!(event.kind, EventKind::Create(_));
    let Some(name) = watched.file_name() else {
        return false;
    };
    relevant && event.paths.iter().any(|p| p.file_name() == Some(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn modify(path: &str) -> Event {
        Event {
            kind: EventKind::Modify(notify::event::ModifyKind::Data(
                notify::event::DataChange::Any,
            )),
            paths: vec![PathBuf::from(path)],
            attrs: Default::default(),
        }
    }

    #[test]
    fn test_is_tuning_event() {
        let watched = Path::new("tuning/climber.ron");
        assert!(is_tuning_event(&modify("/abs/tuning/climber.ron"), watched));
        assert!(!is_tuning_event(&modify("tuning/other.ron"), watched));

        let removed = Event {
            kind: EventKind::Remove(notify::event::RemoveKind::File),
            paths: vec![PathBuf::from("tuning/climber.ron")],
            attrs: Default::default(),
        };
        assert!(!is_tuning_event(&removed, watched));
    }

    #[test]
    fn test_poll_without_events_is_quiet() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher = TuningWatcher::new(dir.path().join("climber.ron")).unwrap();
        assert!(watcher.poll().is_none());
        assert_eq!(watcher.status().reload_count, 0);
        assert!(watcher.status().watched_file.is_some());
    }

    #[test]
    fn test_reload_after_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("climber.json");
        let mut watcher = TuningWatcher::new(&path).unwrap();
        std::fs::write(&path, r#"{"floor_gap": 300.0, "seed": 5}"#).unwrap();

        // the create event may arrive before the contents are flushed
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut reloaded = None;
        while Instant::now() < deadline && reloaded.is_none() {
            if let Some(Ok(options)) = watcher.poll() {
                reloaded = Some(options);
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        let options = reloaded.expect("watcher saw the write");
        assert_eq!(options.floor_gap, 300.0);
        assert_eq!(options.seed, 5);
        assert!(watcher.status().last_reload_success);
    }

    #[test]
    fn test_reload_status_json() {
        let status = ReloadStatus {
            watched_file: Some("tuning/climber.ron".into()),
            reload_count: 2,
            last_reload_success: false,
            last_error: Some("invalid option `floor_gap`".into()),
        };
        let json = serde_json::to_string(&status).unwrap();
        let restored: ReloadStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, status);
    }
}
