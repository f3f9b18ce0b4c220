//! Persistence of the best score and the coin total.
//!
//! Records are JSON values stored under the skin's storage key. Records written
//! by older builds are migrated forward one version at a time:
//! - v1: `{score, coins}` with no `version` field
//! - v2: adds `version` and the `runs` counter
//!
//! A record from a newer build is rejected rather than downgraded. Callers that
//! only need the numbers use [`load_save`], which treats any failure as an
//! empty save.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub const CURRENT_SAVE_VERSION: u32 = 2;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("storage i/o failed for `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed save record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save record is not an object")]
    NotAnObject,
    #[error("save version {found} is newer than supported version {supported}")]
    FutureVersion { found: u32, supported: u32 },
    #[error("no migration path from save version {0}")]
    UnsupportedVersion(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    /// Best number of floors reached in a single run
    pub score: u32,
    /// Coins collected over every run
    pub coins: u64,
    pub runs: u64,
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            version: CURRENT_SAVE_VERSION,
            score: 0,
            coins: 0,
            runs: 0,
        }
    }
}

impl SaveData {
    /// Fold a finished run into the record
    pub fn merged_with_run(&self, floors: u32, coins: u32) -> Self {
        Self {
            version: CURRENT_SAVE_VERSION,
            score: self.score.max(floors),
            coins: self.coins.saturating_add(u64::from(coins)),
            runs: self.runs.saturating_add(1),
        }
    }
}

/// Minimal key-value persistence.
pub trait KeyValueStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, SaveError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), SaveError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.entries.insert(key.to_string(), value.to_string());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, SaveError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), SaveError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, SaveError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SaveError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), SaveError> {
        let io = |source| SaveError::Io {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp).map_err(io)?;
        file.write_all(value.as_bytes()).map_err(io)?;
        file.sync_all().map_err(io)?;
        fs::rename(&tmp, &path).map_err(io)?;
        Ok(())
    }
}

/// Records written before versioning carry no `version` field and count as v1
fn record_version(data: &Value) -> Result<u32, SaveError> {
    match data.get("version").and_then(Value::as_u64) {
        None => Ok(1),
        Some(raw) => u32::try_from(raw).map_err(|_| SaveError::UnsupportedVersion(raw)),
    }
}

fn migrate_v1_to_v2(data: &mut Value) -> Result<(), SaveError> {
    let obj = data.as_object_mut().ok_or(SaveError::NotAnObject)?;
    obj.entry("runs").or_insert(Value::from(0u64));
    obj.insert("version".to_string(), Value::from(2u32));
    Ok(())
}

/// Bring a raw record up to [`CURRENT_SAVE_VERSION`]
pub fn migrate(mut data: Value) -> Result<Value, SaveError> {
    if !data.is_object() {
        return Err(SaveError::NotAnObject);
    }
    let mut version = record_version(&data)?;
    if version > CURRENT_SAVE_VERSION {
        return Err(SaveError::FutureVersion {
            found: version,
            supported: CURRENT_SAVE_VERSION,
        });
    }
    while version < CURRENT_SAVE_VERSION {
        match version {
            1 => migrate_v1_to_v2(&mut data)?,
            other => return Err(SaveError::UnsupportedVersion(u64::from(other))),
        }
        debug!(from = version, to = version + 1, "migrated save record");
        version += 1;
    }
    Ok(data)
}

pub fn decode_save(text: &str) -> Result<SaveData, SaveError> {
    let raw: Value = serde_json::from_str(text)?;
    let data = serde_json::from_value(migrate(raw)?)?;
    Ok(data)
}

pub fn encode_save(data: &SaveData) -> Result<String, SaveError> {
    Ok(serde_json::to_string(data)?)
}

/// Read the record under `key`; missing or unreadable data is an empty save
pub fn load_save(store: &dyn KeyValueStore, key: &str) -> SaveData {
    let text = match store.read(key) {
        Ok(Some(text)) => text,
        Ok(None) => return SaveData::default(),
        Err(err) => {
            warn!(key, %err, "could not read save, starting fresh");
            return SaveData::default();
        }
    };
    decode_save(&text).unwrap_or_else(|err| {
        warn!(key, %err, "discarding unreadable save");
        SaveData::default()
    })
}

pub fn store_save(
    store: &mut dyn KeyValueStore,
    key: &str,
    data: &SaveData,
) -> Result<(), SaveError> {
    store.write(key, &encode_save(data)?)
}
