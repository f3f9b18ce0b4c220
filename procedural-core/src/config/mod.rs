//! Game tuning options and skin presets.
//!
//! `GameOptions` collects every tunable number of a session. It can be loaded
//! from a `.ron` or `.json` file; anything not present in the file falls back to
//! the defaults in [`crate::constants`]. The four shipped variants of the game
//! only differ by their [`Skin`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;
use crate::world::HazardKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tuning file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid RON in {path}: {source}")]
    Ron {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported tuning file extension: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("invalid option `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Cosmetic variant of the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skin {
    pub name: String,
    /// Key under which best score and coins are persisted
    pub storage_key: String,
    pub safe_radius: f32,
    pub companion_name: String,
    /// Display names in `HazardKind::ALL` order
    pub hazard_names: [String; 5],
}

impl Skin {
    pub fn classic() -> Self {
        Self {
            name: "classic".into(),
            storage_key: DEFAULT_STORAGE_KEY.into(),
            safe_radius: SAFE_RADIUS,
            companion_name: "bulbasaur".into(),
            hazard_names: [
                "spike".into(),
                "fire".into(),
                "arrow".into(),
                "monster".into(),
                "spikedmonster".into(),
            ],
        }
    }

    pub fn remix() -> Self {
        Self {
            name: "remix".into(),
            storage_key: "poke-climb".into(),
            safe_radius: 184.0,
            companion_name: "bulbasaur".into(),
            hazard_names: [
                "grimer".into(),
                "rapidash".into(),
                "shell".into(),
                "dugtrio".into(),
                "rhydon".into(),
            ],
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "classic" => Some(Self::classic()),
            "remix" => Some(Self::remix()),
            _ => None,
        }
    }

    pub fn hazard_name(&self, kind: HazardKind) -> &str {
        &self.hazard_names[kind.index()]
    }
}

impl Default for Skin {
    fn default() -> Self {
        Self::classic()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOptions {
    pub game_width: f32,
    pub game_height: f32,
    pub floor_start: f32,
    pub floor_gap: f32,

    pub player_gravity: f32,
    pub player_speed: f32,
    pub climb_speed: f32,
    pub player_jump: f32,
    pub climb_snap_distance: f32,
    pub climb_clearance: f32,

    pub arrow_speed: f32,
    pub monster_speed: f32,
    pub launch_trigger_distance: f32,
    pub launch_delay_ms: (i32, i32),

    pub coin_ratio: i32,
    pub double_hazard_ratio: i32,
    pub safe_attempts: u32,
    pub edge_margin: i32,
    pub hazard_margin: i32,

    pub scroll_duration_ms: u32,

    /// Root seed of the session RNG; each restart derives a fresh stream from it
    pub seed: u64,
    pub skin: Skin,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            game_width: GAME_WIDTH,
            game_height: GAME_HEIGHT,
            floor_start: FLOOR_START,
            floor_gap: FLOOR_GAP,
            player_gravity: PLAYER_GRAVITY,
            player_speed: PLAYER_SPEED,
            climb_speed: CLIMB_SPEED,
            player_jump: PLAYER_JUMP,
            climb_snap_distance: CLIMB_SNAP_DISTANCE,
            climb_clearance: CLIMB_CLEARANCE,
            arrow_speed: ARROW_SPEED,
            monster_speed: MONSTER_SPEED,
            launch_trigger_distance: LAUNCH_TRIGGER_DISTANCE,
            launch_delay_ms: (LAUNCH_DELAY_MIN_MS, LAUNCH_DELAY_MAX_MS),
            coin_ratio: COIN_RATIO,
            double_hazard_ratio: DOUBLE_HAZARD_RATIO,
            safe_attempts: SAFE_POSITION_ATTEMPTS,
            edge_margin: EDGE_MARGIN,
            hazard_margin: HAZARD_MARGIN,
            scroll_duration_ms: SCROLL_DURATION_MS,
            seed: 42,
            skin: Skin::classic(),
        }
    }
}

impl GameOptions {
    pub fn with_skin(skin: Skin) -> Self {
        Self {
            skin,
            ..Self::default()
        }
    }

    /// Vertical coordinate of the start floor
    pub fn start_floor_y(&self) -> f32 {
        self.game_height * self.floor_start
    }

    /// Entities whose y exceeds this are off the bottom of the world
    pub fn world_bottom(&self) -> f32 {
        self.game_height
    }

    pub fn scroll_duration_secs(&self) -> f32 {
        self.scroll_duration_ms as f32 / 1000.0
    }

    pub fn safe_radius(&self) -> f32 {
        self.skin.safe_radius
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if !(self.game_width > 0.0 && self.game_width.is_finite()) {
            return Err(invalid("game_width", "must be a positive number"));
        }
        if !(self.game_height > 0.0 && self.game_height.is_finite()) {
            return Err(invalid("game_height", "must be a positive number"));
        }
        if !(self.floor_gap >= MIN_FLOOR_GAP && self.floor_gap.is_finite()) {
            return Err(invalid(
                "floor_gap",
                format!("must be a number of at least {MIN_FLOOR_GAP}"),
            ));
        }
        if !(0.0..=1.0).contains(&self.floor_start) {
            return Err(invalid("floor_start", "must lie in [0, 1]"));
        }
        if self.start_floor_y() / self.floor_gap > MAX_INITIAL_FLOORS {
            return Err(invalid(
                "floor_gap",
                format!("stacks more than {MAX_INITIAL_FLOORS} floors below the start floor"),
            ));
        }
        if self.coin_ratio < 0 {
            return Err(invalid("coin_ratio", "must not be negative"));
        }
        if self.double_hazard_ratio < 0 {
            return Err(invalid("double_hazard_ratio", "must not be negative"));
        }
        if self.safe_attempts == 0 {
            return Err(invalid("safe_attempts", "at least one attempt is required"));
        }
        let half_width = self.game_width as i32 / 2;
        if self.edge_margin < 0 || self.edge_margin > half_width {
            return Err(invalid("edge_margin", "must fit twice inside game_width"));
        }
        if self.hazard_margin < 0 || self.hazard_margin > half_width {
            return Err(invalid("hazard_margin", "must fit twice inside game_width"));
        }
        let (min, max) = self.launch_delay_ms;
        if min < 0 || min > max {
            return Err(invalid("launch_delay_ms", "expected 0 <= min <= max"));
        }
        if self.scroll_duration_ms == 0 {
            return Err(invalid("scroll_duration_ms", "must be positive"));
        }
        if self.skin.safe_radius < 0.0 {
            return Err(invalid("skin.safe_radius", "must not be negative"));
        }
        Ok(())
    }

    pub fn from_ron_str(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let options: Self = ron::from_str(content).map_err(|source| ConfigError::Ron {
            path: path.to_path_buf(),
            source,
        })?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_json_str(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let options: Self =
            serde_json::from_str(content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a `.ron` or `.json` tuning file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("ron") => Self::from_ron_str(path, &content),
            Some("json") => Self::from_json_str(path, &content),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_constants() {
        let options = GameOptions::default();
        assert_eq!(options.floor_gap, 250.0);
        assert_eq!(options.coin_ratio, 2);
        assert_eq!(options.safe_radius(), 180.0);
        assert_eq!(options.scroll_duration_secs(), 0.5);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_start_floor_y() {
        let options = GameOptions {
            game_height: 800.0,
            ..Default::default()
        };
        assert_eq!(options.start_floor_y(), 500.0);
    }

    #[test]
    fn test_skin_presets() {
        let remix = Skin::remix();
        assert_eq!(remix.safe_radius, 184.0);
        assert_eq!(remix.hazard_name(HazardKind::Spike), "grimer");
        assert_eq!(remix.hazard_name(HazardKind::SpikedMonster), "rhydon");
        assert_eq!(Skin::by_name("classic"), Some(Skin::classic()));
        assert!(Skin::by_name("unknown").is_none());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let options = GameOptions {
            floor_gap: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(ConfigError::Invalid {
                field: "floor_gap",
                ..
            })
        ));

        let options = GameOptions {
            launch_delay_ms: (900, 100),
            ..Default::default()
        };
        assert!(options.validate().is_err());

        let options = GameOptions {
            hazard_margin: 500,
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_huge_margins() {
        for field in ["edge_margin", "hazard_margin"] {
            let json = format!(r#"{{"{field}": 2000000000}}"#);
            let err = GameOptions::from_json_str(Path::new("tuning.json"), &json).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { field: f, .. } if f == field),
                "{err}"
            );
        }

        let options = GameOptions {
            edge_margin: 400,
            ..Default::default()
        };
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_tiny_floor_gap() {
        for gap in [1e-30, 1.0, MIN_FLOOR_GAP - 0.5] {
            let options = GameOptions {
                floor_gap: gap,
                game_height: 800.0,
                ..Default::default()
            };
            assert!(
                matches!(
                    options.validate(),
                    Err(ConfigError::Invalid {
                        field: "floor_gap",
                        ..
                    })
                ),
                "gap {gap} accepted"
            );
        }

        let options = GameOptions {
            floor_gap: MIN_FLOOR_GAP,
            ..Default::default()
        };
        assert!(options.validate().is_ok());

        let options = GameOptions {
            game_height: 1e30,
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let options =
            GameOptions::from_json_str(Path::new("tuning.json"), r#"{"coin_ratio": 5}"#).unwrap();
        assert_eq!(options.coin_ratio, 5);
        assert_eq!(options.floor_gap, FLOOR_GAP);
    }

    #[test]
    fn test_ron_roundtrip() {
        let options = GameOptions::with_skin(Skin::remix());
        let text = ron::to_string(&options).unwrap();
        let parsed = GameOptions::from_ron_str(Path::new("tuning.ron"), &text).unwrap();
        assert_eq!(parsed, options);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tuning.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{"monster_speed": 300.0, "seed": 7}}"#).unwrap();

        let options = GameOptions::load(&path).unwrap();
        assert_eq!(options.monster_speed, 300.0);
        assert_eq!(options.seed, 7);

        let bad = dir.path().join("tuning.toml");
        std::fs::write(&bad, "x = 1").unwrap();
        assert!(matches!(
            GameOptions::load(&bad),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_invalid_json_reports_path() {
        let err = GameOptions::from_json_str(Path::new("broken.json"), "{").unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }
}
