//! Centralized game constants for the climber procedural core.
//!
//! Default tuning values live here so `GameOptions::default()`, the skin presets
//! and the tests agree on a single source of truth. Sprite geometry is fixed by
//! the art and is not part of the tunable options.

// =====================================================
// World
// =====================================================

/// Logical width of the game, height scales with the device aspect ratio
pub const GAME_WIDTH: f32 = 800.0;

/// Default logical height (800 wide at the common 1.8 portrait ratio)
pub const GAME_HEIGHT: f32 = 1440.0;

/// Fraction of the game height where the start floor sits (5/8)
pub const FLOOR_START: f32 = 0.625;

/// Vertical spacing between consecutive floors, in pixels
pub const FLOOR_GAP: f32 = 250.0;

// =====================================================
// Hero
// =====================================================

/// Downward acceleration applied to the hero, px/s²
pub const PLAYER_GRAVITY: f32 = 10_000.0;

/// Auto-walk speed, px/s
pub const PLAYER_SPEED: f32 = 450.0;

/// Upward speed while climbing a ladder, px/s
pub const CLIMB_SPEED: f32 = 450.0;

/// Upward impulse of a jump (also used for stomps and the death tumble), px/s
pub const PLAYER_JUMP: f32 = 1_800.0;

/// Horizontal distance to a ladder's centre under which the hero grabs it
pub const CLIMB_SNAP_DISTANCE: f32 = 10.0;

/// How far above the ladder top the hero must rise before the climb ends
pub const CLIMB_CLEARANCE: f32 = 40.0;

/// Random horizontal drift range of the death tumble, px/s
pub const DEATH_DRIFT: i32 = 20;

// =====================================================
// Procedural Generation
// =====================================================

/// Coin appears when a draw in [0, COIN_RATIO] is non-zero (2/3 chance)
pub const COIN_RATIO: i32 = 2;

/// Two stationary hazards when a draw in [0, DOUBLE_HAZARD_RATIO] is zero (1/2 chance)
pub const DOUBLE_HAZARD_RATIO: i32 = 1;

/// Half-width of a safe zone around ladders and stationary hazards
pub const SAFE_RADIUS: f32 = 180.0;

/// Retry budget of the safe-position search
pub const SAFE_POSITION_ATTEMPTS: u32 = 10;

/// Distance from the world edges for ladders, coins and patrollers
pub const EDGE_MARGIN: i32 = 50;

/// Distance from the world edges for stationary hazards
pub const HAZARD_MARGIN: i32 = 150;

/// Number of distinct hazard kinds the generator chooses between
pub const HAZARD_KIND_COUNT: i32 = 5;

// =====================================================
// Hazards
// =====================================================

/// Patrolling monster speed, px/s
pub const MONSTER_SPEED: f32 = 250.0;

/// Projectile speed once launched, px/s
pub const ARROW_SPEED: f32 = 1_000.0;

/// Vertical distance between hero and launcher that arms the launcher
pub const LAUNCH_TRIGGER_DISTANCE: f32 = 10.0;

/// Launch delay bounds once armed, milliseconds
pub const LAUNCH_DELAY_MIN_MS: i32 = 500;
pub const LAUNCH_DELAY_MAX_MS: i32 = 1_500;

// =====================================================
// Scrolling
// =====================================================

/// Duration of the one-floor scroll tween, milliseconds
pub const SCROLL_DURATION_MS: u32 = 500;

// =====================================================
// Sprite geometry (width, height)
// =====================================================

pub const HERO_SIZE: (f32, f32) = (26.0, 48.0);
pub const FLOOR_THICKNESS: f32 = 20.0;
pub const LADDER_WIDTH: f32 = 40.0;
pub const COMPANION_SIZE: (f32, f32) = (40.0, 40.0);
pub const COIN_SIZE: (f32, f32) = (48.0, 48.0);
pub const SPIKE_SIZE: (f32, f32) = (39.0, 20.0);
pub const FIRE_SIZE: (f32, f32) = (32.0, 58.0);
pub const ARROW_SIZE: (f32, f32) = (21.0, 20.0);
pub const MONSTER_SIZE: (f32, f32) = (40.0, 40.0);
pub const SPIKED_MONSTER_SIZE: (f32, f32) = (40.0, 50.0);

/// Smallest accepted floor gap: a hero standing on a floor fits under the next
pub const MIN_FLOOR_GAP: f32 = HERO_SIZE.1 + FLOOR_THICKNESS;

/// Upper bound on floors stacked by the initial level build
pub const MAX_INITIAL_FLOORS: f32 = 64.0;

// =====================================================
// Persistence
// =====================================================

/// Storage key of the classic skin
pub const DEFAULT_STORAGE_KEY: &str = "PokeClimb";
