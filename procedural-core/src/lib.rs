//! Endless Climber - Procedural Core Library
//!
//! Deterministic game logic for a one-tap endless climber:
//! - Floor generation with ladder safe zones (generation)
//! - Kind-keyed entity pooling with generational handles (generation, world)
//! - Floor-advance scrolling and reconciliation (scroll, schedule)
//! - Hero movement, collision responses and session lifecycle (player, session)
//! - Versioned save persistence (save)
//! - Headless broad-phase and autopilot (headless)
//! - Monte-Carlo generation statistics (balance)
//! - Tuning files with hot-reload (config, hotreload)
//! - Bevy plugin hosting a session (plugin)

pub mod balance;
pub mod config;
pub mod constants;
pub mod generation;
pub mod headless;
pub mod hotreload;
pub mod logging;
pub mod motion;
pub mod player;
pub mod plugin;
pub mod rng;
pub mod save;
pub mod schedule;
pub mod scroll;
pub mod session;
pub mod world;
