//! Procedural floor generation and entity recycling.
//!
//! [`LevelBuilder`] drives [`FloorGenerator`] one floor at a time. The generator
//! keeps stationary hazards out of the [`SafeZoneTracker`] intervals of the
//! floor being populated and takes every entity from the [`PooledWorld`], which
//! only constructs a new slot when the kind's [`EntityPool`] is empty.

pub mod floor_gen;
pub mod level;
pub mod pool;
pub mod safe_zone;

pub use floor_gen::{FloorGenerator, FloorReport, GenContext, PlacedHazard};
pub use level::LevelBuilder;
pub use pool::{EntityPool, PoolStats, Poolable, PooledWorld};
pub use safe_zone::{SafeZone, SafeZoneTracker};
