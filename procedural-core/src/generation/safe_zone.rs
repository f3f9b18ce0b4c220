//! Horizontal exclusion intervals for the floor being populated.

use serde::{Deserialize, Serialize};

/// Open interval `(start, end)`; points strictly inside are unsafe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafeZone {
    pub start: f32,
    pub end: f32,
}

impl SafeZone {
    pub fn contains(&self, x: f32) -> bool {
        x > self.start && x < self.end
    }
}

/// Keeps stationary hazards away from the ladder and from each other.
///
/// Only a handful of zones exist per floor, so a linear scan is enough.
#[derive(Debug, Clone)]
pub struct SafeZoneTracker {
    radius: f32,
    zones: Vec<SafeZone>,
}

impl SafeZoneTracker {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            zones: Vec::with_capacity(4),
        }
    }

    pub fn reset(&mut self) {
        self.zones.clear();
    }

    pub fn is_safe(&self, x: f32) -> bool {
        !self.zones.iter().any(|zone| zone.contains(x))
    }

    pub fn register_safe(&mut self, center: f32) {
        self.zones.push(SafeZone {
            start: center - self.radius,
            end: center + self.radius,
        });
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn zones(&self) -> &[SafeZone] {
        &self.zones
    }
}
