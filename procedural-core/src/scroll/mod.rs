//! Floor-advance scrolling.
//!
//! A climb requests a scroll. While the one-floor tween runs, further requests
//! are counted instead of overlapping. When the tween completes the session
//! calls [`reconcile`], generates the revealed floor and then [`ScrollCoordinator::settle`],
//! which either restarts the tween for a queued request or returns to idle.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::generation::PooledWorld;
use crate::schedule::{ease_cubic_out, Scheduler};
use crate::world::{EntityId, EntityKind};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScrollPhase {
    Idle,
    Scrolling { elapsed: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollRequest {
    Started,
    Queued { pending: u32 },
}

#[derive(Debug, Clone)]
pub struct ScrollCoordinator {
    phase: ScrollPhase,
    pending: u32,
    duration: f32,
    distance: f32,
    completed: u64,
}

impl ScrollCoordinator {
    /// `duration` in seconds, `distance` is one floor gap
    pub fn new(duration: f32, distance: f32) -> Self {
        Self {
            phase: ScrollPhase::Idle,
            pending: 0,
            duration: duration.max(f32::EPSILON),
            distance,
            completed: 0,
        }
    }

    pub fn request(&mut self) -> ScrollRequest {
        match self.phase {
            ScrollPhase::Idle => {
                self.phase = ScrollPhase::Scrolling { elapsed: 0.0 };
                ScrollRequest::Started
            }
            ScrollPhase::Scrolling { .. } => {
                self.pending += 1;
                ScrollRequest::Queued {
                    pending: self.pending,
                }
            }
        }
    }

    /// Advance the tween; `true` when it has just reached its end
    pub fn advance(&mut self, dt: f32) -> bool {
        match &mut self.phase {
            ScrollPhase::Idle => false,
            ScrollPhase::Scrolling { elapsed } => {
                if *elapsed >= self.duration {
                    return false;
                }
                *elapsed = (*elapsed + dt.max(0.0)).min(self.duration);
                *elapsed >= self.duration
            }
        }
    }

    /// Finish a completed tween. Returns `true` if a queued scroll was started.
    pub fn settle(&mut self) -> bool {
        self.completed += 1;
        if self.pending > 0 {
            self.pending -= 1;
            self.phase = ScrollPhase::Scrolling { elapsed: 0.0 };
            debug!(pending = self.pending, "restarting queued scroll");
            true
        } else {
            self.phase = ScrollPhase::Idle;
            false
        }
    }

    /// Current downward displacement of the content container
    pub fn offset(&self) -> f32 {
        match self.phase {
            ScrollPhase::Idle => 0.0,
            ScrollPhase::Scrolling { elapsed } => {
                self.distance * ease_cubic_out(elapsed / self.duration)
            }
        }
    }

    pub fn phase(&self) -> ScrollPhase {
        self.phase
    }

    pub fn is_scrolling(&self) -> bool {
        matches!(self.phase, ScrollPhase::Scrolling { .. })
    }

    pub fn pending(&self) -> u32 {
        self.pending
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    pub shifted: usize,
    pub released: Vec<(EntityKind, EntityId)>,
    pub cancelled_timers: usize,
}

/// Move every live entity down one gap and recycle what fell below `bottom`
pub fn reconcile(
    world: &mut PooledWorld,
    scheduler: &mut Scheduler,
    gap: f32,
    bottom: f32,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    let mut exited = Vec::new();
    for entity in world.store_mut().live_mut() {
        entity.position.y += gap;
        report.shifted += 1;
        if entity.position.y > bottom {
            exited.push((entity.kind, entity.id));
        }
    }
    for (kind, id) in exited {
        report.cancelled_timers += scheduler.cancel_for(id);
        if world.release(id) {
            report.released.push((kind, id));
        }
    }
    debug!(
        shifted = report.shifted,
        released = report.released.len(),
        cancelled_timers = report.cancelled_timers,
        "scroll reconciled"
    );
    report
}
