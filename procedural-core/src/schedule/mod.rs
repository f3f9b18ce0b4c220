//! One-shot timers on the session clock.
//!
//! The clock only moves when the session advances it, so timer callbacks are
//! returned as data from [`Scheduler::advance`] and run by the caller between
//! frames rather than re-entrantly.

use serde::{Deserialize, Serialize};

use crate::world::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// Deferred work keyed to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimedAction {
    /// Give an armed launcher its outward velocity
    LaunchProjectile(EntityId),
}

impl TimedAction {
    pub fn target(&self) -> EntityId {
        match self {
            TimedAction::LaunchProjectile(id) => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Timer {
    id: TimerId,
    due_ms: f64,
    action: TimedAction,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now_ms: f64,
    next_id: u64,
    timers: Vec<Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn schedule_after(&mut self, delay_ms: f64, action: TimedAction) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due_ms: self.now_ms + delay_ms.max(0.0),
            action,
        });
        id
    }

    /// Move the clock forward by `dt` seconds and return the actions that fell due,
    /// ordered by due time then scheduling order
    pub fn advance(&mut self, dt: f32) -> Vec<TimedAction> {
        self.now_ms += f64::from(dt.max(0.0)) * 1000.0;
        let now = self.now_ms;
        let (mut due, pending): (Vec<Timer>, Vec<Timer>) =
            self.timers.drain(..).partition(|timer| timer.due_ms <= now);
        self.timers = pending;
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.id.cmp(&b.id)));
        due.into_iter().map(|timer| timer.action).collect()
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        self.timers.len() != before
    }

    /// Drop every timer aimed at the slot of `entity`, whatever its generation
    pub fn cancel_for(&mut self, entity: EntityId) -> usize {
        let before = self.timers.len();
        self.timers
            .retain(|timer| timer.action.target().index != entity.index);
        before - self.timers.len()
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }
}

/// Cubic ease-out over `t` in `[0, 1]`
pub fn ease_cubic_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0) - 1.0;
    t * t * t + 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(index: u32) -> EntityId {
        EntityId {
            index,
            generation: 0,
        }
    }

    #[test]
    fn test_timer_fires_once_when_due() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_after(500.0, TimedAction::LaunchProjectile(entity(1)));
        assert!(scheduler.advance(0.25).is_empty());
        assert_eq!(
            scheduler.advance(0.25),
            vec![TimedAction::LaunchProjectile(entity(1))]
        );
        assert!(scheduler.advance(1.0).is_empty());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_after(900.0, TimedAction::LaunchProjectile(entity(1)));
        scheduler.schedule_after(600.0, TimedAction::LaunchProjectile(entity(2)));
        scheduler.schedule_after(600.0, TimedAction::LaunchProjectile(entity(3)));
        let fired: Vec<u32> = scheduler
            .advance(1.0)
            .into_iter()
            .map(|action| action.target().index)
            .collect();
        assert_eq!(fired, vec![2, 3, 1]);
    }

    #[test]
    fn test_cancel_for_entity_slot() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_after(500.0, TimedAction::LaunchProjectile(entity(4)));
        let keep = scheduler.schedule_after(500.0, TimedAction::LaunchProjectile(entity(5)));
        let revived = EntityId {
            index: 4,
            generation: 1,
        };
        assert_eq!(scheduler.cancel_for(revived), 1);
        assert!(scheduler.cancel(keep));
        assert!(!scheduler.cancel(keep));
        assert!(scheduler.advance(2.0).is_empty());
    }

    #[test]
    fn test_ease_cubic_out() {
        assert_eq!(ease_cubic_out(0.0), 0.0);
        assert_eq!(ease_cubic_out(1.0), 1.0);
        assert_eq!(ease_cubic_out(2.0), 1.0);
        let half = ease_cubic_out(0.5);
        assert!((half - 0.875).abs() < 1e-6);
    }
}
