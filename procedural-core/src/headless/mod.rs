//! Headless stand-in for the physics collaborator.
//!
//! A plain AABB broad-phase that resolves the hero against the world after
//! each [`GameSession::update`] and calls the session's collision bodies in
//! the same order a frame of the game would: floors, ladders, coins, hazards,
//! then projectiles. Used by the binary, the bevy plugin and soak tests.

use serde::{Deserialize, Serialize};

use crate::constants::FLOOR_THICKNESS;
use crate::session::{Contact, GameEvent, GameSession, SessionPhase};
use crate::world::{EntityId, EntityKind, HazardKind, LaunchState};

/// How far above a hazard's top the hero's feet may have been last frame for a stomp
const STOMP_TOLERANCE: f32 = 1.0;

/// Resolve the hero against every live entity and invoke the matching callbacks
pub fn dispatch_contacts(session: &mut GameSession) {
    if session.phase() != SessionPhase::Playing {
        return;
    }
    land_on_floors(session);

    let width = session.options().game_width;
    let gap = session.options().floor_gap;
    let hero = session.hero().clone();
    let hero_box = hero.bounds();

    let mut ladders = Vec::new();
    let mut coins = Vec::new();
    let mut hazards = Vec::new();
    let mut projectiles = Vec::new();
    for entity in session.world().store().live() {
        if !entity.bounds(width, gap).overlaps(&hero_box) {
            continue;
        }
        match entity.kind {
            EntityKind::Ladder => ladders.push(entity.id),
            EntityKind::Coin => coins.push(entity.id),
            EntityKind::Hazard(HazardKind::Arrow) => projectiles.push(entity.id),
            EntityKind::Hazard(_) => {
                let top = entity.bounds(width, gap).min.y;
                let from_above =
                    hero.velocity.y > 0.0 && hero.previous_bottom() <= top + STOMP_TOLERANCE;
                hazards.push((entity.id, Contact { from_above }));
            }
            EntityKind::Floor | EntityKind::LadderCompanion => {}
        }
    }

    for ladder in ladders {
        if session.on_ladder_overlap(ladder) {
            break;
        }
    }
    for coin in coins {
        session.on_coin_overlap(coin);
    }
    for (hazard, contact) in hazards {
        session.on_hazard_contact(hazard, contact);
        if session.phase() != SessionPhase::Playing {
            return;
        }
    }
    for arrow in projectiles {
        if session.on_projectile_overlap(arrow) {
            return;
        }
    }
}

/// One-way platforms: the hero lands when its feet were above the bottom of a
/// floor slab last frame and are at or below its top now
fn land_on_floors(session: &mut GameSession) {
    let hero = session.hero();
    if hero.velocity.y < 0.0 || hero.is_climbing() {
        return;
    }
    let previous = hero.previous_bottom();
    let bottom = hero.bottom();
    let floors: Vec<(EntityId, f32)> = session
        .world()
        .store()
        .live()
        .filter(|entity| entity.kind == EntityKind::Floor)
        .filter(|entity| {
            previous <= entity.position.y + FLOOR_THICKNESS && bottom >= entity.position.y
        })
        .map(|entity| (entity.id, entity.position.y))
        .collect();
    if let Some(&(floor, y)) = floors.iter().min_by(|a, b| a.1.total_cmp(&b.1)) {
        if session.on_floor_contact(floor) {
            session.hero_mut().land(y);
        }
    }
}

/// Taps when a ground hazard or a flying projectile is just ahead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoPilot {
    pub lookahead: f32,
    pub taps: u64,
}

impl Default for AutoPilot {
    fn default() -> Self {
        Self {
            lookahead: 90.0,
            taps: 0,
        }
    }
}

impl AutoPilot {
    pub fn wants_jump(&self, session: &GameSession) -> bool {
        let hero = session.hero();
        if !hero.can_jump || hero.is_climbing() || session.phase() != SessionPhase::Playing {
            return false;
        }
        let width = session.options().game_width;
        let gap = session.options().floor_gap;
        let hero_box = hero.bounds();
        let direction = hero.facing.sign();
        session.world().store().live().any(|entity| {
            let Some(kind) = entity.kind.hazard() else {
                return false;
            };
            if kind == HazardKind::Arrow && entity.launch != LaunchState::Launched {
                return false;
            }
            let bounds = entity.bounds(width, gap);
            let same_level = bounds.min.y < hero_box.max.y && bounds.max.y > hero_box.min.y;
            let ahead = (entity.position.x - hero.position.x) * direction;
            let incoming = kind == HazardKind::Arrow && entity.velocity.x * direction < 0.0;
            let close = (0.0..self.lookahead).contains(&ahead);
            let closing_in = incoming && ahead.abs() < self.lookahead * 2.0;
            same_level && (close || closing_in)
        })
    }
}

/// Totals over a headless stretch of play.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub frames: u64,
    pub runs_finished: u64,
    pub best_floors: u32,
    pub coins: u64,
    pub stomps: u64,
    pub deaths: u64,
    pub floors_generated: u64,
}

impl RunSummary {
    pub fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::FloorReached { floors } => {
                self.best_floors = self.best_floors.max(*floors)
            }
            GameEvent::CoinCollected { .. } => self.coins += 1,
            GameEvent::MonsterStomped { .. } => self.stomps += 1,
            GameEvent::Hurt { .. } => self.deaths += 1,
            GameEvent::SessionEnded { .. } => self.runs_finished += 1,
            GameEvent::FloorGenerated { .. } => self.floors_generated += 1,
            _ => {}
        }
    }
}

/// One frame: autopilot tap, session update, contact resolution
pub fn step(session: &mut GameSession, pilot: Option<&mut AutoPilot>, dt: f32) {
    if let Some(pilot) = pilot {
        if pilot.wants_jump(session) {
            pilot.taps += 1;
            session.handle_tap();
        }
    }
    session.update(dt);
    dispatch_contacts(session);
}

/// Play `frames` fixed steps and summarize the events produced
pub fn run_frames(
    session: &mut GameSession,
    pilot: &mut AutoPilot,
    frames: u64,
    dt: f32,
) -> RunSummary {
    let mut summary = RunSummary::default();
    for _ in 0..frames {
        step(session, Some(pilot), dt);
        for event in session.drain_events() {
            summary.record(&event);
        }
        summary.frames += 1;
    }
    summary
}
