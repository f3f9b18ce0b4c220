//! Single-floor content generation.
//!
//! Draw order per content floor is fixed so scripted sources can steer it:
//! ladder x, coin gate, coin x (only if the gate passed), hazard count, then for
//! each slot the kind draw followed by that kind's own draws.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::pool::PooledWorld;
use super::safe_zone::SafeZoneTracker;
use crate::config::GameOptions;
use crate::rng::RandomSource;
use crate::world::{EntityId, EntityKind, Facing, HazardKind, Vec2};

/// Everything floor generation needs from the session, borrowed for one call.
pub struct GenContext<'a> {
    pub world: &'a mut PooledWorld,
    pub rng: &'a mut dyn RandomSource,
    pub options: &'a GameOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedHazard {
    pub kind: HazardKind,
    pub id: EntityId,
}

/// Outcome of populating one floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorReport {
    pub floor_y: f32,
    pub floor: EntityId,
    pub ladder: Option<EntityId>,
    pub ladder_x: Option<f32>,
    pub coin: Option<EntityId>,
    pub hazards: Vec<PlacedHazard>,
    /// Hazard slots drawn (1 or 2), before stationary doubling
    pub requested_slots: u32,
    /// Stationary instances dropped because no safe position was found
    pub skipped: u32,
}

impl FloorReport {
    fn bare(floor_y: f32, floor: EntityId) -> Self {
        Self {
            floor_y,
            floor,
            ladder: None,
            ladder_x: None,
            coin: None,
            hazards: Vec::new(),
            requested_slots: 0,
            skipped: 0,
        }
    }

    pub fn is_content_floor(&self) -> bool {
        self.ladder.is_some()
    }

    pub fn hazard_count(&self, kind: HazardKind) -> usize {
        self.hazards.iter().filter(|placed| placed.kind == kind).count()
    }
}

#[derive(Debug, Clone)]
pub struct FloorGenerator {
    safe_zones: SafeZoneTracker,
}

impl FloorGenerator {
    pub fn new(safe_radius: f32) -> Self {
        Self {
            safe_zones: SafeZoneTracker::new(safe_radius),
        }
    }

    pub fn safe_zones(&self) -> &SafeZoneTracker {
        &self.safe_zones
    }

    /// Populate the floor whose line sits at `floor_y`.
    ///
    /// Non-content floors (the start floor) only get the floor segment.
    pub fn populate(
        &mut self,
        ctx: &mut GenContext<'_>,
        floor_y: f32,
        content: bool,
    ) -> FloorReport {
        let floor = ctx.world.place(EntityKind::Floor, Vec2::new(0.0, floor_y));
        let mut report = FloorReport::bare(floor_y, floor);
        if !content {
            debug!(floor_y, "placed start floor");
            return report;
        }

        self.safe_zones.reset();
        self.place_ladder(ctx, floor_y, &mut report);
        report.coin = self.place_coin(ctx, floor_y, None);

        let slots = ctx.rng.integer_in_range(1, 2);
        report.requested_slots = slots as u32;
        for _ in 0..slots {
            let draw = ctx.rng.integer_in_range(0, HazardKind::ALL.len() as i32 - 1);
            let Some(kind) = HazardKind::from_draw(draw) else {
                continue;
            };
            match kind {
                HazardKind::Spike | HazardKind::Fire => {
                    self.place_stationary(ctx, kind, floor_y, &mut report)
                }
                HazardKind::Arrow => self.place_launcher(ctx, floor_y, &mut report),
                HazardKind::Monster | HazardKind::SpikedMonster => {
                    self.place_patroller(ctx, kind, floor_y, &mut report)
                }
            }
        }

        debug!(
            floor_y,
            ladder_x = report.ladder_x,
            coin = report.coin.is_some(),
            hazards = report.hazards.len(),
            skipped = report.skipped,
            "populated floor"
        );
        report
    }

    fn place_ladder(&mut self, ctx: &mut GenContext<'_>, floor_y: f32, report: &mut FloorReport) {
        let margin = ctx.options.edge_margin;
        let x = ctx
            .rng
            .integer_in_range(margin, ctx.options.game_width as i32 - margin) as f32;
        let position = Vec2::new(x, floor_y);
        report.ladder = Some(ctx.world.place(EntityKind::Ladder, position));
        ctx.world.place(EntityKind::LadderCompanion, position);
        report.ladder_x = Some(x);
        self.safe_zones.register_safe(x);
    }

    /// Place a coin for the floor at `floor_y`.
    ///
    /// With `at` the coin is forced there and no draws are consumed. Otherwise a
    /// gate draw in `[0, coin_ratio]` of zero means no coin.
    pub fn place_coin(
        &mut self,
        ctx: &mut GenContext<'_>,
        floor_y: f32,
        at: Option<Vec2>,
    ) -> Option<EntityId> {
        let position = match at {
            Some(point) => point,
            None => {
                if ctx.rng.integer_in_range(0, ctx.options.coin_ratio) == 0 {
                    return None;
                }
                let margin = ctx.options.edge_margin;
                let x = ctx
                    .rng
                    .integer_in_range(margin, ctx.options.game_width as i32 - margin);
                Vec2::new(x as f32, floor_y - ctx.options.floor_gap / 2.0)
            }
        };
        Some(ctx.world.place(EntityKind::Coin, position))
    }

    /// Up to `safe_attempts` draws; the first safe one is registered and returned
    pub fn find_safe_position(&mut self, ctx: &mut GenContext<'_>) -> Option<f32> {
        let margin = ctx.options.hazard_margin;
        let hi = ctx.options.game_width as i32 - margin;
        for _ in 0..ctx.options.safe_attempts {
            let x = ctx.rng.integer_in_range(margin, hi) as f32;
            if self.safe_zones.is_safe(x) {
                self.safe_zones.register_safe(x);
                return Some(x);
            }
        }
        None
    }

    fn place_stationary(
        &mut self,
        ctx: &mut GenContext<'_>,
        kind: HazardKind,
        floor_y: f32,
        report: &mut FloorReport,
    ) {
        let instances = if ctx.rng.integer_in_range(0, ctx.options.double_hazard_ratio) == 0 {
            2
        } else {
            1
        };
        for _ in 0..instances {
            match self.find_safe_position(ctx) {
                Some(x) => {
                    let position = Vec2::new(x, floor_y - kind.floor_offset());
                    let id = ctx.world.place(EntityKind::Hazard(kind), position);
                    report.hazards.push(PlacedHazard { kind, id });
                }
                None => report.skipped += 1,
            }
        }
    }

    fn place_launcher(&mut self, ctx: &mut GenContext<'_>, floor_y: f32, report: &mut FloorReport) {
        let side = ctx.rng.integer_in_range(0, 1);
        let (x, facing) = if side == 0 {
            (0.0, Facing::Right)
        } else {
            (ctx.options.game_width, Facing::Left)
        };
        let kind = HazardKind::Arrow;
        let position = Vec2::new(x, floor_y - kind.floor_offset());
        let id = ctx.world.place(EntityKind::Hazard(kind), position);
        if let Some(arrow) = ctx.world.get_mut(id) {
            arrow.facing = facing;
        }
        report.hazards.push(PlacedHazard { kind, id });
    }

    fn place_patroller(
        &mut self,
        ctx: &mut GenContext<'_>,
        kind: HazardKind,
        floor_y: f32,
        report: &mut FloorReport,
    ) {
        let margin = ctx.options.edge_margin;
        let x = ctx
            .rng
            .integer_in_range(margin, ctx.options.game_width as i32 - margin) as f32;
        let position = Vec2::new(x, floor_y - kind.floor_offset());
        let id = ctx.world.place(EntityKind::Hazard(kind), position);
        if let Some(monster) = ctx.world.get_mut(id) {
            monster.facing = Facing::Left;
            monster.velocity = Vec2::new(-ctx.options.monster_speed, 0.0);
        }
        report.hazards.push(PlacedHazard { kind, id });
    }
}
