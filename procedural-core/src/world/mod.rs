//! Entities of the climber world.
//!
//! Every sprite the generator places is an [`Entity`] slot in the
//! [`EntityStore`]. Slots are never destroyed: a removed entity goes back to
//! its kind's pool and is revived later under a bumped generation, so handles
//! held by timers or by the hero go stale instead of pointing at the new
//! incarnation.

use serde::{Deserialize, Serialize};

use crate::constants::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box in world pixels, `min` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_anchor(position: Vec2, size: (f32, f32), anchor: (f32, f32)) -> Self {
        let min = Vec2::new(position.x - size.0 * anchor.0, position.y - size.1 * anchor.1);
        Self {
            min,
            max: Vec2::new(min.x + size.0, min.y + size.1),
        }
    }

    /// Strict overlap, touching edges do not count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Horizontal facing. Walking speed is `speed * facing.sign()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    #[default]
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// The five hazard variants the generator chooses between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardKind {
    /// Stationary rotating hazard
    Spike,
    /// Stationary burning hazard
    Fire,
    /// Edge-mounted projectile launcher
    Arrow,
    /// Patrolling hazard that can be stomped
    Monster,
    /// Patrolling hazard that cannot be stomped
    SpikedMonster,
}

impl HazardKind {
    pub const ALL: [HazardKind; 5] = [
        HazardKind::Spike,
        HazardKind::Fire,
        HazardKind::Arrow,
        HazardKind::Monster,
        HazardKind::SpikedMonster,
    ];

    /// Maps a uniform draw in `[0, 4]` to a kind
    pub fn from_draw(draw: i32) -> Option<Self> {
        usize::try_from(draw)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    pub const fn index(self) -> usize {
        match self {
            HazardKind::Spike => 0,
            HazardKind::Fire => 1,
            HazardKind::Arrow => 2,
            HazardKind::Monster => 3,
            HazardKind::SpikedMonster => 4,
        }
    }

    pub fn is_stationary(self) -> bool {
        matches!(self, HazardKind::Spike | HazardKind::Fire)
    }

    pub fn is_patrolling(self) -> bool {
        matches!(self, HazardKind::Monster | HazardKind::SpikedMonster)
    }

    /// Height of the sprite's anchor above the floor line
    pub fn floor_offset(self) -> f32 {
        match self {
            HazardKind::Spike => 20.0,
            HazardKind::Fire => 58.0,
            HazardKind::Arrow => 20.0,
            HazardKind::Monster => 20.0,
            HazardKind::SpikedMonster => 25.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Floor,
    Ladder,
    /// Decorative sprite sitting at the foot of each ladder
    LadderCompanion,
    Coin,
    Hazard(HazardKind),
}

impl EntityKind {
    const COUNT: usize = 9;

    pub const ALL: [EntityKind; Self::COUNT] = [
        EntityKind::Floor,
        EntityKind::Ladder,
        EntityKind::LadderCompanion,
        EntityKind::Coin,
        EntityKind::Hazard(HazardKind::Spike),
        EntityKind::Hazard(HazardKind::Fire),
        EntityKind::Hazard(HazardKind::Arrow),
        EntityKind::Hazard(HazardKind::Monster),
        EntityKind::Hazard(HazardKind::SpikedMonster),
    ];

    pub const fn index(self) -> usize {
        match self {
            EntityKind::Floor => 0,
            EntityKind::Ladder => 1,
            EntityKind::LadderCompanion => 2,
            EntityKind::Coin => 3,
            EntityKind::Hazard(kind) => 4 + kind.index(),
        }
    }

    pub fn hazard(self) -> Option<HazardKind> {
        match self {
            EntityKind::Hazard(kind) => Some(kind),
            _ => None,
        }
    }

    /// Sprite size and anchor, mirroring how the art is positioned
    fn geometry(self, game_width: f32, floor_gap: f32) -> ((f32, f32), (f32, f32)) {
        match self {
            EntityKind::Floor => ((game_width, FLOOR_THICKNESS), (0.0, 0.0)),
            EntityKind::Ladder => ((LADDER_WIDTH, floor_gap), (0.5, 0.0)),
            EntityKind::LadderCompanion => (COMPANION_SIZE, (0.5, 1.0)),
            EntityKind::Coin => (COIN_SIZE, (0.5, 0.5)),
            EntityKind::Hazard(HazardKind::Spike) => (SPIKE_SIZE, (0.5, 0.0)),
            EntityKind::Hazard(HazardKind::Fire) => (FIRE_SIZE, (0.5, 0.0)),
            EntityKind::Hazard(HazardKind::Arrow) => (ARROW_SIZE, (0.5, 0.5)),
            EntityKind::Hazard(HazardKind::Monster) => (MONSTER_SIZE, (0.5, 0.5)),
            EntityKind::Hazard(HazardKind::SpikedMonster) => (SPIKED_MONSTER_SIZE, (0.5, 0.5)),
        }
    }

    pub fn half_width(self) -> f32 {
        let ((width, _), _) = self.geometry(0.0, 0.0);
        width / 2.0
    }
}

/// Generational handle to an entity slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId {
    pub index: u32,
    pub generation: u32,
}

/// Launch progress of an arrow launcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaunchState {
    #[default]
    Idle,
    /// Launch timer scheduled
    Armed,
    /// Flying and lethal
    Launched,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing: Facing,
    pub alive: bool,
    pub launch: LaunchState,
    /// First frame on which collision callbacks may see this entity
    pub collidable_from: u64,
}

impl Entity {
    fn fresh(id: EntityId, kind: EntityKind, position: Vec2, frame: u64) -> Self {
        Self {
            id,
            kind,
            position,
            velocity: Vec2::ZERO,
            facing: Facing::Left,
            alive: true,
            launch: LaunchState::Idle,
            collidable_from: frame + 1,
        }
    }

    /// Clears kind-specific transient state; used both on release and on revive
    pub fn reset_transient(&mut self) {
        self.velocity = Vec2::ZERO;
        self.facing = Facing::Left;
        self.launch = LaunchState::Idle;
    }

    pub fn is_hazard(&self, kind: HazardKind) -> bool {
        self.kind == EntityKind::Hazard(kind)
    }

    pub fn bounds(&self, game_width: f32, floor_gap: f32) -> Aabb {
        let (size, anchor) = self.kind.geometry(game_width, floor_gap);
        Aabb::from_anchor(self.position, size, anchor)
    }
}

/// Dense slot storage for every entity ever constructed in a session.
#[derive(Debug, Default, Clone)]
pub struct EntityStore {
    slots: Vec<Entity>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a brand-new entity; the only path that grows the store
    pub fn spawn(&mut self, kind: EntityKind, position: Vec2, frame: u64) -> EntityId {
        let id = EntityId {
            index: self.slots.len() as u32,
            generation: 0,
        };
        self.slots.push(Entity::fresh(id, kind, position, frame));
        id
    }

    /// Bring a pooled slot back under a new generation at `position`
    pub fn revive(&mut self, id: EntityId, position: Vec2, frame: u64) -> Option<EntityId> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.alive || slot.id.generation != id.generation {
            return None;
        }
        let revived = EntityId {
            index: id.index,
            generation: id.generation.wrapping_add(1),
        };
        *slot = Entity::fresh(revived, slot.kind, position, frame);
        Some(revived)
    }

    /// Live entity for a handle, `None` if the handle is stale
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots
            .get(id.index as usize)
            .filter(|entity| entity.id == id && entity.alive)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|entity| entity.id == id && entity.alive)
    }

    /// Slot access regardless of liveness, for the pool
    pub(crate) fn slot_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|entity| entity.id == id)
    }

    pub fn live(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().filter(|entity| entity.alive)
    }

    pub fn live_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.slots.iter_mut().filter(|entity| entity.alive)
    }

    pub fn live_ids(&self) -> Vec<EntityId> {
        self.live().map(|entity| entity.id).collect()
    }

    pub fn live_count(&self) -> usize {
        self.live().count()
    }

    pub fn live_count_of(&self, kind: EntityKind) -> usize {
        self.live().filter(|entity| entity.kind == kind).count()
    }

    /// Number of slots ever constructed
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Entity] {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hazard_from_draw() {
        assert_eq!(HazardKind::from_draw(0), Some(HazardKind::Spike));
        assert_eq!(HazardKind::from_draw(4), Some(HazardKind::SpikedMonster));
        assert_eq!(HazardKind::from_draw(5), None);
        assert_eq!(HazardKind::from_draw(-1), None);
    }

    #[test]
    fn test_kind_indices_are_dense() {
        for (i, kind) in EntityKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_facing() {
        assert_eq!(Facing::Left.sign(), -1.0);
        assert_eq!(Facing::Left.flipped(), Facing::Right);
        assert_eq!(Facing::Right.flipped().sign(), -1.0);
    }

    #[test]
    fn test_spawn_and_get() {
        let mut store = EntityStore::new();
        let id = store.spawn(EntityKind::Coin, Vec2::new(10.0, 20.0), 0);
        let coin = store.get(id).unwrap();
        assert_eq!(coin.position, Vec2::new(10.0, 20.0));
        assert_eq!(coin.collidable_from, 1);
        assert_eq!(store.live_count(), 1);
    }

    #[test]
    fn test_revive_bumps_generation() {
        let mut store = EntityStore::new();
        let id = store.spawn(EntityKind::Floor, Vec2::new(0.0, 500.0), 0);
        assert!(store.revive(id, Vec2::ZERO, 1).is_none(), "live slots cannot be revived");

        store.slot_mut(id).unwrap().alive = false;
        let revived = store.revive(id, Vec2::new(0.0, 250.0), 3).unwrap();
        assert_eq!(revived.index, id.index);
        assert_eq!(revived.generation, id.generation + 1);
        assert!(store.get(id).is_none(), "old handle must be stale");
        assert_eq!(store.get(revived).unwrap().position.y, 250.0);
        assert_eq!(store.get(revived).unwrap().collidable_from, 4);
    }

    #[test]
    fn test_bounds_use_anchor() {
        let mut store = EntityStore::new();
        let id = store.spawn(EntityKind::Ladder, Vec2::new(100.0, 250.0), 0);
        let bounds = store.get(id).unwrap().bounds(800.0, 250.0);
        assert_eq!(bounds.min, Vec2::new(80.0, 250.0));
        assert_eq!(bounds.max, Vec2::new(120.0, 500.0));
    }

    #[test]
    fn test_aabb_touching_is_not_overlap() {
        let a = Aabb::from_anchor(Vec2::ZERO, (10.0, 10.0), (0.0, 0.0));
        let b = Aabb::from_anchor(Vec2::new(10.0, 0.0), (10.0, 10.0), (0.0, 0.0));
        let c = Aabb::from_anchor(Vec2::new(9.0, 9.0), (10.0, 10.0), (0.0, 0.0));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
    }
}
