//! Object pooling for generated entities.
//!
//! Handles are only constructed when a kind's pool is empty, so the number of
//! slots of a kind never exceeds the peak number of simultaneously live
//! entities of that kind.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::world::{Entity, EntityId, EntityKind, EntityStore, Vec2};

/// Something that can be parked in an [`EntityPool`].
pub trait Poolable {
    type Kind: Copy + Eq + Hash + Debug;

    fn kind(&self) -> Self::Kind;
    fn handle(&self) -> EntityId;
    /// Mark dead and clear kind-specific transient state
    fn deactivate(&mut self);
}

impl Poolable for Entity {
    type Kind = EntityKind;

    fn kind(&self) -> EntityKind {
        self.kind
    }

    fn handle(&self) -> EntityId {
        self.id
    }

    fn deactivate(&mut self) {
        self.alive = false;
        self.reset_transient();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Handles constructed because the pool was empty
    pub created: u64,
    /// Handles handed out again from the pool
    pub reused: u64,
    pub released: u64,
}

/// Per-kind LIFO stacks of released handles.
#[derive(Debug, Clone)]
pub struct EntityPool<K> {
    free: HashMap<K, Vec<EntityId>>,
    pooled: HashSet<u32>,
    stats: HashMap<K, PoolStats>,
}

impl<K> Default for EntityPool<K> {
    fn default() -> Self {
        Self {
            free: HashMap::new(),
            pooled: HashSet::new(),
            stats: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash + Debug> EntityPool<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently released handle of `kind`, or `None` when the caller must construct one
    pub fn acquire(&mut self, kind: K) -> Option<EntityId> {
        let id = self.free.get_mut(&kind)?.pop()?;
        self.pooled.remove(&id.index);
        self.stats.entry(kind).or_default().reused += 1;
        Some(id)
    }

    /// Deactivate `item` and park it. Returns `false` if it was already pooled.
    pub fn release<T: Poolable<Kind = K>>(&mut self, item: &mut T) -> bool {
        let id = item.handle();
        if !self.pooled.insert(id.index) {
            return false;
        }
        item.deactivate();
        let kind = item.kind();
        self.free.entry(kind).or_default().push(id);
        self.stats.entry(kind).or_default().released += 1;
        true
    }

    pub fn record_created(&mut self, kind: K) {
        self.stats.entry(kind).or_default().created += 1;
    }

    pub fn is_pooled(&self, id: EntityId) -> bool {
        self.pooled.contains(&id.index)
    }

    pub fn pooled_count(&self, kind: K) -> usize {
        self.free.get(&kind).map_or(0, Vec::len)
    }

    pub fn stats(&self, kind: K) -> PoolStats {
        self.stats.get(&kind).copied().unwrap_or_default()
    }
}

/// Entity storage plus its pool: the "create or recycle" facade generation uses.
#[derive(Debug, Clone, Default)]
pub struct PooledWorld {
    store: EntityStore,
    pool: EntityPool<EntityKind>,
    frame: u64,
}

impl PooledWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame stamped on entities placed from now on
    pub fn set_frame(&mut self, frame: u64) {
        self.frame = frame;
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Reuse a pooled entity of `kind` at `position`, constructing one only if the pool is empty
    pub fn place(&mut self, kind: EntityKind, position: Vec2) -> EntityId {
        if let Some(pooled) = self.pool.acquire(kind) {
            if let Some(id) = self.store.revive(pooled, position, self.frame) {
                return id;
            }
            warn!(?pooled, ?kind, "pooled handle could not be revived");
        }
        self.pool.record_created(kind);
        self.store.spawn(kind, position, self.frame)
    }

    /// Return a live entity to its pool. Stale or already released handles are ignored.
    pub fn release(&mut self, id: EntityId) -> bool {
        match self.store.slot_mut(id) {
            Some(entity) if entity.alive => self.pool.release(entity),
            _ => false,
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.store.get(id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.store.get_mut(id)
    }

    /// Live and old enough to take part in collision callbacks this frame
    pub fn is_collidable(&self, id: EntityId, frame: u64) -> bool {
        self.store
            .get(id)
            .is_some_and(|entity| entity.collidable_from <= frame)
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    pub fn pool(&self) -> &EntityPool<EntityKind> {
        &self.pool
    }
}
