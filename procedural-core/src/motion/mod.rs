//! Kinematics of moving hazards.
//!
//! Patrollers walk at constant speed and bounce off the world's side bounds.
//! Launched projectiles fly straight until they are recycled.

use crate::world::{Entity, Facing, LaunchState};

/// Side of the world a patroller bounced off during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bounce {
    Left,
    Right,
}

/// Advance a patrolling hazard by `dt` seconds inside `[0, world_width]`
pub fn step_patroller(
    entity: &mut Entity,
    dt: f32,
    world_width: f32,
    speed: f32,
) -> Option<Bounce> {
    entity.position.x += entity.velocity.x * dt;
    let half_width = entity.kind.half_width();

    if entity.position.x - half_width <= 0.0 && entity.velocity.x < 0.0 {
        entity.position.x = half_width;
        entity.velocity.x = speed;
        entity.facing = Facing::Right;
        return Some(Bounce::Left);
    }
    if entity.position.x + half_width >= world_width && entity.velocity.x > 0.0 {
        entity.position.x = world_width - half_width;
        entity.velocity.x = -speed;
        entity.facing = Facing::Left;
        return Some(Bounce::Right);
    }
    None
}

pub fn step_projectile(entity: &mut Entity, dt: f32) {
    if entity.launch == LaunchState::Launched {
        entity.position.x += entity.velocity.x * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{EntityKind, EntityStore, HazardKind, Vec2};

    fn spawn(kind: HazardKind, x: f32, vx: f32) -> Entity {
        let mut store = EntityStore::new();
        let id = store.spawn(EntityKind::Hazard(kind), Vec2::new(x, 300.0), 0);
        let mut entity = store.get(id).unwrap().clone();
        entity.velocity.x = vx;
        entity
    }

    #[test]
    fn test_spiked_monster_flips_at_left_edge() {
        let mut monster = spawn(HazardKind::SpikedMonster, 22.0, -250.0);
        assert_eq!(step_patroller(&mut monster, 0.1, 800.0, 250.0), Some(Bounce::Left));
        assert!(monster.velocity.x > 0.0);
        assert_eq!(monster.facing, Facing::Right);
        assert_eq!(monster.position.y, 300.0);
        assert!(monster.position.x >= 0.0);
    }

    #[test]
    fn test_monster_flips_at_right_edge() {
        let mut monster = spawn(HazardKind::Monster, 790.0, 250.0);
        monster.facing = Facing::Right;
        assert_eq!(step_patroller(&mut monster, 0.016, 800.0, 250.0), Some(Bounce::Right));
        assert_eq!(monster.velocity.x, -250.0);
        assert_eq!(monster.facing, Facing::Left);
        assert_eq!(monster.position.x, 780.0);
    }

    #[test]
    fn test_patroller_walks_freely_inside() {
        let mut monster = spawn(HazardKind::Monster, 400.0, -250.0);
        assert_eq!(step_patroller(&mut monster, 0.1, 800.0, 250.0), None);
        assert_eq!(monster.position.x, 375.0);
        assert_eq!(monster.facing, Facing::Left);
    }

    #[test]
    fn test_idle_projectile_stays_put() {
        let mut arrow = spawn(HazardKind::Arrow, 0.0, 1000.0);
        step_projectile(&mut arrow, 0.5);
        assert_eq!(arrow.position.x, 0.0);
        arrow.launch = LaunchState::Launched;
        step_projectile(&mut arrow, 0.5);
        assert_eq!(arrow.position.x, 500.0);
    }
}
