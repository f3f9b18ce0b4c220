//! The hero.
//!
//! Position is the top-centre of the sprite. The hero auto-walks, jumps on tap
//! when standing on a floor, and climbs a ladder with gravity disabled until it
//! clears the ladder top.

use serde::{Deserialize, Serialize};

use crate::config::GameOptions;
use crate::constants::HERO_SIZE;
use crate::world::{Aabb, EntityId, Facing, Vec2};

/// Ladder being climbed and the line the hero must rise above.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Climb {
    pub ladder: EntityId,
    pub top_y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing: Facing,
    pub gravity_enabled: bool,
    pub climb: Option<Climb>,
    pub can_jump: bool,
    pub knocked_out: bool,
    pub floors_reached: u32,
    pub coins_collected: u32,
    previous_position: Vec2,
}

impl Hero {
    /// Standing on the start floor, walking left
    pub fn spawn(options: &GameOptions) -> Self {
        let position = Vec2::new(
            options.game_width / 2.0,
            options.start_floor_y() - HERO_SIZE.1,
        );
        Self {
            position,
            velocity: Vec2::new(-options.player_speed, 0.0),
            facing: Facing::Left,
            gravity_enabled: true,
            climb: None,
            can_jump: false,
            knocked_out: false,
            floors_reached: 0,
            coins_collected: 0,
            previous_position: position,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_anchor(self.position, HERO_SIZE, (0.5, 0.0))
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + HERO_SIZE.1
    }

    /// Bottom edge before the last integration step
    pub fn previous_bottom(&self) -> f32 {
        self.previous_position.y + HERO_SIZE.1
    }

    pub fn is_climbing(&self) -> bool {
        self.climb.is_some()
    }

    /// Semi-implicit Euler step
    pub fn integrate(&mut self, dt: f32, gravity: f32) {
        self.previous_position = self.position;
        if self.gravity_enabled {
            self.velocity.y += gravity * dt;
        }
        self.position.x += self.velocity.x * dt;
        self.position.y += self.velocity.y * dt;
    }

    /// Reverse at the side bounds of the world; `true` if a bounce happened
    pub fn bounce_off_walls(&mut self, world_width: f32, speed: f32) -> bool {
        let half_width = HERO_SIZE.0 / 2.0;
        if self.position.x - half_width <= 0.0 && self.velocity.x < 0.0 {
            self.position.x = half_width;
            self.velocity.x = speed;
            self.facing = Facing::Right;
            return true;
        }
        if self.position.x + half_width >= world_width && self.velocity.x > 0.0 {
            self.position.x = world_width - half_width;
            self.velocity.x = -speed;
            self.facing = Facing::Left;
            return true;
        }
        false
    }

    pub fn try_jump(&mut self, jump: f32) -> bool {
        if !self.can_jump || self.is_climbing() || self.knocked_out {
            return false;
        }
        self.velocity.y = -jump;
        self.can_jump = false;
        true
    }

    /// Rest on the floor line at `floor_y`
    pub fn land(&mut self, floor_y: f32) {
        self.position.y = floor_y - HERO_SIZE.1;
        if self.velocity.y > 0.0 {
            self.velocity.y = 0.0;
        }
        self.can_jump = true;
    }

    pub fn start_climb(&mut self, ladder: EntityId, ladder_top_y: f32, climb_speed: f32) {
        self.velocity = Vec2::new(0.0, -climb_speed);
        self.gravity_enabled = false;
        self.climb = Some(Climb {
            ladder,
            top_y: ladder_top_y,
        });
    }

    /// End the climb once the hero rose `clearance` above the ladder top
    pub fn finish_climb_if_clear(&mut self, clearance: f32, walk_speed: f32) -> bool {
        let Some(climb) = self.climb else {
            return false;
        };
        if self.position.y >= climb.top_y - clearance {
            return false;
        }
        self.gravity_enabled = true;
        self.velocity = Vec2::new(walk_speed * self.facing.sign(), 0.0);
        self.climb = None;
        self.floors_reached += 1;
        true
    }

    /// Upward impulse after stomping a monster
    pub fn bounce(&mut self, jump: f32) {
        self.velocity.y = -jump;
    }

    /// Start the death tumble
    pub fn knock_out(&mut self, drift: f32, jump: f32) {
        self.velocity = Vec2::new(drift, -jump);
        self.gravity_enabled = true;
        self.climb = None;
        self.knocked_out = true;
    }

    /// Follow the world down after a scroll
    pub fn shift_down(&mut self, gap: f32) {
        self.position.y += gap;
        self.previous_position.y += gap;
        if let Some(climb) = &mut self.climb {
            climb.top_y += gap;
        }
    }
}
