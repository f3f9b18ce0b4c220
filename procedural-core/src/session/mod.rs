//! A play session.
//!
//! [`GameSession`] owns every subsystem of one run: the pooled world, the floor
//! generator and level builder, the scroll coordinator, timers, the hero and
//! the save record. The host drives it with [`GameSession::update`] once per
//! frame, forwards taps to [`GameSession::handle_tap`] and calls the `on_*`
//! collision bodies from its broad-phase. Entities placed during frame N only
//! reach collision bodies from frame N+1.
//!
//! Reaching the bottom of the world persists the run and restarts the session
//! in place with a fresh seed derived from the root seed.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, GameOptions};
use crate::constants::DEATH_DRIFT;
use crate::generation::{FloorGenerator, GenContext, LevelBuilder, PooledWorld};
use crate::motion::{step_patroller, step_projectile};
use crate::player::Hero;
use crate::rng::{RandomSource, SeededRandom};
use crate::save::{load_save, store_save, KeyValueStore, MemoryStore, SaveData};
use crate::schedule::{Scheduler, TimedAction};
use crate::scroll::{reconcile, ScrollCoordinator, ScrollRequest};
use crate::world::{EntityId, EntityKind, HazardKind, LaunchState, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Playing,
    /// Death tumble in progress; only motion and scrolling continue
    GameOver,
}

/// Notifications for audio and UI collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    MenuDismissed,
    Jumped,
    CoinCollected { total: u32 },
    MonsterStomped { at: Vec2 },
    ClimbStarted { ladder: EntityId },
    ScrollQueued { pending: u32 },
    FloorReached { floors: u32 },
    FloorGenerated { floor_y: f32, hazards: usize },
    Hurt { by: HazardKind },
    SessionEnded { score: u32, coins: u32 },
    SessionRestarted { run: u64 },
}

/// Which side of a hazard the hero touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contact {
    /// Hero's feet on the hazard's top
    pub from_above: bool,
}

/// Numbers shown by the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hud {
    pub score: u32,
    pub best_score: u32,
    pub saved_coins: u64,
    pub collected_coins: u32,
}

pub struct GameSession {
    options: GameOptions,
    rng: Box<dyn RandomSource>,
    store: Box<dyn KeyValueStore>,
    world: PooledWorld,
    generator: FloorGenerator,
    level: LevelBuilder,
    scroll: ScrollCoordinator,
    scheduler: Scheduler,
    hero: Hero,
    phase: SessionPhase,
    saved: SaveData,
    frame: u64,
    run: u64,
    menu_visible: bool,
    events: Vec<GameEvent>,
    pending_options: Option<GameOptions>,
}

impl GameSession {
    /// Validated session seeded from `options.seed`
    pub fn new(options: GameOptions, store: Box<dyn KeyValueStore>) -> Result<Self, ConfigError> {
        options.validate()?;
        let rng = Box::new(SeededRandom::for_run(options.seed, 0));
        Ok(Self::build(options, store, rng, 0))
    }

    /// Session whose first run draws from `rng`; restarts reseed from `options.seed`
    pub fn with_random(
        options: GameOptions,
        store: Box<dyn KeyValueStore>,
        rng: Box<dyn RandomSource>,
    ) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self::build(options, store, rng, 0))
    }

    fn build(
        options: GameOptions,
        store: Box<dyn KeyValueStore>,
        mut rng: Box<dyn RandomSource>,
        run: u64,
    ) -> Self {
        let saved = load_save(store.as_ref(), &options.skin.storage_key);
        let mut world = PooledWorld::new();
        let mut generator = FloorGenerator::new(options.safe_radius());
        let mut level = LevelBuilder::new();
        {
            let mut ctx = GenContext {
                world: &mut world,
                rng: rng.as_mut(),
                options: &options,
            };
            level.build_initial(&mut generator, &mut ctx);
        }
        let hero = Hero::spawn(&options);
        let scroll = ScrollCoordinator::new(options.scroll_duration_secs(), options.floor_gap);
        info!(
            run,
            skin = %options.skin.name,
            companion = %options.skin.companion_name,
            best = saved.score,
            coins = saved.coins,
            "session started"
        );
        Self {
            options,
            rng,
            store,
            world,
            generator,
            level,
            scroll,
            scheduler: Scheduler::new(),
            hero,
            phase: SessionPhase::Playing,
            saved,
            frame: 0,
            run,
            menu_visible: true,
            events: Vec::new(),
            pending_options: None,
        }
    }

    /// Advance the session by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        self.frame += 1;
        self.world.set_frame(self.frame);

        if self.phase == SessionPhase::Playing {
            self.arm_launchers();
            for action in self.scheduler.advance(dt) {
                self.run_timed(action);
            }
        }

        self.hero.integrate(dt, self.options.player_gravity);
        self.hero
            .bounce_off_walls(self.options.game_width, self.options.player_speed);
        if self.phase == SessionPhase::Playing
            && self
                .hero
                .finish_climb_if_clear(self.options.climb_clearance, self.options.player_speed)
        {
            debug!(floors = self.hero.floors_reached, "floor reached");
            self.events.push(GameEvent::FloorReached {
                floors: self.hero.floors_reached,
            });
        }

        self.step_hazards(dt);

        if self.scroll.advance(dt) {
            self.complete_scroll();
        }

        if self.hero.bottom() >= self.options.world_bottom() {
            self.end_run();
        }
    }

    fn arm_launchers(&mut self) {
        let hero_y = self.hero.position.y;
        let trigger = self.options.launch_trigger_distance;
        let armed: Vec<EntityId> = self
            .world
            .store()
            .live()
            .filter(|entity| {
                entity.is_hazard(HazardKind::Arrow)
                    && entity.launch == LaunchState::Idle
                    && (entity.position.y - hero_y).abs() < trigger
            })
            .map(|entity| entity.id)
            .collect();

        let (min, max) = self.options.launch_delay_ms;
        for id in armed {
            let delay = self.rng.integer_in_range(min, max);
            self.scheduler
                .schedule_after(f64::from(delay), TimedAction::LaunchProjectile(id));
            if let Some(arrow) = self.world.get_mut(id) {
                arrow.launch = LaunchState::Armed;
            }
            debug!(?id, delay, "launcher armed");
        }
    }

    fn run_timed(&mut self, action: TimedAction) {
        match action {
            TimedAction::LaunchProjectile(id) => {
                let speed = self.options.arrow_speed;
                match self.world.get_mut(id) {
                    Some(arrow) if arrow.launch == LaunchState::Armed => {
                        arrow.velocity = Vec2::new(speed * arrow.facing.sign(), 0.0);
                        arrow.launch = LaunchState::Launched;
                    }
                    _ => warn!(?id, "launch timer fired for a recycled launcher"),
                }
            }
        }
    }

    fn step_hazards(&mut self, dt: f32) {
        let width = self.options.game_width;
        let speed = self.options.monster_speed;
        for entity in self.world.store_mut().live_mut() {
            match entity.kind {
                EntityKind::Hazard(kind) if kind.is_patrolling() => {
                    step_patroller(entity, dt, width, speed);
                }
                EntityKind::Hazard(HazardKind::Arrow) => step_projectile(entity, dt),
                _ => {}
            }
        }
    }

    fn complete_scroll(&mut self) {
        let gap = self.options.floor_gap;
        reconcile(
            &mut self.world,
            &mut self.scheduler,
            gap,
            self.options.world_bottom(),
        );
        self.hero.shift_down(gap);
        self.level.shift_down(gap);
        let report = {
            let mut ctx = GenContext {
                world: &mut self.world,
                rng: self.rng.as_mut(),
                options: &self.options,
            };
            self.level.generate_next(&mut self.generator, &mut ctx)
        };
        self.events.push(GameEvent::FloorGenerated {
            floor_y: report.floor_y,
            hazards: report.hazards.len(),
        });
        self.scroll.settle();
    }

    fn end_run(&mut self) {
        let score = self.hero.floors_reached;
        let coins = self.hero.coins_collected;
        let record = self.saved.merged_with_run(score, coins);
        if let Err(err) = store_save(self.store.as_mut(), &self.options.skin.storage_key, &record) {
            warn!(%err, "could not persist run");
        }
        info!(run = self.run, score, coins, best = record.score, "run ended");
        self.events.push(GameEvent::SessionEnded { score, coins });
        self.restart();
    }

    /// Throw the current run away and start the next one
    pub fn restart(&mut self) {
        let options = self
            .pending_options
            .take()
            .unwrap_or_else(|| self.options.clone());
        let run = self.run + 1;
        let rng = Box::new(SeededRandom::for_run(options.seed, run));
        let store = std::mem::replace(&mut self.store, Box::new(MemoryStore::new()));
        let mut events = std::mem::take(&mut self.events);
        *self = Self::build(options, store, rng, run);
        events.push(GameEvent::SessionRestarted { run });
        self.events = events;
    }

    /// Options used from the next restart on
    pub fn queue_options(&mut self, options: GameOptions) -> Result<(), ConfigError> {
        options.validate()?;
        self.pending_options = Some(options);
        Ok(())
    }

    pub fn handle_tap(&mut self) {
        if self.menu_visible {
            self.menu_visible = false;
            self.events.push(GameEvent::MenuDismissed);
        }
        if self.phase == SessionPhase::Playing && self.hero.try_jump(self.options.player_jump) {
            self.events.push(GameEvent::Jumped);
        }
    }

    fn accepts_contact(&self, id: EntityId) -> bool {
        self.phase == SessionPhase::Playing && self.world.is_collidable(id, self.frame)
    }

    /// The hero is standing on `floor`
    pub fn on_floor_contact(&mut self, floor: EntityId) -> bool {
        if !self.accepts_contact(floor) {
            return false;
        }
        self.hero.can_jump = true;
        true
    }

    /// The hero overlaps `ladder`; grabs it when close enough to its centre
    pub fn on_ladder_overlap(&mut self, ladder: EntityId) -> bool {
        if self.hero.is_climbing() || !self.accepts_contact(ladder) {
            return false;
        }
        let Some(position) = self.world.get(ladder).map(|entity| entity.position) else {
            return false;
        };
        if (self.hero.position.x - position.x).abs() >= self.options.climb_snap_distance {
            return false;
        }
        self.hero
            .start_climb(ladder, position.y, self.options.climb_speed);
        self.events.push(GameEvent::ClimbStarted { ladder });
        match self.scroll.request() {
            ScrollRequest::Started => debug!("scroll started"),
            ScrollRequest::Queued { pending } => {
                debug!(pending, "scroll queued");
                self.events.push(GameEvent::ScrollQueued { pending });
            }
        }
        true
    }

    pub fn on_coin_overlap(&mut self, coin: EntityId) -> bool {
        if !self.accepts_contact(coin) {
            return false;
        }
        self.release(coin);
        self.hero.coins_collected += 1;
        self.events.push(GameEvent::CoinCollected {
            total: self.hero.coins_collected,
        });
        true
    }

    /// Touching a monster from above stomps it into a coin; any other hazard contact is lethal
    pub fn on_hazard_contact(&mut self, hazard: EntityId, contact: Contact) -> bool {
        if !self.accepts_contact(hazard) {
            return false;
        }
        let Some((kind, position)) = self
            .world
            .get(hazard)
            .and_then(|entity| entity.kind.hazard().map(|kind| (kind, entity.position)))
        else {
            return false;
        };
        match kind {
            HazardKind::Arrow => self.on_projectile_overlap(hazard),
            HazardKind::Monster if contact.from_above => {
                self.hero.bounce(self.options.player_jump);
                let mut ctx = GenContext {
                    world: &mut self.world,
                    rng: self.rng.as_mut(),
                    options: &self.options,
                };
                self.generator.place_coin(&mut ctx, position.y, Some(position));
                self.release(hazard);
                self.events.push(GameEvent::MonsterStomped { at: position });
                true
            }
            _ => {
                self.game_over(kind);
                true
            }
        }
    }

    /// Launchers are only lethal once launched
    pub fn on_projectile_overlap(&mut self, arrow: EntityId) -> bool {
        if !self.accepts_contact(arrow) {
            return false;
        }
        let launched = self
            .world
            .get(arrow)
            .is_some_and(|entity| entity.launch == LaunchState::Launched);
        if launched {
            self.game_over(HazardKind::Arrow);
        }
        launched
    }

    fn game_over(&mut self, by: HazardKind) {
        self.phase = SessionPhase::GameOver;
        let drift = self.rng.integer_in_range(-DEATH_DRIFT, DEATH_DRIFT);
        self.hero.knock_out(drift as f32, self.options.player_jump);
        info!(
            by = self.options.skin.hazard_name(by),
            floors = self.hero.floors_reached,
            "game over"
        );
        self.events.push(GameEvent::Hurt { by });
    }

    fn release(&mut self, id: EntityId) {
        self.scheduler.cancel_for(id);
        self.world.release(id);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn hud(&self) -> Hud {
        Hud {
            score: self.hero.floors_reached,
            best_score: self.saved.score,
            saved_coins: self.saved.coins,
            collected_coins: self.hero.coins_collected,
        }
    }

    pub fn options(&self) -> &GameOptions {
        &self.options
    }

    pub fn world(&self) -> &PooledWorld {
        &self.world
    }

    pub fn hero(&self) -> &Hero {
        &self.hero
    }

    /// Direct access for the physics collaborator's collision resolution
    pub fn hero_mut(&mut self) -> &mut Hero {
        &mut self.hero
    }

    pub fn scroll(&self) -> &ScrollCoordinator {
        &self.scroll
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn level(&self) -> &LevelBuilder {
        &self.level
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn run(&self) -> u64 {
        self.run
    }

    pub fn saved(&self) -> SaveData {
        self.saved
    }

    pub fn menu_visible(&self) -> bool {
        self.menu_visible
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRandom;
    use crate::save::decode_save;

    fn options_800() -> GameOptions {
        GameOptions {
            game_height: 800.0,
            ..Default::default()
        }
    }

    fn session() -> GameSession {
        GameSession::new(options_800(), Box::new(MemoryStore::new())).unwrap()
    }

    fn scripted(options: GameOptions, draws: impl IntoIterator<Item = i32>) -> GameSession {
        GameSession::with_random(
            options,
            Box::new(MemoryStore::new()),
            Box::new(ScriptedRandom::new(draws)),
        )
        .unwrap()
    }

    fn first_live(session: &GameSession, kind: EntityKind) -> Option<EntityId> {
        session
            .world()
            .store()
            .live()
            .find(|entity| entity.kind == kind)
            .map(|entity| entity.id)
    }

    /// Put the hero on the ladder of the floor above the one it stands on
    fn climb_nearest_ladder(session: &mut GameSession) -> EntityId {
        let hero_bottom = session.hero().bottom();
        let ladder = session
            .world()
            .store()
            .live()
            .filter(|entity| entity.kind == EntityKind::Ladder)
            .filter(|entity| entity.position.y < hero_bottom)
            .max_by(|a, b| a.position.y.total_cmp(&b.position.y))
            .map(|entity| (entity.id, entity.position.x))
            .unwrap();
        session.hero_mut().position.x = ladder.1;
        assert!(session.on_ladder_overlap(ladder.0));
        ladder.0
    }

    #[test]
    fn test_new_session_builds_four_floors() {
        let session = session();
        assert_eq!(session.world().store().live_count_of(EntityKind::Floor), 4);
        assert_eq!(session.world().store().live_count_of(EntityKind::Ladder), 3);
        assert_eq!(session.level().highest_floor_y(), -250.0);
        assert_eq!(session.hero().bottom(), 500.0);
        assert!(session.menu_visible());
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = GameOptions {
            floor_gap: -1.0,
            ..Default::default()
        };
        assert!(GameSession::new(options, Box::new(MemoryStore::new())).is_err());
    }

    #[test]
    fn test_entities_collide_from_next_frame() {
        // ladder, coin at 300, one monster slot at 600 on every floor
        let draws = std::iter::repeat([400, 1, 300, 1, 3, 600]).take(3).flatten();
        let mut session = scripted(options_800(), draws);
        let coin = first_live(&session, EntityKind::Coin).unwrap();
        // built before frame 1
        assert!(!session.on_coin_overlap(coin));
        session.update(0.0);
        assert!(session.on_coin_overlap(coin));
        assert_eq!(session.hud().collected_coins, 1);
        assert!(!session.on_coin_overlap(coin), "coin is gone");
    }

    #[test]
    fn test_tap_dismisses_menu_then_jumps() {
        let mut session = session();
        session.update(0.0);
        let floor = first_live(&session, EntityKind::Floor).unwrap();
        assert!(session.on_floor_contact(floor));
        session.handle_tap();
        assert_eq!(
            session.drain_events(),
            vec![GameEvent::MenuDismissed, GameEvent::Jumped]
        );
        assert!(!session.menu_visible());
    }

    #[test]
    fn test_two_quick_climbs_reconcile_twice() {
        // climbs never finish, so the hero cannot fall out of the world
        let options = GameOptions {
            climb_clearance: 10_000.0,
            ..options_800()
        };
        let mut session = GameSession::new(options, Box::new(MemoryStore::new())).unwrap();
        session.update(0.0);

        climb_nearest_ladder(&mut session);
        assert!(session.scroll().is_scrolling());
        session.update(0.1);

        // hop onto the next floor and grab its ladder while the first scroll runs
        session.hero_mut().climb = None;
        session.hero_mut().land(250.0);
        let second = climb_nearest_ladder(&mut session);
        assert_eq!(session.world().get(second).unwrap().position.y, 0.0);
        assert_eq!(session.scroll().pending(), 1);

        let mut generated = 0;
        for _ in 0..40 {
            session.update(0.05);
            generated += session
                .drain_events()
                .iter()
                .filter(|event| matches!(event, GameEvent::FloorGenerated { .. }))
                .count();
            if !session.scroll().is_scrolling() {
                break;
            }
        }
        assert_eq!(generated, 2);
        assert_eq!(session.scroll().completed(), 2);
        assert_eq!(session.scroll().pending(), 0);
        assert!(!session.scroll().is_scrolling());
        assert_eq!(session.level().highest_floor_y(), -250.0);
        // the start floor left the world on the second reconciliation and was reused
        assert_eq!(session.world().store().live_count_of(EntityKind::Floor), 5);
        let stats = session.world().pool().stats(EntityKind::Floor);
        assert_eq!(stats.created, 5);
        assert_eq!(stats.reused, 1);
    }

    #[test]
    fn test_stale_launch_timer_is_ignored() {
        let options = GameOptions {
            launch_delay_ms: (500, 500),
            ..options_800()
        };
        // ladder, no coin, one slot, arrow on the left for every floor
        let draws = std::iter::repeat([400, 0, 1, 2, 0]).take(3).flatten();
        let mut session = scripted(options, draws);
        let arrow = first_live(&session, EntityKind::Hazard(HazardKind::Arrow)).unwrap();
        let arrow_y = session.world().get(arrow).unwrap().position.y;
        session.hero_mut().position.y = arrow_y;
        session.hero_mut().gravity_enabled = false;
        session.hero_mut().velocity = Vec2::ZERO;
        session.update(0.0);
        assert_eq!(session.world().get(arrow).unwrap().launch, LaunchState::Armed);
        assert_eq!(session.scheduler().pending(), 1);

        session.release(arrow);
        assert_eq!(session.scheduler().pending(), 0);
        let reused = session
            .world
            .place(EntityKind::Hazard(HazardKind::Arrow), Vec2::new(0.0, -600.0));
        assert_eq!(reused.index, arrow.index);

        session.update(1.0);
        assert!(session.world().get(arrow).is_none());
        let fresh = session.world().get(reused).unwrap();
        assert_eq!(fresh.launch, LaunchState::Idle);
        assert_eq!(fresh.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_armed_launcher_fires_outward() {
        let options = GameOptions {
            launch_delay_ms: (500, 500),
            ..options_800()
        };
        let draws = std::iter::repeat([400, 0, 1, 2, 1]).take(3).flatten();
        let mut session = scripted(options, draws);
        let arrow = first_live(&session, EntityKind::Hazard(HazardKind::Arrow)).unwrap();
        let arrow_y = session.world().get(arrow).unwrap().position.y;
        {
            let hero = session.hero_mut();
            hero.position.y = arrow_y + 5.0;
            hero.gravity_enabled = false;
            hero.velocity = Vec2::ZERO;
        }
        session.update(0.0);
        assert!(!session.on_projectile_overlap(arrow), "inert before launch");
        session.update(0.6);
        let launched = session.world().get(arrow).unwrap();
        assert_eq!(launched.launch, LaunchState::Launched);
        assert_eq!(launched.velocity.x, -1000.0);
        assert!(session.on_projectile_overlap(arrow));
        assert_eq!(session.phase(), SessionPhase::GameOver);
    }

    #[test]
    fn test_game_over_freezes_launchers() {
        let options = GameOptions {
            launch_delay_ms: (500, 500),
            ..options_800()
        };
        let draws = std::iter::repeat([400, 0, 1, 2, 1]).take(3).flatten();
        let mut session = scripted(options, draws);
        let mut arrows: Vec<(EntityId, f32)> = session
            .world()
            .store()
            .live()
            .filter(|entity| entity.is_hazard(HazardKind::Arrow))
            .map(|entity| (entity.id, entity.position.y))
            .collect();
        arrows.sort_by(|a, b| b.1.total_cmp(&a.1));
        let (armed, armed_y) = arrows[0];
        let (idle, idle_y) = arrows[arrows.len() - 1];
        assert!(armed_y - idle_y > session.options().launch_trigger_distance);

        {
            let hero = session.hero_mut();
            hero.position.y = armed_y + 5.0;
            hero.gravity_enabled = false;
            hero.velocity = Vec2::ZERO;
        }
        session.update(0.0);
        assert_eq!(session.world().get(armed).unwrap().launch, LaunchState::Armed);

        session.game_over(HazardKind::Spike);
        {
            // hold the tumbling hero beside the idle launcher
            let hero = session.hero_mut();
            hero.position.y = idle_y + 5.0;
            hero.gravity_enabled = false;
            hero.velocity = Vec2::ZERO;
        }
        for _ in 0..10 {
            session.update(0.2);
        }
        assert_eq!(session.phase(), SessionPhase::GameOver);
        assert_eq!(session.run(), 0);
        let still_armed = session.world().get(armed).unwrap();
        assert_eq!(still_armed.launch, LaunchState::Armed);
        assert_eq!(still_armed.velocity, Vec2::ZERO);
        assert_eq!(session.world().get(idle).unwrap().launch, LaunchState::Idle);
        assert_eq!(session.scheduler().pending(), 1);
    }

    #[test]
    fn test_stomp_turns_monster_into_coin() {
        // ladder, no coin, one slot, monster at 300 on every floor
        let draws = std::iter::repeat([400, 0, 1, 3, 300]).take(3).flatten();
        let mut session = scripted(options_800(), draws);
        session.update(0.0);
        let monster = first_live(&session, EntityKind::Hazard(HazardKind::Monster)).unwrap();
        let at = session.world().get(monster).unwrap().position;

        assert!(session.on_hazard_contact(monster, Contact { from_above: true }));
        assert!(session.world().get(monster).is_none());
        assert_eq!(session.hero().velocity.y, -1800.0);
        let coin = first_live(&session, EntityKind::Coin).unwrap();
        assert_eq!(session.world().get(coin).unwrap().position, at);
        assert_eq!(session.phase(), SessionPhase::Playing);
        assert!(session
            .drain_events()
            .contains(&GameEvent::MonsterStomped { at }));
    }

    #[test]
    fn test_side_contact_is_lethal_and_run_persists() {
        let store = MemoryStore::with_entry("PokeClimb", r#"{"score":3,"coins":10}"#);
        // ladder, no coin, a single spike at 640 on every floor
        let draws = std::iter::repeat([400, 0, 1, 0, 1, 640]).take(3).flatten();
        let mut session = GameSession::with_random(
            options_800(),
            Box::new(store),
            Box::new(ScriptedRandom::new(draws)),
        )
        .unwrap();
        assert_eq!(session.hud().best_score, 3);
        session.update(0.0);
        session.hero_mut().coins_collected = 2;

        let hazard = first_live(&session, EntityKind::Hazard(HazardKind::Spike)).unwrap();
        assert!(session.on_hazard_contact(hazard, Contact::default()));
        assert_eq!(session.phase(), SessionPhase::GameOver);
        assert!(!session.on_floor_contact(first_live(&session, EntityKind::Floor).unwrap()));

        for _ in 0..200 {
            session.update(1.0 / 60.0);
            if session.run() == 1 {
                break;
            }
        }
        assert_eq!(session.run(), 1);
        assert_eq!(session.phase(), SessionPhase::Playing);
        let events = session.drain_events();
        assert!(events.contains(&GameEvent::SessionEnded { score: 0, coins: 2 }));
        assert!(events.contains(&GameEvent::SessionRestarted { run: 1 }));

        let raw = session.store().read("PokeClimb").unwrap().unwrap();
        let saved = decode_save(&raw).unwrap();
        assert_eq!(saved.score, 3);
        assert_eq!(saved.coins, 12);
        assert_eq!(session.hud().saved_coins, 12);
    }

    #[test]
    fn test_queued_options_apply_on_restart() {
        let mut session = session();
        let mut next = options_800();
        next.coin_ratio = 7;
        session.queue_options(next).unwrap();
        assert_eq!(session.options().coin_ratio, 2);
        session.restart();
        assert_eq!(session.options().coin_ratio, 7);
        assert_eq!(session.run(), 1);

        let bad = GameOptions {
            scroll_duration_ms: 0,
            ..Default::default()
        };
        assert!(session.queue_options(bad).is_err());
    }
}
