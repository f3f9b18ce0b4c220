//! Monte-Carlo generation statistics
//!
//! Simulates many independent climbs of the generator alone (no hero, no
//! physics) to check hazard mix, coin frequency and placement failures for a
//! tuning before it ships, and to verify that recycling keeps the entity
//! store bounded. Runs fan out across CPU cores with rayon; every run gets its
//! own sha3-derived seed so results are reproducible.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::GameOptions;
use crate::generation::{FloorGenerator, FloorReport, GenContext, LevelBuilder, PooledWorld};
use crate::logging::TimingSpan;
use crate::rng::SeededRandom;
use crate::schedule::Scheduler;
use crate::scroll::reconcile;
use crate::world::HazardKind;

/// Configuration for a simulation run
#[derive(Debug, Clone)]
pub struct GenerationSimConfig {
    pub runs: u64,
    /// Floors generated after the initial level, one per simulated scroll
    pub floors_per_run: u32,
    pub base_seed: u64,
    pub options: GameOptions,
}

impl Default for GenerationSimConfig {
    fn default() -> Self {
        Self {
            runs: 1_000,
            floors_per_run: 50,
            base_seed: 42,
            options: GameOptions::default(),
        }
    }
}

/// Counters for a single simulated climb
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTally {
    pub content_floors: u64,
    pub hazards: [u64; 5],
    pub requested_slots: u64,
    pub skipped: u64,
    pub coins: u64,
    /// Stationary hazards found strictly inside a ladder's safe radius
    pub ladder_zone_violations: u64,
    /// Entity slots ever constructed
    pub slots_created: u64,
    pub max_live: u64,
}

impl RunTally {
    fn absorb(&mut self, report: &FloorReport, world: &PooledWorld, radius: f32) {
        if !report.is_content_floor() {
            return;
        }
        self.content_floors += 1;
        self.requested_slots += u64::from(report.requested_slots);
        self.skipped += u64::from(report.skipped);
        self.coins += u64::from(report.coin.is_some());
        for placed in &report.hazards {
            self.hazards[placed.kind.index()] += 1;
            if !placed.kind.is_stationary() {
                continue;
            }
            let (Some(ladder_x), Some(entity)) = (report.ladder_x, world.get(placed.id)) else {
                continue;
            };
            if (entity.position.x - ladder_x).abs() < radius {
                self.ladder_zone_violations += 1;
            }
        }
    }

    fn merge(mut self, other: Self) -> Self {
        self.content_floors += other.content_floors;
        for (total, count) in self.hazards.iter_mut().zip(other.hazards) {
            *total += count;
        }
        self.requested_slots += other.requested_slots;
        self.skipped += other.skipped;
        self.coins += other.coins;
        self.ladder_zone_violations += other.ladder_zone_violations;
        self.slots_created = self.slots_created.max(other.slots_created);
        self.max_live = self.max_live.max(other.max_live);
        self
    }
}

/// Overall assessment of a tuning's generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationGrade {
    Healthy,
    /// More than a quarter of stationary instances could not be placed
    Crowded,
    /// A stationary hazard was placed inside a ladder's safe zone
    Broken,
}

/// Aggregated results of a simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub total_runs: u64,
    pub content_floors: u64,
    pub hazards_by_kind: Vec<(HazardKind, u64)>,
    pub hazards_per_floor: f32,
    /// Skipped stationary instances over all stationary attempts
    pub skip_rate: f32,
    pub coin_rate: f32,
    pub ladder_zone_violations: u64,
    /// Largest entity store any single run needed
    pub max_slots_created: u64,
    pub max_live: u64,
    pub grade: GenerationGrade,
}

/// Climb one seeded tower: initial level plus `floors` scroll cycles
pub fn simulate_run(options: &GameOptions, seed: u64, floors: u32) -> RunTally {
    let mut world = PooledWorld::new();
    let mut scheduler = Scheduler::new();
    let mut rng = SeededRandom::new(seed);
    let mut generator = FloorGenerator::new(options.safe_radius());
    let mut level = LevelBuilder::new();
    let mut tally = RunTally::default();
    let radius = options.safe_radius();

    let initial = {
        let mut ctx = GenContext {
            world: &mut world,
            rng: &mut rng,
            options,
        };
        level.build_initial(&mut generator, &mut ctx)
    };
    for report in &initial {
        tally.absorb(report, &world, radius);
    }

    for frame in 1..=u64::from(floors) {
        world.set_frame(frame);
        reconcile(
            &mut world,
            &mut scheduler,
            options.floor_gap,
            options.world_bottom(),
        );
        level.shift_down(options.floor_gap);
        let report = {
            let mut ctx = GenContext {
                world: &mut world,
                rng: &mut rng,
                options,
            };
            level.generate_next(&mut generator, &mut ctx)
        };
        tally.absorb(&report, &world, radius);
        tally.max_live = tally.max_live.max(world.store().live().count() as u64);
    }

    tally.slots_created = world.store().capacity() as u64;
    tally
}

/// Run the Monte-Carlo simulation with rayon parallelism
pub fn run_generation_simulation(config: &GenerationSimConfig) -> GenerationReport {
    let _timing = TimingSpan::new("generation_simulation");

    let tally = (0..config.runs)
        .into_par_iter()
        .map(|run| {
            let seed = crate::rng::derive_seed(config.base_seed, run);
            simulate_run(&config.options, seed, config.floors_per_run)
        })
        .reduce(RunTally::default, RunTally::merge);

    let report = analyze(&tally, config.runs);
    info!(
        runs = report.total_runs,
        floors = report.content_floors,
        skip_rate = report.skip_rate,
        grade = ?report.grade,
        "generation simulation finished"
    );
    report
}

fn analyze(tally: &RunTally, runs: u64) -> GenerationReport {
    let floors = tally.content_floors.max(1) as f32;
    let placed: u64 = tally.hazards.iter().sum();
    let stationary_placed =
        tally.hazards[HazardKind::Spike.index()] + tally.hazards[HazardKind::Fire.index()];
    let stationary_attempts = stationary_placed + tally.skipped;
    let skip_rate = if stationary_attempts == 0 {
        0.0
    } else {
        tally.skipped as f32 / stationary_attempts as f32
    };

    let grade = if tally.ladder_zone_violations > 0 {
        GenerationGrade::Broken
    } else if skip_rate > 0.25 {
        GenerationGrade::Crowded
    } else {
        GenerationGrade::Healthy
    };

    GenerationReport {
        total_runs: runs,
        content_floors: tally.content_floors,
        hazards_by_kind: HazardKind::ALL
            .iter()
            .map(|kind| (*kind, tally.hazards[kind.index()]))
            .collect(),
        hazards_per_floor: placed as f32 / floors,
        skip_rate,
        coin_rate: tally.coins as f32 / floors,
        ladder_zone_violations: tally.ladder_zone_violations,
        max_slots_created: tally.slots_created,
        max_live: tally.max_live,
        grade,
    }
}
