//! Level building: the initial tower and one new floor per scroll.

use tracing::info;

use super::floor_gen::{FloorGenerator, FloorReport, GenContext};
use crate::logging::TimingSpan;

/// Tracks the vertical coordinate of the highest floor placed so far.
#[derive(Debug, Clone, Default)]
pub struct LevelBuilder {
    highest_floor_y: f32,
    floors_generated: u64,
}

impl LevelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate from the start floor upward until two gaps above the top of the world.
    ///
    /// The first floor is the bare start floor. On return the running coordinate
    /// names the highest placed floor.
    pub fn build_initial(
        &mut self,
        generator: &mut FloorGenerator,
        ctx: &mut GenContext<'_>,
    ) -> Vec<FloorReport> {
        let _timing = TimingSpan::new("level_build");
        let gap = ctx.options.floor_gap;
        let mut y = ctx.options.start_floor_y();
        let mut reports = Vec::new();
        while y > -2.0 * gap {
            let content = !reports.is_empty();
            reports.push(generator.populate(ctx, y, content));
            y -= gap;
        }
        self.highest_floor_y = y + gap;
        self.floors_generated += reports.len() as u64;
        info!(
            floors = reports.len(),
            highest_floor_y = self.highest_floor_y,
            "initial level built"
        );
        reports
    }

    /// Follow the world content down by one gap after a scroll settled
    pub fn shift_down(&mut self, gap: f32) {
        self.highest_floor_y += gap;
    }

    /// Generate the floor revealed above the current highest one
    pub fn generate_next(
        &mut self,
        generator: &mut FloorGenerator,
        ctx: &mut GenContext<'_>,
    ) -> FloorReport {
        let y = self.highest_floor_y - ctx.options.floor_gap;
        let report = generator.populate(ctx, y, true);
        self.highest_floor_y = y;
        self.floors_generated += 1;
        report
    }

    pub fn highest_floor_y(&self) -> f32 {
        self.highest_floor_y
    }

    pub fn floors_generated(&self) -> u64 {
        self.floors_generated
    }
}
