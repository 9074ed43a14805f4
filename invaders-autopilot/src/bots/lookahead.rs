//! Exhaustive short-horizon planner.
//!
//! Thin wrapper over the core lookahead search: every decision replays the
//! engine's own transition rules across all reachable futures until the
//! pending hazards resolve, then commits to the first action of the
//! best-scoring branch.

use crate::bots::Strategy;
use invaders_core::sim::search::{plan_action, SearchLimits};
use invaders_core::sim::{GameStatus, WorldSnapshot};
use invaders_core::tape::Action;

pub struct LookaheadStrategy {
    limits: SearchLimits,
}

impl LookaheadStrategy {
    pub fn new() -> Self {
        Self::with_limits(SearchLimits::default())
    }

    pub fn with_limits(limits: SearchLimits) -> Self {
        Self { limits }
    }
}

impl Default for LookaheadStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for LookaheadStrategy {
    fn id(&self) -> &'static str {
        "lookahead"
    }

    fn description(&self) -> &'static str {
        "Exhaustive hazard-horizon search; plays the best-scoring branch"
    }

    fn reset(&mut self, _seed: u32) {}

    fn next_action(&mut self, world: &WorldSnapshot) -> Action {
        if world.status != GameStatus::Active {
            return Action::Hold;
        }
        plan_action(world, &self.limits).action
    }
}
