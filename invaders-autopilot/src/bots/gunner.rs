//! Deterministic close-and-shoot heuristic.
//!
//! No search: dodge a hazard about to land on the shooter row, otherwise fire
//! when the current column holds more enemies than bullets already heading up
//! it, otherwise walk toward the nearest column where a shot would be backed.

use crate::bots::Strategy;
use invaders_core::sim::{GameStatus, WorldSnapshot};
use invaders_core::tape::Action;

pub struct GunnerStrategy;

impl GunnerStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Strategy for GunnerStrategy {
    fn id(&self) -> &'static str {
        "gunner"
    }

    fn description(&self) -> &'static str {
        "Greedy heuristic: dodge imminent hazards, fire backed shots, close in"
    }

    fn reset(&mut self, _seed: u32) {}

    fn next_action(&mut self, world: &WorldSnapshot) -> Action {
        if world.status != GameStatus::Active {
            return Action::Hold;
        }

        let col = world.shooter.col;

        // A hazard one row above the shooter row lands this tick.
        if hazard_imminent(world, col) {
            if col > 0 && !hazard_imminent(world, col - 1) {
                return Action::MoveLeft;
            }
            if col + 1 < world.width && !hazard_imminent(world, col + 1) {
                return Action::MoveRight;
            }
            return Action::Hold;
        }

        if world.shooter.can_fire && enemies_in(world, col) > projectiles_in(world, col) {
            return Action::Shoot;
        }

        match nearest_demand_column(world, col) {
            Some(target) if target < col && !hazard_imminent(world, col - 1) => Action::MoveLeft,
            Some(target) if target > col && !hazard_imminent(world, col + 1) => Action::MoveRight,
            // On target but recharging, or the path is blocked: wait a tick.
            _ => Action::Hold,
        }
    }
}

fn enemies_in(world: &WorldSnapshot, col: i32) -> usize {
    world.enemies.iter().filter(|e| e.col == col).count()
}

fn projectiles_in(world: &WorldSnapshot, col: i32) -> usize {
    world.projectiles.iter().filter(|p| p.col == col).count()
}

fn hazard_imminent(world: &WorldSnapshot, col: i32) -> bool {
    world
        .hazards
        .iter()
        .any(|h| h.col == col && h.row == world.height - 2)
}

/// Closest column where one more bullet would still be backed by demand.
/// Ties go to the leftmost column.
fn nearest_demand_column(world: &WorldSnapshot, col: i32) -> Option<i32> {
    let mut best: Option<(i32, i32)> = None;
    for c in 0..world.width {
        if enemies_in(world, c) <= projectiles_in(world, c) {
            continue;
        }
        let distance = (c - col).abs();
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((c, distance));
        }
    }
    best.map(|(c, _)| c)
}
