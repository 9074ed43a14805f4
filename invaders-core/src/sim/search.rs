//! Exhaustive lookahead over shooter actions.
//!
//! Depth-first search over `{shoot, left, right}` from a snapshot. Each
//! level first lets hazards fall, so a branch sees the board it would
//! actually face; branches that leave the shooter standing on a hazard are
//! discarded. Enemies never lay during lookahead, which bounds the depth:
//! every level either breaks a hazard or moves all of them one row closer
//! to breaking, and a board with no hazards (or no enemies) is a leaf.

use super::game::Game;
use super::WorldSnapshot;
use crate::constants::{DEFAULT_NODE_BUDGET, SHOT_VALUE_HORIZON, USEFUL_SHOT_WEIGHT};
use crate::tape::Action;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_nodes: u32,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_nodes: DEFAULT_NODE_BUDGET,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchOutcome {
    pub action: Action,
    pub nodes_expanded: u32,
    pub leaves_recorded: u32,
    pub best_score: i32,
}

struct SearchState {
    max_nodes: u32,
    nodes_expanded: u32,
    leaves_recorded: u32,
    best_score: i32,
    best_action: Option<Action>,
}

impl SearchState {
    /// Strictly-better leaves win; on a tie the first one explored keeps
    /// the slot, which prefers shooting over moving at equal value.
    fn record_leaf(&mut self, score: i32, first: Option<Action>) {
        self.leaves_recorded += 1;
        if score > self.best_score {
            self.best_score = score;
            self.best_action = first;
        }
    }
}

const BRANCH_ORDER: [Action; 3] = [Action::Shoot, Action::MoveLeft, Action::MoveRight];

/// Pick the next action for the shooter. Falls back to [`Action::Shoot`]
/// when the root is already a leaf or every branch ends on a hazard.
pub fn plan_action(snapshot: &WorldSnapshot, limits: &SearchLimits) -> SearchOutcome {
    let mut state = SearchState {
        max_nodes: limits.max_nodes.max(1),
        nodes_expanded: 0,
        leaves_recorded: 0,
        best_score: i32::MIN,
        best_action: None,
    };

    explore(Game::from_snapshot(snapshot), 0, 0, None, &mut state);

    SearchOutcome {
        action: state.best_action.unwrap_or(Action::Shoot),
        nodes_expanded: state.nodes_expanded,
        leaves_recorded: state.leaves_recorded,
        best_score: state.best_score,
    }
}

fn explore(mut world: Game, depth: i32, score: i32, first: Option<Action>, state: &mut SearchState) {
    if state.nodes_expanded >= state.max_nodes {
        state.record_leaf(score, first);
        return;
    }
    state.nodes_expanded += 1;

    world.advance_hazards();
    world.prune_destroyed_entities();

    if world.live_enemy_count() == 0 || world.live_hazard_count() == 0 {
        state.record_leaf(score, first);
        return;
    }

    for action in BRANCH_ORDER {
        match action {
            Action::MoveLeft if world.shooter_col() == 0 => continue,
            Action::MoveRight if world.shooter_col() == world.board_width() - 1 => continue,
            _ => {}
        }

        let mut branch = world.clone();
        let mut branch_score = score;

        if action == Action::Shoot {
            let fired = branch.shooter_can_fire();
            branch.apply_shooter_action(Action::Shoot);
            if fired {
                branch_score += shot_score(&branch, depth);
            }
        } else {
            branch.apply_shooter_action(action);
        }

        if branch.shooter_on_hazard() {
            continue;
        }

        branch.advance_projectiles();
        branch.prune_destroyed_entities();
        explore(branch, depth + 1, branch_score, first.or(Some(action)), state);
    }
}

/// Value of a shot just fired from the shooter's column. A shot backed by
/// demand (at least as many enemies as projectiles now in the column) pays
/// more the earlier it is taken; an over-shot column costs.
fn shot_score(world: &Game, depth: i32) -> i32 {
    let col = world.shooter_col();
    let enemies = world.enemies_in_column(col);
    let shots = world.projectiles_in_column(col);
    if enemies >= shots {
        USEFUL_SHOT_WEIGHT * (SHOT_VALUE_HORIZON - depth)
    } else {
        depth - SHOT_VALUE_HORIZON
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{
        EnemySnapshot, GameConfig, GameStatus, HazardSnapshot, LiveGame, ProjectileSnapshot,
        ShooterSnapshot,
    };

    fn snapshot(
        height: i32,
        width: i32,
        shooter: (i32, i32, bool),
        enemies: &[(i32, i32)],
        hazards: &[(i32, i32)],
        projectiles: &[(i32, i32)],
    ) -> WorldSnapshot {
        WorldSnapshot {
            tick_index: 1,
            height,
            width,
            enemy_count: enemies.len().max(1) as u8,
            status: GameStatus::Active,
            rng_state: 0x2468_ACE0,
            shooter: ShooterSnapshot {
                row: shooter.0,
                col: shooter.1,
                can_fire: shooter.2,
            },
            enemies: enemies
                .iter()
                .map(|&(row, col)| EnemySnapshot { row, col })
                .collect(),
            hazards: hazards
                .iter()
                .map(|&(row, col)| HazardSnapshot { row, col })
                .collect(),
            projectiles: projectiles
                .iter()
                .map(|&(row, col)| ProjectileSnapshot { row, col })
                .collect(),
        }
    }

    #[test]
    fn hazard_free_root_shoots_without_branching() {
        let world = snapshot(4, 3, (3, 1, true), &[(0, 0)], &[], &[]);
        let outcome = plan_action(&world, &SearchLimits::default());

        assert_eq!(outcome.action, Action::Shoot);
        assert_eq!(outcome.nodes_expanded, 1);
        assert_eq!(outcome.leaves_recorded, 1);
    }

    #[test]
    fn falling_hazard_forces_a_dodge() {
        // The hazard lands on the shooter's column in two levels; staying
        // put is pruned, and dodging left lines up a shot on the enemy.
        let world = snapshot(4, 3, (3, 1, true), &[(0, 0)], &[(1, 1)], &[]);
        let outcome = plan_action(&world, &SearchLimits::default());

        assert_eq!(outcome.action, Action::MoveLeft);
        assert_eq!(outcome.best_score, USEFUL_SHOT_WEIGHT * (SHOT_VALUE_HORIZON - 1));
    }

    #[test]
    fn shot_scoring_rewards_backed_columns() {
        // Two enemies above, one projectile (the shot itself) in the column.
        let backed = Game::from_snapshot(&snapshot(
            10,
            7,
            (9, 3, false),
            &[(0, 3), (1, 3)],
            &[],
            &[(8, 3)],
        ));
        assert_eq!(shot_score(&backed, 0), USEFUL_SHOT_WEIGHT * SHOT_VALUE_HORIZON);
        assert_eq!(shot_score(&backed, 4), USEFUL_SHOT_WEIGHT * (SHOT_VALUE_HORIZON - 4));

        // One enemy, two projectiles: the column is over-shot.
        let wasted = Game::from_snapshot(&snapshot(
            10,
            7,
            (9, 3, false),
            &[(0, 3)],
            &[],
            &[(8, 3), (6, 3)],
        ));
        assert_eq!(shot_score(&wasted, 0), -SHOT_VALUE_HORIZON);
        assert_eq!(shot_score(&wasted, 3), 3 - SHOT_VALUE_HORIZON);
    }

    #[test]
    fn aligned_backed_shot_is_taken() {
        let world = snapshot(10, 7, (9, 3, true), &[(0, 3), (1, 3)], &[(1, 0)], &[]);
        let outcome = plan_action(&world, &SearchLimits::default());

        assert_eq!(outcome.action, Action::Shoot);
        assert!(outcome.best_score >= USEFUL_SHOT_WEIGHT * SHOT_VALUE_HORIZON);
    }

    #[test]
    fn search_is_deterministic() {
        let world = snapshot(10, 7, (9, 2, true), &[(0, 1), (1, 4)], &[(2, 2), (4, 5)], &[]);
        let a = plan_action(&world, &SearchLimits::default());
        let b = plan_action(&world, &SearchLimits::default());
        assert_eq!(a, b);
    }

    #[test]
    fn every_branch_pruned_falls_back_to_shoot() {
        let world = snapshot(
            5,
            3,
            (4, 1, true),
            &[(0, 0)],
            &[(3, 0), (3, 1), (3, 2)],
            &[],
        );
        let outcome = plan_action(&world, &SearchLimits::default());

        assert_eq!(outcome.action, Action::Shoot);
        assert_eq!(outcome.leaves_recorded, 0);
        assert_eq!(outcome.nodes_expanded, 1);
    }

    #[test]
    fn node_budget_degrades_to_shallow_choice() {
        let world = snapshot(10, 7, (9, 3, true), &[(0, 3), (1, 2)], &[(2, 3), (3, 1)], &[]);
        let outcome = plan_action(&world, &SearchLimits { max_nodes: 1 });

        assert_eq!(outcome.nodes_expanded, 1);
        assert!(outcome.leaves_recorded > 0);
        assert!(BRANCH_ORDER.contains(&outcome.action));
    }

    #[test]
    fn lookahead_terminates_on_a_live_board() {
        let mut live = LiveGame::new(GameConfig::default(), 0xFACE_FEED).expect("valid config");
        live.step(Action::Hold);

        let outcome = plan_action(&live.snapshot(), &SearchLimits::default());
        assert!(outcome.leaves_recorded > 0);
        assert!(outcome.nodes_expanded < DEFAULT_NODE_BUDGET);
    }
}
