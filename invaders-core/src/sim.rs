use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ENEMY_COUNT, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, ENEMY_ROWS, LAY_INTERVAL_TICKS,
    MAX_GRID_HEIGHT, MAX_GRID_WIDTH, MAX_HAZARDS_PER_VOLLEY, MIN_GRID_HEIGHT, MIN_GRID_WIDTH,
    PROJECTILE_SLOWED_SPEED, PROJECTILE_SPEED,
};
use crate::error::{ConfigError, RuleCode};
use crate::grid::{collide, Contact, EntityKind, Grid};
use crate::rng::SeededRng;
use crate::tape::Action;

mod game;
pub mod search;

use game::Game;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Active,
    Won,
    Lost,
}

/// Board geometry and initial enemy population.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub height: i32,
    pub width: i32,
    pub enemy_count: u8,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            height: DEFAULT_GRID_HEIGHT,
            width: DEFAULT_GRID_WIDTH,
            enemy_count: DEFAULT_ENEMY_COUNT,
        }
    }
}

impl GameConfig {
    /// Number of distinct (row, column) slots the enemy band offers.
    pub fn enemy_slot_count(&self) -> u8 {
        (ENEMY_ROWS * self.width).min(i32::from(u8::MAX)) as u8
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.height < MIN_GRID_HEIGHT {
            return Err(ConfigError::HeightTooSmall {
                got: self.height,
                min: MIN_GRID_HEIGHT,
            });
        }
        if self.height > MAX_GRID_HEIGHT {
            return Err(ConfigError::HeightTooLarge {
                got: self.height,
                max: MAX_GRID_HEIGHT,
            });
        }
        if self.width < MIN_GRID_WIDTH {
            return Err(ConfigError::WidthTooSmall {
                got: self.width,
                min: MIN_GRID_WIDTH,
            });
        }
        if self.width > MAX_GRID_WIDTH {
            return Err(ConfigError::WidthTooLarge {
                got: self.width,
                max: MAX_GRID_WIDTH,
            });
        }
        if self.enemy_count == 0 {
            return Err(ConfigError::EnemyCountZero);
        }
        if self.enemy_count > self.enemy_slot_count() {
            return Err(ConfigError::EnemyCountTooLarge {
                got: self.enemy_count,
                max: self.enemy_slot_count(),
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
struct Shooter {
    row: i32,
    col: i32,
    can_fire: bool,
}

#[derive(Clone, Copy, Debug)]
struct Enemy {
    row: i32,
    col: i32,
    alive: bool,
}

#[derive(Clone, Copy, Debug)]
struct Hazard {
    row: i32,
    col: i32,
    alive: bool,
}

#[derive(Clone, Copy, Debug)]
struct Projectile {
    row: i32,
    col: i32,
    alive: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayResult {
    pub status: GameStatus,
    pub tick_count: u32,
    pub final_rng_state: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayViolation {
    pub tick_count: u32,
    pub rule: RuleCode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShooterSnapshot {
    pub row: i32,
    pub col: i32,
    pub can_fire: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemySnapshot {
    pub row: i32,
    pub col: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HazardSnapshot {
    pub row: i32,
    pub col: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProjectileSnapshot {
    pub row: i32,
    pub col: i32,
}

/// Full game state at a tick boundary. Lists contain live entities only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldSnapshot {
    pub tick_index: u32,
    pub height: i32,
    pub width: i32,
    pub enemy_count: u8,
    pub status: GameStatus,
    pub rng_state: u32,
    pub shooter: ShooterSnapshot,
    pub enemies: Vec<EnemySnapshot>,
    pub hazards: Vec<HazardSnapshot>,
    pub projectiles: Vec<ProjectileSnapshot>,
}

impl WorldSnapshot {
    pub fn config(&self) -> GameConfig {
        GameConfig {
            height: self.height,
            width: self.width,
            enemy_count: self.enemy_count,
        }
    }

    /// Row-major matrix in the legacy additive-tag encoding.
    pub fn legacy_cells(&self) -> Vec<i32> {
        let mut grid = Grid::new(self.height, self.width);
        grid.add(self.shooter.row, self.shooter.col, EntityKind::Shooter);
        for enemy in &self.enemies {
            grid.add(enemy.row, enemy.col, EntityKind::Enemy);
        }
        for hazard in &self.hazards {
            grid.add(hazard.row, hazard.col, EntityKind::Hazard);
        }
        for projectile in &self.projectiles {
            grid.add(projectile.row, projectile.col, EntityKind::Projectile);
        }
        grid.legacy_cells()
    }
}

pub struct LiveGame {
    game: Game,
}

/// Replay a recorded action sequence from the initial board.
///
/// `config` must already satisfy [`GameConfig::validate`]; tape parsing and
/// [`LiveGame::new`] are the validation gates.
pub fn replay(config: GameConfig, seed: u32, actions: &[Action]) -> ReplayResult {
    let mut game = Game::new(config, seed);

    for action in actions {
        game.step(*action);
    }

    game.result()
}

/// Replay with the state invariants checked before the first tick and after
/// every tick.
pub fn replay_checked(
    config: GameConfig,
    seed: u32,
    actions: &[Action],
) -> Result<ReplayResult, ReplayViolation> {
    let mut game = Game::new(config, seed);
    game.validate_invariants().map_err(|rule| ReplayViolation {
        tick_count: game.tick_index(),
        rule,
    })?;

    for action in actions {
        game.step(*action);
        game.validate_invariants().map_err(|rule| ReplayViolation {
            tick_count: game.tick_index(),
            rule,
        })?;
    }

    Ok(game.result())
}

impl LiveGame {
    pub fn new(config: GameConfig, seed: u32) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            game: Game::new(config, seed),
        })
    }

    #[inline]
    pub fn step(&mut self, action: Action) {
        self.game.step(action);
    }

    #[inline]
    pub fn status(&self) -> GameStatus {
        self.game.status()
    }

    #[inline]
    pub fn tick_index(&self) -> u32 {
        self.game.tick_index()
    }

    #[inline]
    pub fn snapshot(&self) -> WorldSnapshot {
        self.game.world_snapshot()
    }

    #[inline]
    pub fn result(&self) -> ReplayResult {
        self.game.result()
    }

    #[inline]
    pub fn validate(&self) -> Result<(), RuleCode> {
        self.game.validate_invariants()
    }
}

/// Draw `count` distinct indices from `0..population`, returned in ascending
/// order. Consumes exactly `count` generator steps.
fn sample_distinct(rng: &mut SeededRng, population: usize, count: usize) -> Vec<usize> {
    debug_assert!(count <= population);
    let mut pool: Vec<usize> = (0..population).collect();
    for i in 0..count {
        let j = i + rng.next_int((population - i) as u32) as usize;
        pool.swap(i, j);
    }
    pool.truncate(count);
    pool.sort_unstable();
    pool
}

/// Band slot to (row, column): slots alternate between the two enemy rows,
/// filling columns left to right.
#[inline]
fn enemy_slot_position(slot: i32) -> (i32, i32) {
    (slot % ENEMY_ROWS, slot / ENEMY_ROWS)
}
