use crate::bots::{create_strategy, Strategy};
use anyhow::{anyhow, Context, Result};
use invaders_core::error::{ConfigError, VerifyError};
use invaders_core::sim::{GameConfig, GameStatus, LiveGame, WorldSnapshot};
use invaders_core::tape::{serialize_tape, Action};
use invaders_core::verify_tape;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Instant;

/// Call-sequencing and self-check failures of the run controller. All of
/// these abort the offending call without touching recorded state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunnerError {
    RunAlreadyActive,
    RunNotInitialized,
    NoHistoryAvailable,
    ConfigRejected(ConfigError),
    ZeroTickBudget,
    TapeRejected(VerifyError),
}

impl fmt::Display for RunnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunAlreadyActive => {
                write!(f, "initialization already consumed by a run; reinitialize first")
            }
            Self::RunNotInitialized => write!(f, "run controller is not initialized"),
            Self::NoHistoryAvailable => write!(f, "no run has recorded any history yet"),
            Self::ConfigRejected(err) => write!(f, "configuration rejected: {err}"),
            Self::ZeroTickBudget => write!(f, "max_ticks must be > 0"),
            Self::TapeRejected(err) => write!(f, "generated tape failed verification: {err}"),
        }
    }
}

impl std::error::Error for RunnerError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Won,
    Lost,
    Unresolved,
}

impl RunOutcome {
    pub fn from_status(status: GameStatus) -> Self {
        match status {
            GameStatus::Won => Self::Won,
            GameStatus::Lost => Self::Lost,
            GameStatus::Active => Self::Unresolved,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Won => "won",
            Self::Lost => "lost",
            Self::Unresolved => "unresolved",
        }
    }
}

/// One board per tick boundary, in the legacy additive-tag matrix form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub tick: u32,
    pub cells: Vec<i32>,
}

/// On-disk history document: the initial board plus one entry per tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunHistory {
    pub height: i32,
    pub width: i32,
    pub entries: Vec<HistoryEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunMetrics {
    pub strategy_id: String,
    pub seed: u32,
    pub height: i32,
    pub width: i32,
    pub enemy_count: u8,
    pub max_ticks: u32,
    pub tick_count: u32,
    pub outcome: RunOutcome,
    pub final_rng_state: u32,
    pub elapsed_ms: f64,
    pub shots: u32,
    pub moves: u32,
    pub holds: u32,
}

#[derive(Clone, Debug)]
pub struct RunArtifact {
    pub metrics: RunMetrics,
    pub actions: Vec<Action>,
    pub history: Vec<HistoryEntry>,
    pub tape: Vec<u8>,
}

/// Drives one game at a time: `initialize` arms it, `run` consumes the armed
/// game to completion, `reinitialize` re-arms with a fresh seed on the same
/// configuration.
pub struct RunController {
    config: Option<GameConfig>,
    seed: u32,
    game: Option<LiveGame>,
    history: Vec<HistoryEntry>,
    actions: Vec<Action>,
}

impl Default for RunController {
    fn default() -> Self {
        Self::new()
    }
}

impl RunController {
    pub fn new() -> Self {
        Self {
            config: None,
            seed: 0,
            game: None,
            history: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn initialize(&mut self, config: GameConfig, seed: u32) -> Result<(), ConfigError> {
        let game = LiveGame::new(config, seed)?;
        self.config = Some(config);
        self.seed = seed;
        self.game = Some(game);
        self.history.clear();
        self.actions.clear();
        Ok(())
    }

    /// Re-arm with the configuration from the last `initialize`.
    pub fn reinitialize(&mut self, seed: u32) -> Result<(), RunnerError> {
        let config = self.config.ok_or(RunnerError::RunNotInitialized)?;
        self.initialize(config, seed).map_err(RunnerError::ConfigRejected)
    }

    pub fn run(
        &mut self,
        strategy: &mut dyn Strategy,
        max_ticks: u32,
    ) -> Result<RunArtifact, RunnerError> {
        if max_ticks == 0 {
            return Err(RunnerError::ZeroTickBudget);
        }
        let config = self.config.ok_or(RunnerError::RunNotInitialized)?;
        let mut game = self.game.take().ok_or(RunnerError::RunAlreadyActive)?;

        strategy.reset(self.seed);
        self.history.clear();
        self.actions.clear();

        let started = Instant::now();
        let mut snapshot = game.snapshot();
        self.history.push(history_entry(&snapshot));

        while snapshot.status == GameStatus::Active && snapshot.tick_index < max_ticks {
            let action = strategy.next_action(&snapshot);
            self.actions.push(action);
            game.step(action);
            snapshot = game.snapshot();
            self.history.push(history_entry(&snapshot));
        }

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        let result = game.result();
        let tape = serialize_tape(
            config,
            self.seed,
            &self.actions,
            result.status,
            result.final_rng_state,
        );
        verify_tape(&tape, max_ticks.max(result.tick_count).max(1))
            .map_err(RunnerError::TapeRejected)?;

        let mut shots = 0u32;
        let mut moves = 0u32;
        let mut holds = 0u32;
        for action in &self.actions {
            match action {
                Action::Shoot => shots += 1,
                Action::MoveLeft | Action::MoveRight => moves += 1,
                Action::Hold => holds += 1,
            }
        }

        Ok(RunArtifact {
            metrics: RunMetrics {
                strategy_id: strategy.id().to_string(),
                seed: self.seed,
                height: config.height,
                width: config.width,
                enemy_count: config.enemy_count,
                max_ticks,
                tick_count: result.tick_count,
                outcome: RunOutcome::from_status(result.status),
                final_rng_state: result.final_rng_state,
                elapsed_ms,
                shots,
                moves,
                holds,
            },
            actions: self.actions.clone(),
            history: self.history.clone(),
            tape,
        })
    }

    pub fn history(&self) -> Result<&[HistoryEntry], RunnerError> {
        if self.history.is_empty() {
            return Err(RunnerError::NoHistoryAvailable);
        }
        Ok(&self.history)
    }

    pub fn actions(&self) -> Result<&[Action], RunnerError> {
        if self.actions.is_empty() {
            return Err(RunnerError::NoHistoryAvailable);
        }
        Ok(&self.actions)
    }
}

pub fn run_once(
    strategy_id: &str,
    config: GameConfig,
    seed: u32,
    max_ticks: u32,
) -> Result<RunArtifact> {
    let mut strategy =
        create_strategy(strategy_id).ok_or_else(|| anyhow!("unknown strategy '{strategy_id}'"))?;
    let mut controller = RunController::new();
    controller
        .initialize(config, seed)
        .context("invalid game configuration")?;
    let artifact = controller.run(strategy.as_mut(), max_ticks)?;
    Ok(artifact)
}

/// Rebuild the per-tick board history of a recorded run.
pub fn history_from_actions(
    config: GameConfig,
    seed: u32,
    actions: &[Action],
) -> Result<RunHistory, ConfigError> {
    let mut game = LiveGame::new(config, seed)?;
    let mut entries = vec![history_entry(&game.snapshot())];

    for action in actions {
        if game.status() != GameStatus::Active {
            break;
        }
        game.step(*action);
        entries.push(history_entry(&game.snapshot()));
    }

    Ok(RunHistory {
        height: config.height,
        width: config.width,
        entries,
    })
}

pub fn write_tape(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("failed writing {}", path.display()))
}

fn history_entry(snapshot: &WorldSnapshot) -> HistoryEntry {
    HistoryEntry {
        tick: snapshot.tick_index,
        cells: snapshot.legacy_cells(),
    }
}
