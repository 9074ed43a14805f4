use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use invaders_autopilot::benchmark::{run_benchmark, BenchmarkConfig};
use invaders_autopilot::bots::{create_strategy_with_limits, describe_strategies, strategy_ids};
use invaders_autopilot::runner::{self, history_from_actions, RunController, RunHistory, RunOutcome};
use invaders_core::constants::{
    DEFAULT_ENEMY_COUNT, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, DEFAULT_MAX_TAPE_TICKS,
    DEFAULT_NODE_BUDGET,
};
use invaders_core::sim::search::SearchLimits;
use invaders_core::sim::GameConfig;
use invaders_core::tape::parse_tape;
use invaders_core::verify_tape;

#[derive(Parser)]
#[command(
    name = "invaders-autopilot",
    about = "Grid-shooter strategies, replays and benchmarks"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the strategy roster
    ListStrategies,

    /// Play one game and report the outcome
    Run {
        /// Strategy id (see list-strategies)
        #[arg(long, default_value = "lookahead")]
        strategy: String,

        /// Game seed (decimal or 0x-hex)
        #[arg(long, default_value = "0xDEADBEEF")]
        seed: String,

        /// Board height in rows
        #[arg(long, default_value_t = DEFAULT_GRID_HEIGHT)]
        height: i32,

        /// Board width in columns
        #[arg(long, default_value_t = DEFAULT_GRID_WIDTH)]
        width: i32,

        /// Enemies seeded into the top two rows
        #[arg(long, default_value_t = DEFAULT_ENEMY_COUNT)]
        enemies: u8,

        /// Tick cap before the run is recorded as unresolved
        #[arg(long, default_value_t = 1_000)]
        max_ticks: u32,

        /// Search node budget for lookahead strategies
        #[arg(long, default_value_t = DEFAULT_NODE_BUDGET)]
        node_budget: u32,

        /// Write the run tape here
        #[arg(long)]
        tape_out: Option<PathBuf>,

        /// Write the per-tick board history here (JSON)
        #[arg(long)]
        history_out: Option<PathBuf>,
    },

    /// Play every strategy against a seed range and rank them
    Benchmark {
        /// Comma-separated strategy ids (default: the whole roster)
        #[arg(long, value_delimiter = ',')]
        strategies: Vec<String>,

        /// Number of seeds per strategy
        #[arg(long, default_value_t = 16)]
        seed_count: usize,

        /// First seed (decimal or 0x-hex); the rest are derived from it
        #[arg(long, default_value = "0xDEADBEEF")]
        base_seed: String,

        /// Board height in rows
        #[arg(long, default_value_t = DEFAULT_GRID_HEIGHT)]
        height: i32,

        /// Board width in columns
        #[arg(long, default_value_t = DEFAULT_GRID_WIDTH)]
        width: i32,

        /// Enemies seeded into the top two rows
        #[arg(long, default_value_t = DEFAULT_ENEMY_COUNT)]
        enemies: u8,

        /// Tick cap per run
        #[arg(long, default_value_t = 1_000)]
        max_ticks: u32,

        /// Output directory
        #[arg(long, default_value = "bench-output")]
        out_dir: PathBuf,

        /// Parallel jobs (default: all cores)
        #[arg(long)]
        jobs: Option<usize>,
    },

    /// Replay a tape from scratch and check its claims
    VerifyTape {
        /// Tape file
        #[arg(long)]
        tape: PathBuf,

        /// Largest tick count accepted
        #[arg(long, default_value_t = DEFAULT_MAX_TAPE_TICKS)]
        max_ticks: u32,
    },

    /// Rebuild a tape's per-tick board history as JSON
    ExportHistory {
        /// Tape file
        #[arg(long)]
        tape: PathBuf,

        /// Output JSON path
        #[arg(long)]
        out: PathBuf,

        /// Largest tick count accepted
        #[arg(long, default_value_t = DEFAULT_MAX_TAPE_TICKS)]
        max_ticks: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::ListStrategies => {
            for (id, description) in describe_strategies() {
                println!("{id:<12} {description}");
            }
        }

        Command::Run {
            strategy,
            seed,
            height,
            width,
            enemies,
            max_ticks,
            node_budget,
            tape_out,
            history_out,
        } => {
            let config = GameConfig {
                height,
                width,
                enemy_count: enemies,
            };
            let seed_val = parse_seed(&seed)?;
            let limits = SearchLimits {
                max_nodes: node_budget,
            };
            let mut strategy = create_strategy_with_limits(&strategy, limits).ok_or_else(|| {
                anyhow!(
                    "unknown strategy '{strategy}' (try: {})",
                    strategy_ids().join(", ")
                )
            })?;

            let mut controller = RunController::new();
            controller
                .initialize(config, seed_val)
                .context("invalid game configuration")?;
            let artifact = controller.run(strategy.as_mut(), max_ticks)?;

            eprintln!(
                "strategy={} seed={:#010x} outcome={} ticks={} shots={} moves={} holds={} elapsed_ms={:.2}",
                artifact.metrics.strategy_id,
                artifact.metrics.seed,
                artifact.metrics.outcome.as_str(),
                artifact.metrics.tick_count,
                artifact.metrics.shots,
                artifact.metrics.moves,
                artifact.metrics.holds,
                artifact.metrics.elapsed_ms,
            );

            if let Some(path) = tape_out {
                runner::write_tape(&path, &artifact.tape)?;
                eprintln!("tape written to {}", path.display());
            }
            if let Some(path) = history_out {
                let history = RunHistory {
                    height: config.height,
                    width: config.width,
                    entries: artifact.history.clone(),
                };
                let data =
                    serde_json::to_vec_pretty(&history).context("failed to serialize history")?;
                fs::write(&path, data)
                    .with_context(|| format!("failed writing {}", path.display()))?;
                eprintln!("history written to {}", path.display());
            }
        }

        Command::Benchmark {
            strategies,
            seed_count,
            base_seed,
            height,
            width,
            enemies,
            max_ticks,
            out_dir,
            jobs,
        } => {
            let roster: Vec<String> = if strategies.is_empty() {
                strategy_ids().iter().map(|s| s.to_string()).collect()
            } else {
                strategies
            };
            let base = parse_seed(&base_seed)?;
            let seeds = generate_seeds(base, seed_count);
            let game = GameConfig {
                height,
                width,
                enemy_count: enemies,
            };

            eprintln!(
                "benchmarking {} strategies over {} seeds, max_ticks={}",
                roster.len(),
                seeds.len(),
                max_ticks
            );

            let report = run_benchmark(BenchmarkConfig {
                strategies: roster,
                seeds,
                game,
                max_ticks,
                out_dir: out_dir.clone(),
                jobs,
            })?;

            for ranking in &report.rankings {
                eprintln!(
                    "rank={} strategy={} wins={}/{} win_rate={:.1}% mean_ticks={:.1}",
                    ranking.rank,
                    ranking.strategy_id,
                    ranking.wins,
                    ranking.runs,
                    ranking.win_rate * 100.0,
                    ranking.mean_ticks,
                );
            }
            eprintln!("report saved to {}/summary.json", out_dir.display());
        }

        Command::VerifyTape { tape, max_ticks } => {
            let bytes =
                fs::read(&tape).with_context(|| format!("failed reading {}", tape.display()))?;
            let journal = verify_tape(&bytes, max_ticks)?;
            eprintln!(
                "seed={:#010x} height={} width={} enemies={} ticks={} status={} rng={:#010x} crc={:#010x}",
                journal.seed,
                journal.height,
                journal.width,
                journal.enemy_count,
                journal.tick_count,
                RunOutcome::from_status(journal.status).as_str(),
                journal.final_rng_state,
                journal.tape_checksum,
            );
        }

        Command::ExportHistory {
            tape,
            out,
            max_ticks,
        } => {
            let bytes =
                fs::read(&tape).with_context(|| format!("failed reading {}", tape.display()))?;
            verify_tape(&bytes, max_ticks)?;

            let view = parse_tape(&bytes, max_ticks)?;
            let actions = view.decode_actions()?;
            let history = history_from_actions(view.header.config(), view.header.seed, &actions)?;

            let data =
                serde_json::to_vec_pretty(&history).context("failed to serialize history")?;
            fs::write(&out, data).with_context(|| format!("failed writing {}", out.display()))?;
            eprintln!(
                "history written to {} ({} boards)",
                out.display(),
                history.entries.len()
            );
        }
    }

    Ok(())
}

fn parse_seed(s: &str) -> Result<u32> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| anyhow!("invalid hex seed '{}': {}", s, e))
    } else {
        s.parse::<u32>()
            .map_err(|e| anyhow!("invalid seed '{}': {}", s, e))
    }
}

fn generate_seeds(base: u32, count: usize) -> Vec<u32> {
    (0..count as u32)
        .map(|i| base.wrapping_add(i.wrapping_mul(0x9E37_79B9)))
        .collect()
}
