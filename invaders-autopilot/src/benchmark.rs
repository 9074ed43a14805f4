use crate::runner::{run_once, RunMetrics, RunOutcome};
use anyhow::{anyhow, Context, Result};
use invaders_core::sim::GameConfig;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunRecord {
    pub strategy_id: String,
    pub seed: u32,
    pub seed_hex: String,
    pub tick_count: u32,
    pub outcome: RunOutcome,
    pub elapsed_ms: f64,
    pub shots: u32,
    pub moves: u32,
    pub holds: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StrategyRanking {
    pub rank: usize,
    pub strategy_id: String,
    pub runs: usize,
    pub wins: usize,
    pub losses: usize,
    pub unresolved: usize,
    pub win_rate: f64,
    pub mean_ticks: f64,
    pub mean_elapsed_ms: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub generated_unix_s: u64,
    pub height: i32,
    pub width: i32,
    pub enemy_count: u8,
    pub max_ticks: u32,
    pub seed_count: usize,
    pub run_count: usize,
    pub rankings: Vec<StrategyRanking>,
    pub runs: Vec<RunRecord>,
}

pub struct BenchmarkConfig {
    pub strategies: Vec<String>,
    pub seeds: Vec<u32>,
    pub game: GameConfig,
    pub max_ticks: u32,
    pub out_dir: PathBuf,
    pub jobs: Option<usize>,
}

/// Every strategy plays every seed; runs are independent and parallelized
/// across the pool. Writes `summary.json`, `runs.csv` and `rankings.csv` into
/// the output directory.
pub fn run_benchmark(config: BenchmarkConfig) -> Result<BenchmarkReport> {
    if config.strategies.is_empty() {
        return Err(anyhow!("benchmark requires at least one strategy"));
    }
    if config.seeds.is_empty() {
        return Err(anyhow!("benchmark requires at least one seed"));
    }

    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("failed creating {}", config.out_dir.display()))?;

    let mut pairs = Vec::with_capacity(config.strategies.len() * config.seeds.len());
    for strategy_id in &config.strategies {
        for seed in &config.seeds {
            pairs.push((strategy_id.clone(), *seed));
        }
    }

    let run_one = |(strategy_id, seed): &(String, u32)| -> Result<RunMetrics> {
        let artifact = run_once(strategy_id, config.game, *seed, config.max_ticks)
            .with_context(|| {
                format!("benchmark run failed for strategy={strategy_id} seed={seed:#010x}")
            })?;
        Ok(artifact.metrics)
    };

    let results: Vec<Result<RunMetrics>> = if let Some(jobs) = config.jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| pairs.par_iter().map(run_one).collect())
    } else {
        pairs.par_iter().map(run_one).collect()
    };

    let mut metrics = Vec::with_capacity(results.len());
    for result in results {
        metrics.push(result?);
    }

    let mut rankings: Vec<StrategyRanking> = config
        .strategies
        .iter()
        .map(|id| aggregate_strategy(id, &metrics))
        .collect();
    rankings.sort_by(|a, b| {
        b.win_rate
            .total_cmp(&a.win_rate)
            .then(a.mean_ticks.total_cmp(&b.mean_ticks))
            .then(a.strategy_id.cmp(&b.strategy_id))
    });
    for (idx, ranking) in rankings.iter_mut().enumerate() {
        ranking.rank = idx + 1;
    }

    let runs: Vec<RunRecord> = metrics
        .iter()
        .map(|m| RunRecord {
            strategy_id: m.strategy_id.clone(),
            seed: m.seed,
            seed_hex: format!("{:#010x}", m.seed),
            tick_count: m.tick_count,
            outcome: m.outcome,
            elapsed_ms: m.elapsed_ms,
            shots: m.shots,
            moves: m.moves,
            holds: m.holds,
        })
        .collect();

    let report = BenchmarkReport {
        generated_unix_s: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
        height: config.game.height,
        width: config.game.width,
        enemy_count: config.game.enemy_count,
        max_ticks: config.max_ticks,
        seed_count: config.seeds.len(),
        run_count: runs.len(),
        rankings,
        runs,
    };

    fs::write(
        config.out_dir.join("summary.json"),
        serde_json::to_vec_pretty(&report).context("failed to serialize summary")?,
    )?;
    fs::write(config.out_dir.join("runs.csv"), runs_csv(&report.runs))?;
    fs::write(
        config.out_dir.join("rankings.csv"),
        rankings_csv(&report.rankings),
    )?;

    Ok(report)
}

fn aggregate_strategy(id: &str, metrics: &[RunMetrics]) -> StrategyRanking {
    let runs: Vec<&RunMetrics> = metrics.iter().filter(|m| m.strategy_id == id).collect();
    let total = runs.len();
    let wins = runs.iter().filter(|m| m.outcome == RunOutcome::Won).count();
    let losses = runs.iter().filter(|m| m.outcome == RunOutcome::Lost).count();
    let unresolved = total - wins - losses;
    let sum_ticks: u64 = runs.iter().map(|m| u64::from(m.tick_count)).sum();
    let sum_elapsed: f64 = runs.iter().map(|m| m.elapsed_ms).sum();
    let denom = total.max(1) as f64;

    StrategyRanking {
        rank: 0,
        strategy_id: id.to_string(),
        runs: total,
        wins,
        losses,
        unresolved,
        win_rate: wins as f64 / denom,
        mean_ticks: sum_ticks as f64 / denom,
        mean_elapsed_ms: sum_elapsed / denom,
    }
}

fn runs_csv(runs: &[RunRecord]) -> String {
    let mut out = String::from("strategy,seed,outcome,ticks,elapsed_ms,shots,moves,holds\n");
    for r in runs {
        out.push_str(&format!(
            "{},{},{},{},{:.3},{},{},{}\n",
            r.strategy_id,
            r.seed_hex,
            r.outcome.as_str(),
            r.tick_count,
            r.elapsed_ms,
            r.shots,
            r.moves,
            r.holds
        ));
    }
    out
}

fn rankings_csv(rankings: &[StrategyRanking]) -> String {
    let mut out =
        String::from("rank,strategy,runs,wins,losses,unresolved,win_rate,mean_ticks,mean_elapsed_ms\n");
    for r in rankings {
        out.push_str(&format!(
            "{},{},{},{},{},{},{:.4},{:.2},{:.3}\n",
            r.rank,
            r.strategy_id,
            r.runs,
            r.wins,
            r.losses,
            r.unresolved,
            r.win_rate,
            r.mean_ticks,
            r.mean_elapsed_ms
        ));
    }
    out
}
