use anyhow::Result;
use invaders_autopilot::benchmark::{run_benchmark, BenchmarkConfig};
use invaders_autopilot::bots::strategy_ids;
use invaders_autopilot::runner::{history_from_actions, run_once};
use invaders_core::sim::GameConfig;
use invaders_core::tape::parse_tape;
use invaders_core::verify_tape;

fn small_board() -> GameConfig {
    GameConfig {
        height: 8,
        width: 5,
        enemy_count: 6,
    }
}

#[test]
fn every_strategy_produces_a_verifiable_tape() -> Result<()> {
    let seed = 0xDEAD_BEEF;
    for id in strategy_ids() {
        let artifact = run_once(id, small_board(), seed, 60)?;
        let metrics = &artifact.metrics;
        assert_eq!(metrics.strategy_id, id, "id mismatch for {id}");
        assert!(metrics.tick_count > 0, "strategy={id}");
        assert_eq!(
            metrics.tick_count as usize,
            artifact.actions.len(),
            "strategy={id}"
        );
        assert_eq!(
            artifact.history.len(),
            artifact.actions.len() + 1,
            "strategy={id}"
        );
        assert_eq!(
            metrics.shots + metrics.moves + metrics.holds,
            metrics.tick_count,
            "strategy={id}"
        );

        let journal = verify_tape(&artifact.tape, 60)?;
        assert_eq!(journal.tick_count, metrics.tick_count, "strategy={id}");
        assert_eq!(
            journal.final_rng_state, metrics.final_rng_state,
            "strategy={id}"
        );
    }
    Ok(())
}

#[test]
fn every_strategy_survives_a_seed_sweep() -> Result<()> {
    let seeds = [0xDEAD_BEEF, 0xC0FF_EE11, 0x1234_5678];
    for seed in seeds {
        for id in strategy_ids() {
            let artifact = run_once(id, small_board(), seed, 80)?;
            assert!(
                artifact.metrics.tick_count > 0,
                "strategy={id} seed={seed:#x}"
            );
            verify_tape(&artifact.tape, 80)?;
        }
    }
    Ok(())
}

#[test]
fn equal_seeds_reproduce_equal_tapes() -> Result<()> {
    let a = run_once("lookahead", small_board(), 0xAB12_CD34, 60)?;
    let b = run_once("lookahead", small_board(), 0xAB12_CD34, 60)?;
    assert_eq!(a.tape, b.tape);
    assert_eq!(a.metrics.tick_count, b.metrics.tick_count);
    assert_eq!(a.metrics.outcome, b.metrics.outcome);
    Ok(())
}

#[test]
fn history_rebuilt_from_the_tape_matches_the_live_run() -> Result<()> {
    let artifact = run_once("gunner", small_board(), 0xC0FF_EE11, 60)?;

    let view = parse_tape(&artifact.tape, 60)?;
    let actions = view.decode_actions()?;
    let rebuilt = history_from_actions(view.header.config(), view.header.seed, &actions)?;

    assert_eq!(rebuilt.height, small_board().height);
    assert_eq!(rebuilt.width, small_board().width);
    assert_eq!(rebuilt.entries, artifact.history);
    Ok(())
}

#[test]
fn benchmark_smoke_outputs_expected_metadata() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let report = run_benchmark(BenchmarkConfig {
        strategies: vec!["gunner".to_string(), "drifter".to_string()],
        seeds: vec![0xDEAD_BEEF, 0xC0FF_EE11],
        game: small_board(),
        max_ticks: 40,
        out_dir: tmp.path().to_path_buf(),
        jobs: None,
    })?;

    assert_eq!(report.run_count, 4);
    assert_eq!(report.rankings.len(), 2);
    assert_eq!(report.runs.len(), 4);
    assert!(tmp.path().join("summary.json").exists());
    assert!(tmp.path().join("runs.csv").exists());
    assert!(tmp.path().join("rankings.csv").exists());

    Ok(())
}
