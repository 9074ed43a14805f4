use serde::{Deserialize, Serialize};

use crate::error::VerifyError;
use crate::sim::{replay_checked, GameConfig, GameStatus, ReplayResult, ReplayViolation};
use crate::tape::{encode_status_byte, parse_tape, Action};

/// Everything a verifier can vouch for after replaying a tape from scratch.
///
/// The status and generator state come from the replay, not the footer, so a
/// journal is trustworthy even though the footer bytes are attacker-supplied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapeJournal {
    pub seed: u32,
    pub height: u8,
    pub width: u8,
    pub enemy_count: u8,
    pub tick_count: u32,
    pub status: GameStatus,
    pub final_rng_state: u32,
    pub tape_checksum: u32,
}

pub fn verify_tape(bytes: &[u8], max_ticks: u32) -> Result<TapeJournal, VerifyError> {
    verify_tape_with_replay(bytes, max_ticks, replay_checked)
}

fn verify_tape_with_replay<F>(
    bytes: &[u8],
    max_ticks: u32,
    replay_fn: F,
) -> Result<TapeJournal, VerifyError>
where
    F: FnOnce(GameConfig, u32, &[Action]) -> Result<ReplayResult, ReplayViolation>,
{
    let tape = parse_tape(bytes, max_ticks)?;
    let actions = tape.decode_actions()?;

    let replay_result = replay_fn(tape.header.config(), tape.header.seed, &actions).map_err(
        |err| VerifyError::RuleViolation {
            tick: err.tick_count,
            rule: err.rule,
        },
    )?;

    if replay_result.tick_count != tape.header.tick_count {
        return Err(VerifyError::TickCountMismatch {
            claimed: tape.header.tick_count,
            computed: replay_result.tick_count,
        });
    }

    if replay_result.status != tape.footer.status {
        return Err(VerifyError::StatusMismatch {
            claimed: encode_status_byte(tape.footer.status),
            computed: encode_status_byte(replay_result.status),
        });
    }

    if replay_result.final_rng_state != tape.footer.final_rng_state {
        return Err(VerifyError::RngMismatch {
            claimed: tape.footer.final_rng_state,
            computed: replay_result.final_rng_state,
        });
    }

    Ok(TapeJournal {
        seed: tape.header.seed,
        height: tape.header.height,
        width: tape.header.width,
        enemy_count: tape.header.enemy_count,
        tick_count: tape.header.tick_count,
        status: replay_result.status,
        final_rng_state: replay_result.final_rng_state,
        tape_checksum: tape.footer.checksum,
    })
}
