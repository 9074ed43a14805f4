use serde::{Deserialize, Serialize};

use crate::constants::{TAPE_FOOTER_SIZE, TAPE_HEADER_SIZE, TAPE_MAGIC, TAPE_VERSION};
use crate::error::VerifyError;
use crate::sim::{GameConfig, GameStatus};

/// One shooter action per tick. The wire encoding is a single byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Shoot,
    MoveLeft,
    MoveRight,
    Hold,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapeHeader {
    pub magic: u32,
    pub version: u8,
    pub height: u8,
    pub width: u8,
    pub enemy_count: u8,
    pub seed: u32,
    pub tick_count: u32,
}

impl TapeHeader {
    pub fn config(&self) -> GameConfig {
        GameConfig {
            height: i32::from(self.height),
            width: i32::from(self.width),
            enemy_count: self.enemy_count,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapeFooter {
    pub status: GameStatus,
    pub final_rng_state: u32,
    pub checksum: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TapeView<'a> {
    pub header: TapeHeader,
    pub actions: &'a [u8],
    pub footer: TapeFooter,
}

impl TapeView<'_> {
    /// Decode the body into typed actions. Parsing already rejected illegal
    /// bytes, so this only fails on a tape view built by hand.
    pub fn decode_actions(&self) -> Result<Vec<Action>, VerifyError> {
        self.actions
            .iter()
            .enumerate()
            .map(|(tick, &byte)| {
                decode_action_byte(byte).ok_or(VerifyError::IllegalActionByte {
                    tick: tick as u32,
                    byte,
                })
            })
            .collect()
    }
}

#[inline]
pub fn encode_action_byte(action: Action) -> u8 {
    match action {
        Action::Shoot => 0x00,
        Action::MoveLeft => 0x01,
        Action::MoveRight => 0x02,
        Action::Hold => 0x03,
    }
}

#[inline]
pub fn decode_action_byte(byte: u8) -> Option<Action> {
    match byte {
        0x00 => Some(Action::Shoot),
        0x01 => Some(Action::MoveLeft),
        0x02 => Some(Action::MoveRight),
        0x03 => Some(Action::Hold),
        _ => None,
    }
}

#[inline]
pub fn encode_status_byte(status: GameStatus) -> u8 {
    match status {
        GameStatus::Active => 0x00,
        GameStatus::Won => 0x01,
        GameStatus::Lost => 0x02,
    }
}

#[inline]
pub fn decode_status_byte(byte: u8) -> Option<GameStatus> {
    match byte {
        0x00 => Some(GameStatus::Active),
        0x01 => Some(GameStatus::Won),
        0x02 => Some(GameStatus::Lost),
        _ => None,
    }
}

pub fn parse_tape(bytes: &[u8], max_ticks: u32) -> Result<TapeView<'_>, VerifyError> {
    let min_len = TAPE_HEADER_SIZE + TAPE_FOOTER_SIZE;
    if bytes.len() < min_len {
        return Err(VerifyError::TapeTooShort {
            actual: bytes.len(),
            min: min_len,
        });
    }

    let magic = read_u32_le(bytes, 0);
    if magic != TAPE_MAGIC {
        return Err(VerifyError::InvalidMagic { found: magic });
    }

    let version = bytes[4];
    if version != TAPE_VERSION {
        return Err(VerifyError::UnsupportedVersion { found: version });
    }

    if bytes[5] != 0 || bytes[9] != 0 || bytes[10] != 0 || bytes[11] != 0 {
        return Err(VerifyError::HeaderReservedNonZero);
    }

    let header = TapeHeader {
        magic,
        version,
        height: bytes[6],
        width: bytes[7],
        enemy_count: bytes[8],
        seed: read_u32_le(bytes, 12),
        tick_count: read_u32_le(bytes, 16),
    };

    header.config().validate().map_err(VerifyError::ConfigRejected)?;

    if header.tick_count == 0 || header.tick_count > max_ticks {
        return Err(VerifyError::TickCountOutOfRange {
            tick_count: header.tick_count,
            max_ticks,
        });
    }

    let expected_len = TAPE_HEADER_SIZE + header.tick_count as usize + TAPE_FOOTER_SIZE;
    if bytes.len() != expected_len {
        return Err(VerifyError::TapeLengthMismatch {
            expected: expected_len,
            actual: bytes.len(),
        });
    }

    let body_start = TAPE_HEADER_SIZE;
    let body_end = body_start + header.tick_count as usize;
    let actions = &bytes[body_start..body_end];

    let status_byte = bytes[body_end];
    let status = decode_status_byte(status_byte)
        .ok_or(VerifyError::InvalidStatusByte { found: status_byte })?;

    if bytes[body_end + 1] != 0 || bytes[body_end + 2] != 0 || bytes[body_end + 3] != 0 {
        return Err(VerifyError::FooterReservedNonZero);
    }

    let final_rng_state = read_u32_le(bytes, body_end + 4);
    let checksum = read_u32_le(bytes, body_end + 8);

    let computed = crc32_and_validate_actions(bytes, body_start, body_end)?;
    if checksum != computed {
        return Err(VerifyError::CrcMismatch {
            stored: checksum,
            computed,
        });
    }

    Ok(TapeView {
        header,
        actions,
        footer: TapeFooter {
            status,
            final_rng_state,
            checksum,
        },
    })
}

/// Pack a finished run. The checksum covers the header and body, so the
/// footer's claimed outcome stays independently checkable against replay.
pub fn serialize_tape(
    config: GameConfig,
    seed: u32,
    actions: &[Action],
    status: GameStatus,
    final_rng_state: u32,
) -> Vec<u8> {
    debug_assert!(config.validate().is_ok());

    let total_len = TAPE_HEADER_SIZE + actions.len() + TAPE_FOOTER_SIZE;
    let mut data = vec![0u8; total_len];

    write_u32_le(&mut data, 0, TAPE_MAGIC);
    data[4] = TAPE_VERSION;
    data[5] = 0;
    data[6] = config.height as u8;
    data[7] = config.width as u8;
    data[8] = config.enemy_count;
    write_u32_le(&mut data, 12, seed);
    write_u32_le(&mut data, 16, actions.len() as u32);

    let body_start = TAPE_HEADER_SIZE;
    let body_end = body_start + actions.len();
    for (slot, action) in data[body_start..body_end].iter_mut().zip(actions) {
        *slot = encode_action_byte(*action);
    }

    data[body_end] = encode_status_byte(status);
    write_u32_le(&mut data, body_end + 4, final_rng_state);

    let checksum = crc32(&data[..body_end]);
    write_u32_le(&mut data, body_end + 8, checksum);

    data
}

#[inline]
fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[inline]
fn write_u32_le(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

const CRC_TABLE: [u32; 256] = build_crc_table();

const fn build_crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;

    while i < 256 {
        let mut c = i as u32;
        let mut j = 0;

        while j < 8 {
            c = if (c & 1) != 0 {
                0xEDB8_8320u32 ^ (c >> 1)
            } else {
                c >> 1
            };
            j += 1;
        }

        table[i] = c;
        i += 1;
    }

    table
}

pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;

    for byte in data {
        let idx = ((crc ^ (*byte as u32)) & 0xFF) as usize;
        crc = CRC_TABLE[idx] ^ (crc >> 8);
    }

    crc ^ 0xFFFF_FFFFu32
}

fn crc32_and_validate_actions(
    bytes: &[u8],
    body_start: usize,
    body_end: usize,
) -> Result<u32, VerifyError> {
    let mut crc = 0xFFFF_FFFFu32;
    let mut i = 0usize;

    while i < body_end {
        let byte = bytes[i];
        if i >= body_start && decode_action_byte(byte).is_none() {
            return Err(VerifyError::IllegalActionByte {
                tick: (i - body_start) as u32,
                byte,
            });
        }

        let idx = ((crc ^ byte as u32) & 0xFF) as usize;
        crc = CRC_TABLE[idx] ^ (crc >> 8);
        i += 1;
    }

    Ok(crc ^ 0xFFFF_FFFFu32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn footer_offset(tick_count: usize) -> usize {
        TAPE_HEADER_SIZE + tick_count
    }

    fn sample_tape(actions: &[Action]) -> Vec<u8> {
        serialize_tape(
            GameConfig::default(),
            0xABCD_1234,
            actions,
            GameStatus::Lost,
            0x1111_2222,
        )
    }

    #[test]
    fn crc_matches_known_vector() {
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn action_byte_roundtrip() {
        for action in [
            Action::Shoot,
            Action::MoveLeft,
            Action::MoveRight,
            Action::Hold,
        ] {
            assert_eq!(decode_action_byte(encode_action_byte(action)), Some(action));
        }
        assert_eq!(decode_action_byte(0x04), None);
        assert_eq!(decode_action_byte(0xFF), None);
    }

    #[test]
    fn status_byte_roundtrip() {
        for status in [GameStatus::Active, GameStatus::Won, GameStatus::Lost] {
            assert_eq!(decode_status_byte(encode_status_byte(status)), Some(status));
        }
        assert_eq!(decode_status_byte(0x03), None);
    }

    #[test]
    fn roundtrip_small_tape() {
        let actions = [Action::Shoot, Action::MoveLeft, Action::Hold];
        let bytes = sample_tape(&actions);
        let tape = parse_tape(&bytes, 100).unwrap();

        assert_eq!(tape.header.height, 10);
        assert_eq!(tape.header.width, 7);
        assert_eq!(tape.header.enemy_count, 8);
        assert_eq!(tape.header.seed, 0xABCD_1234);
        assert_eq!(tape.header.tick_count, 3);
        assert_eq!(tape.actions, [0x00, 0x01, 0x03]);
        assert_eq!(tape.decode_actions().unwrap(), actions.to_vec());
        assert_eq!(tape.footer.status, GameStatus::Lost);
        assert_eq!(tape.footer.final_rng_state, 0x1111_2222);
    }

    #[test]
    fn rejects_tape_too_short() {
        let bytes = [0u8; TAPE_HEADER_SIZE + TAPE_FOOTER_SIZE - 1];
        assert!(matches!(
            parse_tape(&bytes, 100),
            Err(VerifyError::TapeTooShort { .. })
        ));
    }

    #[test]
    fn rejects_invalid_magic() {
        let mut bytes = sample_tape(&[Action::Hold]);
        bytes[0] ^= 0x01;
        assert!(matches!(
            parse_tape(&bytes, 100),
            Err(VerifyError::InvalidMagic { .. })
        ));
    }

    #[test]
    fn rejects_unsupported_version() {
        let mut bytes = sample_tape(&[Action::Hold]);
        bytes[4] = TAPE_VERSION + 1;
        assert!(matches!(
            parse_tape(&bytes, 100),
            Err(VerifyError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn rejects_nonzero_header_reserved_bytes() {
        for offset in [5usize, 9, 10, 11] {
            let mut bytes = sample_tape(&[Action::Hold]);
            bytes[offset] = 1;
            assert!(
                matches!(
                    parse_tape(&bytes, 100),
                    Err(VerifyError::HeaderReservedNonZero)
                ),
                "reserved byte at offset {offset} must be rejected"
            );
        }
    }

    #[test]
    fn rejects_undersized_board() {
        let mut bytes = sample_tape(&[Action::Hold]);
        bytes[6] = 2; // height below the playable minimum
        assert!(matches!(
            parse_tape(&bytes, 100),
            Err(VerifyError::ConfigRejected(_))
        ));
    }

    #[test]
    fn rejects_overfull_enemy_band() {
        let mut bytes = sample_tape(&[Action::Hold]);
        bytes[8] = 255; // more enemies than a 7-wide band can seat
        assert!(matches!(
            parse_tape(&bytes, 100),
            Err(VerifyError::ConfigRejected(_))
        ));
    }

    #[test]
    fn rejects_zero_tick_count() {
        let mut bytes = sample_tape(&[Action::Hold]);
        bytes[16..20].copy_from_slice(&0u32.to_le_bytes());
        assert!(matches!(
            parse_tape(&bytes, 100),
            Err(VerifyError::TickCountOutOfRange {
                tick_count: 0,
                max_ticks: 100
            })
        ));
    }

    #[test]
    fn rejects_tick_count_above_max() {
        let bytes = sample_tape(&[Action::Hold]);
        assert!(matches!(
            parse_tape(&bytes, 0),
            Err(VerifyError::TickCountOutOfRange {
                tick_count: 1,
                max_ticks: 0
            })
        ));
    }

    #[test]
    fn rejects_trailing_bytes_beyond_declared_tick_count() {
        let mut bytes = sample_tape(&[Action::Hold]);
        bytes.push(0);
        assert!(matches!(
            parse_tape(&bytes, 100),
            Err(VerifyError::TapeLengthMismatch { .. })
        ));
    }

    #[test]
    fn rejects_shorter_than_declared_tick_count() {
        let mut bytes = sample_tape(&[Action::Hold, Action::Hold]);
        bytes.pop();
        assert!(matches!(
            parse_tape(&bytes, 100),
            Err(VerifyError::TapeLengthMismatch { .. })
        ));
    }

    #[test]
    fn rejects_illegal_action_byte() {
        let mut bytes = sample_tape(&[Action::Hold]);
        bytes[TAPE_HEADER_SIZE] = 0x07;
        assert!(matches!(
            parse_tape(&bytes, 100),
            Err(VerifyError::IllegalActionByte {
                tick: 0,
                byte: 0x07
            })
        ));
    }

    #[test]
    fn rejects_invalid_status_byte() {
        let mut bytes = sample_tape(&[Action::Hold]);
        let status_offset = footer_offset(1);
        bytes[status_offset] = 9;
        assert!(matches!(
            parse_tape(&bytes, 100),
            Err(VerifyError::InvalidStatusByte { found: 9 })
        ));
    }

    #[test]
    fn rejects_nonzero_footer_reserved_bytes() {
        for pad in 1usize..4 {
            let mut bytes = sample_tape(&[Action::Hold]);
            bytes[footer_offset(1) + pad] = 1;
            assert!(
                matches!(
                    parse_tape(&bytes, 100),
                    Err(VerifyError::FooterReservedNonZero)
                ),
                "reserved footer byte at pad {pad} must be rejected"
            );
        }
    }

    #[test]
    fn rejects_crc_mismatch() {
        let mut bytes = sample_tape(&[Action::Hold]);
        let checksum_offset = footer_offset(1) + 8;
        bytes[checksum_offset] ^= 0x01;
        assert!(matches!(
            parse_tape(&bytes, 100),
            Err(VerifyError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn serialize_tape_writes_crc_over_header_and_body() {
        let actions = [
            Action::Shoot,
            Action::MoveRight,
            Action::MoveLeft,
            Action::Hold,
        ];
        let bytes = sample_tape(&actions);
        let checksum_offset = footer_offset(actions.len()) + 8;
        let stored = u32::from_le_bytes([
            bytes[checksum_offset],
            bytes[checksum_offset + 1],
            bytes[checksum_offset + 2],
            bytes[checksum_offset + 3],
        ]);
        assert_eq!(stored, crc32(&bytes[..footer_offset(actions.len())]));
    }

    #[test]
    fn tampering_with_the_body_breaks_the_crc() {
        let mut bytes = sample_tape(&[Action::Shoot, Action::Shoot, Action::Hold]);
        bytes[TAPE_HEADER_SIZE + 1] = encode_action_byte(Action::MoveRight);
        assert!(matches!(
            parse_tape(&bytes, 100),
            Err(VerifyError::CrcMismatch { .. })
        ));
    }
}
