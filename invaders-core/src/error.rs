use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    HeightTooSmall { got: i32, min: i32 },
    HeightTooLarge { got: i32, max: i32 },
    WidthTooSmall { got: i32, min: i32 },
    WidthTooLarge { got: i32, max: i32 },
    EnemyCountZero,
    EnemyCountTooLarge { got: u8, max: u8 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeightTooSmall { got, min } => {
                write!(f, "grid height too small: got {got}, need at least {min}")
            }
            Self::HeightTooLarge { got, max } => {
                write!(f, "grid height too large: got {got}, tape limit is {max}")
            }
            Self::WidthTooSmall { got, min } => {
                write!(f, "grid width too small: got {got}, need at least {min}")
            }
            Self::WidthTooLarge { got, max } => {
                write!(f, "grid width too large: got {got}, tape limit is {max}")
            }
            Self::EnemyCountZero => write!(f, "enemy count must be non-zero"),
            Self::EnemyCountTooLarge { got, max } => {
                write!(f, "enemy count too large: got {got}, band holds {max}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleCode {
    ShooterBounds,
    ShooterRow,
    EnemyState,
    HazardState,
    ProjectileState,
    GridOccupancyDesync,
    StatusConsistency,
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShooterBounds => write!(f, "SHOOTER_BOUNDS"),
            Self::ShooterRow => write!(f, "SHOOTER_ROW"),
            Self::EnemyState => write!(f, "ENEMY_STATE"),
            Self::HazardState => write!(f, "HAZARD_STATE"),
            Self::ProjectileState => write!(f, "PROJECTILE_STATE"),
            Self::GridOccupancyDesync => write!(f, "GRID_OCCUPANCY_DESYNC"),
            Self::StatusConsistency => write!(f, "STATUS_CONSISTENCY"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifyError {
    TapeTooShort { actual: usize, min: usize },
    InvalidMagic { found: u32 },
    UnsupportedVersion { found: u8 },
    HeaderReservedNonZero,
    ConfigRejected(ConfigError),
    TickCountOutOfRange { tick_count: u32, max_ticks: u32 },
    TapeLengthMismatch { expected: usize, actual: usize },
    IllegalActionByte { tick: u32, byte: u8 },
    InvalidStatusByte { found: u8 },
    FooterReservedNonZero,
    CrcMismatch { stored: u32, computed: u32 },
    RuleViolation { tick: u32, rule: RuleCode },
    TickCountMismatch { claimed: u32, computed: u32 },
    StatusMismatch { claimed: u8, computed: u8 },
    RngMismatch { claimed: u32, computed: u32 },
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TapeTooShort { actual, min } => {
                write!(f, "tape too short: got {actual} bytes, need at least {min}")
            }
            Self::InvalidMagic { found } => write!(f, "invalid tape magic: 0x{found:08x}"),
            Self::UnsupportedVersion { found } => write!(f, "unsupported tape version: {found}"),
            Self::HeaderReservedNonZero => write!(f, "header reserved bytes are non-zero"),
            Self::ConfigRejected(err) => write!(f, "header config rejected: {err}"),
            Self::TickCountOutOfRange {
                tick_count,
                max_ticks,
            } => write!(
                f,
                "tick count out of range: {tick_count} (allowed 1..={max_ticks})"
            ),
            Self::TapeLengthMismatch { expected, actual } => write!(
                f,
                "tape length mismatch: expected {expected} bytes, got {actual}"
            ),
            Self::IllegalActionByte { tick, byte } => {
                write!(f, "illegal action byte at tick {tick}: 0x{byte:02x}")
            }
            Self::InvalidStatusByte { found } => {
                write!(f, "invalid footer status byte: 0x{found:02x}")
            }
            Self::FooterReservedNonZero => write!(f, "footer reserved bytes are non-zero"),
            Self::CrcMismatch { stored, computed } => write!(
                f,
                "crc mismatch: stored=0x{stored:08x}, computed=0x{computed:08x}"
            ),
            Self::RuleViolation { tick, rule } => {
                write!(f, "rule violation at tick {tick}: {rule}")
            }
            Self::TickCountMismatch { claimed, computed } => {
                write!(
                    f,
                    "tick-count mismatch: claimed={claimed}, computed={computed}"
                )
            }
            Self::StatusMismatch { claimed, computed } => {
                write!(f, "status mismatch: claimed={claimed}, computed={computed}")
            }
            Self::RngMismatch { claimed, computed } => {
                write!(
                    f,
                    "rng mismatch: claimed=0x{claimed:08x}, computed=0x{computed:08x}"
                )
            }
        }
    }
}

impl std::error::Error for VerifyError {}
