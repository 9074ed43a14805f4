//! Simulation and tape constants.
//!
//! Grid geometry, rule cadence, and legacy cell tags all live here so the
//! simulation, search, and tape layers agree on a single set of values.

// Grid defaults
pub const DEFAULT_GRID_HEIGHT: i32 = 10;
pub const DEFAULT_GRID_WIDTH: i32 = 7;
pub const DEFAULT_ENEMY_COUNT: u8 = 8;

// Grid lower bounds (a playable board needs room for the shooter row,
// the enemy band, and at least one row of hazard fall)
pub const MIN_GRID_HEIGHT: i32 = 4;
pub const MIN_GRID_WIDTH: i32 = 2;

// Grid upper bounds; the tape header stores dimensions as single bytes
pub const MAX_GRID_HEIGHT: i32 = u8::MAX as i32;
pub const MAX_GRID_WIDTH: i32 = u8::MAX as i32;

// Enemy band: enemies occupy rows 0..ENEMY_ROWS, one slot per (row, column)
pub const ENEMY_ROWS: i32 = 2;

// Enemy volley cadence and size
pub const LAY_INTERVAL_TICKS: u32 = 3;
pub const MAX_HAZARDS_PER_VOLLEY: u32 = 3;

// Projectile movement (rows per tick)
pub const PROJECTILE_SPEED: i32 = 2;
pub const PROJECTILE_SLOWED_SPEED: i32 = 1;

// Legacy additive cell tags; a cell's legacy value is the sum of the tags
// of everything standing on it
pub const TAG_ENEMY: i32 = 1;
pub const TAG_SHOOTER: i32 = 2;
pub const TAG_HAZARD: i32 = 4;
pub const TAG_PROJECTILE: i32 = 7;

// Lookahead scoring
pub const USEFUL_SHOT_WEIGHT: i32 = 2;
pub const SHOT_VALUE_HORIZON: i32 = 10;
pub const DEFAULT_NODE_BUDGET: u32 = 250_000;

// Tape format
pub const TAPE_MAGIC: u32 = 0x4456_4E49; // "INVD" when written little-endian
pub const TAPE_VERSION: u8 = 1;
pub const TAPE_HEADER_SIZE: usize = 20;
pub const TAPE_FOOTER_SIZE: usize = 12;
pub const DEFAULT_MAX_TAPE_TICKS: u32 = 100_000;
