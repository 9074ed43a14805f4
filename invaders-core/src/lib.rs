pub mod constants;
pub mod error;
pub mod grid;
pub mod rng;
pub mod sim;
pub mod tape;
pub mod verify;

pub use error::{ConfigError, RuleCode, VerifyError};
pub use verify::{verify_tape, TapeJournal};
