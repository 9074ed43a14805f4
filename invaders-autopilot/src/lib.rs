pub mod benchmark;
pub mod bots;
pub mod runner;
