//! CLI module - argument parsing and the standalone distribution command

mod args;
pub mod distribution;

pub use args::{Cli, Commands};
pub use distribution::run_distribution;
