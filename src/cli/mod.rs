//! Command-line workflow, independent of argument parsing

pub mod orchestration;

pub use orchestration::{open_repository, run_bump, BumpArgs, BumpOutcome};
