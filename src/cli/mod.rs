pub mod args;
pub mod helpers;

pub use args::{CheckArgs, Cli, Commands};
pub use helpers::{describe_config, run_single_check};
