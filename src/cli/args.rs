use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config YAML file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging for internal details
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe the configured endpoint once and print the result
    Check(CheckArgs),
    /// Print the effective configuration (credentials masked)
    Show,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Mail the recipients if the probe fails
    #[arg(long)]
    pub notify: bool,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from("config.yaml"))
    }
}
