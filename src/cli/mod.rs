//! Command-line interface definitions.

pub mod output;
pub mod stream;
pub mod topics;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Jock MKT - stream live exchange data from the command line.
#[derive(Parser, Debug)]
#[command(name = "jockmkt")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the configuration file; defaults apply when it does not exist
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// Override the configured log level
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Connect to the stream and print every decoded frame as JSON
    Stream(StreamArgs),

    /// List streaming topics and the argument each requires
    Topics,
}

#[derive(Args, Debug)]
pub struct StreamArgs {
    /// Subscribe in addition to the configured subscriptions, e.g.
    /// `account`, `games:nba`, `event:evt_123`
    #[arg(short, long = "subscribe", value_name = "TOPIC[:ARG]")]
    pub subscriptions: Vec<String>,

    /// Log as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}
