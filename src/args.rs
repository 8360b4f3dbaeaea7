use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Clone)]
#[command(
    display_name = "Rating Engine",
    long_about = "Rebuilds player ratings from match history and predicts or balances lobbies"
)]
pub struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        global = true,
        env = "RUST_LOG",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"],
        help = "Sets the logging verbosity"
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command
}

#[derive(Subcommand, Clone)]
pub enum Command {
    /// Replays the full match history and writes every derived record
    Recalculate {
        /// Dataset JSON containing players, matches and optionally the current model
        #[arg(short, long, env = "DATASET_PATH")]
        input: PathBuf,

        /// Output file. Writes to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keeps the dataset's model (or the baseline) instead of training a new one
        #[arg(long, action = clap::ArgAction::SetTrue)]
        skip_training: bool
    },

    /// Predicts the outcome of a lobby
    Predict {
        #[arg(short, long, env = "DATASET_PATH")]
        input: PathBuf,

        /// Lobby JSON with two teams of known or unknown slots
        #[arg(long)]
        lobby: PathBuf
    },

    /// Suggests swaps that even out a lobby
    Balance {
        #[arg(short, long, env = "DATASET_PATH")]
        input: PathBuf,

        #[arg(long)]
        lobby: PathBuf
    }
}
