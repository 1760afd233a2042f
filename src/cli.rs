use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "signage-agent")]
#[command(author, version, about = "Keeps a signage display in sync with its authority")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the reconciliation loop until interrupted
    Run {
        /// Authority base URL (overrides config and MASTER_URL)
        #[arg(long)]
        authority_url: Option<String>,

        /// Local media cache directory
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },

    /// Start the player, query its version over IPC, and stop it
    ProbePlayer,

    /// Check that the player program is available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
