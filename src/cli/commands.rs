//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Archive ecobee runtime telemetry into Elasticsearch
#[derive(Parser, Debug)]
#[command(name = "elastibee")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Credentials file holding the app key and tokens
    #[arg(long, global = true)]
    pub credentials: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Request a PIN to authorize this app in the ecobee portal
    Pin,

    /// Exchange an authorization code for tokens
    Token {
        /// Code printed by the `pin` command
        code: String,
    },

    /// Refresh the stored access token
    Refresh,

    /// Archive runtime reports from a start date up to today
    Archive {
        /// First day to archive (YYYY-MM-DD)
        start: String,

        /// Elasticsearch URL
        #[arg(long)]
        elasticsearch: Option<String>,

        /// Target index
        #[arg(long)]
        index: Option<String>,

        /// Directory receiving one NDJSON file per window
        #[arg(long)]
        archive_dir: Option<PathBuf>,

        /// Seconds to pause between windows
        #[arg(long)]
        pause: Option<u64>,
    },
}

impl Commands {
    /// Subcommand name as typed on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pin => "pin",
            Self::Token { .. } => "token",
            Self::Refresh => "refresh",
            Self::Archive { .. } => "archive",
        }
    }
}
