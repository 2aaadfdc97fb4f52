//! CLI argument definitions using clap
//!
//! Commands:
//! - lexicon list [--remote]
//! - lexicon fetch <version>
//! - lexicon show <version>
//! - lexicon migrate --from <older> [--to <newer>] [terms...]
//! - lexicon phonetic <version>
//! - lexicon default

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// lexicon - versioned snapshots of a symbolic dictionary
#[derive(Parser, Debug)]
#[command(name = "lexicon")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = "./lexicon.json")]
    pub config: PathBuf,

    /// Only log warnings and errors
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List installed versions, or those published remotely
    List {
        #[arg(long)]
        remote: bool,
    },

    /// Download a version into the local directory
    Fetch {
        /// Version identifier, or "default"
        version: String,
    },

    /// Print the snapshot of a version
    Show {
        /// Version identifier, or "default"
        version: String,
    },

    /// Map terms of an older version to their current equivalent
    Migrate {
        /// Version the terms come from
        #[arg(long)]
        from: String,

        /// Version to migrate to (default version when omitted)
        #[arg(long)]
        to: Option<String>,

        /// Terms to migrate (all terms of the older version when omitted)
        terms: Vec<String>,
    },

    /// Print the phonetic alias mapping of a version
    Phonetic {
        /// Version identifier, or "default"
        version: String,
    },

    /// Print the default version
    Default,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
