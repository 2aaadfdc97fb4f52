//! CLI module for lexicon
//!
//! Provides command-line administration of the versions directory:
//! - list: installed or remotely published versions
//! - fetch: download a version into the local cache
//! - show: print a snapshot
//! - migrate: map old terms to their current equivalent
//! - phonetic: print phonetic aliases
//! - default: print the default version

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{execute, run, run_command, Session, DEFAULT_KEYWORD};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_response;
