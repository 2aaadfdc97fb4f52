//! CLI-specific error types
//!
//! Every CLI error is fatal: it is printed to stderr with its code and the
//! process exits non-zero.

use std::fmt;
use std::io;

use crate::errors::LexiconError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdout)
    IoError,
    /// A requested term does not exist in the older version
    UnknownTerm,
    /// A lexicon operation failed; carries its `LEX_*` code
    Operation(&'static str),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "LEX_CLI_CONFIG_ERROR",
            Self::IoError => "LEX_CLI_IO_ERROR",
            Self::UnknownTerm => "LEX_CLI_UNKNOWN_TERM",
            Self::Operation(code) => *code,
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn unknown_term(term: &str, version: &str) -> Self {
        Self::new(
            CliErrorCode::UnknownTerm,
            format!("{} is not a term of {}", term, version),
        )
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<LexiconError> for CliError {
    fn from(e: LexiconError) -> Self {
        match e {
            LexiconError::Configuration(msg) => Self::config_error(msg),
            other => Self::new(CliErrorCode::Operation(other.code()), other.to_string()),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
