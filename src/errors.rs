//! Error taxonomy for lexicon
//!
//! Every failure surfaces to the caller of the loader or builder. The only
//! silent defaults are the two documented backward-compatibility fallbacks
//! applied while decoding a snapshot (missing `history`, missing `diff`).
//!
//! Error codes:
//! - LEX_CONFIGURATION
//! - LEX_DOWNLOAD
//! - LEX_CORRUPTION
//! - LEX_DUPLICATE_RULE
//! - LEX_COHERENCE
//! - LEX_IDENTITY_RESOLUTION
//! - LEX_INVARIANT_VIOLATION
//! - LEX_IO

use std::io;
use std::path::Path;

use thiserror::Error;

/// Result type for lexicon operations
pub type LexiconResult<T> = Result<T, LexiconError>;

/// Lexicon errors
#[derive(Debug, Error)]
pub enum LexiconError {
    /// A required setting is missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Remote fetch or listing failed
    #[error("Download failed for {target}: {reason}")]
    Download { target: String, reason: String },

    /// Persisted JSON/cache is malformed, or a rename source is not fully translated
    #[error("Corruption: {0}")]
    Corruption(String),

    /// An add operation collides with an existing inhibition or translation
    #[error("Duplicate rule: {0}")]
    DuplicateRule(String),

    /// The relation graph collaborator rejected a term/root/inhibition set
    #[error("Coherence check failed: {0}")]
    Coherence(String),

    /// A version identifier could not be parsed
    #[error("Cannot resolve version identifier {0:?}")]
    IdentityResolution(String),

    /// A produced snapshot breaks a cross-field invariant
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Local filesystem failure
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl LexiconError {
    /// I/O error with path context
    pub fn io_at(path: &Path, source: io::Error) -> Self {
        LexiconError::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// Download error for a remote object
    pub fn download(target: impl Into<String>, reason: impl ToString) -> Self {
        LexiconError::Download {
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            LexiconError::Configuration(_) => "LEX_CONFIGURATION",
            LexiconError::Download { .. } => "LEX_DOWNLOAD",
            LexiconError::Corruption(_) => "LEX_CORRUPTION",
            LexiconError::DuplicateRule(_) => "LEX_DUPLICATE_RULE",
            LexiconError::Coherence(_) => "LEX_COHERENCE",
            LexiconError::IdentityResolution(_) => "LEX_IDENTITY_RESOLUTION",
            LexiconError::InvariantViolation(_) => "LEX_INVARIANT_VIOLATION",
            LexiconError::Io { .. } => "LEX_IO",
        }
    }

    /// Whether a retry of the same operation may succeed later.
    ///
    /// A failed load leaves the version unloaded, so transient failures can
    /// simply be retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, LexiconError::Download { .. } | LexiconError::Io { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(LexiconError::Configuration("x".into()).code(), "LEX_CONFIGURATION");
        assert_eq!(LexiconError::download("a.json", "404").code(), "LEX_DOWNLOAD");
        assert_eq!(LexiconError::Corruption("x".into()).code(), "LEX_CORRUPTION");
        assert_eq!(LexiconError::DuplicateRule("x".into()).code(), "LEX_DUPLICATE_RULE");
        assert_eq!(LexiconError::Coherence("x".into()).code(), "LEX_COHERENCE");
        assert_eq!(
            LexiconError::IdentityResolution("x".into()).code(),
            "LEX_IDENTITY_RESOLUTION"
        );
    }

    #[test]
    fn test_transient_errors() {
        assert!(LexiconError::download("a.json", "timeout").is_transient());
        assert!(LexiconError::io_at(
            Path::new("/tmp/x"),
            io::Error::new(io::ErrorKind::Other, "disk")
        )
        .is_transient());
        assert!(!LexiconError::Corruption("bad json".into()).is_transient());
    }

    #[test]
    fn test_display_includes_context() {
        let err = LexiconError::download("dictionary_2020-01-01_00:00:00.json", "HTTP 404");
        let display = err.to_string();
        assert!(display.contains("dictionary_2020-01-01_00:00:00.json"));
        assert!(display.contains("HTTP 404"));
    }
}
