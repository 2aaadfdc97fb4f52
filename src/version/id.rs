//! Version identifiers and their textual forms
//!
//! A version is identified by a UTC timestamp at second resolution.
//!
//! ```text
//! date string     2024-03-01_12:30:05
//! version name    dictionary_2024-03-01_12:30:05
//! remote file     dictionary_2024-03-01_12:30:05.json
//! local file      dictionary_2024-03-01_12:30:05.json   (colons become '-' on Windows)
//! cache artifact  cache_dictionary_2024-03-01_12:30:05.pk1
//! ```

use std::fmt;

use chrono::{DateTime, Duration, NaiveDateTime, Timelike, Utc};

use crate::errors::{LexiconError, LexiconResult};

/// Prefix of every version name
pub const VERSION_PREFIX: &str = "dictionary_";

/// Prefix of derived cache artifact filenames
pub const CACHE_PREFIX: &str = "cache_";

const DATE_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";

/// Normalized version timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionId(NaiveDateTime);

impl VersionId {
    /// Build an id from a timestamp, dropping sub-second precision.
    pub fn from_datetime(date: NaiveDateTime) -> Self {
        Self(date.with_nanosecond(0).unwrap_or(date))
    }

    /// Parse any accepted textual form.
    ///
    /// Accepts the bare date string, the full version name, either of those
    /// followed by a `.suffix`, and time parts whose colons were replaced by
    /// hyphens.
    pub fn parse(identifier: &str) -> LexiconResult<Self> {
        let stem = identifier.split('.').next().unwrap_or(identifier);
        let raw = stem.strip_prefix(VERSION_PREFIX).unwrap_or(stem);

        let (date_part, time_part) = raw
            .split_once('_')
            .ok_or_else(|| LexiconError::IdentityResolution(identifier.to_string()))?;
        let canonical = format!("{}_{}", date_part, time_part.replace('-', ":"));

        NaiveDateTime::parse_from_str(&canonical, DATE_FORMAT)
            .map(Self::from_datetime)
            .map_err(|_| LexiconError::IdentityResolution(identifier.to_string()))
    }

    /// Underlying timestamp
    pub fn datetime(&self) -> NaiveDateTime {
        self.0
    }

    /// The id one second later
    pub fn next(&self) -> Self {
        Self(self.0 + Duration::seconds(1))
    }

    /// `2024-03-01_12:30:05`
    pub fn date_string(&self) -> String {
        self.0.format(DATE_FORMAT).to_string()
    }

    /// `dictionary_2024-03-01_12:30:05`
    pub fn name(&self) -> String {
        format!("{}{}", VERSION_PREFIX, self.date_string())
    }

    /// Name with colons substituted where the filesystem cannot store them.
    pub fn safe_name(&self) -> String {
        let name = self.name();
        if cfg!(windows) {
            name.replace(':', "-")
        } else {
            name
        }
    }

    /// Object name on the remote source (never substituted)
    pub fn remote_file_name(&self) -> String {
        format!("{}.json", self.name())
    }

    /// Snapshot filename in the local versions directory
    pub fn local_file_name(&self) -> String {
        format!("{}.json", self.safe_name())
    }

    /// Derived relation graph artifact filename
    pub fn cache_file_name(&self) -> String {
        format!("{}{}.pk1", CACHE_PREFIX, self.safe_name())
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<NaiveDateTime> for VersionId {
    fn from(date: NaiveDateTime) -> Self {
        Self::from_datetime(date)
    }
}

impl From<DateTime<Utc>> for VersionId {
    fn from(date: DateTime<Utc>) -> Self {
        Self::from_datetime(date.naive_utc())
    }
}
