//! Observable lifecycle events

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    ConfigLoaded,
    DefaultVersionSet,

    // Snapshot loading
    SnapshotCacheHit,
    SnapshotDownload,
    SnapshotLoaded,
    SnapshotSaved,

    // Diff resolution
    MigrationComputed,

    // Derived relation graph
    GraphCloned,
    GraphRebuilt,
    GraphCacheSaved,
    GraphCacheLoaded,
    GraphCacheCorrupt,

    // Version construction
    VersionCreated,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::DefaultVersionSet => "DEFAULT_VERSION_SET",
            Event::SnapshotCacheHit => "SNAPSHOT_CACHE_HIT",
            Event::SnapshotDownload => "SNAPSHOT_DOWNLOAD",
            Event::SnapshotLoaded => "SNAPSHOT_LOADED",
            Event::SnapshotSaved => "SNAPSHOT_SAVED",
            Event::MigrationComputed => "MIGRATION_COMPUTED",
            Event::GraphCloned => "GRAPH_CLONED",
            Event::GraphRebuilt => "GRAPH_REBUILT",
            Event::GraphCacheSaved => "GRAPH_CACHE_SAVED",
            Event::GraphCacheLoaded => "GRAPH_CACHE_LOADED",
            Event::GraphCacheCorrupt => "GRAPH_CACHE_CORRUPT",
            Event::VersionCreated => "VERSION_CREATED",
        }
    }

    /// Events that indicate something an operator should look at
    pub fn is_warning(&self) -> bool {
        matches!(self, Event::GraphCacheCorrupt)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
