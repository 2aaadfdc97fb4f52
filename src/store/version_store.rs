//! Local-cache-or-remote snapshot loading

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::errors::{LexiconError, LexiconResult};
use crate::observability::{log_event_with_fields, Event};
use crate::version::{DictionaryVersion, VersionId};

use super::atomic::write_atomic;
use super::document::SnapshotDocument;
use super::remote::RemoteSource;
use super::snapshot::Snapshot;

static INSTALLED_FILE: OnceLock<Regex> = OnceLock::new();

fn installed_file_pattern() -> &'static Regex {
    INSTALLED_FILE.get_or_init(|| {
        Regex::new(r"^dictionary_\d{4}-\d{2}-\d{2}_\d{2}[:-]\d{2}[:-]\d{2}\.json$")
            .expect("static pattern")
    })
}

/// Loads and persists snapshots in a local versions directory, falling back
/// to a remote source for versions not yet cached.
pub struct VersionStore {
    versions_dir: PathBuf,
    remote: Option<Box<dyn RemoteSource>>,
}

impl VersionStore {
    /// Open a store, creating the versions directory if needed.
    pub fn new(
        versions_dir: impl Into<PathBuf>,
        remote: Option<Box<dyn RemoteSource>>,
    ) -> LexiconResult<Self> {
        let versions_dir = versions_dir.into();
        fs::create_dir_all(&versions_dir).map_err(|e| LexiconError::io_at(&versions_dir, e))?;
        Ok(Self {
            versions_dir,
            remote,
        })
    }

    pub fn versions_dir(&self) -> &Path {
        &self.versions_dir
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Local snapshot path of a version
    pub fn local_path(&self, id: VersionId) -> PathBuf {
        self.versions_dir.join(id.local_file_name())
    }

    pub fn is_installed(&self, id: VersionId) -> bool {
        self.local_path(id).is_file()
    }

    /// Materialize the snapshot of `version`.
    ///
    /// Returns the installed snapshot without I/O when already loaded.
    /// Otherwise reads the local copy, or downloads the document and caches
    /// it atomically once it has parsed.
    ///
    /// # Errors
    ///
    /// - `Download` if the remote fetch fails or no remote is configured
    /// - `Corruption` if the document is malformed
    /// - `Io` if the local copy cannot be read or written
    ///
    /// A failed load leaves the version unloaded so it can be retried.
    pub fn load(&self, version: &DictionaryVersion) -> LexiconResult<Arc<Snapshot>> {
        if let Some(snapshot) = version.snapshot() {
            return Ok(snapshot);
        }

        let id = version.id();
        let local_path = self.local_path(id);

        let snapshot = if local_path.is_file() {
            log_event_with_fields(Event::SnapshotCacheHit, &[("version", &id.name())]);
            let bytes = fs::read(&local_path).map_err(|e| LexiconError::io_at(&local_path, e))?;
            SnapshotDocument::from_slice(&bytes)?.into_snapshot(id)?
        } else {
            let bytes = self.download(id)?;
            let snapshot = SnapshotDocument::from_slice(&bytes)?.into_snapshot(id)?;
            write_atomic(&local_path, &bytes)?;
            snapshot
        };

        log_event_with_fields(
            Event::SnapshotLoaded,
            &[("terms", &snapshot.terms.len().to_string()), ("version", &id.name())],
        );
        Ok(version.install(snapshot))
    }

    fn download(&self, id: VersionId) -> LexiconResult<Vec<u8>> {
        let remote_name = id.remote_file_name();
        let remote = self.remote.as_ref().ok_or_else(|| {
            LexiconError::download(&remote_name, "not installed locally and no remote configured")
        })?;

        log_event_with_fields(
            Event::SnapshotDownload,
            &[("remote", &remote.location()), ("version", &id.name())],
        );
        remote.fetch(&remote_name)
    }

    /// Persist the snapshot of a newly built version.
    pub fn save(&self, id: VersionId, snapshot: &Snapshot) -> LexiconResult<PathBuf> {
        let path = self.local_path(id);
        let json = SnapshotDocument::from_snapshot(id, snapshot).to_json()?;
        write_atomic(&path, json.as_bytes())?;
        log_event_with_fields(Event::SnapshotSaved, &[("path", &path.display().to_string())]);
        Ok(path)
    }

    /// Versions present in the local directory, oldest first.
    pub fn installed_versions(&self) -> LexiconResult<Vec<VersionId>> {
        let entries = fs::read_dir(&self.versions_dir)
            .map_err(|e| LexiconError::io_at(&self.versions_dir, e))?;

        let pattern = installed_file_pattern();
        let mut ids: Vec<VersionId> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| pattern.is_match(name))
            .filter_map(|name| VersionId::parse(&name).ok())
            .collect();
        ids.sort();
        Ok(ids)
    }

    pub fn latest_installed(&self) -> LexiconResult<Option<VersionId>> {
        Ok(self.installed_versions()?.last().copied())
    }

    /// Versions published on the remote, newest first. Empty without a remote.
    pub fn available_versions(&self) -> LexiconResult<Vec<VersionId>> {
        match &self.remote {
            Some(remote) => remote
                .list()?
                .iter()
                .map(|name| VersionId::parse(name))
                .collect(),
            None => Ok(Vec::new()),
        }
    }

    /// Newest known version, remote or installed.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when no version exists anywhere.
    pub fn latest_version(&self) -> LexiconResult<VersionId> {
        let remote_latest = self.available_versions()?.into_iter().max();
        let local_latest = self.latest_installed()?;
        remote_latest.max(local_latest).ok_or_else(|| {
            LexiconError::Configuration(format!(
                "no dictionary version installed in {} or available remotely",
                self.versions_dir.display()
            ))
        })
    }
}
