//! Remote snapshot sources
//!
//! A remote is a read-only location holding `dictionary_<date>.json`
//! objects under their canonical (never colon-substituted) names.

use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Url;

use crate::errors::{LexiconError, LexiconResult};
use crate::version::VersionId;

/// Read-only transport for published snapshots.
pub trait RemoteSource: Send + Sync {
    /// Fetch the raw bytes of a remote object.
    fn fetch(&self, remote_name: &str) -> LexiconResult<Vec<u8>>;

    /// Version names available remotely, newest first.
    fn list(&self) -> LexiconResult<Vec<String>>;

    /// Where this remote points, for logging
    fn location(&self) -> String;
}

/// Build a remote from a configured location.
///
/// `http://` and `https://` locations use [`HttpRemote`]; `file://` URLs and
/// bare paths use [`DirectoryRemote`].
pub fn remote_from_location(location: &str) -> LexiconResult<Box<dyn RemoteSource>> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpRemote::new(location)?))
    } else {
        let path = location.strip_prefix("file://").unwrap_or(location);
        Ok(Box::new(DirectoryRemote::new(path)))
    }
}

fn sort_newest_first(names: Vec<String>) -> Vec<String> {
    let mut ids: Vec<VersionId> = names
        .iter()
        .filter_map(|n| VersionId::parse(n).ok())
        .collect();
    ids.sort();
    ids.dedup();
    ids.into_iter().rev().map(|id| id.name()).collect()
}

/// HTTP(S) remote, typically an object-storage bucket.
pub struct HttpRemote {
    base: Url,
    client: reqwest::blocking::Client,
}

impl HttpRemote {
    pub fn new(base: &str) -> LexiconResult<Self> {
        let mut base = Url::parse(base).map_err(|e| {
            LexiconError::Configuration(format!("invalid versions url {:?}: {}", base, e))
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| LexiconError::Configuration(format!("cannot build http client: {}", e)))?;

        Ok(Self { base, client })
    }

    fn object_url(&self, remote_name: &str) -> LexiconResult<Url> {
        self.base
            .join(&format!("./{}", remote_name))
            .map_err(|e| LexiconError::download(remote_name, e))
    }

    fn get(&self, url: Url, target: &str) -> LexiconResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| LexiconError::download(target, e))?;
        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| LexiconError::download(target, e))
    }
}

impl RemoteSource for HttpRemote {
    fn fetch(&self, remote_name: &str) -> LexiconResult<Vec<u8>> {
        let url = self.object_url(remote_name)?;
        self.get(url, remote_name)
    }

    fn list(&self) -> LexiconResult<Vec<String>> {
        let listing = self.get(self.base.clone(), self.base.as_str())?;
        let body = String::from_utf8_lossy(&listing);
        Ok(sort_newest_first(parse_bucket_listing(&body)))
    }

    fn location(&self) -> String {
        self.base.to_string()
    }
}

static BUCKET_KEY: OnceLock<Regex> = OnceLock::new();

/// Extract version names from an S3 `ListBucketResult` body.
pub fn parse_bucket_listing(body: &str) -> Vec<String> {
    let key = BUCKET_KEY
        .get_or_init(|| Regex::new(r"<Key>(dictionary_[^<]+?)\.json</Key>").expect("static pattern"));
    key.captures_iter(body)
        .map(|c| c[1].to_string())
        .collect()
}

/// A directory mirroring the remote layout.
pub struct DirectoryRemote {
    root: PathBuf,
}

impl DirectoryRemote {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl RemoteSource for DirectoryRemote {
    fn fetch(&self, remote_name: &str) -> LexiconResult<Vec<u8>> {
        let canonical = self.root.join(remote_name);
        let substituted = self.root.join(remote_name.replace(':', "-"));
        let path = if canonical.is_file() { canonical } else { substituted };
        fs::read(&path).map_err(|e| LexiconError::download(remote_name, e))
    }

    fn list(&self) -> LexiconResult<Vec<String>> {
        let entries = fs::read_dir(&self.root)
            .map_err(|e| LexiconError::download(self.root.display().to_string(), e))?;
        let names = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("dictionary_") && name.ends_with(".json"))
            .collect();
        Ok(sort_newest_first(names))
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }
}
