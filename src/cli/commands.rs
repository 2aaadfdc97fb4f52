//! CLI command implementations
//!
//! Commands are read-only administration of the versions directory: they
//! resolve, download and inspect versions but never build new ones, since
//! building needs a relation graph engine.
//!
//! Each command computes a JSON value; `run_command` prints it.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::config::Config;
use crate::defaults::DefaultVersion;
use crate::diff::DiffResolver;
use crate::observability::{Logger, Severity};
use crate::store::{SnapshotDocument, VersionStore};
use crate::version::{DictionaryVersion, VersionRegistry};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Identifier accepted by commands in place of a version for the default one
pub const DEFAULT_KEYWORD: &str = "default";

/// Components a command runs against, opened from the configuration file.
pub struct Session {
    registry: Arc<VersionRegistry>,
    store: Arc<VersionStore>,
    resolver: DiffResolver,
    defaults: DefaultVersion,
}

impl Session {
    pub fn open(config_path: &Path) -> CliResult<Self> {
        let config = Config::load(config_path)?;
        Self::from_config(&config)
    }

    pub fn from_config(config: &Config) -> CliResult<Self> {
        let registry = Arc::new(VersionRegistry::new(config.default_version.clone()));
        let store = Arc::new(config.open_store()?);
        Ok(Self {
            resolver: DiffResolver::new(Arc::clone(&registry), Arc::clone(&store)),
            defaults: DefaultVersion::new(Arc::clone(&registry), Arc::clone(&store)),
            registry,
            store,
        })
    }

    /// Resolve a command-line version argument
    pub fn resolve(&self, identifier: &str) -> CliResult<Arc<DictionaryVersion>> {
        if identifier == DEFAULT_KEYWORD {
            return Ok(self.defaults.get()?);
        }
        Ok(self.registry.resolve(identifier)?)
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    if cli.quiet {
        Logger::set_min_severity(Severity::Warn);
    }
    run_command(&cli.config, cli.command)
}

/// Run the appropriate command and print its result
pub fn run_command(config_path: &Path, cmd: Command) -> CliResult<()> {
    let session = Session::open(config_path)?;
    let data = execute(&session, cmd)?;
    write_response(data)
}

/// Run a command against an open session
pub fn execute(session: &Session, cmd: Command) -> CliResult<Value> {
    match cmd {
        Command::List { remote } => list(session, remote),
        Command::Fetch { version } => fetch(session, &version),
        Command::Show { version } => show(session, &version),
        Command::Migrate { from, to, terms } => migrate(session, &from, to.as_deref(), &terms),
        Command::Phonetic { version } => phonetic(session, &version),
        Command::Default => default(session),
    }
}

/// Installed versions (oldest first) or remote versions (newest first)
pub fn list(session: &Session, remote: bool) -> CliResult<Value> {
    if remote && !session.store.has_remote() {
        return Err(CliError::config_error("no versions_url configured"));
    }
    let ids = if remote {
        session.store.available_versions()?
    } else {
        session.store.installed_versions()?
    };
    let names: Vec<String> = ids.iter().map(|id| id.name()).collect();
    Ok(json!({ "versions": names }))
}

/// Ensure a version is cached locally
pub fn fetch(session: &Session, identifier: &str) -> CliResult<Value> {
    let version = session.resolve(identifier)?;
    let snapshot = session.store.load(&version)?;
    Ok(json!({
        "version": version.name(),
        "path": session.store.local_path(version.id()).display().to_string(),
        "terms": snapshot.terms.len(),
    }))
}

/// Full snapshot document of a version
pub fn show(session: &Session, identifier: &str) -> CliResult<Value> {
    let version = session.resolve(identifier)?;
    let snapshot = session.store.load(&version)?;
    let document = SnapshotDocument::from_snapshot(version.id(), &snapshot);
    Ok(serde_json::to_value(document)?)
}

/// Old term -> current term mapping
pub fn migrate(
    session: &Session,
    from: &str,
    to: Option<&str>,
    terms: &[String],
) -> CliResult<Value> {
    let older = session.resolve(from)?;
    let newer = session.resolve(to.unwrap_or(DEFAULT_KEYWORD))?;
    let mapping = session.resolver.migrate(&newer, &older)?;

    let selected: BTreeMap<&str, &str> = if terms.is_empty() {
        mapping.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    } else {
        let mut selected = BTreeMap::new();
        for term in terms {
            let current = mapping
                .get(term)
                .ok_or_else(|| CliError::unknown_term(term, &older.name()))?;
            selected.insert(term.as_str(), current.as_str());
        }
        selected
    };

    Ok(json!({
        "from": older.name(),
        "to": newer.name(),
        "mapping": selected,
    }))
}

/// Phonetic alias -> term mapping
pub fn phonetic(session: &Session, identifier: &str) -> CliResult<Value> {
    let version = session.resolve(identifier)?;
    let snapshot = session.store.load(&version)?;
    Ok(json!({
        "version": version.name(),
        "aliases": snapshot.phonetic_mapping(),
    }))
}

pub fn default(session: &Session) -> CliResult<Value> {
    let version = session.defaults.get()?;
    Ok(json!({ "version": version.name() }))
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const V0: &str = r#"{"version": "2020-01-01_00:00:00", "terms": ["A", "B"], "roots": ["A"],
        "inhibitions": {}, "translations": {"en": {"A": "alpha", "B": "beta"}}}"#;

    const V1: &str = r#"{"version": "2020-02-01_00:00:00", "terms": ["A", "B2"], "roots": ["A"],
        "inhibitions": {}, "translations": {"en": {"A": "alpha", "B2": "beta"}},
        "diff": {"dictionary_2020-01-01_00:00:00": {"B": "B2"}},
        "history": {"dictionary_2020-02-01_00:00:00": {"B": "-", "B2": "+"}}}"#;

    fn create_config(temp_dir: &TempDir) -> std::path::PathBuf {
        let versions = temp_dir.path().join("versions");
        let mirror = temp_dir.path().join("mirror");
        fs::create_dir_all(&mirror).unwrap();
        fs::write(mirror.join("dictionary_2020-01-01_00:00:00.json"), V0).unwrap();
        fs::write(mirror.join("dictionary_2020-02-01_00:00:00.json"), V1).unwrap();

        let config_path = temp_dir.path().join("lexicon.json");
        let config = json!({
            "versions_dir": versions.to_string_lossy(),
            "versions_url": mirror.to_string_lossy(),
            "languages": ["en"],
        });
        fs::write(&config_path, config.to_string()).unwrap();
        config_path
    }

    #[test]
    fn test_fetch_then_list() {
        let temp_dir = TempDir::new().unwrap();
        let session = Session::open(&create_config(&temp_dir)).unwrap();

        assert_eq!(list(&session, false).unwrap()["versions"], json!([]));
        fetch(&session, "2020-01-01_00:00:00").unwrap();
        assert_eq!(
            list(&session, false).unwrap()["versions"],
            json!(["dictionary_2020-01-01_00:00:00"])
        );
        assert_eq!(
            list(&session, true).unwrap()["versions"],
            json!(["dictionary_2020-02-01_00:00:00", "dictionary_2020-01-01_00:00:00"])
        );
    }

    #[test]
    fn test_migrate_to_default() {
        let temp_dir = TempDir::new().unwrap();
        let session = Session::open(&create_config(&temp_dir)).unwrap();

        let result = migrate(&session, "2020-01-01_00:00:00", None, &[]).unwrap();
        assert_eq!(result["to"], "dictionary_2020-02-01_00:00:00");
        assert_eq!(result["mapping"], json!({"A": "A", "B": "B2"}));
    }

    #[test]
    fn test_migrate_unknown_term() {
        let temp_dir = TempDir::new().unwrap();
        let session = Session::open(&create_config(&temp_dir)).unwrap();

        let err = migrate(
            &session,
            "2020-01-01_00:00:00",
            Some("2020-02-01_00:00:00"),
            &["Q".to_string()],
        )
        .unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::UnknownTerm);
    }

    #[test]
    fn test_show_and_phonetic() {
        let temp_dir = TempDir::new().unwrap();
        let session = Session::open(&create_config(&temp_dir)).unwrap();

        let shown = show(&session, "dictionary_2020-02-01_00:00:00").unwrap();
        assert_eq!(shown["terms"], json!(["A", "B2"]));
        assert_eq!(shown["diff"]["dictionary_2020-01-01_00:00:00"]["B"], "B2");

        let aliases = phonetic(&session, "2020-02-01_00:00:00").unwrap();
        assert_eq!(aliases["aliases"]["B2"], "B2");
    }

    #[test]
    fn test_missing_config_file() {
        let err = Session::open(Path::new("/nonexistent/lexicon.json")).err().unwrap();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_bad_version_argument() {
        let temp_dir = TempDir::new().unwrap();
        let session = Session::open(&create_config(&temp_dir)).unwrap();
        let err = fetch(&session, "yesterday").unwrap_err();
        assert_eq!(err.code_str(), "LEX_IDENTITY_RESOLUTION");
    }
}
