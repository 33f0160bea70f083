//! Application configuration.
//!
//! Values come from `~/.config/crate-digger/config.toml`, overridden by
//! environment variables. The loaded [`AppConfig`] is a plain value handed to
//! the components that need it; nothing reads configuration lazily.
//!
//! ```toml
//! [discogs]
//! key = "..."
//! secret = "..."
//!
//! [spotify]
//! client_id = "..."
//! client_secret = "..."
//!
//! [users]
//! discodan = "Dan"
//!
//! [session]
//! list_ttl_secs = 300
//! choice_ttl_secs = 60
//! page_size = 10
//!
//! [matching]
//! coarse_threshold = 0.4
//! title_threshold = 0.8
//!
//! [database]
//! path = "/srv/crate-digger/collection.db"
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::MatchThresholds;
use crate::directory::UserDirectory;
use crate::error::ConfigError;

const DEFAULT_USER_AGENT: &str = concat!("crate-digger/", env!("CARGO_PKG_VERSION"));
const DEFAULT_LIST_TTL_SECS: u64 = 5 * 60;
const DEFAULT_CHOICE_TTL_SECS: u64 = 60;
const DEFAULT_PAGE_SIZE: usize = 10;

/// Where a configuration value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Loaded from an environment variable.
    EnvVar(&'static str),
    /// Loaded from the config file.
    ConfigFile,
    /// Built-in default.
    Default,
    /// Not set anywhere.
    Missing,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
            Self::Missing => write!(f, "not set"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscogsSettings {
    pub key: Option<String>,
    pub secret: Option<String>,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifySettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

/// Interactive session timing and layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Lifetime of list and random-pick sessions.
    pub list_ttl: Duration,
    /// Lifetime of single-choice sessions.
    pub choice_ttl: Duration,
    pub page_size: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            list_ttl: Duration::from_secs(DEFAULT_LIST_TTL_SECS),
            choice_ttl: Duration::from_secs(DEFAULT_CHOICE_TTL_SECS),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub discogs: DiscogsSettings,
    pub spotify: SpotifySettings,
    pub users: UserDirectory,
    pub session: SessionSettings,
    pub matching: MatchThresholds,
    pub database_path: PathBuf,
    /// Provenance of each string-valued setting, keyed by `section.field`.
    pub sources: BTreeMap<&'static str, ValueSource>,
}

// ── File format ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, serde::Deserialize)]
struct ConfigFile {
    discogs: Option<DiscogsSection>,
    spotify: Option<SpotifySection>,
    #[serde(default)]
    users: HashMap<String, String>,
    session: Option<SessionSection>,
    matching: Option<MatchingSection>,
    database: Option<DatabaseSection>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct DiscogsSection {
    key: Option<String>,
    secret: Option<String>,
    user_agent: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct SpotifySection {
    client_id: Option<String>,
    client_secret: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct SessionSection {
    list_ttl_secs: Option<u64>,
    choice_ttl_secs: Option<u64>,
    page_size: Option<usize>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct MatchingSection {
    coarse_threshold: Option<f64>,
    title_threshold: Option<f64>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct DatabaseSection {
    path: Option<PathBuf>,
}

// ── Loading ─────────────────────────────────────────────────────────────────

/// Return the path to the config file.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("crate-digger").join("config.toml"))
}

/// Default location of the collection database.
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("crate-digger")
        .join("collection.db")
}

impl AppConfig {
    /// Load from the default config file (if present) and the process environment.
    ///
    /// Priority: env vars > config file > defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Self::from_file(ConfigFile::default(), |key| std::env::var(key).ok()),
        }
    }

    /// Load from an explicit config file and the process environment.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        log::debug!("Loading config from {}", path.display());
        Self::from_toml_str(&content, |key| std::env::var(key).ok())
    }

    /// Build from TOML text and an environment lookup.
    pub fn from_toml_str(
        content: &str,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        Self::from_file(file, env)
    }

    fn from_file(
        file: ConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut sources = BTreeMap::new();
        let discogs_file = file.discogs.unwrap_or_default();
        let spotify_file = file.spotify.unwrap_or_default();
        let session_file = file.session.unwrap_or_default();
        let matching_file = file.matching.unwrap_or_default();

        let mut pick = |key: &'static str, var: Option<&'static str>, from_file: Option<String>| {
            let from_env = var.and_then(|v| env(v).filter(|s| !s.is_empty()).map(|s| (v, s)));
            let (value, source) = match (from_env, from_file) {
                (Some((v, s)), _) => (Some(s), ValueSource::EnvVar(v)),
                (None, Some(s)) => (Some(s), ValueSource::ConfigFile),
                (None, None) => (None, ValueSource::Missing),
            };
            sources.insert(key, source);
            value
        };

        let discogs_key = pick("discogs.key", Some("DISCOGS_KEY"), discogs_file.key);
        let discogs_secret = pick("discogs.secret", Some("DISCOGS_SECRET"), discogs_file.secret);
        let user_agent = pick("discogs.user_agent", None, discogs_file.user_agent);
        let client_id = pick(
            "spotify.client_id",
            Some("SPOTIFY_CLIENT_ID"),
            spotify_file.client_id,
        );
        let client_secret = pick(
            "spotify.client_secret",
            Some("SPOTIFY_CLIENT_SECRET"),
            spotify_file.client_secret,
        );
        let database_path = pick(
            "database.path",
            Some("CRATE_DIGGER_DB"),
            file.database
                .and_then(|d| d.path)
                .map(|p| p.to_string_lossy().into_owned()),
        );

        let user_agent = user_agent.unwrap_or_else(|| {
            sources.insert("discogs.user_agent", ValueSource::Default);
            DEFAULT_USER_AGENT.to_string()
        });
        let database_path = database_path.map(PathBuf::from).unwrap_or_else(|| {
            sources.insert("database.path", ValueSource::Default);
            default_database_path()
        });

        let session = SessionSettings {
            list_ttl: Duration::from_secs(ttl_secs(
                "session.list_ttl_secs",
                session_file.list_ttl_secs,
                DEFAULT_LIST_TTL_SECS,
            )?),
            choice_ttl: Duration::from_secs(ttl_secs(
                "session.choice_ttl_secs",
                session_file.choice_ttl_secs,
                DEFAULT_CHOICE_TTL_SECS,
            )?),
            page_size: match session_file.page_size {
                Some(0) => return Err(ConfigError::invalid("session.page_size", "must be at least 1")),
                Some(n) => n,
                None => DEFAULT_PAGE_SIZE,
            },
        };

        let defaults = MatchThresholds::default();
        let matching = MatchThresholds {
            coarse: threshold(
                "matching.coarse_threshold",
                matching_file.coarse_threshold,
                defaults.coarse,
            )?,
            title: threshold(
                "matching.title_threshold",
                matching_file.title_threshold,
                defaults.title,
            )?,
        };

        Ok(Self {
            discogs: DiscogsSettings {
                key: discogs_key,
                secret: discogs_secret,
                user_agent,
            },
            spotify: SpotifySettings {
                client_id,
                client_secret,
            },
            users: UserDirectory::new(file.users),
            session,
            matching,
            database_path,
            sources,
        })
    }

    /// Source of a setting, `Missing` if the key is unknown.
    pub fn source(&self, key: &str) -> &ValueSource {
        self.sources.get(key).unwrap_or(&ValueSource::Missing)
    }
}

fn ttl_secs(key: &str, value: Option<u64>, default: u64) -> Result<u64, ConfigError> {
    match value {
        Some(0) => Err(ConfigError::invalid(key, "must be at least 1 second")),
        Some(n) => Ok(n),
        None => Ok(default),
    }
}

fn threshold(key: &str, value: Option<f64>, default: f64) -> Result<f64, ConfigError> {
    match value {
        Some(t) if !(0.0..=1.0).contains(&t) => {
            Err(ConfigError::invalid(key, format!("{t} is outside [0, 1]")))
        }
        Some(t) => Ok(t),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml_str("", no_env).unwrap();
        assert_eq!(config.discogs.key, None);
        assert_eq!(config.session, SessionSettings::default());
        assert_eq!(config.matching, MatchThresholds::default());
        assert!(config.users.is_empty());
        assert_eq!(config.source("discogs.key"), &ValueSource::Missing);
        assert_eq!(config.source("discogs.user_agent"), &ValueSource::Default);
        assert_eq!(config.source("database.path"), &ValueSource::Default);
    }

    #[test]
    fn test_file_values() {
        let toml = r#"
            [discogs]
            key = "file-key"
            secret = "file-secret"

            [users]
            DiscoDan = "Dan"

            [session]
            list_ttl_secs = 120
            page_size = 5

            [matching]
            title_threshold = 0.75

            [database]
            path = "/tmp/collection.db"
        "#;
        let config = AppConfig::from_toml_str(toml, no_env).unwrap();
        assert_eq!(config.discogs.key.as_deref(), Some("file-key"));
        assert_eq!(config.source("discogs.key"), &ValueSource::ConfigFile);
        assert_eq!(config.users.resolve("discodan"), Some("Dan"));
        assert_eq!(config.session.list_ttl, Duration::from_secs(120));
        assert_eq!(config.session.choice_ttl, Duration::from_secs(60));
        assert_eq!(config.session.page_size, 5);
        assert_eq!(config.matching.coarse, 0.4);
        assert_eq!(config.matching.title, 0.75);
        assert_eq!(config.database_path, PathBuf::from("/tmp/collection.db"));
    }

    #[test]
    fn test_env_overrides_file() {
        let toml = r#"
            [discogs]
            key = "file-key"
        "#;
        let env = |key: &str| match key {
            "DISCOGS_KEY" => Some("env-key".to_string()),
            "CRATE_DIGGER_DB" => Some("/var/db.sqlite".to_string()),
            _ => None,
        };
        let config = AppConfig::from_toml_str(toml, env).unwrap();
        assert_eq!(config.discogs.key.as_deref(), Some("env-key"));
        assert_eq!(config.source("discogs.key"), &ValueSource::EnvVar("DISCOGS_KEY"));
        assert_eq!(config.database_path, PathBuf::from("/var/db.sqlite"));
    }

    #[test]
    fn test_empty_env_value_is_ignored() {
        let env = |key: &str| (key == "DISCOGS_SECRET").then(String::new);
        let config = AppConfig::from_toml_str("", env).unwrap();
        assert_eq!(config.discogs.secret, None);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(
            AppConfig::from_toml_str("[session]\npage_size = 0", no_env),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            AppConfig::from_toml_str("[session]\nchoice_ttl_secs = 0", no_env),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            AppConfig::from_toml_str("[matching]\ncoarse_threshold = 1.5", no_env),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            AppConfig::from_toml_str("[discogs\n", no_env),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[spotify]\nclient_id = \"abc\"\n").unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.spotify.client_id.as_deref(), Some("abc"));
    }
}
