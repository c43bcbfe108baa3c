//! Shared configuration for graphly consumers.
//!
//! TOML profiles (app id, redirect URI, scope, cache location), the
//! platform config path, and a file-backed [`TokenStore`] that persists
//! session state across launches -- with the token secret optionally in
//! the OS keyring instead of plaintext.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use graphly_api::TokenStore;
use graphly_core::FacebookConfig;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no profile named '{profile}'")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Named application profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            profiles: HashMap::new(),
        }
    }
}

/// A named application profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Facebook application id.
    pub app_id: String,

    /// OAuth redirect URI. Defaults to Facebook's login-success page.
    pub redirect_uri: Option<String>,

    /// Comma-separated permission scope to request.
    pub scope: Option<String>,

    /// Root directory for the object/photo cache. Absent means the
    /// platform cache dir.
    pub cache_dir: Option<PathBuf>,

    /// Per-request timeout in seconds.
    pub timeout: Option<u64>,
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "airheart", "graphly")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Resolve where the session key-value file lives.
pub fn session_path() -> PathBuf {
    project_dirs().map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("session.toml");
            p
        },
        |dirs| dirs.config_dir().join("session.toml"),
    )
}

/// Resolve the default cache directory.
pub fn default_cache_dir() -> PathBuf {
    project_dirs().map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("cache");
            p
        },
        |dirs| dirs.cache_dir().to_path_buf(),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("graphly");
    p
}

// ── Config loading / saving ─────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("GRAPHLY_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Profile resolution ──────────────────────────────────────────────

/// Pick a profile by name, falling back to the config's default.
pub fn resolve_profile<'a>(
    config: &'a Config,
    name: Option<&'a str>,
) -> Result<(&'a str, &'a Profile), ConfigError> {
    let name = name
        .or(config.default_profile.as_deref())
        .unwrap_or("default");
    config
        .profiles
        .get(name)
        .map(|profile| (name, profile))
        .ok_or_else(|| ConfigError::UnknownProfile {
            profile: name.to_owned(),
        })
}

/// Build a [`FacebookConfig`] from a profile.
pub fn profile_to_facebook_config(profile: &Profile) -> Result<FacebookConfig, ConfigError> {
    if profile.app_id.is_empty() {
        return Err(ConfigError::Validation {
            field: "app_id".into(),
            reason: "must not be empty".into(),
        });
    }

    let mut config = FacebookConfig::new(profile.app_id.clone());
    if let Some(uri) = &profile.redirect_uri {
        config.redirect_uri.clone_from(uri);
    }
    config.permissions = profile.scope.clone();
    config.cache_dir = Some(
        profile
            .cache_dir
            .clone()
            .unwrap_or_else(default_cache_dir),
    );
    if let Some(secs) = profile.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    Ok(config)
}

// ── File-backed token store ─────────────────────────────────────────

/// [`TokenStore`] persisting session values to a TOML key-value file.
///
/// The access token itself goes to the OS keyring when enabled, so the
/// plaintext file only ever holds expiry/permissions/user-id bookkeeping.
/// Persistence is best-effort: failures log and the in-memory session
/// carries on.
pub struct FileTokenStore {
    path: PathBuf,
    keyring_service: Option<String>,
    values: RwLock<HashMap<String, String>>,
}

impl FileTokenStore {
    /// Open the store at the canonical session path, keyring enabled.
    pub fn open() -> Self {
        Self::at_path(session_path(), Some("graphly".into()))
    }

    /// Open a store at an explicit path. `keyring_service` of `None`
    /// keeps every key in the file (tests, containers without a keyring).
    pub fn at_path(path: PathBuf, keyring_service: Option<String>) -> Self {
        let values = RwLock::new(read_values(&path));
        Self {
            path,
            keyring_service,
            values,
        }
    }

    fn is_secret(key: &str) -> bool {
        key == graphly_api::session::keys::ACCESS_TOKEN
    }

    fn keyring_entry(&self, key: &str) -> Option<keyring::Entry> {
        let service = self.keyring_service.as_deref()?;
        if !Self::is_secret(key) {
            return None;
        }
        keyring::Entry::new(service, key).ok()
    }

    fn persist(&self) {
        let values = self.values.read().expect("token store lock poisoned");
        if let Err(e) = write_values(&self.path, &values) {
            warn!(path = %self.path.display(), error = %e, "session store write failed");
        }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        if let Some(entry) = self.keyring_entry(key) {
            if let Ok(secret) = entry.get_password() {
                return Some(secret);
            }
        }
        self.values
            .read()
            .expect("token store lock poisoned")
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(entry) = self.keyring_entry(key) {
            if entry.set_password(value).is_ok() {
                return;
            }
            warn!(key, "keyring write failed -- falling back to file");
        }
        self.values
            .write()
            .expect("token store lock poisoned")
            .insert(key.to_owned(), value.to_owned());
        self.persist();
    }

    fn remove(&self, key: &str) {
        if let Some(entry) = self.keyring_entry(key) {
            let _ = entry.delete_credential();
        }
        self.values
            .write()
            .expect("token store lock poisoned")
            .remove(key);
        self.persist();
    }
}

fn read_values(path: &std::path::Path) -> HashMap<String, String> {
    let Ok(raw) = std::fs::read_to_string(path) else {
        return HashMap::new();
    };
    match toml::from_str(&raw) {
        Ok(values) => values,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "session store unreadable -- starting fresh");
            HashMap::new()
        }
    }
}

fn write_values(path: &std::path::Path, values: &HashMap<String, String>) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(values)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
