//! Shared configuration for Podium clients.
//!
//! TOML file + `PODIUM_` environment layering, application secret
//! resolution (env + keyring + plaintext), and translation to a ready
//! `podium_api::PodiumClient`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use podium_api::{
    ApplicationCredential, DEFAULT_BASE_URL, PodiumClient, ReqwestTransport, TlsMode,
    TransportConfig, application_registry,
};

const KEYRING_SERVICE: &str = "podium";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no secret configured for application '{application}'")]
    NoCredentials { application: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Client(#[from] podium_api::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// API host, e.g. "https://podium.live".
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Path to an extra CA certificate (PEM).
    pub ca_cert: Option<PathBuf>,

    /// Registered application used for token requests.
    pub application: Option<ApplicationConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            ca_cert: None,
            application: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_timeout() -> u64 {
    30
}

/// The `[application]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApplicationConfig {
    /// Application (client) id.
    pub id: String,

    /// Application secret (plaintext; prefer keyring or env var).
    pub secret: Option<String>,

    /// Environment variable name containing the secret.
    pub secret_env: Option<String>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("live", "podium", "podium").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("podium");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load config from `path` layered over defaults and under environment.
///
/// Nested keys use a double underscore: `PODIUM_APPLICATION__ID` sets
/// `application.id`, while `PODIUM_BASE_URL` sets `base_url`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("PODIUM_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config, returning a default if it can't be loaded.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Write config to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(&config_path(), cfg)
}

// ── Application secret ──────────────────────────────────────────────

fn keyring_entry(app_id: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{app_id}/secret"))
}

/// Resolve the application secret from the credential chain.
pub fn resolve_application_secret(app: &ApplicationConfig) -> Result<SecretString, ConfigError> {
    // 1. Configured env var
    if let Some(ref env_name) = app.secret_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(&app.id) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref secret) = app.secret {
        return Ok(SecretString::from(secret.clone()));
    }

    Err(ConfigError::NoCredentials {
        application: app.id.clone(),
    })
}

/// Resolve the full credential for the configured application.
pub fn resolve_application(app: &ApplicationConfig) -> Result<ApplicationCredential, ConfigError> {
    let secret = resolve_application_secret(app)?;
    Ok(ApplicationCredential::new(app.id.clone(), secret))
}

/// Store an application secret in the system keyring.
pub fn store_application_secret(app_id: &str, secret: &str) -> Result<(), ConfigError> {
    let keyring_err = |e: keyring::Error| ConfigError::Validation {
        field: "keyring".into(),
        reason: format!("failed to store application secret: {e}"),
    };
    keyring_entry(app_id)
        .map_err(keyring_err)?
        .set_password(secret)
        .map_err(keyring_err)
}

/// Register the configured application process-wide.
///
/// Returns `false` when the config has no `[application]` table.
pub fn register_configured_application(cfg: &Config) -> Result<bool, ConfigError> {
    let Some(app) = cfg.application.as_ref() else {
        return Ok(false);
    };
    application_registry().register(resolve_application(app)?);
    Ok(true)
}

// ── Client construction ─────────────────────────────────────────────

/// Parse and validate the configured host.
pub fn base_url(cfg: &Config) -> Result<Url, ConfigError> {
    let url: Url = cfg.base_url.parse().map_err(|_| ConfigError::Validation {
        field: "base_url".into(),
        reason: format!("invalid URL: {}", cfg.base_url),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("expected http or https, got '{}'", url.scheme()),
        });
    }
    Ok(url)
}

/// Transport settings derived from the config.
pub fn transport_config(cfg: &Config) -> TransportConfig {
    let tls = cfg
        .ca_cert
        .clone()
        .map_or(TlsMode::System, TlsMode::CustomCa);
    TransportConfig {
        tls,
        timeout: Duration::from_secs(cfg.timeout),
        ..TransportConfig::default()
    }
}

/// Build a client for the configured host.
///
/// Must be called from within a tokio runtime.
pub fn connect(cfg: &Config) -> Result<PodiumClient, ConfigError> {
    let transport = ReqwestTransport::new(&transport_config(cfg))?;
    Ok(PodiumClient::with_transport(base_url(cfg)?, Arc::new(transport)))
}
