//! Bootstrap configuration loading
//!
//! Settings come from a single TOML file. Resolution order for the file path:
//! 1. Command-line argument (highest priority)
//! 2. `EDUAI_CONFIG` environment variable
//! 3. `<config_dir>/eduai/eduai.toml`
//!
//! A missing file is never fatal: a warning is logged and compiled defaults
//! are used. A file that exists but cannot be parsed is a configuration error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "EDUAI_CONFIG";

/// Bootstrap configuration loaded from TOML
///
/// Read once at startup. The service must restart to pick up changes.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted request body (CSV uploads)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Accuracy figure reported alongside predictions, in percent
    #[serde(default = "default_model_accuracy")]
    pub model_accuracy: f64,

    #[serde(default)]
    pub models: ModelPaths,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Locations of the four pre-trained model artifacts
///
/// Relative file names resolve against `dir`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelPaths {
    #[serde(default = "default_models_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_scaler_file")]
    pub scaler: PathBuf,
    #[serde(default = "default_regressor_file")]
    pub regressor: PathBuf,
    #[serde(default = "default_cluster_file")]
    pub cluster: PathBuf,
    #[serde(default = "default_classifier_file")]
    pub classifier: PathBuf,
}

/// Session marker settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Shared secret for session hashes. 0 disables checking.
    #[serde(default)]
    pub shared_secret: i64,

    /// Oldest accepted session timestamp, in milliseconds
    #[serde(default = "default_max_age_ms")]
    pub max_age_ms: i64,

    /// Largest accepted clock skew into the future, in milliseconds
    #[serde(default = "default_max_skew_ms")]
    pub max_skew_ms: i64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_model_accuracy() -> f64 {
    85.5
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_scaler_file() -> PathBuf {
    PathBuf::from("scaler.json")
}

fn default_regressor_file() -> PathBuf {
    PathBuf::from("regression_model.json")
}

fn default_cluster_file() -> PathBuf {
    PathBuf::from("kmeans_model.json")
}

fn default_classifier_file() -> PathBuf {
    PathBuf::from("naive_bayes_model.json")
}

fn default_max_age_ms() -> i64 {
    5 * 60 * 1000
}

fn default_max_skew_ms() -> i64 {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
            model_accuracy: default_model_accuracy(),
            models: ModelPaths::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self {
            dir: default_models_dir(),
            scaler: default_scaler_file(),
            regressor: default_regressor_file(),
            cluster: default_cluster_file(),
            classifier: default_classifier_file(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            shared_secret: 0,
            max_age_ms: default_max_age_ms(),
            max_skew_ms: default_max_skew_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ModelPaths {
    /// Models directory rooted at `dir`, default file names
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    fn resolve(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.dir.join(file)
        }
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.resolve(&self.scaler)
    }

    pub fn regressor_path(&self) -> PathBuf {
        self.resolve(&self.regressor)
    }

    pub fn cluster_path(&self) -> PathBuf {
        self.resolve(&self.cluster)
    }

    pub fn classifier_path(&self) -> PathBuf {
        self.resolve(&self.classifier)
    }
}

impl TomlConfig {
    /// Parse a config file that is known to exist
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// `host:port` string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    UserConfigDir(PathBuf),
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::CommandLine(p) => write!(f, "command line ({})", p.display()),
            ConfigSource::Environment(p) => {
                write!(f, "{} ({})", CONFIG_ENV_VAR, p.display())
            }
            ConfigSource::UserConfigDir(p) => write!(f, "user config ({})", p.display()),
            ConfigSource::Defaults => write!(f, "compiled defaults"),
        }
    }
}

/// Configuration together with its origin
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: TomlConfig,
    pub source: ConfigSource,
}

/// Default user config file location for the platform
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("eduai").join("eduai.toml"))
}

/// Pick the config file to read, highest priority first
pub fn resolve_config_path(cli_arg: Option<&Path>) -> ConfigSource {
    if let Some(path) = cli_arg {
        return ConfigSource::CommandLine(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return ConfigSource::Environment(PathBuf::from(path));
        }
    }

    match user_config_path() {
        Some(path) if path.exists() => ConfigSource::UserConfigDir(path),
        _ => ConfigSource::Defaults,
    }
}

/// Resolve and load the bootstrap configuration
///
/// Missing files degrade to defaults with a warning.
pub fn load_config(cli_arg: Option<&Path>) -> Result<LoadedConfig> {
    let source = resolve_config_path(cli_arg);

    let path = match &source {
        ConfigSource::CommandLine(p)
        | ConfigSource::Environment(p)
        | ConfigSource::UserConfigDir(p) => p.clone(),
        ConfigSource::Defaults => {
            info!("No config file found, using compiled defaults");
            return Ok(LoadedConfig {
                config: TomlConfig::default(),
                source,
            });
        }
    };

    if !path.exists() {
        warn!(
            "Config file {} not found, using compiled defaults",
            path.display()
        );
        return Ok(LoadedConfig {
            config: TomlConfig::default(),
            source: ConfigSource::Defaults,
        });
    }

    let config = TomlConfig::from_file(&path)?;
    Ok(LoadedConfig { config, source })
}
