//! Site configuration.
//!
//! # Responsibility
//! - Load operator settings from TOML.
//! - Validate settings once at startup so handlers can rely on them.
//!
//! # Invariants
//! - `site_url` is absolute (`http://` or `https://`) and has no trailing slash.
//! - `admin_email` passes the same syntax check as RSVP emails.
//! - `token_secret` is at least `MIN_TOKEN_SECRET_LEN` characters.

use crate::logging::default_log_level;
use crate::sanitize::is_valid_email;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const MIN_TOKEN_SECRET_LEN: usize = 16;

/// Operator settings shared by every request handler.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Base URL used to build event permalinks.
    pub site_url: String,
    /// Recipient of publication notices.
    pub admin_email: String,
    /// Key material for anti-forgery tokens.
    pub token_secret: String,
    /// SQLite file. In-memory storage is used when absent.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    /// Absolute directory for rolling log files. Logging stays off when absent.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: None,
        }
    }
}

fn default_level() -> String {
    default_log_level().to_string()
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid { field: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config syntax: {err}"),
            Self::Invalid { field, message } => write!(f, "invalid config `{field}`: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

impl SiteConfig {
    /// Builds an in-memory configuration; mostly useful for tooling and tests.
    pub fn new(
        site_url: impl Into<String>,
        admin_email: impl Into<String>,
        token_secret: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self {
            site_url: site_url.into(),
            admin_email: admin_email.into(),
            token_secret: token_secret.into(),
            database_path: None,
            logging: LoggingConfig::default(),
        };
        config.normalize()?;
        Ok(config)
    }

    /// Reads and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let mut config: SiteConfig = toml::from_str(raw)?;
        config.normalize()?;
        Ok(config)
    }

    /// Database file for callers that must persist between runs.
    pub fn require_database_path(&self) -> Result<&Path, ConfigError> {
        self.database_path
            .as_deref()
            .ok_or_else(|| ConfigError::Invalid {
                field: "database_path",
                message: "must be set to persist events between runs".to_string(),
            })
    }

    fn normalize(&mut self) -> Result<(), ConfigError> {
        let site_url = self.site_url.trim().trim_end_matches('/').to_string();
        if !(site_url.starts_with("http://") || site_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "site_url",
                message: format!("`{site_url}` must start with http:// or https://"),
            });
        }
        self.site_url = site_url;

        self.admin_email = self.admin_email.trim().to_string();
        if !is_valid_email(&self.admin_email) {
            return Err(ConfigError::Invalid {
                field: "admin_email",
                message: format!("`{}` is not a valid address", self.admin_email),
            });
        }

        if self.token_secret.chars().count() < MIN_TOKEN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                field: "token_secret",
                message: format!("must be at least {MIN_TOKEN_SECRET_LEN} characters"),
            });
        }

        if let Some(dir) = self.logging.dir.as_ref() {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid {
                    field: "logging.dir",
                    message: format!("`{}` must be an absolute path", dir.display()),
                });
            }
        }

        Ok(())
    }
}
