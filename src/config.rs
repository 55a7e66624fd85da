//! Configuration for the intake service.
//!
//! Settings are layered file → environment → CLI. The file is TOML:
//!
//! ```toml
//! [api]
//! host = "0.0.0.0"
//! port = 8015
//! cors = true
//!
//! [database]
//! path = "intake.db"
//! busy_timeout_ms = 5000
//!
//! [messages]
//! locale = "ru"
//!
//! [logging]
//! json = false
//! ```
//!
//! Environment variables (a `.env` file is honoured) override the file:
//! `INTAKE_API_HOST`, `INTAKE_API_PORT`, `INTAKE_DB_PATH`, `INTAKE_LOCALE`,
//! `INTAKE_LOG_JSON`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::intake::messages::Locale;

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allow cross-origin requests from any origin.
    #[serde(default = "default_cors")]
    pub cors: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8015
}

fn default_cors() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: default_cors(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    /// How long a statement waits on a locked database before failing.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("intake.db")
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagesConfig {
    #[serde(default)]
    pub locale: Locale,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of human-readable ones.
    #[serde(default)]
    pub json: bool,
}

/// Complete application configuration, passed explicitly into the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub messages: MessagesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse intake config")
    }

    /// Load from `path` when given and present, otherwise start from defaults,
    /// then apply environment overrides.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) if p.exists() => Self::load(p)?,
            Some(p) => anyhow::bail!("Config file not found: {}", p.display()),
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `INTAKE_*` overrides using the given variable lookup.
    pub fn apply_env<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = var("INTAKE_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("INTAKE_API_PORT") {
            self.api.port = port
                .parse()
                .with_context(|| format!("Invalid INTAKE_API_PORT '{}'", port))?;
        }
        if let Some(path) = var("INTAKE_DB_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(locale) = var("INTAKE_LOCALE") {
            self.messages.locale = locale.parse()?;
        }
        if let Some(json) = var("INTAKE_LOG_JSON") {
            self.logging.json = json != "false" && json != "0";
        }
        Ok(())
    }

    /// Socket address string the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize intake config")
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.api.port == 0 {
            warnings.push("api.port is 0: the server will bind a random port".to_string());
        }
        if self.database.path.as_os_str().is_empty() {
            warnings.push("database.path is empty".to_string());
        }
        if self.database.busy_timeout_ms == 0 {
            warnings.push(
                "database.busy_timeout_ms is 0: concurrent writers fail immediately".to_string(),
            );
        }
        warnings
    }
}
