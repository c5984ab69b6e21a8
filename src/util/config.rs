//! Runtime configuration: defaults, then `config.json` in the platform config
//! directory, then `.env` / environment overrides.

use std::{fs, io, path::PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;
use tracing::Level;

use crate::domain::StaleQuotePolicy;
use crate::infra::api::DEFAULT_BASE_URL;

const APP_QUALIFIER: &str = "br";
const APP_ORG: &str = "ShippingConsole";
const APP_NAME: &str = "ShippingConsole";

pub const ENV_API_URL: &str = "SHIPPING_API_URL";
pub const ENV_LOG_LEVEL: &str = "SHIPPING_LOG";
pub const ENV_STALE_QUOTES: &str = "SHIPPING_STALE_QUOTES";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub log_level: String,
    /// How the hire page treats quotes that arrive for an outdated selection.
    pub stale_quotes: StaleQuotePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            log_level: "info".to_string(),
            stale_quotes: StaleQuotePolicy::default(),
        }
    }
}

/// Shape of `config.json`; every key is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub stale_quotes: Option<StaleQuotePolicy>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}

impl AppConfig {
    /// Loads the layered configuration. A broken config file is reported and skipped.
    pub fn load() -> Self {
        // .env is optional
        let _ = dotenvy::dotenv();

        let file = match load_config_file() {
            Ok(file) => file,
            Err(err) => {
                eprintln!("Ignoring unreadable config file: {err}");
                None
            }
        };

        Self::default()
            .merge_file(file.unwrap_or_default())
            .merge_env(|key| std::env::var(key).ok())
    }

    pub fn merge_file(mut self, file: ConfigFile) -> Self {
        if let Some(url) = non_blank(file.api_base_url) {
            self.api_base_url = url;
        }
        if let Some(level) = non_blank(file.log_level) {
            self.log_level = level;
        }
        if let Some(policy) = file.stale_quotes {
            self.stale_quotes = policy;
        }
        self
    }

    pub fn merge_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = non_blank(lookup(ENV_API_URL)) {
            self.api_base_url = url;
        }
        if let Some(level) = non_blank(lookup(ENV_LOG_LEVEL)) {
            self.log_level = level;
        }
        if let Some(policy) = non_blank(lookup(ENV_STALE_QUOTES))
            .as_deref()
            .and_then(StaleQuotePolicy::parse)
        {
            self.stale_quotes = policy;
        }
        self
    }

    /// Log level for the subscriber; unknown names fall back to `INFO`.
    pub fn tracing_level(&self) -> Level {
        self.log_level.trim().parse().unwrap_or(Level::INFO)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

fn config_file_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join("config.json"))
}

/// Reads `config.json`; `Ok(None)` when there is none.
pub fn load_config_file() -> Result<Option<ConfigFile>, ConfigError> {
    let Some(path) = config_file_path() else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&data)?))
}
