use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::view::OrderingPolicy;

pub const DEFAULT_CONFIG_FILE: &str = "emulator.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub server_url: String,
    pub request_timeout_ms: u64,
    pub ordering: OrderingPolicy,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".into(),
            request_timeout_ms: 10_000,
            ordering: OrderingPolicy::LastWriteWins,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    server_url: Option<String>,
    request_timeout_ms: Option<u64>,
    ordering: Option<OrderingPolicy>,
}

/// Defaults, then `emulator.toml` in the working directory, then environment.
pub fn load_settings() -> Result<ClientSettings, ConfigError> {
    load_settings_from(Path::new(DEFAULT_CONFIG_FILE), |name| std::env::var(name).ok())
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings, ConfigError> {
    let mut settings = ClientSettings::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg: FileSettings =
                toml::from_str(&raw).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?;
            if let Some(v) = file_cfg.server_url {
                settings.server_url = v;
            }
            if let Some(v) = file_cfg.request_timeout_ms {
                settings.request_timeout_ms = v;
            }
            if let Some(v) = file_cfg.ordering {
                settings.ordering = v;
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    if let Some(v) = env("EMULATOR_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_MS") {
        settings.request_timeout_ms = v.parse().map_err(|_| ConfigError::InvalidValue {
            key: "APP__REQUEST_TIMEOUT_MS",
            value: v.clone(),
        })?;
    }

    if let Some(v) = env("APP__ORDERING") {
        settings.ordering = parse_ordering(&v).ok_or(ConfigError::InvalidValue {
            key: "APP__ORDERING",
            value: v.clone(),
        })?;
    }

    validate_server_url(&settings.server_url)?;
    Ok(settings)
}

pub fn parse_ordering(raw: &str) -> Option<OrderingPolicy> {
    match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "last_write_wins" => Some(OrderingPolicy::LastWriteWins),
        "latest_issued" => Some(OrderingPolicy::LatestIssued),
        _ => None,
    }
}

pub fn validate_server_url(raw: &str) -> Result<(), ConfigError> {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ConfigError::InvalidValue {
            key: "server_url",
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
