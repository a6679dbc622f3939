//! Application configuration management.
//!
//! This module handles loading the application configuration:
//! backend URL, device identifier and login deadline. Environment variables
//! take precedence over the file.
//!
//! Configuration is stored at `~/.config/bizzy/config.json`. The encrypted
//! store lives under `~/.cache/bizzy/`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::api::{DEFAULT_BASE_URL, DEFAULT_DEVICE_TOKEN};
use crate::auth::keychain::{DEFAULT_ACCOUNT, DEFAULT_SERVICE_NAME};
use crate::auth::{KeySource, LOGIN_TIMEOUT_MS, STORE_FILE};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "bizzy";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Overrides the backend base URL
pub const ENV_API_URL: &str = "BIZZY_API_URL";

/// When set, the secure store key is derived from this passphrase instead of
/// being kept in the OS keychain
pub const ENV_STORE_PASSPHRASE: &str = "BIZZY_STORE_PASSPHRASE";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub device_token: Option<String>,
    pub login_timeout_ms: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn store_path(&self) -> Result<PathBuf> {
        Ok(self.cache_dir()?.join(STORE_FILE))
    }

    pub fn base_url(&self) -> String {
        std::env::var(ENV_API_URL)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn device_token(&self) -> String {
        self.device_token
            .clone()
            .unwrap_or_else(|| DEFAULT_DEVICE_TOKEN.to_string())
    }

    pub fn login_timeout(&self) -> Duration {
        Duration::from_millis(self.login_timeout_ms.unwrap_or(LOGIN_TIMEOUT_MS))
    }

    pub fn key_source(&self) -> KeySource {
        key_source_from(std::env::var(ENV_STORE_PASSPHRASE).ok())
    }
}

fn key_source_from(passphrase: Option<String>) -> KeySource {
    match passphrase.filter(|p| !p.is_empty()) {
        Some(passphrase) => KeySource::Passphrase(passphrase),
        None => KeySource::Keyring {
            service: DEFAULT_SERVICE_NAME.to_string(),
            account: DEFAULT_ACCOUNT.to_string(),
        },
    }
}
