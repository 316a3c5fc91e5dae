//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which holds the catalog API base URL and the last used username.
//!
//! Configuration is stored at `~/.config/storefront/config.json`. The
//! `STOREFRONT_API_URL` environment variable overrides the stored base URL.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_BASE_URL;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "storefront";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "STOREFRONT_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub last_username: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Base URL for API calls: environment, then config file, then default.
    pub fn api_base_url(&self) -> String {
        Self::resolve_base_url(std::env::var(API_URL_ENV).ok(), self.api_base_url.as_deref())
    }

    fn resolve_base_url(env: Option<String>, configured: Option<&str>) -> String {
        env.filter(|url| !url.trim().is_empty())
            .or_else(|| {
                configured
                    .filter(|url| !url.trim().is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Directory for cached product lists, logs and the persisted session.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_base_url_precedence() {
        assert_eq!(Config::resolve_base_url(None, None), DEFAULT_BASE_URL);
        assert_eq!(
            Config::resolve_base_url(None, Some("http://localhost:3000")),
            "http://localhost:3000"
        );
        assert_eq!(
            Config::resolve_base_url(Some("http://env".to_string()), Some("http://file")),
            "http://env"
        );
        assert_eq!(
            Config::resolve_base_url(Some("  ".to_string()), Some("")),
            DEFAULT_BASE_URL
        );
    }

    #[test]
    fn test_config_parses_partial_file() {
        let config: Config = serde_json::from_str(r#"{"last_username": "emilys"}"#).unwrap();
        assert_eq!(config.last_username.as_deref(), Some("emilys"));
        assert_eq!(config.api_base_url, None);
    }
}
