//! Configuration for the SmartReview client.
//!
//! Loads configuration from ${SMARTREVIEW_HOME}/config.toml with sensible
//! defaults.

use std::fs;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default base URL for the SmartReview backend.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the SmartReview backend
    pub server_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
        }
    }
}

impl Config {
    /// Loads the configuration from disk.
    /// Returns defaults if the config file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = paths::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Resolves the backend base URL with precedence: env > config > default.
    ///
    /// # Errors
    /// Returns an error if the resolved URL is not well-formed.
    pub fn server_url(&self) -> Result<String> {
        let env_url = std::env::var("SMARTREVIEW_SERVER_URL").ok();
        Self::resolve_server_url(env_url.as_deref(), &self.server_url)
    }

    fn resolve_server_url(env_value: Option<&str>, config_value: &str) -> Result<String> {
        if let Some(env_url) = env_value {
            let trimmed = env_url.trim();
            if !trimmed.is_empty() {
                Self::validate_url(trimmed)?;
                return Ok(trimmed.trim_end_matches('/').to_string());
            }
        }

        let trimmed = config_value.trim();
        if !trimmed.is_empty() {
            Self::validate_url(trimmed)?;
            return Ok(trimmed.trim_end_matches('/').to_string());
        }

        Ok(DEFAULT_SERVER_URL.to_string())
    }

    fn validate_url(url: &str) -> Result<()> {
        url::Url::parse(url).with_context(|| format!("Invalid server URL: {url}"))?;
        Ok(())
    }
}

pub mod paths {
    //! Path resolution for SmartReview configuration and session data.
    //!
    //! SMARTREVIEW_HOME resolution order:
    //! 1. SMARTREVIEW_HOME environment variable (if set)
    //! 2. ~/.config/smartreview (default)

    use std::path::PathBuf;

    /// Returns the SmartReview home directory.
    pub fn smartreview_home() -> PathBuf {
        if let Ok(home) = std::env::var("SMARTREVIEW_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("smartreview"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        smartreview_home().join("config.toml")
    }

    /// Returns the path to the persisted session file.
    pub fn session_path() -> PathBuf {
        smartreview_home().join("session.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: env var wins over config value.
    #[test]
    fn test_server_url_env_precedence() {
        let url =
            Config::resolve_server_url(Some("https://review.example.com"), "http://other").unwrap();
        assert_eq!(url, "https://review.example.com");
    }

    /// Test: empty env value falls through to config.
    #[test]
    fn test_server_url_blank_env_ignored() {
        let url = Config::resolve_server_url(Some("  "), "https://config.example.com").unwrap();
        assert_eq!(url, "https://config.example.com");
    }

    /// Test: trailing slash is normalized away.
    #[test]
    fn test_server_url_strips_trailing_slash() {
        let url = Config::resolve_server_url(None, "http://localhost:5000/").unwrap();
        assert_eq!(url, "http://localhost:5000");
    }

    /// Test: malformed URLs are rejected.
    #[test]
    fn test_server_url_rejects_invalid() {
        assert!(Config::resolve_server_url(None, "not a url").is_err());
    }

    /// Test: defaults kick in when both sources are blank.
    #[test]
    fn test_server_url_default() {
        let url = Config::resolve_server_url(None, "").unwrap();
        assert_eq!(url, DEFAULT_SERVER_URL);
    }

    /// Test: config.toml parses, missing keys fall back to defaults.
    #[test]
    fn test_config_parse() {
        let config: Config = toml::from_str("server_url = \"https://api.example.com\"\n").unwrap();
        assert_eq!(config.server_url, "https://api.example.com");

        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
    }
}
