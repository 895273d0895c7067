use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default backend when neither the environment nor the config file names
/// one.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub backend_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_or_init(&Self::get_config_path()?)
    }

    /// Load the config file, writing an empty scaffold on first run so
    /// there is a file for the user to fill in.
    fn load_or_init(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            return Self::load_from(config_path);
        }

        let config = Self::new();
        config.save_to(config_path)?;
        Ok(config)
    }

    fn load_from(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    /// Chat backend base URL: environment beats config file beats the
    /// hard-coded localhost fallback.
    pub fn backend_url(&self) -> String {
        self.resolve_backend_url(std::env::var("WEATHER_CHAT_BACKEND_URL").ok())
    }

    fn resolve_backend_url(&self, env_value: Option<String>) -> String {
        env_value
            .or_else(|| self.backend_url.clone())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
    }

    /// Google OAuth client id, env first then config file.
    pub fn client_id(&self) -> Option<String> {
        std::env::var("GOOGLE_CLIENT_ID").ok().or_else(|| self.client_id.clone())
    }

    /// Google OAuth client secret, env first then config file.
    pub fn client_secret(&self) -> Option<String> {
        std::env::var("GOOGLE_CLIENT_SECRET")
            .ok()
            .or_else(|| self.client_secret.clone())
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("weather-chat").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_load_writes_an_editable_scaffold() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weather-chat").join("config.json");

        let config = Config::load_or_init(&path).unwrap();
        assert!(config.backend_url.is_none());
        assert!(config.client_id.is_none());
        assert!(path.exists());

        let reloaded = Config::load_or_init(&path).unwrap();
        assert!(reloaded.client_secret.is_none());
    }

    #[test]
    fn save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            backend_url: Some("http://example.com:8080".to_string()),
            client_id: Some("abc.apps.googleusercontent.com".to_string()),
            client_secret: Some("shh".to_string()),
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.backend_url.as_deref(), Some("http://example.com:8080"));
        assert_eq!(loaded.client_secret.as_deref(), Some("shh"));
    }

    #[test]
    fn backend_url_falls_back_to_localhost() {
        let config = Config::new();
        assert_eq!(config.resolve_backend_url(None), DEFAULT_BACKEND_URL);
    }

    #[test]
    fn config_file_value_is_used_when_env_is_unset() {
        let config = Config {
            backend_url: Some("http://10.0.0.2:5000".to_string()),
            ..Config::new()
        };
        assert_eq!(config.resolve_backend_url(None), "http://10.0.0.2:5000");
    }

    #[test]
    fn environment_overrides_config_file() {
        let config = Config {
            backend_url: Some("http://10.0.0.2:5000".to_string()),
            ..Config::new()
        };
        assert_eq!(
            config.resolve_backend_url(Some("http://env-host:9000".to_string())),
            "http://env-host:9000"
        );
    }
}
