use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:3000";

const DEFAULT_CONFIG_FILE: &str = r#"# axo-tasks client configuration
api_url = "http://localhost:3000"
request_timeout_secs = 30
autosave_delay_ms = 2000
toast_duration_ms = 3000
# session_file = "/path/to/session.json"
# log_file = "/path/to/axo-tasks.log"
"#;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    pub api_url: String,
    pub request_timeout_secs: u64,
    pub autosave_delay_ms: u64,
    pub toast_duration_ms: u64,
    pub session_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 30,
            autosave_delay_ms: 2000,
            toast_duration_ms: 3000,
            session_file: None,
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Loads the user config file, writing a commented default the first time.
    pub fn load() -> Result<(Self, PathBuf), ConfigError> {
        let config_path = get_config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        if !config_path.exists() {
            std::fs::write(&config_path, DEFAULT_CONFIG_FILE).map_err(|e| {
                ConfigError::Message(format!("Failed to write default config: {e}"))
            })?;
        }

        let config = Self::load_from(&config_path)?;
        Ok((config, config_path))
    }

    /// File values first, then `AXO_*` environment overrides. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let builder = Config::builder()
            .set_default("api_url", defaults.api_url)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs)?
            .set_default("autosave_delay_ms", defaults.autosave_delay_ms)?
            .set_default("toast_duration_ms", defaults.toast_duration_ms)?
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("AXO").try_parsing(true))
            .build()?;

        let mut config: AppConfig = builder.try_deserialize()?;
        config.api_url = config.api_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    pub fn session_path(&self) -> PathBuf {
        self.session_file
            .clone()
            .unwrap_or_else(|| data_dir().join("session.json"))
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| data_dir().join("axo-tasks.log"))
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("axo-tasks").join("config.toml")
    } else {
        PathBuf::from("axo-tasks.toml")
    }
}

pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("axo-tasks"))
        .unwrap_or_else(|| PathBuf::from(".axo-tasks"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.autosave_delay(), Duration::from_secs(2));
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "api_url = \"https://tasks.example.com/\"\nautosave_delay_ms = 500\nsession_file = \"/tmp/s.json\"\n",
        )
        .unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.api_url, "https://tasks.example.com");
        assert_eq!(config.autosave_delay_ms, 500);
        assert_eq!(config.session_path(), PathBuf::from("/tmp/s.json"));
    }
}
