//! Configuration for the fleet console.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    /// Load the config file, falling back to defaults when missing or broken.
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| Self::parse(&s).ok())
            .unwrap_or_default()
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(self)?;
            std::fs::write(path, content)?;
        }
        Ok(())
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("", "", "fleet-console")
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|d| d.config_dir().join("config.toml"))
    }

    /// Directory for rolling log files.
    pub fn log_dir(&self) -> PathBuf {
        self.logging
            .dir
            .clone()
            .or_else(|| Self::project_dirs().map(|d| d.data_dir().join("logs")))
            .unwrap_or_else(|| PathBuf::from("logs"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String { "http://localhost:8080/api".to_string() }
fn default_timeout_secs() -> u64 { 30 }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Log out after this many minutes without input (0 = never)
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_minutes: u64,
    /// Refresh the access token after this many minutes of activity
    #[serde(default = "default_refresh_minutes")]
    pub refresh_minutes: u64,
}

fn default_idle_timeout() -> u64 { 30 }
fn default_refresh_minutes() -> u64 { 20 }

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: default_idle_timeout(),
            refresh_minutes: default_refresh_minutes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    /// `EnvFilter` directives; `RUST_LOG` overrides them
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Write logs to a daily rolling file
    #[serde(default = "default_true")]
    pub file: bool,
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_filter() -> String { "info,fleet_console=debug,console_widgets=info".to_string() }
fn default_true() -> bool { true }

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            file: true,
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Seconds before info popups close by themselves (0 = never)
    #[serde(default = "default_popup_secs")]
    pub popup_dismiss_secs: i64,
}

fn default_date_format() -> String { "%Y-%m-%d".to_string() }
fn default_popup_secs() -> i64 { 5 }

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            popup_dismiss_secs: default_popup_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.session.idle_timeout_minutes, 30);
        assert!(config.logging.file);
        assert_eq!(config.display.date_format, "%Y-%m-%d");
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::parse(
            r#"
            [api]
            base_url = "https://fleet.example.com/api"

            [session]
            idle_timeout_minutes = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://fleet.example.com/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.session.idle_timeout_minutes, 10);
        assert_eq!(config.session.refresh_minutes, 20);
    }

    #[test]
    fn test_broken_file_is_an_error() {
        assert!(Config::parse("[api\nbase_url = 1").is_err());
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.logging.dir = Some(dir.path().join("logs"));
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = Config::parse(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.log_dir(), dir.path().join("logs"));
    }
}
