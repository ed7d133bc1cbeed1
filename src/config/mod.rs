//! Configuration management for jiraby.
//!
//! This module handles loading, saving, and validating the user's
//! configuration: connection profiles plus a few client settings. Passwords
//! never live in the file; see [`secrets`].

mod profile;
pub mod secrets;
mod settings;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::api::ClientConfig;

pub use profile::Profile;
pub use settings::Settings;

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the configuration directory")]
    NoConfigDir,

    #[error("failed to create configuration directory: {0}")]
    CreateDirError(#[source] std::io::Error),

    #[error("failed to read configuration file: {0}")]
    ReadError(#[source] std::io::Error),

    #[error("failed to write configuration file: {0}")]
    WriteError(#[source] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    ValidationError(String),

    #[error("profile '{0}' not found")]
    ProfileNotFound(String),

    #[error("secure storage error: {0}")]
    Keyring(String),

    #[error("no password stored for profile '{0}'")]
    MissingPassword(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// The whole configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

impl Config {
    /// Load the configuration from the default location.
    ///
    /// A missing file yields the default (empty) configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load the configuration from `path`. A missing file yields the default.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        debug!(
            path = %path.display(),
            profiles = config.profiles.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Save the configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::CreateDirError)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(ConfigError::WriteError)?;
        info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// The default configuration file path: `<config dir>/jiraby/config.toml`.
    pub fn config_path() -> Result<PathBuf> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join("jiraby").join("config.toml"))
    }

    /// Look up a profile by name, or the default profile when `name` is `None`.
    ///
    /// With no name and no `default_profile` set, a lone profile is used.
    pub fn profile(&self, name: Option<&str>) -> Result<&Profile> {
        let name = match name.or(self.settings.default_profile.as_deref()) {
            Some(name) => name,
            None => match self.profiles.as_slice() {
                [only] => return Ok(only),
                [] => {
                    return Err(ConfigError::ValidationError(
                        "no profiles configured".to_string(),
                    ))
                }
                _ => {
                    return Err(ConfigError::ValidationError(
                        "several profiles configured and no default_profile set".to_string(),
                    ))
                }
            },
        };

        self.profiles
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))
    }

    /// Check every profile, that profile names are unique, and that the
    /// default profile exists.
    pub fn validate(&self) -> Result<()> {
        self.settings.validate()?;

        for (i, profile) in self.profiles.iter().enumerate() {
            profile.validate()?;
            if self.profiles[..i].iter().any(|p| p.name == profile.name) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate profile name '{}'",
                    profile.name
                )));
            }
        }

        if let Some(default) = &self.settings.default_profile {
            if !self.profiles.iter().any(|p| &p.name == default) {
                return Err(ConfigError::ValidationError(format!(
                    "default profile '{}' does not exist",
                    default
                )));
            }
        }

        Ok(())
    }

    /// Client settings for `profile`.
    pub fn client_config(&self, profile: &Profile) -> ClientConfig {
        ClientConfig::new(&profile.url)
            .with_api_version(&profile.api_version)
            .with_timeout(Duration::from_secs(self.settings.timeout_secs))
            .with_page_size(self.settings.page_size)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn sample() -> Config {
        Config {
            settings: Settings {
                default_profile: Some("work".to_string()),
                ..Default::default()
            },
            profiles: vec![
                Profile::new("work", "https://jira.example.com", "fred"),
                Profile::new("local", "http://localhost:8080", "admin"),
            ],
        }
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        sample().save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_parse_minimal_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[[profiles]]
name = "work"
url = "https://jira.example.com"
username = "fred"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        let profile = config.profile(None).unwrap();
        assert_eq!(profile.name, "work");
        assert_eq!(profile.api_version, "2");
        assert_eq!(config.settings.page_size, 50);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[[profiles]\nname = ").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_profile_lookup() {
        let config = sample();
        assert_eq!(config.profile(None).unwrap().name, "work");
        assert_eq!(config.profile(Some("local")).unwrap().name, "local");
        assert!(matches!(
            config.profile(Some("nope")),
            Err(ConfigError::ProfileNotFound(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_profile_lookup_without_default() {
        let mut config = sample();
        config.settings.default_profile = None;
        assert!(config.profile(None).is_err());

        config.profiles.truncate(1);
        assert_eq!(config.profile(None).unwrap().name, "work");

        assert!(Config::default().profile(None).is_err());
    }

    #[test]
    fn test_duplicate_profiles_rejected() {
        let mut config = sample();
        config
            .profiles
            .push(Profile::new("work", "https://other.example.com", "bob"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate profile name 'work'"));
    }

    #[test]
    fn test_unknown_default_profile_rejected() {
        let mut config = sample();
        config.settings.default_profile = Some("missing".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_client_config_from_profile() {
        let mut config = sample();
        config.settings.page_size = 25;
        config.settings.timeout_secs = 5;
        let client = config.client_config(config.profile(None).unwrap());

        assert_eq!(client.base_url, "https://jira.example.com");
        assert_eq!(client.api_version, "2");
        assert_eq!(client.page_size, 25);
        assert_eq!(client.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_config_path_ends_with_app_dir() {
        let path = Config::config_path().unwrap();
        assert!(path.ends_with("jiraby/config.toml"));
    }
}
