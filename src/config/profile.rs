//! JIRA connection profiles.

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};
use crate::api::DEFAULT_API_VERSION;

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

/// Connection details for one JIRA instance.
///
/// The password is kept in the OS keyring, never in the profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// The name of this profile.
    ///
    /// Must be non-empty and unique across all profiles.
    pub name: String,

    /// The JIRA instance URL, e.g. `https://jira.example.com`.
    pub url: String,

    /// The JIRA username to log in as.
    pub username: String,

    /// REST API version.
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Profile {
    pub fn new(name: &str, url: &str, username: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            username: username.to_string(),
            api_version: default_api_version(),
        }
    }

    /// Validate this profile.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` with details if validation fails.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::ValidationError(
                "profile name cannot be empty".to_string(),
            ));
        }

        if self.name.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "profile name '{}' cannot contain whitespace",
                self.name
            )));
        }

        if self.url.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': URL cannot be empty",
                self.name
            )));
        }

        if !self.url.starts_with("https://") && !self.url.starts_with("http://") {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': URL must start with http:// or https://",
                self.name
            )));
        }

        if self.username.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': username cannot be empty",
                self.name
            )));
        }

        if self.api_version != DEFAULT_API_VERSION {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': unsupported API version '{}'",
                self.name, self.api_version
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile::new("work", "https://jira.example.com", "fred")
    }

    #[test]
    fn test_valid_profile() {
        assert!(profile().validate().is_ok());
        assert!(Profile::new("local", "http://localhost:8080", "admin")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut p = profile();
        p.name = String::new();
        let err = p.validate().unwrap_err();
        assert!(err.to_string().contains("name cannot be empty"));
    }

    #[test]
    fn test_whitespace_name_rejected() {
        let mut p = profile();
        p.name = "my work".to_string();
        let err = p.validate().unwrap_err();
        assert!(err.to_string().contains("cannot contain whitespace"));
    }

    #[test]
    fn test_url_rules() {
        let mut p = profile();
        p.url = String::new();
        assert!(p.validate().unwrap_err().to_string().contains("URL cannot be empty"));

        p.url = "jira.example.com".to_string();
        assert!(p.validate().unwrap_err().to_string().contains("must start with http"));
    }

    #[test]
    fn test_empty_username_rejected() {
        let mut p = profile();
        p.username = "  ".to_string();
        assert!(p.validate().unwrap_err().to_string().contains("username"));
    }

    #[test]
    fn test_unknown_api_version_rejected() {
        let mut p = profile();
        p.api_version = "3".to_string();
        assert!(p.validate().unwrap_err().to_string().contains("API version"));
    }

    #[test]
    fn test_api_version_defaults_when_absent() {
        let p: Profile = toml::from_str(
            r#"
name = "work"
url = "https://jira.example.com"
username = "fred"
"#,
        )
        .unwrap();
        assert_eq!(p, profile());
    }
}
