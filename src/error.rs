//! Top-level error type for the command-line front end.
//!
//! Library calls report [`JiraError`] and [`AuthFailure`]; configuration
//! reports [`ConfigError`]. [`AppError`] gathers them so the binary can print
//! one friendly message and a hint.

use thiserror::Error;

use crate::api::{AuthFailure, JiraError};
use crate::config::ConfigError;

/// Anything that can stop a command.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Api(#[from] JiraError),

    #[error("Login failed: {0}")]
    Auth(#[from] AuthFailure),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn other(msg: impl Into<String>) -> Self {
        AppError::Other(msg.into())
    }

    /// A message suitable for printing to the user.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(ConfigError::NoConfigDir) => {
                "Could not find configuration directory. Please check your system settings."
                    .to_string()
            }
            AppError::Config(ConfigError::ParseError(_)) => {
                "Configuration file is invalid. Please check the file format.".to_string()
            }
            AppError::Config(ConfigError::MissingPassword(profile)) => {
                format!("No password stored for profile '{}'.", profile)
            }
            AppError::Config(e) => format!("Configuration error: {}", e),
            AppError::Api(e) => match e {
                JiraError::IssueNotFound(key) => format!("Issue '{}' was not found.", key),
                JiraError::ProjectNotFound(key) => format!("Project '{}' was not found.", key),
                JiraError::InvalidField(name) => format!("'{}' is not a field on this issue.", name),
                JiraError::Timeout { .. } => {
                    "JIRA did not answer in time. Please try again later.".to_string()
                }
                JiraError::RequestFailed { status: None, .. } => {
                    "Could not connect to JIRA. Please check your URL and network.".to_string()
                }
                other => other.to_string(),
            },
            AppError::Auth(AuthFailure::Rejected { .. }) => {
                "Authentication failed. Please check your username and password.".to_string()
            }
            AppError::Auth(AuthFailure::Unreachable(_)) => {
                "Could not connect to JIRA. Please check your URL and network.".to_string()
            }
            AppError::Auth(e) => format!("Login failed: {}", e),
            AppError::Io(_) => "A file operation failed. Please check file permissions.".to_string(),
            AppError::Other(msg) => msg.clone(),
        }
    }

    /// Whether trying the same command again may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Api(JiraError::Timeout { .. })
                | AppError::Api(JiraError::RequestFailed { status: None, .. })
                | AppError::Auth(AuthFailure::Unreachable(_))
        )
    }

    /// A hint for what the user can do next.
    pub fn suggested_action(&self) -> Option<&'static str> {
        match self {
            AppError::Config(ConfigError::NoConfigDir)
            | AppError::Config(ConfigError::ProfileNotFound(_)) => {
                Some("Add a [[profiles]] entry to the jiraby config.toml.")
            }
            AppError::Config(ConfigError::MissingPassword(_)) => {
                Some("Run 'jiraby store-password' or set JIRABY_PASSWORD.")
            }
            AppError::Auth(AuthFailure::Rejected { .. }) => {
                Some("Run 'jiraby store-password' to update the stored password.")
            }
            AppError::Api(JiraError::InvalidField(_)) => {
                Some("Run 'jiraby fields' to list the field names the server knows.")
            }
            _ if self.is_recoverable() => Some("Check your network and JIRA URL, then retry."),
            _ => None,
        }
    }
}

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, AppError>;
