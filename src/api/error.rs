//! Error types for the JIRA client.

use std::fmt;

use thiserror::Error;

use super::transport::Method;

/// Errors that can occur when talking to the JIRA REST API.
///
/// Every condition raised across the library boundary is one of these kinds;
/// transport and codec errors are translated before they reach the caller.
#[derive(Debug, Error)]
pub enum JiraError {
    /// A response or input text was not valid JSON of the expected shape.
    #[error("Failed to decode JSON: {message}")]
    Decode {
        /// What the decoder complained about.
        message: String,
        /// The offending text, kept for diagnostics.
        raw: String,
    },

    /// A field name or id could not be resolved for a resource.
    #[error("Invalid field: '{0}'")]
    InvalidField(String),

    /// A strict record lookup hit a missing key.
    #[error("Key not found: '{0}'")]
    KeyNotFound(String),

    /// The server reported that the issue does not exist.
    #[error("Issue not found: {0}")]
    IssueNotFound(String),

    /// The server reported that the project does not exist.
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// The request could not be completed or the server rejected it.
    #[error("{method} {path} failed{}: {message}", StatusSuffix(*status))]
    RequestFailed {
        method: Method,
        path: String,
        /// HTTP status, or `None` if no response was received.
        status: Option<u16>,
        message: String,
    },

    /// The server never answered within the configured timeout.
    #[error("{method} {path} timed out")]
    Timeout { method: Method, path: String },

    /// The client was configured with unusable settings.
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

/// Result type for JIRA client operations.
pub type Result<T> = std::result::Result<T, JiraError>;

struct StatusSuffix(Option<u16>);

impl fmt::Display for StatusSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(status) => write!(f, " (HTTP {})", status),
            None => Ok(()),
        }
    }
}

impl JiraError {
    /// Build a decode error, keeping the raw text that failed to parse.
    pub fn decode(message: impl Into<String>, raw: impl Into<String>) -> Self {
        JiraError::Decode {
            message: message.into(),
            raw: raw.into(),
        }
    }

    /// Build a request failure from an HTTP status and response body.
    ///
    /// JIRA usually reports failures as `{"errorMessages": [...], "errors": {...}}`;
    /// when that envelope is present its messages are used, otherwise the raw body.
    pub fn from_status(method: Method, path: &str, status: u16, body: &str) -> Self {
        let message = error_envelope_message(body).unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                body.trim().to_string()
            }
        });

        JiraError::RequestFailed {
            method,
            path: path.to_string(),
            status: Some(status),
            message,
        }
    }

    /// Check if this error means the server never answered.
    pub fn is_timeout(&self) -> bool {
        matches!(self, JiraError::Timeout { .. })
    }

    /// Check if this error is a structural "not found" from the API.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            JiraError::IssueNotFound(_) | JiraError::ProjectNotFound(_)
        )
    }

    /// The HTTP status attached to a request failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            JiraError::RequestFailed { status, .. } => *status,
            _ => None,
        }
    }
}

/// Extract a human-readable message from a JIRA error envelope.
///
/// Returns `None` if the body is not JSON or carries no messages.
pub(crate) fn error_envelope_message(body: &str) -> Option<String> {
    let json = serde_json::from_str::<serde_json::Value>(body).ok()?;

    if let Some(arr) = json.get("errorMessages").and_then(|m| m.as_array()) {
        let messages: Vec<&str> = arr.iter().filter_map(|v| v.as_str()).collect();
        if !messages.is_empty() {
            return Some(messages.join(", "));
        }
    }

    if let Some(obj) = json.get("errors").and_then(|e| e.as_object()) {
        let error_strings: Vec<String> = obj
            .iter()
            .map(|(k, v)| match v.as_str() {
                Some(s) => format!("{}: {}", k, s),
                None => format!("{}: {}", k, v),
            })
            .collect();
        if !error_strings.is_empty() {
            return Some(error_strings.join(", "));
        }
    }

    None
}
