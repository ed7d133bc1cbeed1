//! Client-wide settings.

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};
use crate::api::{DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS};

/// Settings shared by every profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// The name of the profile used when none is given.
    pub default_profile: Option<String>,
    /// Issues requested per search page.
    pub page_size: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_profile: None,
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(ConfigError::ValidationError(
                "page_size must be at least 1".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
