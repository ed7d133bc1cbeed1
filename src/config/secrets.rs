//! Password storage.
//!
//! Passwords are kept in the OS keyring under the `jiraby` service, one entry
//! per profile. Setting `JIRABY_PASSWORD` overrides the keyring, which is
//! handy for CI and headless machines without a keyring daemon.

use tracing::debug;

use super::{ConfigError, Result};

/// Keyring service name for every stored password.
const KEYRING_SERVICE: &str = "jiraby";

/// Environment variable consulted before the keyring.
pub const PASSWORD_ENV: &str = "JIRABY_PASSWORD";

fn entry(profile_name: &str) -> Result<keyring::Entry> {
    keyring::Entry::new(KEYRING_SERVICE, profile_name)
        .map_err(|e| ConfigError::Keyring(format!("failed to access keyring: {}", e)))
}

/// Store the password for a profile in the OS keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<()> {
    entry(profile_name)?
        .set_password(password)
        .map_err(|e| ConfigError::Keyring(format!("failed to store password: {}", e)))?;
    debug!(profile = profile_name, "Password stored");
    Ok(())
}

/// The password for a profile: `JIRABY_PASSWORD` if set, otherwise the keyring.
///
/// # Errors
///
/// [`ConfigError::MissingPassword`] if neither source has one.
pub fn get_password(profile_name: &str) -> Result<String> {
    if let Some(password) = password_from_env() {
        debug!("Using password from {}", PASSWORD_ENV);
        return Ok(password);
    }

    match entry(profile_name)?.get_password() {
        Ok(password) => Ok(password),
        Err(keyring::Error::NoEntry) => Err(ConfigError::MissingPassword(profile_name.to_string())),
        Err(e) => Err(ConfigError::Keyring(format!(
            "failed to retrieve password: {}",
            e
        ))),
    }
}

/// Remove the stored password for a profile.
pub fn delete_password(profile_name: &str) -> Result<()> {
    entry(profile_name)?
        .delete_password()
        .map_err(|e| ConfigError::Keyring(format!("failed to delete password: {}", e)))
}

fn password_from_env() -> Option<String> {
    std::env::var(PASSWORD_ENV).ok().filter(|p| !p.is_empty())
}
