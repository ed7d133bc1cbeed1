//! Authentication handling for the JIRA API.
//!
//! Two kinds of credentials are supported: a session cookie obtained by
//! logging in against `/rest/auth/1/session`, and HTTP Basic auth (username
//! plus password or API token) for servers that do not issue sessions.

use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether the client currently holds credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

/// Why a login or logout did not succeed.
///
/// These are expected outcomes, returned as values rather than raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// The server refused the credentials or the session.
    #[error("Authentication rejected by server (HTTP {status})")]
    Rejected { status: u16 },

    /// The server could not be reached or did not answer.
    #[error("Server unreachable: {0}")]
    Unreachable(String),

    /// The server accepted the login but the session payload was unusable.
    #[error("Malformed session response: {0}")]
    MalformedSession(String),
}

/// Outcome of [`login`](super::JiraClient::login) and
/// [`logout`](super::JiraClient::logout).
pub type AuthResult = std::result::Result<(), AuthFailure>;

/// Body of a login request.
#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    session: SessionCookie,
}

/// The session cookie issued by the server on login.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
}

impl SessionCookie {
    /// Parse the `{"session": {"name": ..., "value": ...}}` login response.
    pub fn from_login_response(body: &str) -> Result<Self, AuthFailure> {
        serde_json::from_str::<LoginResponse>(body)
            .map(|response| response.session)
            .map_err(|e| AuthFailure::MalformedSession(e.to_string()))
    }

    /// The `Cookie` header value, `name=value`.
    pub fn header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

impl fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCookie")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// HTTP Basic credentials.
///
/// The secret is encoded immediately and the raw value is not stored.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    username: String,
    auth_header: String,
}

impl BasicAuth {
    pub fn new(username: &str, secret: &str) -> Self {
        Self {
            username: username.to_string(),
            auth_header: build_auth_header(username, secret),
        }
    }

    /// The complete `Basic ...` header value.
    pub fn header_value(&self) -> &str {
        &self.auth_header
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Credentials attached to every request while authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Session(SessionCookie),
    Basic(BasicAuth),
}

impl Credential {
    /// The header carrying this credential.
    pub fn header(&self) -> (&'static str, String) {
        match self {
            Credential::Session(cookie) => ("Cookie", cookie.header_value()),
            Credential::Basic(basic) => ("Authorization", basic.header_value().to_string()),
        }
    }
}

/// Build the Basic Auth header value.
///
/// Encodes "username:secret" in Base64 and prepends "Basic ".
fn build_auth_header(username: &str, secret: &str) -> String {
    let credentials = format!("{}:{}", username, secret);
    let encoded = BASE64.encode(credentials.as_bytes());
    format!("Basic {}", encoded)
}
