//! JIRA REST API client.
//!
//! [`JiraClient`] owns the session and mediates every request. Responses
//! surface as [`Record`]s, issues as [`Issue`] aggregates with deferred
//! writes, and search results through the lazy [`Paginator`].

mod auth;
mod client;
pub mod error;
mod fields;
mod issue;
mod pagination;
mod project;
mod record;
mod search;
mod transport;

#[cfg(test)]
mod testing;

pub use auth::{AuthFailure, AuthResult, BasicAuth, Credential, SessionCookie, SessionState};
pub use client::{ClientConfig, JiraClient, Payload, DEFAULT_API_VERSION, DEFAULT_PAGE_SIZE};
pub use error::{JiraError, Result};
pub use issue::Issue;
pub use pagination::Paginator;
pub use project::Project;
pub use record::Record;
pub use search::{IssueStream, PageFuture, SearchPages, SearchQuery};
pub use transport::{
    HttpRequest, HttpResponse, Method, ReqwestTransport, Transport, TransportError,
    DEFAULT_TIMEOUT_SECS,
};
