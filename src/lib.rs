//! jiraby - a small JIRA REST client.
//!
//! Log in, fetch and edit issues field by field, and walk JQL search results
//! page by page without holding them all in memory.
//!
//! ```no_run
//! use jiraby::api::{ClientConfig, JiraClient, SearchQuery};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = JiraClient::new(ClientConfig::new("https://jira.example.com"))?;
//! client.login("fred", "secret").await?;
//!
//! let mut issue = client.issue("TST-1").await?;
//! issue.set("Summary", "Fix the widget").await?;
//! issue.save().await?;
//!
//! let mut issues = client.issues(&SearchQuery::new("project = TST"));
//! while let Some(issue) = issues.next().await {
//!     println!("{}", issue?.key().unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
