//! Projects and their issue-creation metadata.

use serde_json::Value;
use tracing::instrument;

use super::client::{JiraClient, Payload};
use super::error::{JiraError, Result};
use super::record::Record;

/// A JIRA project as returned by `project/{key}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    data: Record,
}

impl Project {
    pub fn new(data: Record) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &Record {
        &self.data
    }

    pub fn key(&self) -> Option<&str> {
        self.data.get_key("key").and_then(Value::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.data.get_key("id").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.data.get_key("name").and_then(Value::as_str)
    }

    /// Issue types available in this project.
    pub fn issue_types(&self) -> Vec<Record> {
        self.data.get_records("issueTypes")
    }

    /// The first issue type called `name`.
    pub fn issue_type(&self, name: &str) -> Option<Record> {
        self.issue_types()
            .into_iter()
            .find(|t| t.get_str("name") == Some(name))
    }
}

impl JiraClient {
    /// Fetch a project by key.
    ///
    /// # Errors
    ///
    /// [`JiraError::ProjectNotFound`] if the server reports the project absent.
    #[instrument(skip(self))]
    pub async fn project(&self, key: &str) -> Result<Project> {
        let data = self
            .lookup(&format!("project/{}", key), || {
                JiraError::ProjectNotFound(key.to_string())
            })
            .await?;
        Ok(Project::new(data))
    }

    /// The issue-creation metadata for one project, including the fields each
    /// issue type accepts.
    #[instrument(skip(self))]
    pub async fn project_meta(&self, key: &str) -> Result<Record> {
        let payload = self
            .get_with_query(
                "issue/createmeta",
                &[("projectKeys", key), ("expand", "projects.issuetypes.fields")],
            )
            .await?;

        let meta = match payload {
            Payload::Record(record) => record,
            _ => return Err(JiraError::ProjectNotFound(key.to_string())),
        };
        meta.get_records("projects")
            .into_iter()
            .find(|project| project.get_str("key") == Some(key))
            .ok_or_else(|| JiraError::ProjectNotFound(key.to_string()))
    }
}
