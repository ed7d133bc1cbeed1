//! The issue aggregate: server data plus locally pending field writes.

use serde_json::{json, Map, Value};
use tracing::{debug, info, instrument};

use super::client::{JiraClient, Payload};
use super::error::{JiraError, Result};
use super::record::Record;

/// A JIRA issue bound to the client it came from.
///
/// `data` holds the issue as the server last reported it. Writes made with
/// [`set`](Self::set) go to a separate set of pending changes, keyed by field
/// id, until [`save`](Self::save) persists them.
///
/// An issue is not meant to be saved from two places at once: calling `save`
/// again while a previous call is still in flight is not guarded against.
#[derive(Debug, Clone)]
pub struct Issue<'c> {
    client: &'c JiraClient,
    data: Record,
    pending: Record,
}

impl<'c> Issue<'c> {
    pub(crate) fn from_record(client: &'c JiraClient, data: Record) -> Self {
        Self {
            client,
            data,
            pending: Record::new(),
        }
    }

    /// The issue as last reported by the server.
    pub fn data(&self) -> &Record {
        &self.data
    }

    /// Field writes not yet saved, keyed by field id.
    pub fn pending_changes(&self) -> &Record {
        &self.pending
    }

    /// The issue key, e.g. `TST-1`. `None` until the issue exists on the server.
    pub fn key(&self) -> Option<&str> {
        self.data.get_key("key").and_then(Value::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.data.get_key("id").and_then(Value::as_str)
    }

    pub fn summary(&self) -> Option<&str> {
        self.field("summary").and_then(Value::as_str)
    }

    /// Resolve a field label or id to the field id used by this issue.
    pub async fn resolve(&self, name_or_id: &str) -> Result<String> {
        self.client.resolve_field(self.field_keys(), name_or_id).await
    }

    /// The current value of a field: the pending write if there is one,
    /// otherwise the value from the server.
    ///
    /// Returns `Ok(None)` for a valid field that this issue carries no value for.
    pub async fn get(&self, name_or_id: &str) -> Result<Option<&Value>> {
        let id = self.resolve(name_or_id).await?;
        Ok(self.pending.get_key(&id).or_else(|| self.field(&id)))
    }

    /// Record a write to a field. Nothing is sent until [`save`](Self::save).
    pub async fn set(&mut self, name_or_id: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let id = self.resolve(name_or_id).await?;
        debug!(field = %id, "Pending change recorded");
        self.pending.set_key(&id, value);
        Ok(())
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drop every pending write.
    pub fn discard_changes(&mut self) {
        self.pending.clear();
    }

    /// Persist the pending writes.
    ///
    /// An issue that already exists is updated with `PUT issue/{key}`; a new
    /// one is created with `POST issue` and takes on the server-assigned `id`
    /// and `key`. Only after the server accepts the write are the pending
    /// changes merged into [`data`](Self::data) and cleared. On failure both
    /// are left exactly as they were.
    ///
    /// If a create is accepted but the response carries no `key`, the issue
    /// may exist on the server even though this returns
    /// [`JiraError::Decode`]. The response text is kept in the error's `raw`;
    /// check it, or search for the issue, before calling `save` again, since a
    /// second save sends another `POST` and can create a duplicate.
    #[instrument(skip(self), fields(key = self.key()))]
    pub async fn save(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            debug!("Nothing to save");
            return Ok(());
        }

        let body = json!({ "fields": self.pending.clone() });
        match self.key().map(|key| format!("issue/{}", key)) {
            Some(path) => {
                self.client.put(&path, &body).await?;
            }
            None => {
                let created = match self.client.post("issue", &body).await? {
                    Payload::Record(record) if record.has("key") => record,
                    other => {
                        return Err(JiraError::decode(
                            "issue creation response carried no key",
                            other.to_json_string(),
                        ))
                    }
                };
                for attr in ["id", "key", "self"] {
                    if let Some(value) = created.get_key(attr) {
                        self.data.set_key(attr, value.clone());
                    }
                }
                info!(key = self.key(), "Issue created");
            }
        }

        let mut fields = self.data.get_record("fields").unwrap_or_default();
        fields.merge(&self.pending);
        self.data.set_key("fields", fields);
        self.pending.clear();
        Ok(())
    }

    /// Re-fetch the issue from the server. Pending writes are kept.
    pub async fn refresh(&mut self) -> Result<()> {
        let key = self
            .key()
            .ok_or_else(|| JiraError::IssueNotFound("unsaved issue".to_string()))?
            .to_string();
        self.data = self.client.fetch_issue(&key).await?;
        Ok(())
    }

    /// The edit metadata for this issue: which fields may be changed and how.
    pub async fn editmeta(&self) -> Result<Record> {
        let key = self
            .key()
            .ok_or_else(|| JiraError::IssueNotFound("unsaved issue".to_string()))?;
        self.client
            .lookup(&format!("issue/{}/editmeta", key), || {
                JiraError::IssueNotFound(key.to_string())
            })
            .await
    }

    pub fn is_subtask(&self) -> bool {
        self.data
            .get("fields.issuetype.subtask")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn is_assigned(&self) -> bool {
        self.field("assignee").is_some_and(|v| !v.is_null())
    }

    /// The key of the parent issue, for sub-tasks.
    pub fn parent_key(&self) -> Option<&str> {
        self.data.get_str("fields.parent.key")
    }

    pub fn subtask_keys(&self) -> Vec<String> {
        self.data
            .get_records("fields.subtasks")
            .iter()
            .filter_map(|subtask| subtask.get_str("key").map(str::to_string))
            .collect()
    }

    /// The ids of every field the server reported, sorted.
    pub fn field_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.field_keys().map(str::to_string).collect();
        ids.sort();
        ids
    }

    fn fields(&self) -> Option<&Map<String, Value>> {
        self.data.get_key("fields").and_then(Value::as_object)
    }

    fn field(&self, id: &str) -> Option<&Value> {
        self.fields().and_then(|fields| fields.get(id))
    }

    fn field_keys(&self) -> impl Iterator<Item = &str> {
        self.fields()
            .into_iter()
            .flat_map(|fields| fields.keys().map(String::as_str))
    }
}

impl JiraClient {
    /// Fetch an issue by key.
    ///
    /// # Errors
    ///
    /// [`JiraError::IssueNotFound`] if the server reports the issue absent,
    /// whether by status code or in the response body.
    #[instrument(skip(self))]
    pub async fn issue(&self, key: &str) -> Result<Issue<'_>> {
        let data = self.fetch_issue(key).await?;
        Ok(Issue::from_record(self, data))
    }

    /// An empty issue that [`Issue::save`] will create on the server.
    pub fn new_issue(&self) -> Issue<'_> {
        Issue::from_record(self, Record::new())
    }

    /// Create an issue of `issue_type` in `project_key`.
    #[instrument(skip(self))]
    pub async fn create_issue(
        &self,
        project_key: &str,
        issue_type: &str,
        summary: &str,
    ) -> Result<Issue<'_>> {
        let mut issue = self.new_issue();
        issue.pending.set_key("project", json!({ "key": project_key }));
        issue.pending.set_key("issuetype", json!({ "name": issue_type }));
        issue.pending.set_key("summary", summary);
        issue.save().await?;
        Ok(issue)
    }

    async fn fetch_issue(&self, key: &str) -> Result<Record> {
        self.lookup(&format!("issue/{}", key), || {
            JiraError::IssueNotFound(key.to_string())
        })
        .await
    }
}
