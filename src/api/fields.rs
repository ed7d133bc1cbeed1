//! Field name resolution.
//!
//! Callers may refer to an issue field by its id or by its label. Resolution
//! tries, in order: the resource's own field keys, ids in the server catalog,
//! then labels in the server catalog. The first tier never touches the network,
//! so an issue's own fields shadow any ambiguous catalog label.

use std::sync::Arc;

use tracing::{debug, instrument};

use super::client::{JiraClient, Payload};
use super::error::{JiraError, Result};
use crate::cache::FieldCatalog;

impl JiraClient {
    /// The server's field catalog, fetched on first use and cached for the
    /// lifetime of this client.
    pub async fn field_catalog(&self) -> Result<Arc<FieldCatalog>> {
        self.fields
            .get_or_fetch(|| self.fetch_field_catalog())
            .await
    }

    /// Mapping of every field label to its id, in server order.
    pub async fn field_labels(&self) -> Result<Vec<(String, String)>> {
        let catalog = self.field_catalog().await?;
        Ok(catalog
            .iter()
            .map(|f| (f.name.clone(), f.id.clone()))
            .collect())
    }

    /// Forget the cached field catalog.
    pub async fn invalidate_fields(&self) {
        self.fields.invalidate().await;
    }

    /// Fetch the field catalog again, replacing the cached copy.
    pub async fn refresh_fields(&self) -> Result<Arc<FieldCatalog>> {
        self.fields.invalidate().await;
        self.field_catalog().await
    }

    /// Resolve `name_or_id` to a field id for a resource whose own field keys
    /// are `own_keys`.
    ///
    /// # Errors
    ///
    /// [`JiraError::InvalidField`] if the name matches neither an own field, a
    /// catalog id, nor a catalog label. Errors fetching the catalog propagate.
    #[instrument(skip(self, own_keys))]
    pub async fn resolve_field<'k, I>(&self, own_keys: I, name_or_id: &str) -> Result<String>
    where
        I: IntoIterator<Item = &'k str>,
    {
        if own_keys.into_iter().any(|key| key == name_or_id) {
            return Ok(name_or_id.to_string());
        }

        let catalog = self.field_catalog().await?;
        if catalog.contains_id(name_or_id) {
            return Ok(name_or_id.to_string());
        }
        if let Some(id) = catalog.id_for_label(name_or_id) {
            debug!(field_id = id, "Resolved field label");
            return Ok(id.to_string());
        }

        Err(JiraError::InvalidField(name_or_id.to_string()))
    }

    async fn fetch_field_catalog(&self) -> Result<FieldCatalog> {
        match self.get("field").await? {
            Payload::List(records) => Ok(FieldCatalog::from_records(&records)),
            Payload::Empty => Ok(FieldCatalog::default()),
            Payload::Record(record) => Err(JiraError::decode(
                "expected an array of fields",
                record.to_json_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::client::ClientConfig;
    use crate::api::record::Record;
    use crate::api::testing::ScriptedTransport;
    use crate::api::transport::{Method, TransportError};

    const FIELDS: &str = r#"[
        {"id": "summary", "name": "Summary", "custom": false},
        {"id": "description", "name": "Description", "custom": false},
        {"id": "customfield_10001", "name": "description", "custom": true},
        {"id": "customfield_10002", "name": "Custom Field", "custom": true},
        {"id": "customfield_10003", "name": "Custom Field", "custom": true}
    ]"#;

    fn client(transport: &Arc<ScriptedTransport>) -> JiraClient {
        JiraClient::with_transport(ClientConfig::new("http://localhost:8080"), transport.clone())
            .unwrap()
    }

    fn own_fields() -> Record {
        r#"{"summary": "New widget", "description": "We need a new foo widget"}"#
            .parse()
            .unwrap()
    }

    #[tokio::test]
    async fn test_own_key_wins_without_fetching() {
        let transport = ScriptedTransport::new();
        let client = client(&transport);

        let id = client.resolve_field(own_fields().keys(), "description").await.unwrap();
        assert_eq!(id, "description");
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_own_key_beats_colliding_label() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::Get, "/rest/api/2/field", 200, FIELDS);
        let client = client(&transport);

        // Populate the catalog so the collision is really there.
        let catalog = client.field_catalog().await.unwrap();
        assert_eq!(catalog.id_for_label("description"), Some("customfield_10001"));

        let id = client.resolve_field(own_fields().keys(), "description").await.unwrap();
        assert_eq!(id, "description");
    }

    #[tokio::test]
    async fn test_label_resolution_uses_first_match_and_caches() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::Get, "/rest/api/2/field", 200, FIELDS);
        let client = client(&transport);

        let id = client.resolve_field(std::iter::empty(), "Custom Field").await.unwrap();
        assert_eq!(id, "customfield_10002");
        let id = client.resolve_field(std::iter::empty(), "Summary").await.unwrap();
        assert_eq!(id, "summary");

        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_catalog_id_resolves() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::Get, "/rest/api/2/field", 200, FIELDS);
        let client = client(&transport);

        let id = client
            .resolve_field(std::iter::empty(), "customfield_10003")
            .await
            .unwrap();
        assert_eq!(id, "customfield_10003");
    }

    #[tokio::test]
    async fn test_unknown_field_is_invalid() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::Get, "/rest/api/2/field", 200, FIELDS);
        let client = client(&transport);

        let err = client
            .resolve_field(own_fields().keys(), "Bogus Field")
            .await
            .unwrap_err();
        assert!(matches!(err, JiraError::InvalidField(name) if name == "Bogus Field"));
    }

    #[tokio::test]
    async fn test_catalog_fetch_failure_propagates() {
        let transport = ScriptedTransport::new();
        transport.fail(Method::Get, "/rest/api/2/field", TransportError::Timeout);
        let client = client(&transport);

        let err = client
            .resolve_field(std::iter::empty(), "Summary")
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_refresh_refetches_catalog() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::Get, "/rest/api/2/field", 200, "[]");
        transport.respond(Method::Get, "/rest/api/2/field", 200, FIELDS);
        let client = client(&transport);

        assert!(client.field_catalog().await.unwrap().is_empty());
        assert!(client.field_catalog().await.unwrap().is_empty());
        assert_eq!(client.refresh_fields().await.unwrap().len(), 5);
        assert_eq!(transport.remaining(), 0);
    }

    #[tokio::test]
    async fn test_field_labels_in_server_order() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::Get, "/rest/api/2/field", 200, FIELDS);
        let client = client(&transport);

        let labels = client.field_labels().await.unwrap();
        assert_eq!(labels[0], ("Summary".to_string(), "summary".to_string()));
        assert_eq!(labels.len(), 5);
    }

    #[tokio::test]
    async fn test_object_instead_of_list_is_decode_error() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::Get, "/rest/api/2/field", 200, r#"{"oops": true}"#);
        let client = client(&transport);

        assert!(matches!(
            client.field_catalog().await,
            Err(JiraError::Decode { .. })
        ));
    }
}
