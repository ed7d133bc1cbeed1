//! Field catalog caching.
//!
//! JIRA identifies issue fields by stable ids (`summary`, `customfield_10001`)
//! and shows them to people under labels (`Summary`, `Story Points`). The full
//! id/label catalog comes from `GET /rest/api/2/field`; this module keeps one
//! copy of it per client so that label lookups cost a single request per
//! session.
//!
//! The cache is never refreshed on its own. If the server's field catalog
//! changes mid-session, call [`FieldCache::invalidate`] and the next lookup
//! fetches it again.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::api::{Record, Result};

/// One entry of the server's field catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// The stable field id, e.g. `customfield_10001`.
    pub id: String,
    /// The display label, e.g. `Story Points`.
    pub name: String,
    /// Whether this is a custom field.
    pub custom: bool,
}

/// The id/label mapping for every field on the server, in server order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldCatalog {
    fields: Vec<FieldDescriptor>,
}

impl FieldCatalog {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self { fields }
    }

    /// Build a catalog from the records returned by `GET field`.
    ///
    /// Entries without an `id` or `name` are skipped.
    pub fn from_records(records: &[Record]) -> Self {
        let fields = records
            .iter()
            .filter_map(|record| {
                let id = record.get_str("id")?;
                let name = record.get_str("name")?;
                Some(FieldDescriptor {
                    id: id.to_string(),
                    name: name.to_string(),
                    custom: record.get_bool("custom").unwrap_or(false),
                })
            })
            .collect();
        Self { fields }
    }

    /// The id of the first field carrying `label`.
    ///
    /// Labels are not guaranteed unique; the first match in server order wins.
    pub fn id_for_label(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == label)
            .map(|f| f.id.as_str())
    }

    /// The label of the field with this id.
    pub fn label_for_id(&self, id: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.id == id)
            .map(|f| f.name.as_str())
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.fields.iter().any(|f| f.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Lazily-populated holder for a [`FieldCatalog`].
///
/// Concurrent callers wait on the same fetch rather than issuing their own.
#[derive(Debug, Default)]
pub struct FieldCache {
    catalog: Mutex<Option<Arc<FieldCatalog>>>,
}

impl FieldCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached catalog, running `fetch` to populate it on first use.
    ///
    /// A failed fetch leaves the cache empty so the next call tries again.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<Arc<FieldCatalog>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<FieldCatalog>>,
    {
        let mut guard = self.catalog.lock().await;
        if let Some(catalog) = guard.as_ref() {
            trace!("Field catalog served from cache");
            return Ok(Arc::clone(catalog));
        }

        let catalog = Arc::new(fetch().await?);
        debug!(fields = catalog.len(), "Field catalog cached");
        *guard = Some(Arc::clone(&catalog));
        Ok(catalog)
    }

    /// The cached catalog, if it has been fetched.
    pub async fn get(&self) -> Option<Arc<FieldCatalog>> {
        self.catalog.lock().await.clone()
    }

    /// Drop the cached catalog so the next lookup fetches it again.
    pub async fn invalidate(&self) {
        debug!("Field catalog invalidated");
        *self.catalog.lock().await = None;
    }

    pub async fn is_populated(&self) -> bool {
        self.catalog.lock().await.is_some()
    }
}
