//! Lazy enumeration of paged API results.
//!
//! A [`Paginator`] drives a page-fetching function one page at a time and
//! hands out the items individually. A page is requested only when the
//! consumer asks for an item and the previous page is used up, so stopping
//! early never costs an extra request.
//!
//! Enumeration ends when a page comes back with fewer items than were asked
//! for. Server-reported totals are recorded but not trusted for termination,
//! which means a result set that is an exact multiple of the page size costs
//! one final empty fetch.

use std::collections::VecDeque;
use std::future::Future;

use futures::Stream;
use serde_json::Value;
use tracing::{debug, trace};

use super::client::Payload;
use super::error::{JiraError, Result};
use super::record::{kind_of, Record};

/// Pulls items from a paged remote operation.
///
/// `fetch(start_at, max_results)` must return either a bare list of items or
/// an envelope object holding the items under the configured key.
pub struct Paginator<F> {
    fetch: F,
    items_key: Option<String>,
    page_size: usize,
    page: usize,
    buffer: VecDeque<Record>,
    exhausted: bool,
    reported_total: Option<u64>,
    pages_fetched: usize,
}

impl<F, Fut> Paginator<F>
where
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = Result<Payload>>,
{
    /// Create a paginator that requests `page_size` items at a time.
    ///
    /// A page size of zero is treated as one.
    pub fn new(fetch: F, page_size: usize) -> Self {
        Self {
            fetch,
            items_key: None,
            page_size: page_size.max(1),
            page: 0,
            buffer: VecDeque::new(),
            exhausted: false,
            reported_total: None,
            pages_fetched: 0,
        }
    }

    /// Read items from `key` of an envelope response, e.g. `"issues"`.
    pub fn with_items_key(mut self, key: &str) -> Self {
        self.items_key = Some(key.to_string());
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The `total` of the most recent envelope, if the server sent one.
    pub fn reported_total(&self) -> Option<u64> {
        self.reported_total
    }

    /// Number of fetches performed so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// The next item, fetching a new page if the current one is used up.
    ///
    /// Returns `None` once the results are exhausted. A failed fetch is
    /// returned once as `Some(Err(_))`, after which the paginator is exhausted.
    #[allow(clippy::should_implement_trait)]
    pub async fn next(&mut self) -> Option<Result<Record>> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.fetch_page().await {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
        self.buffer.pop_front().map(Ok)
    }

    /// Collect up to `n` items, fetching only the pages needed for them.
    pub async fn take(&mut self, n: usize) -> Result<Vec<Record>> {
        let mut items = Vec::with_capacity(n.min(self.page_size));
        while items.len() < n {
            match self.next().await {
                Some(item) => items.push(item?),
                None => break,
            }
        }
        Ok(items)
    }

    /// Collect every remaining item.
    pub async fn collect_all(mut self) -> Result<Vec<Record>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await {
            items.push(item?);
        }
        Ok(items)
    }

    /// Turn the paginator into a [`Stream`] with the same one-page-at-a-time
    /// behavior.
    pub fn into_stream(self) -> impl Stream<Item = Result<Record>> {
        futures::stream::unfold(self, |mut pages| async move {
            let item = pages.next().await?;
            Some((item, pages))
        })
    }

    async fn fetch_page(&mut self) -> Result<()> {
        let start_at = self.page * self.page_size;
        trace!(start_at, max_results = self.page_size, "Fetching page");

        let payload = (self.fetch)(start_at, self.page_size).await?;
        self.pages_fetched += 1;

        let items = self.extract_items(payload)?;
        if items.len() < self.page_size {
            debug!(
                start_at,
                received = items.len(),
                pages = self.pages_fetched,
                "Last page reached"
            );
            self.exhausted = true;
        } else {
            self.page += 1;
        }

        self.buffer.extend(items);
        Ok(())
    }

    fn extract_items(&mut self, payload: Payload) -> Result<Vec<Record>> {
        match payload {
            Payload::Empty => Ok(Vec::new()),
            Payload::List(items) => Ok(items),
            Payload::Record(envelope) => {
                let key = self.items_key.as_deref().ok_or_else(|| {
                    JiraError::decode(
                        "expected a list of items, found an object",
                        envelope.to_json_string(),
                    )
                })?;
                if let Some(total) = envelope.get_u64("total") {
                    self.reported_total = Some(total);
                }
                match envelope.get_key(key) {
                    None | Some(Value::Null) => Ok(Vec::new()),
                    Some(Value::Array(items)) => items
                        .iter()
                        .map(|item| Record::from_value(item.clone()))
                        .collect(),
                    Some(other) => Err(JiraError::decode(
                        format!("expected '{}' to be an array, found {}", key, kind_of(other)),
                        envelope.to_json_string(),
                    )),
                }
            }
        }
    }
}
