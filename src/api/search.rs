//! JQL search, one page at a time.

use futures::future::BoxFuture;
use futures::{FutureExt, Stream};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use super::client::{JiraClient, Payload};
use super::error::{JiraError, Result};
use super::issue::Issue;
use super::pagination::Paginator;
use super::record::Record;

/// One in-flight page request.
pub type PageFuture<'c> = BoxFuture<'c, Result<Payload>>;

/// The page source behind [`JiraClient::search_pages`].
pub type SearchPages<'c> = Box<dyn FnMut(usize, usize) -> PageFuture<'c> + Send + 'c>;

/// A JQL query plus the options that shape its result pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub jql: String,
    /// Fields to return for each issue. Empty means the server default.
    pub fields: Vec<String>,
    /// Items per page. `None` uses the client's page size.
    pub page_size: Option<usize>,
}

impl SearchQuery {
    pub fn new(jql: impl Into<String>) -> Self {
        Self {
            jql: jql.into(),
            fields: Vec::new(),
            page_size: None,
        }
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// The `POST search` body for one page.
    pub fn body(&self, start_at: usize, max_results: usize) -> Value {
        let mut body = json!({
            "jql": self.jql,
            "startAt": start_at,
            "maxResults": max_results,
        });
        if !self.fields.is_empty() {
            body["fields"] = json!(self.fields);
        }
        body
    }
}

/// Issues matching a query, fetched lazily page by page.
pub struct IssueStream<'c> {
    client: &'c JiraClient,
    pages: Paginator<SearchPages<'c>>,
}

impl<'c> IssueStream<'c> {
    /// The next matching issue, or `None` when the results are exhausted.
    #[allow(clippy::should_implement_trait)]
    pub async fn next(&mut self) -> Option<Result<Issue<'c>>> {
        let item = self.pages.next().await?;
        Some(item.map(|data| Issue::from_record(self.client, data)))
    }

    /// The server's count of matching issues, known after the first page.
    pub fn reported_total(&self) -> Option<u64> {
        self.pages.reported_total()
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<Issue<'c>>> + 'c {
        futures::stream::unfold(self, |mut issues| async move {
            let item = issues.next().await?;
            Some((item, issues))
        })
    }
}

impl JiraClient {
    /// Run one page of a search and return the raw envelope.
    #[instrument(skip(self, query), fields(jql = %query.jql))]
    pub async fn search(
        &self,
        query: &SearchQuery,
        start_at: usize,
        max_results: usize,
    ) -> Result<Record> {
        match self.post("search", &query.body(start_at, max_results)).await? {
            Payload::Record(envelope) => Ok(envelope),
            other @ Payload::Empty => Err(JiraError::decode(
                "empty search response",
                other.to_json_string(),
            )),
            other @ Payload::List(_) => Err(JiraError::decode(
                "expected a search envelope, found an array",
                other.to_json_string(),
            )),
        }
    }

    /// Every issue record matching `query`, fetched as it is consumed.
    pub fn search_pages<'c>(&'c self, query: &SearchQuery) -> Paginator<SearchPages<'c>> {
        let page_size = query.page_size.unwrap_or(self.page_size());
        let query = query.clone();
        let fetch: SearchPages<'c> = Box::new(
            move |start_at: usize, max_results: usize| -> PageFuture<'c> {
                let body = query.body(start_at, max_results);
                async move { self.post("search", &body).await }.boxed()
            },
        );
        Paginator::new(fetch, page_size).with_items_key("issues")
    }

    /// Every issue matching `query`, as [`Issue`] aggregates.
    pub fn issues(&self, query: &SearchQuery) -> IssueStream<'_> {
        IssueStream {
            client: self,
            pages: self.search_pages(query),
        }
    }

    /// The keys of every issue matching `jql`.
    ///
    /// Stops on a short page, or as soon as the number of keys collected
    /// reaches the total the server reported, whichever comes first.
    #[instrument(skip(self))]
    pub async fn issue_keys(&self, jql: &str) -> Result<Vec<String>> {
        let query = SearchQuery::new(jql).with_fields(["key"]);
        let mut pages = self.search_pages(&query);
        let mut keys = Vec::new();
        let mut seen: u64 = 0;

        loop {
            if pages.reported_total().is_some_and(|total| seen >= total) {
                break;
            }
            let Some(item) = pages.next().await else {
                break;
            };
            let item = item?;
            seen += 1;
            if let Some(key) = item.get_str("key") {
                keys.push(key.to_string());
            }
        }

        debug!(keys = keys.len(), pages = pages.pages_fetched(), "Collected issue keys");
        Ok(keys)
    }

    /// The number of issues matching `jql`, as reported by the server.
    #[instrument(skip(self))]
    pub async fn count(&self, jql: &str) -> Result<u64> {
        let envelope = self.search(&SearchQuery::new(jql), 0, 1).await?;
        envelope
            .get_u64("total")
            .ok_or_else(|| JiraError::KeyNotFound("total".to_string()))
    }
}
