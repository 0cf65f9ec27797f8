//! Query-index page source.
//!
//! Listing blocks (press releases, article cards, magazine issues) read
//! their records from a JSON index endpoint that supports `offset` and
//! `limit` parameters and answers with
//! `{ "total": n, "offset": o, "limit": l, "data": [ ... ] }`.

use super::{LoadContext, PageSource};
use crate::error::{PaginationError, PaginationResult};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, trace};

/// Number of pages needed for `count` items, never less than one
pub fn total_pages_for(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    count.div_ceil(page_size).max(1)
}

/// One row of a query index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, deserialize_with = "optional_text")]
    pub image: Option<String>,

    #[serde(default, alias = "publishedDate", deserialize_with = "optional_text")]
    pub date: Option<String>,
}

impl fmt::Display for IndexRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.date {
            Some(date) => write!(f, "{} ({})", self.title, date),
            None => f.write_str(&self.title),
        }
    }
}

/// Index cells arrive as strings or numbers; empty strings mean "absent"
fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(text)) if !text.trim().is_empty() => Some(text),
        Some(serde_json::Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

/// One page of an index response
#[derive(Debug, Clone, Deserialize)]
pub struct IndexResponse<R> {
    #[serde(default)]
    pub total: usize,

    #[serde(default)]
    pub offset: usize,

    #[serde(default)]
    pub limit: usize,

    #[serde(default = "Vec::new")]
    pub data: Vec<R>,
}

/// HTTP page source over a query index
#[derive(Debug, Clone)]
pub struct IndexSource<R = IndexRecord> {
    client: Client,
    endpoint: Url,
    page_size: usize,
    _records: PhantomData<fn() -> R>,
}

impl<R> IndexSource<R>
where
    R: DeserializeOwned + Send,
{
    /// Create a source reading `page_size` records per page from `endpoint`
    pub fn new(endpoint: &str, page_size: usize) -> PaginationResult<Self> {
        Self::with_client(Client::new(), endpoint, page_size)
    }

    pub fn with_client(client: Client, endpoint: &str, page_size: usize) -> PaginationResult<Self> {
        if page_size == 0 {
            return Err(PaginationError::Config(
                "page size must be greater than zero".to_string(),
            ));
        }

        let endpoint = Url::parse(endpoint)
            .map_err(|e| PaginationError::Config(format!("invalid index endpoint {endpoint}: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            page_size,
            _records: PhantomData,
        })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// URL of `limit` records starting at `offset`
    pub fn window_url(&self, offset: usize, limit: usize) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("offset", &offset.to_string())
            .append_pair("limit", &limit.to_string());
        url
    }

    /// URL for one zero-based page
    pub fn page_url(&self, page: usize) -> Url {
        self.window_url(page.saturating_mul(self.page_size), self.page_size)
    }

    async fn fetch(&self, url: Url) -> PaginationResult<IndexResponse<R>> {
        trace!("GET {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.json::<IndexResponse<R>>().await?)
    }

    /// Total record count reported by the index
    pub async fn fetch_total(&self) -> PaginationResult<usize> {
        let response = self.fetch(self.window_url(0, 1)).await?;
        debug!("Index {} reports {} records", self.endpoint, response.total);
        Ok(response.total)
    }

    /// Number of pages of this source's page size
    pub async fn fetch_total_pages(&self) -> PaginationResult<usize> {
        Ok(total_pages_for(self.fetch_total().await?, self.page_size))
    }
}

#[async_trait]
impl<R> PageSource<R> for IndexSource<R>
where
    R: DeserializeOwned + Send,
{
    async fn load_page(&self, mut ctx: LoadContext) -> PaginationResult<Vec<R>> {
        let url = self.page_url(ctx.page());

        // dropping the request future aborts the HTTP exchange
        let response = tokio::select! {
            response = self.fetch(url) => response?,
            _ = ctx.superseded() => return Err(ctx.superseded_error()),
        };

        Ok(response.data)
    }
}
