use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::ListingConfig;
use crate::source::{
    total_pages_for, CachedSource, IndexRecord, IndexSource, MemorySource, PageCache, PageSource,
};

/// Listing options shared by all subcommands
#[derive(Args, Debug, Clone, Default)]
pub struct ListingArgs {
    /// Query index URL to page through
    #[arg(short = 'e', long = "endpoint")]
    pub endpoint: Option<String>,

    /// Records per page
    #[arg(short = 's', long = "page-size")]
    pub page_size: Option<usize>,

    /// First page to show (zero-based)
    #[arg(short = 'p', long = "initial-page", allow_hyphen_values = true)]
    pub initial_page: Option<i64>,

    /// Number of records in the demo listing
    #[arg(long = "items")]
    pub demo_items: Option<usize>,

    /// Simulated latency of the demo listing
    #[arg(long = "latency-ms")]
    pub latency_ms: Option<u64>,

    /// Always ask the source, even for pages seen before
    #[arg(long = "no-cache")]
    pub no_cache: bool,
}

impl ListingArgs {
    /// Command-line values take precedence over file and environment
    pub fn apply(&self, config: &mut ListingConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = Some(endpoint.clone());
        }
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if let Some(initial_page) = self.initial_page {
            config.initial_page = initial_page;
        }
        if let Some(demo_items) = self.demo_items {
            config.demo_items = demo_items;
        }
        if let Some(latency_ms) = self.latency_ms {
            config.latency_ms = latency_ms;
        }
        if self.no_cache {
            config.cache.enabled = false;
        }
    }
}

/// Everything needed to start a listing
pub struct Listing {
    pub title: String,
    pub source: Arc<dyn PageSource<IndexRecord>>,
    pub total_pages: usize,
    pub cache: Option<PageCache<IndexRecord>>,
}

/// Generated press-release records for the demo listing
pub fn demo_records(count: usize) -> Vec<IndexRecord> {
    (1..=count)
        .map(|n| IndexRecord {
            path: format!("/press/release-{n:03}"),
            title: format!("Press release #{n}"),
            description: format!("Announcement number {n} from the newsroom"),
            image: None,
            date: Some(format!("2024-{:02}-{:02}", (n - 1) % 12 + 1, (n - 1) % 28 + 1)),
        })
        .collect()
}

fn with_cache<S>(source: S, config: &ListingConfig) -> (Arc<dyn PageSource<IndexRecord>>, Option<PageCache<IndexRecord>>)
where
    S: PageSource<IndexRecord> + 'static,
{
    if config.cache.enabled {
        let cache = PageCache::new(config.cache.max_pages, config.cache_ttl());
        (Arc::new(CachedSource::new(source, cache.clone())), Some(cache))
    } else {
        (Arc::new(source), None)
    }
}

/// Build the page source described by `config`
pub async fn open_listing(config: &ListingConfig) -> Result<Listing> {
    match &config.endpoint {
        Some(endpoint) => {
            let index: IndexSource = IndexSource::new(endpoint, config.page_size)?;
            let total = index
                .fetch_total()
                .await
                .with_context(|| format!("Failed to read record count from {}", endpoint))?;
            info!("{} holds {} records", endpoint, total);

            let (source, cache) = with_cache(index, config);
            Ok(Listing {
                title: endpoint.clone(),
                source,
                total_pages: total_pages_for(total, config.page_size),
                cache,
            })
        }
        None => {
            debug!("Using demo listing with {} records", config.demo_items);
            let memory = MemorySource::new(demo_records(config.demo_items), config.page_size)?
                .with_latency(config.latency());
            let total_pages = memory.total_pages();

            let (source, cache) = with_cache(memory, config);
            Ok(Listing {
                title: "Newsroom (demo)".to_string(),
                source,
                total_pages,
                cache,
            })
        }
    }
}
