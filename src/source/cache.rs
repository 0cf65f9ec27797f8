//! Caller-owned page cache.
//!
//! The listing itself always asks its source for data. Callers that want
//! revisited pages served from memory wrap their source in a
//! [`CachedSource`] and keep the [`PageCache`] handle themselves, so the
//! store can be shared, inspected or cleared without touching the listing.

use super::{LoadContext, PageSource};
use crate::error::PaginationResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Cached page data
#[derive(Debug, Clone)]
struct CachedPage<T> {
    items: Vec<T>,
    cached_at: Instant,
    last_accessed: Instant,
}

/// Cache hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Shared store of loaded pages keyed by page index
#[derive(Debug)]
pub struct PageCache<T> {
    pages: Arc<RwLock<HashMap<usize, CachedPage<T>>>>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    max_pages: usize,
    ttl: Duration,
}

impl<T> Clone for PageCache<T> {
    fn clone(&self) -> Self {
        Self {
            pages: Arc::clone(&self.pages),
            hits: Arc::clone(&self.hits),
            misses: Arc::clone(&self.misses),
            max_pages: self.max_pages,
            ttl: self.ttl,
        }
    }
}

impl<T: Clone + Send + Sync> PageCache<T> {
    /// Create a cache holding at most `max_pages` pages for `ttl` each
    pub fn new(max_pages: usize, ttl: Duration) -> Self {
        Self {
            pages: Arc::new(RwLock::new(HashMap::new())),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
            max_pages: max_pages.max(1),
            ttl,
        }
    }

    /// Cached items for `page`, if present and fresh
    pub async fn get(&self, page: usize) -> Option<Vec<T>> {
        let mut pages = self.pages.write().await;
        let fresh = pages
            .get(&page)
            .map(|entry| entry.cached_at.elapsed() < self.ttl);

        match fresh {
            Some(true) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                let entry = pages.get_mut(&page)?;
                entry.last_accessed = Instant::now();
                Some(entry.items.clone())
            }
            Some(false) => {
                pages.remove(&page);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store `items` for `page`, evicting old entries when full
    pub async fn insert(&self, page: usize, items: Vec<T>) {
        let now = Instant::now();
        let mut pages = self.pages.write().await;
        pages.insert(
            page,
            CachedPage {
                items,
                cached_at: now,
                last_accessed: now,
            },
        );

        if pages.len() > self.max_pages {
            self.evict(&mut pages);
        }
    }

    /// Remove every cached page
    pub async fn clear(&self) {
        self.pages.write().await.clear();
    }

    pub async fn contains(&self, page: usize) -> bool {
        self.pages.read().await.contains_key(&page)
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: self.pages.read().await.len(),
        }
    }

    /// Drop expired pages, then least recently used ones until within bounds
    fn evict(&self, pages: &mut HashMap<usize, CachedPage<T>>) {
        let ttl = self.ttl;
        pages.retain(|_, entry| entry.cached_at.elapsed() < ttl);

        if pages.len() > self.max_pages {
            let mut by_access: Vec<_> = pages
                .iter()
                .map(|(page, entry)| (*page, entry.last_accessed))
                .collect();
            by_access.sort_by_key(|(_, accessed)| *accessed);

            let excess = pages.len() - self.max_pages;
            for (page, _) in by_access.into_iter().take(excess) {
                pages.remove(&page);
            }
        }

        debug!("Page cache trimmed to {} entries", pages.len());
    }
}

/// Source that consults a [`PageCache`] before delegating
pub struct CachedSource<S, T> {
    inner: S,
    cache: PageCache<T>,
}

impl<S, T> CachedSource<S, T>
where
    S: PageSource<T>,
    T: Clone + Send + Sync,
{
    pub fn new(inner: S, cache: PageCache<T>) -> Self {
        Self { inner, cache }
    }

    /// Handle to the underlying cache
    pub fn cache(&self) -> &PageCache<T> {
        &self.cache
    }
}

#[async_trait]
impl<S, T> PageSource<T> for CachedSource<S, T>
where
    S: PageSource<T>,
    T: Clone + Send + Sync,
{
    async fn load_page(&self, ctx: LoadContext) -> PaginationResult<Vec<T>> {
        let page = ctx.page();
        if let Some(items) = self.cache.get(page).await {
            debug!("Serving page {} from cache", page);
            return Ok(items);
        }

        let items = self.inner.load_page(ctx).await?;
        self.cache.insert(page, items.clone()).await;
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PaginationError;
    use crate::source::from_fn;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn test_get_and_insert() {
        let cache = PageCache::new(4, Duration::from_secs(60));
        assert_eq!(cache.get(0).await, None);

        cache.insert(0, vec!["a", "b"]).await;
        assert_eq!(cache.get(0).await, Some(vec!["a", "b"]));

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_expired_pages_are_misses() {
        let cache = PageCache::new(4, Duration::ZERO);
        cache.insert(1, vec![1]).await;
        assert_eq!(cache.get(1).await, None);
        assert!(!cache.contains(1).await);
    }

    #[tokio::test]
    async fn test_least_recently_used_page_evicted() {
        let cache = PageCache::new(2, Duration::from_secs(60));
        cache.insert(0, vec![0]).await;
        cache.insert(1, vec![1]).await;
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(cache.get(0).await.is_some());

        cache.insert(2, vec![2]).await;
        assert!(cache.contains(0).await);
        assert!(!cache.contains(1).await);
        assert!(cache.contains(2).await);
    }

    #[tokio::test]
    async fn test_cached_source_skips_inner_on_hit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let inner = from_fn(move |page| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, PaginationError>(vec![page]) }
        });

        let cache = PageCache::new(8, Duration::from_secs(60));
        let source = CachedSource::new(inner, cache.clone());

        assert_eq!(source.load_page(LoadContext::detached(3)).await.unwrap(), vec![3]);
        assert_eq!(source.load_page(LoadContext::detached(3)).await.unwrap(), vec![3]);
        assert_eq!(source.load_page(LoadContext::detached(4)).await.unwrap(), vec![4]);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.stats().await.hits, 1);
    }

    #[tokio::test]
    async fn test_failed_loads_are_not_cached() {
        let inner = from_fn(|page| async move {
            Err::<Vec<usize>, _>(PaginationError::load(page, "offline"))
        });
        let cache = PageCache::new(8, Duration::from_secs(60));
        let source = CachedSource::new(inner, cache.clone());

        assert!(source.load_page(LoadContext::detached(0)).await.is_err());
        assert_eq!(cache.stats().await.size, 0);
    }
}
