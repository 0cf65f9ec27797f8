//! In-memory page source with optional simulated latency

use super::{LoadContext, PageSource};
use crate::error::{PaginationError, PaginationResult};
use async_trait::async_trait;
use std::time::Duration;
use tracing::trace;

/// Serves fixed-size pages out of a vector
#[derive(Debug, Clone)]
pub struct MemorySource<T> {
    items: Vec<T>,
    page_size: usize,
    latency: Option<Duration>,
}

impl<T: Clone + Send + Sync> MemorySource<T> {
    /// Create a source over `items` split into pages of `page_size`
    pub fn new(items: Vec<T>, page_size: usize) -> PaginationResult<Self> {
        if page_size == 0 {
            return Err(PaginationError::Config(
                "page size must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            items,
            page_size,
            latency: None,
        })
    }

    /// Delay every load by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency).filter(|latency| !latency.is_zero());
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_items(&self) -> usize {
        self.items.len()
    }

    /// Number of pages, at least one
    pub fn total_pages(&self) -> usize {
        super::total_pages_for(self.items.len(), self.page_size)
    }

    /// Items on `page`; empty past the end
    pub fn page(&self, page: usize) -> Vec<T> {
        let start = page.saturating_mul(self.page_size).min(self.items.len());
        let end = start.saturating_add(self.page_size).min(self.items.len());
        self.items[start..end].to_vec()
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> PageSource<T> for MemorySource<T> {
    async fn load_page(&self, mut ctx: LoadContext) -> PaginationResult<Vec<T>> {
        if let Some(latency) = self.latency {
            tokio::select! {
                _ = tokio::time::sleep(latency) => {}
                _ = ctx.superseded() => {
                    trace!("Abandoning superseded load of page {}", ctx.page());
                    return Err(ctx.superseded_error());
                }
            }
        }
        Ok(self.page(ctx.page()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::watch;

    #[test]
    fn test_page_slicing() {
        let source = MemorySource::new((0..25).collect::<Vec<_>>(), 10).unwrap();
        assert_eq!(source.total_pages(), 3);
        assert_eq!(source.page(0), (0..10).collect::<Vec<_>>());
        assert_eq!(source.page(2), (20..25).collect::<Vec<_>>());
        assert!(source.page(3).is_empty());
        assert!(source.page(usize::MAX).is_empty());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(matches!(
            MemorySource::new(vec![1], 0),
            Err(PaginationError::Config(_))
        ));
    }

    #[test]
    fn test_empty_source_has_one_page() {
        let source = MemorySource::<u8>::new(Vec::new(), 5).unwrap();
        assert_eq!(source.total_pages(), 1);
    }

    #[tokio::test]
    async fn test_load_without_latency() {
        let source = MemorySource::new(vec!["a", "b", "c"], 2).unwrap();
        let items = source.load_page(LoadContext::detached(1)).await.unwrap();
        assert_eq!(items, vec!["c"]);
    }

    #[tokio::test]
    async fn test_superseded_load_is_abandoned() {
        let source = MemorySource::new(vec![1, 2, 3], 1)
            .unwrap()
            .with_latency(Duration::from_secs(30));

        let (sender, latest) = watch::channel(1);
        let ctx = LoadContext::new(0, 1, latest);
        let load = tokio::spawn(async move { source.load_page(ctx).await });

        sender.send_replace(2);
        let result = load.await.unwrap();
        assert!(matches!(result, Err(PaginationError::Superseded(0))));
    }
}
