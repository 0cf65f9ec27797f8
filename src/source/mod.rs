//! Page data sources.
//!
//! A source turns a page index into that page's items. Sources are owned by
//! the caller and shared with the listing behind an `Arc`; the listing
//! calls [`PageSource::load_page`] exactly once per transition.

pub mod cache;
pub mod index;
pub mod memory;

pub use cache::{CacheStats, CachedSource, PageCache};
pub use index::{total_pages_for, IndexRecord, IndexResponse, IndexSource};
pub use memory::MemorySource;

use crate::error::{PaginationError, PaginationResult};
use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;
use tokio::sync::watch;

/// Per-load information handed to a source
#[derive(Debug, Clone)]
pub struct LoadContext {
    page: usize,
    sequence: u64,
    latest: watch::Receiver<u64>,
}

impl LoadContext {
    pub fn new(page: usize, sequence: u64, latest: watch::Receiver<u64>) -> Self {
        Self {
            page,
            sequence,
            latest,
        }
    }

    /// Context that is never superseded, for loading outside a listing
    pub fn detached(page: usize) -> Self {
        let (_, latest) = watch::channel(0);
        Self::new(page, 0, latest)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Whether a newer navigation has been issued since this load started
    pub fn is_superseded(&self) -> bool {
        *self.latest.borrow() != self.sequence
    }

    /// Resolves once a newer navigation is issued.
    ///
    /// Never resolves if the listing is gone and nothing superseded this
    /// load, so it is only useful inside `tokio::select!`.
    pub async fn superseded(&mut self) {
        let sequence = self.sequence;
        let closed = self
            .latest
            .wait_for(|latest| *latest != sequence)
            .await
            .is_err();
        if closed {
            futures::future::pending::<()>().await;
        }
    }

    /// Error a source returns when it abandons superseded work
    pub fn superseded_error(&self) -> PaginationError {
        PaginationError::Superseded(self.page)
    }
}

/// Asynchronous source of page items
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    /// Load the items of `ctx.page()`.
    ///
    /// Only called with in-range pages. Sources may return
    /// [`PaginationError::Superseded`] once `ctx` reports supersession.
    async fn load_page(&self, ctx: LoadContext) -> PaginationResult<Vec<T>>;
}

/// Adapter turning an async closure into a [`PageSource`]
pub struct PageFn<F, T> {
    load: F,
    _items: PhantomData<fn() -> T>,
}

/// Build a source from `|page| async move { ... }`
pub fn from_fn<F, Fut, T>(load: F) -> PageFn<F, T>
where
    F: Fn(usize) -> Fut + Send + Sync,
    Fut: Future<Output = PaginationResult<Vec<T>>> + Send,
{
    PageFn {
        load,
        _items: PhantomData,
    }
}

#[async_trait]
impl<F, Fut, T> PageSource<T> for PageFn<F, T>
where
    F: Fn(usize) -> Fut + Send + Sync,
    Fut: Future<Output = PaginationResult<Vec<T>>> + Send,
    T: Send,
{
    async fn load_page(&self, ctx: LoadContext) -> PaginationResult<Vec<T>> {
        (self.load)(ctx.page()).await
    }
}
