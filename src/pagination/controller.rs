//! Paginated list controller.
//!
//! Owns the pagination state of one listing, renders controls
//! optimistically, runs guarded loads against the caller's
//! [`PageSource`] and hands fresh results to the caller's
//! [`ItemRenderer`]. Overlapping navigations resolve as last request wins:
//! every load captures a sequence number and its result is dropped if a
//! newer navigation was issued meanwhile.

use super::controls::Controls;
use super::events::PaginationEvent;
use super::state::{LoadTicket, PaginationState, Resolution, Trigger};
use crate::error::{PaginationError, PaginationResult};
use crate::render::ItemRenderer;
use crate::source::{LoadContext, PageSource};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, trace, warn};

/// Buffered events per subscriber before it starts lagging
const EVENT_CAPACITY: usize = 64;

type PageChangeHook = Box<dyn Fn(usize, usize) + Send + Sync>;

/// How a single navigation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Target was already active; nothing was loaded
    Unchanged { page: usize },
    /// Items rendered and page confirmed
    Applied { page: usize },
    /// A newer navigation superseded this one
    Discarded { page: usize },
    /// The source failed; previous content remains
    Failed { page: usize, error: String },
    /// The load task panicked or was cancelled by the runtime
    Aborted { page: usize },
}

impl LoadOutcome {
    pub fn page(&self) -> usize {
        match self {
            LoadOutcome::Unchanged { page }
            | LoadOutcome::Applied { page }
            | LoadOutcome::Discarded { page }
            | LoadOutcome::Failed { page, .. }
            | LoadOutcome::Aborted { page } => *page,
        }
    }
}

/// Handle to an issued navigation.
///
/// Dropping it does not cancel the load.
#[derive(Debug)]
pub struct PageLoad {
    page: usize,
    handle: Option<JoinHandle<LoadOutcome>>,
}

impl PageLoad {
    fn unchanged(page: usize) -> Self {
        Self { page, handle: None }
    }

    /// Clamped target page
    pub fn page(&self) -> usize {
        self.page
    }

    /// Whether the navigation was a no-op
    pub fn is_unchanged(&self) -> bool {
        self.handle.is_none()
    }

    /// Wait for the load to settle
    pub async fn outcome(self) -> LoadOutcome {
        let Some(handle) = self.handle else {
            return LoadOutcome::Unchanged { page: self.page };
        };

        match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Load task for page {} did not finish: {}", self.page, e);
                LoadOutcome::Aborted { page: self.page }
            }
        }
    }
}

/// Point-in-time view of a listing's state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationSnapshot {
    pub active_page: usize,
    pub total_pages: usize,
    /// Page the controls show (pending target while loading)
    pub displayed_page: usize,
    pub is_loading: bool,
    pub should_focus: bool,
    pub request_sequence: u64,
    /// Message of the last failed load, cleared by the next applied one
    pub last_error: Option<String>,
}

/// Builder for [`PaginatedList`]
pub struct PaginatedListBuilder<T> {
    total_pages: Option<i64>,
    initial_page: i64,
    source: Option<Arc<dyn PageSource<T>>>,
    renderer: Option<Box<dyn ItemRenderer<T>>>,
    on_page_change: Option<PageChangeHook>,
    events: broadcast::Sender<PaginationEvent>,
}

impl<T: Send + 'static> PaginatedListBuilder<T> {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            total_pages: None,
            initial_page: 0,
            source: None,
            renderer: None,
            on_page_change: None,
            events,
        }
    }

    /// Number of pages; values below one become one
    pub fn total_pages(mut self, total_pages: i64) -> Self {
        self.total_pages = Some(total_pages);
        self
    }

    /// First page shown, clamped into range (default 0)
    pub fn initial_page(mut self, page: i64) -> Self {
        self.initial_page = page;
        self
    }

    pub fn source<S>(mut self, source: S) -> Self
    where
        S: PageSource<T> + 'static,
    {
        self.source = Some(Arc::new(source));
        self
    }

    /// Use a source that is shared with other owners
    pub fn shared_source(mut self, source: Arc<dyn PageSource<T>>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn renderer<R>(mut self, renderer: R) -> Self
    where
        R: ItemRenderer<T> + 'static,
    {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Called with `(page, total_pages)` after every applied load.
    ///
    /// The hook runs while the listing is locked and must not call back
    /// into it; spawn a task to navigate from a hook.
    pub fn on_page_change<F>(mut self, hook: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.on_page_change = Some(Box::new(hook));
        self
    }

    /// Subscribe before starting to also observe the initial render
    pub fn subscribe(&self) -> broadcast::Receiver<PaginationEvent> {
        self.events.subscribe()
    }

    /// Render the initial controls and issue the first load.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(self) -> PaginationResult<(PaginatedList<T>, PageLoad)> {
        let total_pages = self
            .total_pages
            .ok_or(PaginationError::MissingField("total_pages"))?;
        let source = self.source.ok_or(PaginationError::MissingField("source"))?;
        let renderer = self
            .renderer
            .ok_or(PaginationError::MissingField("renderer"))?;

        let state = PaginationState::new(total_pages, self.initial_page);
        let initial_page = state.active_page();
        let controls = Controls::build(initial_page, state.total_pages(), false, false);
        let (latest, _) = watch::channel(state.request_sequence());

        let list = PaginatedList {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    state,
                    renderer,
                    controls,
                    last_error: None,
                }),
                source,
                events: self.events,
                latest,
                on_page_change: self.on_page_change,
            }),
        };

        let initial = list.issue(page_arg(initial_page), Trigger::Initial);
        Ok((list, initial))
    }
}

impl<T: Send + 'static> Default for PaginatedListBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

struct Inner<T> {
    state: PaginationState,
    renderer: Box<dyn ItemRenderer<T>>,
    controls: Controls,
    last_error: Option<String>,
}

struct Shared<T> {
    inner: Mutex<Inner<T>>,
    source: Arc<dyn PageSource<T>>,
    events: broadcast::Sender<PaginationEvent>,
    /// Sequence of the most recent request, observed by sources
    latest: watch::Sender<u64>,
    on_page_change: Option<PageChangeHook>,
}

impl<T: Send + 'static> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: PaginationEvent) {
        self.events.send(event).ok();
    }

    async fn run(self: Arc<Self>, ticket: LoadTicket) -> LoadOutcome {
        let ctx = LoadContext::new(ticket.page, ticket.sequence, self.latest.subscribe());
        let result = self.source.load_page(ctx).await;

        let mut inner = self.lock();

        let items = match result {
            Ok(items) => items,
            Err(e) if !inner.state.is_current(&ticket) => {
                debug!("Ignoring superseded load of page {}: {}", ticket.page, e);
                self.emit(PaginationEvent::StaleDiscarded {
                    page: ticket.page,
                    sequence: ticket.sequence,
                });
                return LoadOutcome::Discarded { page: ticket.page };
            }
            Err(e) => {
                error!("Failed to load page {}: {}", ticket.page, e);
                let message = e.to_string();
                inner.last_error = Some(message.clone());
                self.emit(PaginationEvent::LoadFailed {
                    page: ticket.page,
                    error: message.clone(),
                });
                return LoadOutcome::Failed {
                    page: ticket.page,
                    error: message,
                };
            }
        };

        match inner.state.complete(&ticket) {
            Resolution::Stale { page, sequence } => {
                debug!("Discarding stale result for page {} (request {})", page, sequence);
                self.emit(PaginationEvent::StaleDiscarded { page, sequence });
                LoadOutcome::Discarded { page }
            }
            Resolution::Applied {
                page,
                previous,
                focus,
            } => {
                let total_pages = inner.state.total_pages();

                inner.renderer.clear();
                inner.renderer.render_items(&items);
                inner.last_error = None;

                let controls = Controls::build(page, total_pages, focus, false);
                inner.controls = controls.clone();

                debug!("Page {} of {} applied ({} items)", page + 1, total_pages, items.len());
                self.emit(PaginationEvent::ItemsRendered {
                    page,
                    count: items.len(),
                });
                self.emit(PaginationEvent::ControlsRendered {
                    controls,
                    optimistic: false,
                });
                self.emit(PaginationEvent::PageChanged {
                    old_page: previous,
                    new_page: page,
                    total_pages,
                });

                // runs under the lock so hooks observe transitions in order
                if let Some(hook) = &self.on_page_change {
                    hook(page, total_pages);
                }

                LoadOutcome::Applied { page }
            }
        }
    }
}

/// Paginated listing driven by an async page source.
///
/// Cloning yields another handle to the same listing.
pub struct PaginatedList<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for PaginatedList<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Send + 'static> fmt::Debug for PaginatedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginatedList")
            .field("state", &self.shared.lock().state)
            .finish()
    }
}

impl<T: Send + 'static> PaginatedList<T> {
    pub fn builder() -> PaginatedListBuilder<T> {
        PaginatedListBuilder::new()
    }

    /// Start a listing, or log why it cannot start and return `None`.
    ///
    /// A misconfigured listing stays inert instead of taking the rest of
    /// the page down with it.
    pub fn decorate(builder: PaginatedListBuilder<T>) -> Option<Self> {
        match builder.start() {
            Ok((list, _initial)) => Some(list),
            Err(e) => {
                warn!("Pagination not initialized: {}", e);
                None
            }
        }
    }

    /// Navigate to `target`, clamped into range.
    ///
    /// Controls switch to the target immediately; the items follow once the
    /// source answers, unless another navigation supersedes this one first.
    pub fn go_to(&self, target: i64) -> PageLoad {
        self.issue(target, Trigger::User)
    }

    /// Step forward from the displayed page
    pub fn next(&self) -> PageLoad {
        let displayed = self.shared.lock().state.displayed_page();
        self.go_to(page_arg(displayed).saturating_add(1))
    }

    /// Step back from the displayed page
    pub fn previous(&self) -> PageLoad {
        let displayed = self.shared.lock().state.displayed_page();
        self.go_to(page_arg(displayed) - 1)
    }

    pub fn first(&self) -> PageLoad {
        self.go_to(0)
    }

    pub fn last(&self) -> PageLoad {
        let total_pages = self.shared.lock().state.total_pages();
        self.go_to(page_arg(total_pages) - 1)
    }

    /// Reissue the pending load, e.g. after a failure. No-op when idle.
    pub fn retry(&self) -> PageLoad {
        let displayed = self.shared.lock().state.displayed_page();
        self.go_to(page_arg(displayed))
    }

    /// Map navigation keys onto transitions.
    ///
    /// Returns `None` for keys the listing does not handle.
    pub fn handle_key_event(&self, key: KeyEvent) -> Option<PageLoad> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        match key.code {
            KeyCode::Left | KeyCode::Char('h') => Some(self.previous()),
            KeyCode::Right | KeyCode::Char('l') => Some(self.next()),
            KeyCode::Home | KeyCode::Char('g') => Some(self.first()),
            KeyCode::End | KeyCode::Char('G') => Some(self.last()),
            _ => None,
        }
    }

    pub fn active_page(&self) -> usize {
        self.shared.lock().state.active_page()
    }

    pub fn total_pages(&self) -> usize {
        self.shared.lock().state.total_pages()
    }

    /// Controls as last rendered
    pub fn controls(&self) -> Controls {
        self.shared.lock().controls.clone()
    }

    pub fn snapshot(&self) -> PaginationSnapshot {
        let inner = self.shared.lock();
        PaginationSnapshot {
            active_page: inner.state.active_page(),
            total_pages: inner.state.total_pages(),
            displayed_page: inner.state.displayed_page(),
            is_loading: inner.state.is_loading(),
            should_focus: inner.state.should_focus(),
            request_sequence: inner.state.request_sequence(),
            last_error: inner.last_error.clone(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PaginationEvent> {
        self.shared.events.subscribe()
    }

    /// Begin a transition. The optimistic controls never carry focus; it
    /// returns with the confirmed render once the load applies.
    fn issue(&self, target: i64, trigger: Trigger) -> PageLoad {
        let ticket = {
            let mut inner = self.shared.lock();

            let Some(ticket) = inner.state.begin(target, trigger) else {
                let page = inner.state.active_page();
                trace!("Page {} already active, ignoring navigation", page);
                return PageLoad::unchanged(page);
            };

            let controls = Controls::build(ticket.page, inner.state.total_pages(), false, true);
            inner.controls = controls.clone();
            self.shared.latest.send_replace(ticket.sequence);

            debug!(
                "Loading page {} (request {}, {:?})",
                ticket.page, ticket.sequence, ticket.trigger
            );
            self.shared.emit(PaginationEvent::ControlsRendered {
                controls,
                optimistic: true,
            });
            self.shared.emit(PaginationEvent::LoadStarted {
                page: ticket.page,
                sequence: ticket.sequence,
                trigger: ticket.trigger,
            });

            ticket
        };

        let shared = Arc::clone(&self.shared);
        PageLoad {
            page: ticket.page,
            handle: Some(tokio::spawn(shared.run(ticket))),
        }
    }
}

fn page_arg(page: usize) -> i64 {
    i64::try_from(page).unwrap_or(i64::MAX)
}
