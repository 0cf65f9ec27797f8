//! Notifications published by a paginated listing

use super::controls::Controls;
use super::state::Trigger;

/// Pagination events
#[derive(Debug, Clone)]
pub enum PaginationEvent {
    /// Controls were (re)rendered; `optimistic` when the target page has
    /// not loaded yet
    ControlsRendered {
        controls: Controls,
        optimistic: bool,
    },

    /// A guarded load was issued
    LoadStarted {
        page: usize,
        sequence: u64,
        trigger: Trigger,
    },

    /// Items for `page` replaced the content area
    ItemsRendered {
        page: usize,
        count: usize,
    },

    /// A transition completed
    PageChanged {
        old_page: usize,
        new_page: usize,
        total_pages: usize,
    },

    /// A superseded load finished and its result was dropped
    StaleDiscarded {
        page: usize,
        sequence: u64,
    },

    /// The page source failed; previous content stays visible
    LoadFailed {
        page: usize,
        error: String,
    },
}
