//! Visible page window computation.
//!
//! The window decides which page numbers appear in the pagination controls.
//! Small listings show every page; larger ones always keep the first and
//! last page reachable and collapse the gaps into ellipsis markers.

use std::fmt;

/// Listings with at most this many pages show every page number
pub const MAX_CONTIGUOUS_PAGES: usize = 7;

/// A single position in the visible page window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageSlot {
    /// Zero-based page index
    Page(usize),
    /// Collapsed run of pages
    Ellipsis,
}

impl PageSlot {
    /// Page index for numbered slots
    pub fn page(&self) -> Option<usize> {
        match self {
            PageSlot::Page(page) => Some(*page),
            PageSlot::Ellipsis => None,
        }
    }
}

impl fmt::Display for PageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSlot::Page(page) => write!(f, "{}", page),
            PageSlot::Ellipsis => f.write_str("..."),
        }
    }
}

/// Compute the ordered page window for `active_page` out of `total_pages`.
///
/// `total_pages` below one is treated as one and `active_page` is clamped
/// into range, so the result is always non-empty and starts with page 0.
pub fn visible_pages(active_page: usize, total_pages: usize) -> Vec<PageSlot> {
    let total = total_pages.max(1);
    let active = active_page.min(total - 1);
    let last = total - 1;

    if total <= MAX_CONTIGUOUS_PAGES {
        return (0..total).map(PageSlot::Page).collect();
    }

    let mut slots = vec![PageSlot::Page(0)];

    if active <= 3 {
        slots.extend((1..=4).map(PageSlot::Page));
        slots.push(PageSlot::Ellipsis);
        slots.push(PageSlot::Page(last));
    } else if active >= total - 4 {
        slots.push(PageSlot::Ellipsis);
        slots.extend((total - 5..total).map(PageSlot::Page));
    } else {
        slots.push(PageSlot::Ellipsis);
        slots.extend((active - 1..=active + 1).map(PageSlot::Page));
        slots.push(PageSlot::Ellipsis);
        slots.push(PageSlot::Page(last));
    }

    slots
}
