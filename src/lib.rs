//! Paginated, cancellable list loading with optimistic pagination controls.
//!
//! A [`PaginatedList`] owns the page state of one listing. It asks a
//! caller-supplied [`PageSource`] for page data, hands results to a
//! caller-supplied [`ItemRenderer`], and publishes control updates as
//! [`PaginationEvent`]s. Overlapping navigations resolve as last request
//! wins.

pub mod cli;
pub mod config;
pub mod error;
pub mod pagination;
pub mod render;
pub mod source;
pub mod tui;

pub use error::{PaginationError, PaginationResult};
pub use pagination::{
    Controls, LoadOutcome, PageLoad, PaginatedList, PaginatedListBuilder, PaginationEvent,
    PaginationSnapshot,
};
pub use render::{ItemRenderer, SharedPanel};
pub use source::{LoadContext, PageSource};
