//! Paginated list controller and its building blocks.
//!
//! `window` and `controls` are pure functions of the active page,
//! `state` is the synchronous state machine, and `controller` ties them to
//! an async page source and an item renderer.

pub mod controller;
pub mod controls;
pub mod events;
pub mod state;
pub mod window;

#[cfg(test)]
mod scenarios;

pub use controller::{LoadOutcome, PageLoad, PaginatedList, PaginatedListBuilder, PaginationSnapshot};
pub use controls::{ArrowButton, ControlItem, Controls, PageButton, PaginationStyling};
pub use events::PaginationEvent;
pub use state::{LoadTicket, PaginationState, Phase, Resolution, Trigger};
pub use window::{visible_pages, PageSlot};
