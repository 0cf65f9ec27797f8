//! Pagination state machine.
//!
//! Pure and synchronous: every transition happens between suspension
//! points, so the controller only has to hold its lock around these calls.

/// Where the listing currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Showing `active_page`, nothing in flight
    Idle,
    /// A load for `target` is pending; `from` was active when it started
    Loading { target: usize, from: usize },
}

/// What caused a load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// First load issued on construction; never steals focus
    Initial,
    /// Click, key press or programmatic navigation
    User,
}

/// Guarded load handed out by [`PaginationState::begin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub page: usize,
    pub sequence: u64,
    pub trigger: Trigger,
}

/// Result of applying a finished load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Load was the latest one and is now the active page
    Applied {
        page: usize,
        previous: usize,
        focus: bool,
    },
    /// A newer request superseded this one
    Stale { page: usize, sequence: u64 },
}

/// State owned by one paginated listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    active_page: usize,
    total_pages: usize,
    phase: Phase,
    should_focus: bool,
    request_sequence: u64,
}

impl PaginationState {
    /// Create state for `total_pages` starting at `initial_page`.
    ///
    /// Non-positive totals are coerced to one page and the initial page is
    /// clamped into range.
    pub fn new(total_pages: i64, initial_page: i64) -> Self {
        let total_pages = usize::try_from(total_pages.max(1)).unwrap_or(usize::MAX);
        let mut state = Self {
            active_page: 0,
            total_pages,
            phase: Phase::Idle,
            should_focus: false,
            request_sequence: 0,
        };
        state.active_page = state.clamp(initial_page);
        state
    }

    /// Clamp any requested page into `[0, total_pages - 1]`
    pub fn clamp(&self, page: i64) -> usize {
        if page <= 0 {
            return 0;
        }
        usize::try_from(page)
            .unwrap_or(usize::MAX)
            .min(self.total_pages - 1)
    }

    pub fn active_page(&self) -> usize {
        self.active_page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading { .. })
    }

    pub fn should_focus(&self) -> bool {
        self.should_focus
    }

    pub fn request_sequence(&self) -> u64 {
        self.request_sequence
    }

    /// Page the controls currently show: the pending target while loading
    pub fn displayed_page(&self) -> usize {
        match self.phase {
            Phase::Loading { target, .. } => target,
            Phase::Idle => self.active_page,
        }
    }

    /// Start a guarded load for `target`.
    ///
    /// Returns `None` when a user navigates to the already active page while
    /// nothing is loading. The initial load always proceeds.
    pub fn begin(&mut self, target: i64, trigger: Trigger) -> Option<LoadTicket> {
        let page = self.clamp(target);

        if trigger == Trigger::User && page == self.active_page && !self.is_loading() {
            return None;
        }

        self.request_sequence += 1;
        self.phase = Phase::Loading {
            target: page,
            from: self.active_page,
        };

        Some(LoadTicket {
            page,
            sequence: self.request_sequence,
            trigger,
        })
    }

    /// Whether `ticket` is still the most recent request
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.sequence == self.request_sequence
    }

    /// Apply a successful load, unless a newer request superseded it
    pub fn complete(&mut self, ticket: &LoadTicket) -> Resolution {
        if !self.is_current(ticket) {
            return Resolution::Stale {
                page: ticket.page,
                sequence: ticket.sequence,
            };
        }

        let previous = self.active_page;
        self.active_page = ticket.page;
        self.phase = Phase::Idle;
        if ticket.trigger == Trigger::User {
            self.should_focus = true;
        }

        Resolution::Applied {
            page: ticket.page,
            previous,
            focus: self.should_focus,
        }
    }
}
