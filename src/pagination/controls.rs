//! Pagination control set.
//!
//! `Controls` is the pure description of what the navigation region shows
//! for a given page: numbered buttons, ellipsis markers, previous/next
//! arrows and which control currently owns keyboard focus. Terminal output
//! is derived from it with [`Controls::to_line`]; other front ends can read
//! the fields directly.

use super::window::{visible_pages, PageSlot};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

/// Accessible name of the navigation region
pub const NAV_LABEL: &str = "Pagination";

/// Accessible label of the previous-page arrow
pub const PREVIOUS_LABEL: &str = "Previous page";

/// Accessible label of the next-page arrow
pub const NEXT_LABEL: &str = "Next page";

/// Numbered page button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageButton {
    /// Zero-based page index
    pub page: usize,

    /// Visible text (one-based page number)
    pub text: String,

    /// Accessible label, e.g. "Page 3"
    pub label: String,

    /// Marked as the current page for assistive technology
    pub current: bool,
}

impl PageButton {
    fn new(page: usize, current: bool) -> Self {
        Self {
            page,
            text: (page + 1).to_string(),
            label: format!("Page {}", page + 1),
            current,
        }
    }
}

/// Previous or next arrow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrowButton {
    pub label: &'static str,
    pub disabled: bool,

    /// Page the arrow leads to, `None` when disabled
    pub target: Option<usize>,
}

/// Entry between the two arrows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlItem {
    Page(PageButton),
    Ellipsis,
}

/// Complete control set for one rendered state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controls {
    /// Accessible name of the navigation region
    pub nav_label: &'static str,

    pub previous: ArrowButton,
    pub next: ArrowButton,
    pub items: Vec<ControlItem>,

    /// Page rendered as current (the optimistic target while loading)
    pub current_page: usize,
    pub total_pages: usize,

    /// Page whose control receives keyboard focus, if any
    pub focused: Option<usize>,

    /// Whether a load for `current_page` is still in flight
    pub busy: bool,
}

impl Controls {
    /// Build the control set for `current_page` out of `total_pages`
    pub fn build(current_page: usize, total_pages: usize, focus: bool, busy: bool) -> Self {
        let total_pages = total_pages.max(1);
        let current_page = current_page.min(total_pages - 1);
        let last = total_pages - 1;

        let items = visible_pages(current_page, total_pages)
            .into_iter()
            .map(|slot| match slot {
                PageSlot::Page(page) => ControlItem::Page(PageButton::new(page, page == current_page)),
                PageSlot::Ellipsis => ControlItem::Ellipsis,
            })
            .collect();

        Self {
            nav_label: NAV_LABEL,
            previous: ArrowButton {
                label: PREVIOUS_LABEL,
                disabled: current_page == 0,
                target: current_page.checked_sub(1),
            },
            next: ArrowButton {
                label: NEXT_LABEL,
                disabled: current_page == last,
                target: (current_page < last).then_some(current_page + 1),
            },
            items,
            current_page,
            total_pages,
            focused: focus.then_some(current_page),
            busy,
        }
    }

    /// Numbered buttons in display order
    pub fn page_buttons(&self) -> impl Iterator<Item = &PageButton> {
        self.items.iter().filter_map(|item| match item {
            ControlItem::Page(button) => Some(button),
            ControlItem::Ellipsis => None,
        })
    }

    /// Button marked as the current page
    pub fn current_button(&self) -> Option<&PageButton> {
        self.page_buttons().find(|button| button.current)
    }

    /// Arrows, page numbers and ellipsis markers as plain text, e.g. `< 1 2 [3] 4 5 … 20 >`
    pub fn summary(&self) -> String {
        let mut parts = Vec::with_capacity(self.items.len() + 2);
        parts.push(if self.previous.disabled { "-" } else { "<" }.to_string());
        for item in &self.items {
            parts.push(match item {
                ControlItem::Page(button) if button.current => format!("[{}]", button.text),
                ControlItem::Page(button) => button.text.clone(),
                ControlItem::Ellipsis => "…".to_string(),
            });
        }
        parts.push(if self.next.disabled { "-" } else { ">" }.to_string());
        parts.join(" ")
    }

    /// Render the controls as a single terminal line
    pub fn to_line(&self, styling: &PaginationStyling) -> Line<'static> {
        let mut spans = Vec::with_capacity(self.items.len() + 2);

        let arrow_style = |arrow: &ArrowButton| {
            if arrow.disabled {
                styling.disabled_style
            } else {
                styling.navigation_style
            }
        };

        spans.push(Span::styled("‹ ", arrow_style(&self.previous)));

        for item in &self.items {
            match item {
                ControlItem::Page(button) => {
                    let mut style = if button.current {
                        styling.current_page_style
                    } else {
                        styling.page_style
                    };
                    if self.focused == Some(button.page) {
                        style = style.patch(styling.focus_style);
                    }
                    let text = if button.current {
                        format!("[{}]", button.text)
                    } else {
                        button.text.clone()
                    };
                    spans.push(Span::styled(text, style));
                }
                ControlItem::Ellipsis => {
                    spans.push(Span::styled("…", styling.text_style));
                }
            }
            spans.push(Span::raw(" "));
        }

        spans.push(Span::styled("›", arrow_style(&self.next)));

        if self.busy {
            spans.push(Span::styled("  loading…", styling.text_style));
        }

        Line::from(spans)
    }
}

/// Styling configuration for terminal pagination controls
#[derive(Debug, Clone)]
pub struct PaginationStyling {
    /// Style for current page
    pub current_page_style: Style,

    /// Style for other pages
    pub page_style: Style,

    /// Style for navigation arrows
    pub navigation_style: Style,

    /// Style for disabled arrows
    pub disabled_style: Style,

    /// Style for ellipsis and status text
    pub text_style: Style,

    /// Added on top of the focused control
    pub focus_style: Style,
}

impl Default for PaginationStyling {
    fn default() -> Self {
        Self {
            current_page_style: Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            page_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
            navigation_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            disabled_style: Style::default().fg(Color::DarkGray),
            text_style: Style::default().fg(Color::White),
            focus_style: Style::default().add_modifier(Modifier::REVERSED),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrows_at_first_page() {
        let controls = Controls::build(0, 6, false, false);
        assert!(controls.previous.disabled);
        assert_eq!(controls.previous.target, None);
        assert!(!controls.next.disabled);
        assert_eq!(controls.next.target, Some(1));
    }

    #[test]
    fn test_arrows_at_last_page() {
        let controls = Controls::build(5, 6, false, false);
        assert!(!controls.previous.disabled);
        assert_eq!(controls.previous.target, Some(4));
        assert!(controls.next.disabled);
        assert_eq!(controls.next.target, None);
    }

    #[test]
    fn test_single_page_disables_both_arrows() {
        let controls = Controls::build(0, 1, false, false);
        assert!(controls.previous.disabled);
        assert!(controls.next.disabled);
        assert_eq!(controls.page_buttons().count(), 1);
    }

    #[test]
    fn test_current_page_is_marked_once() {
        let controls = Controls::build(10, 20, false, false);
        let current: Vec<_> = controls.page_buttons().filter(|b| b.current).collect();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].page, 10);
        assert_eq!(current[0].label, "Page 11");
        assert_eq!(current[0].text, "11");
    }

    #[test]
    fn test_accessibility_labels() {
        let controls = Controls::build(2, 20, false, false);
        assert_eq!(controls.nav_label, "Pagination");
        assert_eq!(controls.previous.label, "Previous page");
        assert_eq!(controls.next.label, "Next page");
        assert!(controls.page_buttons().all(|b| b.label == format!("Page {}", b.page + 1)));
    }

    #[test]
    fn test_focus_only_when_requested() {
        assert_eq!(Controls::build(3, 8, false, false).focused, None);
        assert_eq!(Controls::build(3, 8, true, false).focused, Some(3));
    }

    #[test]
    fn test_summary_text() {
        assert_eq!(
            Controls::build(10, 20, false, false).summary(),
            "< 1 … 10 [11] 12 … 20 >"
        );
        assert_eq!(Controls::build(0, 3, false, false).summary(), "- [1] 2 3 >");
    }

    #[test]
    fn test_to_line_styles_current_and_disabled() {
        let styling = PaginationStyling::default();
        let line = Controls::build(0, 3, true, true).to_line(&styling);

        let first = &line.spans[0];
        assert_eq!(first.style, styling.disabled_style);

        let current = line
            .spans
            .iter()
            .find(|span| span.content == "[1]")
            .expect("current page span");
        assert_eq!(
            current.style,
            styling.current_page_style.patch(styling.focus_style)
        );

        assert!(line.spans.iter().any(|span| span.content.contains("loading")));
    }
}
