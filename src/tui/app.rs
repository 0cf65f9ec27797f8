use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Frame;
use tracing::debug;

use crate::tui::events::Event;
use crate::pagination::{PaginatedList, PaginationEvent, PaginationStyling};
use crate::render::SharedPanel;
use crate::source::IndexRecord;

const HELP: &str = "←/→ page  Home/End first/last  r retry  q quit";

/// Interactive listing browser state
pub struct BrowseApp {
    list: PaginatedList<IndexRecord>,
    panel: SharedPanel<IndexRecord>,
    styling: PaginationStyling,
    title: String,

    /// Status message to display
    pub status: String,

    /// Whether the browser should quit
    pub should_quit: bool,
}

impl BrowseApp {
    pub fn new(list: PaginatedList<IndexRecord>, panel: SharedPanel<IndexRecord>, title: String) -> Self {
        Self {
            list,
            panel,
            styling: PaginationStyling::default(),
            title,
            status: "Loading…".to_string(),
            should_quit: false,
        }
    }

    /// Handle one event; returns true when the browser should exit
    pub fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Listing(event) => self.apply_listing_event(&event),
            Event::Resize(width, height) => debug!("Terminal resized to {}x{}", width, height),
            Event::Tick => {}
        }
        self.should_quit
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Char('r') => {
                if self.list.retry().is_unchanged() {
                    self.status = "Nothing to retry".to_string();
                }
            }
            _ => {
                self.list.handle_key_event(key);
            }
        }
    }

    /// Update the status line from a listing notification
    pub fn apply_listing_event(&mut self, event: &PaginationEvent) {
        match event {
            PaginationEvent::LoadStarted { page, .. } => {
                self.status = format!("Loading page {}…", page + 1);
            }
            PaginationEvent::PageChanged {
                new_page,
                total_pages,
                ..
            } => {
                self.status = format!("Page {} of {}", new_page + 1, total_pages);
            }
            PaginationEvent::LoadFailed { page, error } => {
                self.status = format!("Page {} failed: {} (r to retry)", page + 1, error);
            }
            PaginationEvent::ControlsRendered { .. }
            | PaginationEvent::ItemsRendered { .. }
            | PaginationEvent::StaleDiscarded { .. } => {}
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                [
                    Constraint::Min(3),
                    Constraint::Length(3),
                    Constraint::Length(1),
                ]
                .as_ref(),
            )
            .split(frame.size());

        let rows: Vec<ListItem> = self
            .panel
            .rows()
            .into_iter()
            .map(|record| {
                let mut spans = vec![Span::styled(
                    record.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )];
                if let Some(date) = &record.date {
                    spans.push(Span::styled(
                        format!("  {}", date),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();
        let items = List::new(rows).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", self.title)),
        );
        frame.render_widget(items, chunks[0]);

        let controls = self.list.controls();
        let navigation = Paragraph::new(controls.to_line(&self.styling))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", controls.nav_label)),
            );
        frame.render_widget(navigation, chunks[1]);

        let status = Paragraph::new(Line::from(vec![
            Span::styled(self.status.clone(), self.styling.text_style),
            Span::styled(format!("  {}", HELP), Style::default().fg(Color::DarkGray)),
        ]));
        frame.render_widget(status, chunks[2]);
    }
}
