//! Terminal listing browser using ratatui

mod app;
mod events;

pub use app::BrowseApp;
pub use events::{Event, EventHandler};

use anyhow::{Context, Result};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::time::Duration;

use crate::cli::open_listing;
use crate::config::ListingConfig;
use crate::pagination::PaginatedList;
use crate::render::SharedPanel;

pub type Backend = CrosstermBackend<io::Stdout>;

const TICK_RATE: Duration = Duration::from_millis(100);

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> Result<Terminal<Backend>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore_terminal(terminal: &mut Terminal<Backend>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Browse the listing described by `config` until the user quits
pub async fn run(config: &ListingConfig) -> Result<()> {
    let listing = open_listing(config).await?;
    let panel = SharedPanel::new();

    let builder = PaginatedList::builder()
        .total_pages(i64::try_from(listing.total_pages).unwrap_or(i64::MAX))
        .initial_page(config.initial_page)
        .shared_source(listing.source)
        .renderer(panel.clone());
    let events = builder.subscribe();
    let (list, _initial) = builder.start().context("Failed to start listing")?;

    let mut app = BrowseApp::new(list, panel, listing.title);
    let mut event_handler = EventHandler::new(events, TICK_RATE);

    let mut terminal = init_terminal()?;
    let result = run_app(&mut terminal, &mut app, &mut event_handler).await;
    restore_terminal(&mut terminal)?;
    result
}

async fn run_app(
    terminal: &mut Terminal<Backend>,
    app: &mut BrowseApp,
    event_handler: &mut EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        match event_handler.next().await {
            Some(event) => {
                if app.handle_event(event) {
                    break;
                }
            }
            None => break,
        }
    }
    Ok(())
}
