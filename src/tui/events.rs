use crossterm::event::{Event as CrosstermEvent, KeyEvent};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

use crate::pagination::PaginationEvent;

/// Browser events
#[derive(Debug, Clone)]
pub enum Event {
    /// Keyboard input event
    Key(KeyEvent),

    /// Terminal resize event
    Resize(u16, u16),

    /// No input within one tick
    Tick,

    /// Something happened to the listing
    Listing(PaginationEvent),
}

/// Merges terminal input and listing notifications into one stream
pub struct EventHandler {
    receiver: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Start reading terminal input and forwarding `listing` events
    pub fn new(listing: broadcast::Receiver<PaginationEvent>, tick_interval: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        tokio::task::spawn_blocking({
            let sender = sender.clone();
            move || read_terminal(sender, tick_interval)
        });
        tokio::spawn(forward_listing(listing, sender));

        Self { receiver }
    }

    /// Get the next event; `None` once every producer has stopped
    pub async fn next(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }
}

fn read_terminal(sender: mpsc::UnboundedSender<Event>, tick_interval: Duration) {
    while !sender.is_closed() {
        let event = match crossterm::event::poll(tick_interval) {
            Ok(true) => match crossterm::event::read() {
                Ok(CrosstermEvent::Key(key)) => Event::Key(key),
                Ok(CrosstermEvent::Resize(width, height)) => Event::Resize(width, height),
                Ok(_) => continue,
                Err(e) => {
                    warn!("Failed to read terminal input: {}", e);
                    break;
                }
            },
            Ok(false) => Event::Tick,
            Err(e) => {
                warn!("Failed to poll terminal input: {}", e);
                break;
            }
        };

        if sender.send(event).is_err() {
            break;
        }
    }
    debug!("Terminal input reader stopped");
}

async fn forward_listing(
    mut listing: broadcast::Receiver<PaginationEvent>,
    sender: mpsc::UnboundedSender<Event>,
) {
    loop {
        match listing.recv().await {
            Ok(event) => {
                if sender.send(Event::Listing(event)).is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!("Browser skipped {} listing events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
