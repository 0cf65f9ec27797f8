use anyhow::{Context, Result};
use clap::Args;
use futures::future::join_all;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, warn};

use super::listing::{open_listing, ListingArgs};
use crate::config::ListingConfig;
use crate::pagination::{LoadOutcome, PaginatedList, PaginationEvent};
use crate::render::SharedPanel;
use crate::source::IndexRecord;

/// Issue navigations non-interactively and print what happened
#[derive(Args, Debug)]
pub struct RunCommand {
    /// Zero-based pages to navigate to, issued back-to-back without waiting
    #[arg(short = 'g', long = "goto", allow_hyphen_values = true)]
    pub targets: Vec<i64>,

    /// Only print the final page
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    #[command(flatten)]
    pub listing: ListingArgs,
}

impl RunCommand {
    pub async fn execute(&self, mut config: ListingConfig) -> Result<()> {
        debug!("Executing run command");
        self.listing.apply(&mut config);
        config.validate()?;

        let listing = open_listing(&config).await?;
        let panel = SharedPanel::new();

        let builder = PaginatedList::builder()
            .total_pages(i64::try_from(listing.total_pages).unwrap_or(i64::MAX))
            .initial_page(config.initial_page)
            .shared_source(listing.source)
            .renderer(panel.clone());
        let mut events = builder.subscribe();
        let (list, initial) = builder.start().context("Failed to start listing")?;

        if let LoadOutcome::Failed { error, .. } = initial.outcome().await {
            warn!("Initial page did not load: {}", error);
        }

        info!("Issuing {} navigations", self.targets.len());
        let loads: Vec<_> = self.targets.iter().map(|target| list.go_to(*target)).collect();
        let outcomes = join_all(loads.into_iter().map(|load| load.outcome())).await;

        if !self.quiet {
            println!("{}", listing.title);
            for line in drain_transcript(&mut events) {
                println!("{}", line);
            }
            for outcome in &outcomes {
                println!("  {}", describe_outcome(outcome));
            }
            println!();
        }

        let snapshot = list.snapshot();
        println!(
            "Page {} of {}  {}",
            snapshot.active_page + 1,
            snapshot.total_pages,
            list.controls().summary()
        );
        for row in panel.rows() {
            println!("  {}", format_row(&row));
        }
        if let Some(error) = snapshot.last_error {
            println!("Last error: {}", error);
        }

        if let Some(cache) = listing.cache {
            let stats = cache.stats().await;
            debug!(
                "Page cache: {} hits, {} misses, {} pages held",
                stats.hits, stats.misses, stats.size
            );
        }

        Ok(())
    }
}

/// Text lines for every event received so far
fn drain_transcript(events: &mut broadcast::Receiver<PaginationEvent>) -> Vec<String> {
    let mut lines = Vec::new();
    loop {
        match events.try_recv() {
            Ok(event) => lines.push(describe_event(&event)),
            Err(TryRecvError::Lagged(skipped)) => {
                lines.push(format!("  ({} events skipped)", skipped));
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
    lines
}

fn describe_event(event: &PaginationEvent) -> String {
    match event {
        PaginationEvent::ControlsRendered {
            controls,
            optimistic,
        } => {
            let marker = if *optimistic { "~" } else { "=" };
            format!("{} {}", marker, controls.summary())
        }
        PaginationEvent::LoadStarted {
            page,
            sequence,
            trigger,
        } => format!("  load page {} (request {}, {:?})", page + 1, sequence, trigger),
        PaginationEvent::ItemsRendered { page, count } => {
            format!("  rendered {} items of page {}", count, page + 1)
        }
        PaginationEvent::PageChanged {
            old_page, new_page, ..
        } => format!("  page {} -> {}", old_page + 1, new_page + 1),
        PaginationEvent::StaleDiscarded { page, sequence } => {
            format!("  dropped stale page {} (request {})", page + 1, sequence)
        }
        PaginationEvent::LoadFailed { page, error } => {
            format!("! page {} failed: {}", page + 1, error)
        }
    }
}

fn describe_outcome(outcome: &LoadOutcome) -> String {
    match outcome {
        LoadOutcome::Unchanged { page } => format!("goto {}: already there", page + 1),
        LoadOutcome::Applied { page } => format!("goto {}: applied", page + 1),
        LoadOutcome::Discarded { page } => format!("goto {}: superseded", page + 1),
        LoadOutcome::Failed { page, error } => format!("goto {}: failed ({})", page + 1, error),
        LoadOutcome::Aborted { page } => format!("goto {}: aborted", page + 1),
    }
}

fn format_row(record: &IndexRecord) -> String {
    if record.path.is_empty() {
        record.to_string()
    } else {
        format!("{}  {}", record, record.path)
    }
}
