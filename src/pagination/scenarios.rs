//! End-to-end listing scenarios with a hand-driven page source

use super::controller::{LoadOutcome, PaginatedList};
use super::events::PaginationEvent;
use crate::error::{PaginationError, PaginationResult};
use crate::render::{ItemRenderer, SharedPanel};
use crate::source::{from_fn, LoadContext, MemorySource, PageSource};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, oneshot};

/// Source whose pages resolve only when the test releases them
#[derive(Default)]
struct GatedSource {
    gates: Mutex<HashMap<usize, oneshot::Receiver<Vec<String>>>>,
    calls: Mutex<Vec<usize>>,
}

impl GatedSource {
    fn gate(&self, page: usize) -> oneshot::Sender<Vec<String>> {
        let (sender, receiver) = oneshot::channel();
        self.gates.lock().unwrap().insert(page, receiver);
        sender
    }

    fn calls(&self) -> Vec<usize> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource<String> for Arc<GatedSource> {
    async fn load_page(&self, ctx: LoadContext) -> PaginationResult<Vec<String>> {
        let page = ctx.page();
        self.calls.lock().unwrap().push(page);
        let gate = self.gates.lock().unwrap().remove(&page);
        match gate {
            Some(gate) => gate
                .await
                .map_err(|_| PaginationError::load(page, "gate dropped")),
            None => Err(PaginationError::load(page, "no gate")),
        }
    }
}

/// Renderer that records every call
#[derive(Clone, Default)]
struct Recorder {
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    clears: Arc<Mutex<usize>>,
}

impl Recorder {
    fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl ItemRenderer<String> for Recorder {
    fn clear(&mut self) {
        *self.clears.lock().unwrap() += 1;
    }

    fn render_items(&mut self, items: &[String]) {
        self.calls.lock().unwrap().push(items.to_vec());
    }
}

fn failures(events: &mut broadcast::Receiver<PaginationEvent>) -> (Vec<usize>, Vec<usize>) {
    let mut failed = Vec::new();
    let mut discarded = Vec::new();
    while let Ok(event) = events.try_recv() {
        match event {
            PaginationEvent::LoadFailed { page, .. } => failed.push(page),
            PaginationEvent::StaleDiscarded { page, .. } => discarded.push(page),
            _ => {}
        }
    }
    (failed, discarded)
}

fn page(label: &str) -> Vec<String> {
    vec![label.to_string()]
}

async fn gated_list(
    total_pages: i64,
    initial_page: usize,
) -> (PaginatedList<String>, Arc<GatedSource>, Recorder) {
    let source = Arc::new(GatedSource::default());
    let recorder = Recorder::default();
    let initial_gate = source.gate(initial_page);

    let (list, initial) = PaginatedList::builder()
        .total_pages(total_pages)
        .initial_page(initial_page as i64)
        .source(Arc::clone(&source))
        .renderer(recorder.clone())
        .start()
        .unwrap();

    initial_gate.send(page("initial")).unwrap();
    assert_eq!(
        initial.outcome().await,
        LoadOutcome::Applied { page: initial_page }
    );

    (list, source, recorder)
}

#[tokio::test]
async fn test_same_page_navigation_is_idempotent() {
    let (list, source, recorder) = gated_list(6, 2).await;
    let sequence = list.snapshot().request_sequence;

    for _ in 0..3 {
        assert_eq!(list.go_to(2).outcome().await, LoadOutcome::Unchanged { page: 2 });
    }

    assert_eq!(source.calls(), vec![2]);
    assert_eq!(recorder.calls().len(), 1);
    assert_eq!(list.snapshot().request_sequence, sequence);
}

#[tokio::test]
async fn test_targets_are_clamped() {
    let (list, source, _recorder) = gated_list(5, 2).await;

    let below = source.gate(0);
    let load = list.go_to(-3);
    assert_eq!(load.page(), 0);
    below.send(page("zero")).unwrap();
    load.outcome().await;
    assert_eq!(list.active_page(), 0);

    let above = source.gate(4);
    let load = list.go_to(99);
    assert_eq!(load.page(), 4);
    above.send(page("four")).unwrap();
    load.outcome().await;
    assert_eq!(list.active_page(), 4);

    assert_eq!(source.calls(), vec![2, 0, 4]);
}

#[tokio::test]
async fn test_last_request_wins() {
    let (list, source, recorder) = gated_list(20, 0).await;
    let mut events = list.subscribe();

    let three_gate = source.gate(3);
    let five_gate = source.gate(5);

    let three = list.go_to(3);
    let five = list.go_to(5);
    assert_eq!(list.controls().current_page, 5);

    five_gate.send(page("five")).unwrap();
    assert_eq!(five.outcome().await, LoadOutcome::Applied { page: 5 });

    three_gate.send(page("three")).unwrap();
    assert_eq!(three.outcome().await, LoadOutcome::Discarded { page: 3 });

    assert_eq!(list.active_page(), 5);
    assert_eq!(list.controls().current_page, 5);
    assert_eq!(recorder.calls().last(), Some(&page("five")));
    assert!(!recorder.calls().contains(&page("three")));

    let mut discarded = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let PaginationEvent::StaleDiscarded { page, .. } = event {
            discarded.push(page);
        }
    }
    assert_eq!(discarded, vec![3]);
}

#[tokio::test]
async fn test_stale_response_arriving_first_is_dropped() {
    let (list, source, recorder) = gated_list(20, 0).await;

    let three_gate = source.gate(3);
    let five_gate = source.gate(5);
    let three = list.go_to(3);
    let five = list.go_to(5);

    three_gate.send(page("three")).unwrap();
    assert_eq!(three.outcome().await, LoadOutcome::Discarded { page: 3 });

    // still waiting on page five
    let snapshot = list.snapshot();
    assert!(snapshot.is_loading);
    assert_eq!(snapshot.active_page, 0);
    assert_eq!(snapshot.displayed_page, 5);

    five_gate.send(page("five")).unwrap();
    assert_eq!(five.outcome().await, LoadOutcome::Applied { page: 5 });
    assert_eq!(recorder.calls(), vec![page("initial"), page("five")]);
}

#[tokio::test]
async fn test_abandoned_slow_load_is_discarded_not_failed() {
    let panel = SharedPanel::new();
    let source = MemorySource::new((0..10).collect::<Vec<usize>>(), 1)
        .unwrap()
        .with_latency(Duration::from_millis(50));
    let (list, initial) = PaginatedList::builder()
        .total_pages(10)
        .source(source)
        .renderer(panel.clone())
        .start()
        .unwrap();
    initial.outcome().await;
    let mut events = list.subscribe();

    let three = list.go_to(3);
    let five = list.go_to(5);

    assert_eq!(three.outcome().await, LoadOutcome::Discarded { page: 3 });
    assert_eq!(five.outcome().await, LoadOutcome::Applied { page: 5 });

    let (failed, discarded) = failures(&mut events);
    assert!(failed.is_empty());
    assert_eq!(discarded, vec![3]);
    assert_eq!(list.snapshot().last_error, None);
    assert_eq!(panel.rows(), vec![5]);
}

#[tokio::test]
async fn test_stale_failure_is_discarded_not_failed() {
    let (list, source, recorder) = gated_list(20, 0).await;
    let mut events = list.subscribe();

    let three_gate = source.gate(3);
    let five_gate = source.gate(5);
    let three = list.go_to(3);
    let five = list.go_to(5);

    drop(three_gate);
    assert_eq!(three.outcome().await, LoadOutcome::Discarded { page: 3 });

    five_gate.send(page("five")).unwrap();
    assert_eq!(five.outcome().await, LoadOutcome::Applied { page: 5 });

    let (failed, discarded) = failures(&mut events);
    assert!(failed.is_empty());
    assert_eq!(discarded, vec![3]);
    assert_eq!(list.snapshot().last_error, None);
    assert_eq!(recorder.calls().last(), Some(&page("five")));
}

#[tokio::test]
async fn test_no_focus_on_first_paint() {
    let (list, source, _recorder) = gated_list(5, 2).await;

    let controls = list.controls();
    assert_eq!(controls.current_page, 2);
    assert_eq!(controls.focused, None);
    assert!(!list.snapshot().should_focus);

    let gate = source.gate(3);
    let load = list.go_to(3);
    assert_eq!(list.controls().focused, None);
    gate.send(page("three")).unwrap();
    load.outcome().await;

    assert_eq!(list.controls().focused, Some(3));
    assert!(list.snapshot().should_focus);
}

#[tokio::test]
async fn test_three_page_walkthrough() {
    let recorder = Recorder::default();
    let source = from_fn(|page: usize| async move {
        let label = ["a", "b", "c"][page];
        Ok::<_, PaginationError>(vec![label.to_string()])
    });

    let (list, initial) = PaginatedList::builder()
        .total_pages(3)
        .source(source)
        .renderer(recorder.clone())
        .start()
        .unwrap();
    initial.outcome().await;

    assert_eq!(list.go_to(2).outcome().await, LoadOutcome::Applied { page: 2 });

    let calls = recorder.calls();
    assert_eq!(calls.iter().filter(|items| **items == page("c")).count(), 1);
    assert_eq!(calls.last(), Some(&page("c")));
    assert_eq!(*recorder.clears.lock().unwrap(), calls.len());

    let controls = list.controls();
    assert_eq!(list.active_page(), 2);
    assert!(controls.next.disabled);
    assert!(!controls.previous.disabled);
}

#[tokio::test]
async fn test_instances_are_independent() {
    let (first, first_source, _) = gated_list(4, 0).await;
    let (second, _, second_recorder) = gated_list(4, 0).await;

    let gate = first_source.gate(3);
    let load = first.go_to(3);
    gate.send(page("three")).unwrap();
    load.outcome().await;

    assert_eq!(first.active_page(), 3);
    assert_eq!(second.active_page(), 0);
    assert_eq!(second.snapshot().request_sequence, 1);
    assert_eq!(second_recorder.calls().len(), 1);
}
