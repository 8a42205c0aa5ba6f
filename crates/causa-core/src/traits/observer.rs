//! Injected sink for structured search events.
//!
//! Searches take an `Arc<dyn SearchObserver>` at construction. The default
//! forwards to `tracing`; tests use `NoopObserver` or `RecordingObserver`.

use std::sync::Mutex;

use crate::graph::TripleType;

/// Something a search did that a caller may want to audit.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    EdgeRemoved {
        x: String,
        y: String,
        sepset: Vec<String>,
        p_value: f64,
    },
    DepthCompleted {
        depth: usize,
        edges_remaining: usize,
    },
    TripleClassified {
        x: String,
        y: String,
        z: String,
        kind: TripleType,
    },
    ColliderOriented {
        x: String,
        y: String,
        z: String,
    },
    RuleApplied {
        rule: &'static str,
        edge: String,
    },
    KnowledgeOriented {
        edge: String,
    },
}

pub trait SearchObserver: Send + Sync {
    fn on_event(&self, event: &SearchEvent);

    /// Callers skip building events when this is false.
    fn enabled(&self) -> bool {
        true
    }
}

/// Forwards events to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SearchObserver for TracingObserver {
    fn on_event(&self, event: &SearchEvent) {
        match event {
            SearchEvent::EdgeRemoved {
                x,
                y,
                sepset,
                p_value,
            } => tracing::debug!(%x, %y, ?sepset, p_value, "edge removed"),
            SearchEvent::DepthCompleted {
                depth,
                edges_remaining,
            } => tracing::debug!(depth, edges_remaining, "depth completed"),
            SearchEvent::TripleClassified { x, y, z, kind } => {
                tracing::debug!(%x, %y, %z, ?kind, "triple classified")
            }
            SearchEvent::ColliderOriented { x, y, z } => {
                tracing::debug!(%x, %y, %z, "collider oriented")
            }
            SearchEvent::RuleApplied { rule, edge } => tracing::debug!(rule, %edge, "rule applied"),
            SearchEvent::KnowledgeOriented { edge } => {
                tracing::debug!(%edge, "knowledge orientation")
            }
        }
    }

    fn enabled(&self) -> bool {
        tracing::enabled!(tracing::Level::DEBUG)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {
    fn on_event(&self, _event: &SearchEvent) {}

    fn enabled(&self) -> bool {
        false
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<SearchEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SearchEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn count_where(&self, pred: impl Fn(&SearchEvent) -> bool) -> usize {
        self.events
            .lock()
            .map(|e| e.iter().filter(|ev| pred(ev)).count())
            .unwrap_or(0)
    }
}

impl SearchObserver for RecordingObserver {
    fn on_event(&self, event: &SearchEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
