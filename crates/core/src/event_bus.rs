//! Transport seam — trait for handing built events to the analytics backend.
//!
//! The dispatcher accepts an `Arc<dyn EventSink>`; the real sink (Piano
//! Analytics SDK, HTTP forwarder, …) lives outside this workspace.

use crate::types::PianoEvent;
use std::sync::{Arc, Mutex};

/// Receives finished events. Implementations must not block the caller on
/// delivery; the dispatcher never waits for completion.
pub trait EventSink: Send + Sync {
    fn send(&self, event: PianoEvent);
}

/// No-op sink for callers that only want the returned events.
pub struct NoOpSink;

impl EventSink for NoOpSink {
    fn send(&self, _event: PianoEvent) {}
}

/// In-memory sink that captures events for testing.
#[derive(Default)]
pub struct CaptureSink {
    events: Mutex<Vec<PianoEvent>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<PianoEvent> {
        self.events.lock().expect("event sink mutex poisoned").clone()
    }

    pub fn count(&self) -> usize {
        self.events.lock().expect("event sink mutex poisoned").len()
    }

    pub fn count_named(&self, name: &str) -> usize {
        self.events
            .lock()
            .expect("event sink mutex poisoned")
            .iter()
            .filter(|e| e.name == name)
            .count()
    }

    pub fn clear(&self) {
        self.events.lock().expect("event sink mutex poisoned").clear();
    }
}

impl EventSink for CaptureSink {
    fn send(&self, event: PianoEvent) {
        self.events.lock().expect("event sink mutex poisoned").push(event);
    }
}

/// Convenience: a sink that drops everything.
pub fn noop_sink() -> Arc<dyn EventSink> {
    Arc::new(NoOpSink)
}

/// Convenience: create a capture sink for tests.
pub fn capture_sink() -> Arc<CaptureSink> {
    Arc::new(CaptureSink::new())
}
