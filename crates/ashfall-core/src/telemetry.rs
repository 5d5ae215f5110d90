//! Telemetry sinks.
//!
//! The scheduler reports the generated schedule (and nothing else) as a
//! named payload. Transport, authentication and retries belong to the
//! host; from here a sink is fire-and-forget.

use std::cell::RefCell;
use std::rc::Rc;

/// Fire-and-forget sink for research telemetry.
pub trait TelemetrySink {
    /// Hands a named payload to the backend.
    fn send(&mut self, event_name: &str, payload: serde_json::Value);
}

/// Discards every payload. For sessions running without a backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn send(&mut self, _event_name: &str, _payload: serde_json::Value) {}
}

/// Buffers payloads in memory.
///
/// Clones share one buffer, so a test (or the headless driver) can keep a
/// handle while the manager owns its boxed copy.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Rc<RefCell<Vec<(String, serde_json::Value)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All payloads sent so far, in order.
    pub fn records(&self) -> Vec<(String, serde_json::Value)> {
        self.records.borrow().clone()
    }

    /// The most recent payload with the given name, if any.
    pub fn last_named(&self, event_name: &str) -> Option<serde_json::Value> {
        self.records
            .borrow()
            .iter()
            .rev()
            .find(|(name, _)| name == event_name)
            .map(|(_, payload)| payload.clone())
    }
}

impl TelemetrySink for MemorySink {
    fn send(&mut self, event_name: &str, payload: serde_json::Value) {
        self.records
            .borrow_mut()
            .push((event_name.to_string(), payload));
    }
}
