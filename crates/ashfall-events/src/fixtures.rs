//! Sample data fixtures for testing.
//!
//! This module provides a ready-made schedule for other crates to use.
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // ashfall-events = { path = "../ashfall-events", features = ["test-fixtures"] }
//!
//! use ashfall_events::fixtures;
//!
//! let blob = fixtures::sample_schedule_blob();
//! let events = fixtures::sample_events();
//! ```

use crate::{ScheduleBlob, SicknessEvent};

/// Returns a small but representative schedule blob.
///
/// Covers three rounds and every consumable record kind: a lethal
/// sickness/death pair in rounds 7 and 8, a non-lethal sickness in
/// round 10, and bathhouse visits for one adhering id per pool
/// (npc 2 ingroup, npc 16 outgroup at the default pool size).
pub fn sample_schedule_blob() -> ScheduleBlob {
    let json = include_str!("../tests/fixtures/sample_schedule.json");
    ScheduleBlob::from_json(json).expect("failed to parse sample_schedule.json")
}

/// Returns the sample schedule flattened into events, in file order.
pub fn sample_events() -> Vec<SicknessEvent> {
    sample_schedule_blob().events()
}
