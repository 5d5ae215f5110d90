//! Shared event types and serialization for the sickness schedule.
//!
//! This crate contains pure data structures with no scheduling logic.
//! It is a dependency for all other crates in the workspace.

pub mod blob;
pub mod event;
pub mod round;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

// Re-export event types
pub use event::{SicknessEvent, StatusChange, UnknownStatusChange};

// Re-export wire types
pub use blob::{EventRecord, ScheduleBlob, ScheduleData};

// Re-export round constants
pub use round::{in_sickness_phase, sickness_rounds, FIRST_SICKNESS_ROUND, LAST_SICKNESS_ROUND};
