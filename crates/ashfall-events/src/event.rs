//! Event Types
//!
//! A `SicknessEvent` is the atomic unit of the pre-computed schedule: one
//! status change for one NPC at one point of one round. Events are created
//! during schedule generation, never mutated, and consumed by the
//! dispatcher exactly once.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of status change an event applies to its NPC.
///
/// The discriminants are the wire encoding used by the telemetry backend
/// and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum StatusChange {
    Sickness = 0,
    SwitchToRecovery = 1,
    Die = 2,
    GoToBathhouse = 3,
}

impl StatusChange {
    /// Returns all status change variants.
    pub fn all() -> &'static [StatusChange] {
        &[
            StatusChange::Sickness,
            StatusChange::SwitchToRecovery,
            StatusChange::Die,
            StatusChange::GoToBathhouse,
        ]
    }
}

impl From<StatusChange> for u8 {
    fn from(change: StatusChange) -> u8 {
        change as u8
    }
}

impl TryFrom<u8> for StatusChange {
    type Error = UnknownStatusChange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(StatusChange::Sickness),
            1 => Ok(StatusChange::SwitchToRecovery),
            2 => Ok(StatusChange::Die),
            3 => Ok(StatusChange::GoToBathhouse),
            other => Err(UnknownStatusChange(other)),
        }
    }
}

impl fmt::Display for StatusChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusChange::Sickness => write!(f, "SICKNESS"),
            StatusChange::SwitchToRecovery => write!(f, "SWITCH_TO_RECOVERY"),
            StatusChange::Die => write!(f, "DIE"),
            StatusChange::GoToBathhouse => write!(f, "GO_TO_BATHHOUSE"),
        }
    }
}

/// Error type for decoding a status change from its wire value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownStatusChange(pub u8);

impl fmt::Display for UnknownStatusChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown status change value: {}", self.0)
    }
}

impl std::error::Error for UnknownStatusChange {}

/// One scheduled status change for one NPC.
///
/// `timestamp` is in seconds relative to the start of `round_no` and is
/// never negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SicknessEvent {
    /// Stable NPC id within the session's population pools.
    pub npc_id: u32,
    /// Round in which the change applies (sickness phase only).
    pub round_no: u32,
    /// Seconds since the start of the round.
    pub timestamp: f32,
    /// What happens to the NPC.
    pub change: StatusChange,
}

impl SicknessEvent {
    /// Creates a new event.
    pub fn new(npc_id: u32, round_no: u32, timestamp: f32, change: StatusChange) -> Self {
        debug_assert!(timestamp >= 0.0, "event timestamps are relative to round start");
        Self {
            npc_id,
            round_no,
            timestamp,
            change,
        }
    }
}

impl fmt::Display for SicknessEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rnd {:2} TS: {:6.1}: NPC {:2} will {}",
            self.round_no, self.timestamp, self.npc_id, self.change
        )
    }
}
