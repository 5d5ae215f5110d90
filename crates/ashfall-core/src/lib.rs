//! Core scheduling logic for the sickness phase of the research game.
//!
//! Everything an NPC does during the last six rounds (falling sick, dying,
//! recovering, visiting the bathhouse) is rolled up front into a single
//! per-session schedule, so the live game never has to decide anyone's fate
//! on the fly. The [`manager::SicknessManager`] owns that schedule and
//! replays it against the host's round clock, one event per tick.
//!
//! The host supplies three collaborators: a [`clock::RoundClock`] for round
//! progress, a [`telemetry::TelemetrySink`] for research telemetry, and one
//! [`npc::NpcHandle`] per NPC for applying status changes.

pub mod clock;
pub mod config;
pub mod manager;
pub mod npc;
pub mod player;
pub mod population;
pub mod schedule;
pub mod telemetry;

pub use clock::{ManualClock, RoundClock};
pub use config::{Config, ConfigError};
pub use manager::{RestoreError, SicknessManager};
pub use npc::NpcHandle;
pub use player::{PlayerSickness, Protection};
pub use population::{AdherenceSets, Group, GroupCounts, Populations};
pub use schedule::{DeathRecord, DeathTable, RoundQueues, Schedule};
pub use telemetry::{MemorySink, NullSink, TelemetrySink};
