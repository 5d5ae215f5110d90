//! The sickness manager: owns the schedule, replays it against the clock.
//!
//! One manager lives for one session. The schedule is computed locally (or
//! adopted from the telemetry backend) exactly once before gameplay
//! reaches round 7, then drained monotonically: `advance` is called every
//! frame and consumes at most one event per call, strictly in (round,
//! timestamp) order and never ahead of the live round timer.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::HashMap;
use thiserror::Error;

use ashfall_events::{
    in_sickness_phase, ScheduleBlob, ScheduleData, SicknessEvent, StatusChange,
    FIRST_SICKNESS_ROUND,
};

use crate::clock::RoundClock;
use crate::config::Config;
use crate::npc::NpcHandle;
use crate::population::{AdherenceSets, Group, GroupCounts, Populations};
use crate::schedule::{self, DeathRecord, DeathTable, RoundQueues};
use crate::telemetry::TelemetrySink;

/// Error adopting an externally stored schedule.
///
/// A research session depends on schedule integrity, so a payload that
/// decodes but contradicts the session's population or round structure is
/// rejected outright instead of being repaired.
#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("malformed schedule payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("round {round_no} is outside the sickness phase")]
    RoundOutOfPhase { round_no: u32 },
    #[error("npc {npc_id} is outside both population pools")]
    UnknownNpc { npc_id: u32 },
    #[error("bad timestamp {timestamp} for npc {npc_id} in round {round_no}")]
    BadTimestamp {
        npc_id: u32,
        round_no: u32,
        timestamp: f32,
    },
}

/// Pre-computed sickness scheduling for all NPCs of one session.
pub struct SicknessManager {
    config: Config,
    populations: Populations,
    adherence_condition: bool,
    rng: SmallRng,
    clock: Box<dyn RoundClock>,
    telemetry: Box<dyn TelemetrySink>,
    npcs: HashMap<u32, Box<dyn NpcHandle>>,
    adherence: AdherenceSets,
    queues: RoundQueues,
    deaths: DeathTable,
    dispatched_deaths: GroupCounts,
    computed: bool,
}

impl SicknessManager {
    /// Creates a manager with an empty schedule.
    ///
    /// Call [`Self::compute_schedule`] or [`Self::adopt_or_generate`]
    /// before gameplay reaches round 7.
    pub fn new(
        config: Config,
        adherence_condition: bool,
        seed: u64,
        clock: Box<dyn RoundClock>,
        telemetry: Box<dyn TelemetrySink>,
    ) -> Self {
        let populations = Populations::new(config.population.pool_size);
        Self {
            populations,
            config,
            adherence_condition,
            rng: SmallRng::seed_from_u64(seed),
            clock,
            telemetry,
            npcs: HashMap::new(),
            adherence: AdherenceSets::default(),
            queues: RoundQueues::default(),
            deaths: DeathTable::new(),
            dispatched_deaths: GroupCounts::default(),
            computed: false,
        }
    }

    /// Generates the schedule locally and reports it to the backend.
    ///
    /// # Panics
    ///
    /// Panics if a schedule was already computed or adopted; a session's
    /// schedule is never regenerated.
    pub fn compute_schedule(&mut self) {
        assert!(!self.computed, "schedule already computed for this session");
        let schedule = schedule::generate(
            &self.config,
            &self.populations,
            self.adherence_condition,
            &mut self.rng,
        );
        self.adherence = schedule.adherence;
        self.deaths = schedule.deaths;
        self.queues = schedule.queues;
        self.computed = true;
        self.emit_schedule();
    }

    /// Adopts a schedule stored by the backend, or generates one locally
    /// when the blob is absent or carries no data.
    ///
    /// Returns `true` when the external schedule was adopted.
    pub fn adopt_or_generate(
        &mut self,
        blob: Option<ScheduleBlob>,
    ) -> Result<bool, RestoreError> {
        match blob.and_then(|b| b.data) {
            Some(data) => {
                self.restore_from(data)?;
                Ok(true)
            }
            None => {
                self.compute_schedule();
                Ok(false)
            }
        }
    }

    /// [`Self::adopt_or_generate`] over the raw JSON the backend returns.
    pub fn adopt_or_generate_json(
        &mut self,
        payload: Option<&str>,
    ) -> Result<bool, RestoreError> {
        let blob = payload.map(ScheduleBlob::from_json).transpose()?;
        self.adopt_or_generate(blob)
    }

    /// Registers the handle the dispatcher will mutate for `npc_id`.
    ///
    /// Returns whether the NPC adheres to the protective measures; an
    /// adhering NPC must additionally be marked by the host as wearing
    /// its goggles, which also allows the bathhouse visits.
    ///
    /// # Panics
    ///
    /// Panics if the id lies outside both population pools.
    pub fn register_npc(&mut self, npc_id: u32, handle: Box<dyn NpcHandle>) -> bool {
        assert!(
            self.populations.group_of(npc_id).is_some(),
            "npc {} is outside both population pools",
            npc_id
        );
        self.npcs.insert(npc_id, handle);
        self.is_adhering(npc_id)
    }

    /// Whether the id was selected to adhere.
    pub fn is_adhering(&self, npc_id: u32) -> bool {
        self.adherence.contains(npc_id)
    }

    /// The adhering ids of both groups.
    pub fn adherence(&self) -> &AdherenceSets {
        &self.adherence
    }

    /// The scheduled death timestamp table.
    pub fn deaths(&self) -> &DeathTable {
        &self.deaths
    }

    /// The remaining per-round queues.
    pub fn queues(&self) -> &RoundQueues {
        &self.queues
    }

    /// Deaths actually dispatched so far for one group.
    pub fn death_count(&self, group: Group) -> usize {
        self.dispatched_deaths.get(group)
    }

    /// Deaths the schedule holds for one group, dispatched or not.
    pub fn scheduled_death_count(&self, group: Group) -> usize {
        self.deaths
            .keys()
            .filter(|&&id| self.populations.group_of(id) == Some(group))
            .count()
    }

    /// Consumes at most one due event against the live clock.
    ///
    /// Does nothing before round 7, when every queue at or before the
    /// current round is empty, or while the earliest remaining event is
    /// still ahead of the round timer. Events are never reordered and
    /// never dispatched early.
    pub fn advance(&mut self) {
        let current_round = self.clock.current_round();
        if current_round < FIRST_SICKNESS_ROUND {
            return;
        }
        let due = match self.queues.next_due(current_round) {
            Some(event) => *event,
            None => return,
        };
        if due.timestamp > self.clock.round_elapsed() {
            // Too early.
            return;
        }
        if let Some(event) = self.queues.pop_next_due(current_round) {
            self.dispatch(event, current_round);
        }
    }

    fn dispatch(&mut self, event: SicknessEvent, current_round: u32) {
        tracing::debug!(%event, "dispatching status change");
        match event.change {
            StatusChange::Sickness => {
                let death_timestamp = self.lethal_death_timestamp(&event, current_round);
                let npc = self
                    .npcs
                    .get_mut(&event.npc_id)
                    .expect("status change scheduled for an unregistered NPC");
                npc.get_sick(event.timestamp, death_timestamp);
            }
            StatusChange::Die => {
                let group = self
                    .populations
                    .group_of(event.npc_id)
                    .expect("death scheduled for an NPC outside both pools");
                let npc = self
                    .npcs
                    .get_mut(&event.npc_id)
                    .expect("status change scheduled for an unregistered NPC");
                npc.die();
                self.dispatched_deaths.increment(group);
            }
            // Recovery is the NPC's own behaviour; bathhouse trips belong
            // to the movement AI. Both are consumed here without touching
            // health state.
            StatusChange::SwitchToRecovery | StatusChange::GoToBathhouse => {}
        }
    }

    /// Decides whether a sickness dispatch is the one that kills its NPC.
    ///
    /// Lethal only when a death is on the books for the same round and far
    /// enough out that the sickness does not outlast it: the NPC's decline
    /// has to run its full interval before the death timestamp arrives.
    fn lethal_death_timestamp(&self, event: &SicknessEvent, current_round: u32) -> Option<f32> {
        let interval = self.config.sickness.sick_interval;
        match self.deaths.get(&event.npc_id) {
            Some(death)
                if death.round_no == current_round
                    && event.timestamp + interval < death.timestamp =>
            {
                Some(death.timestamp)
            }
            _ => None,
        }
    }

    fn emit_schedule(&mut self) {
        let data = self.queues.to_schedule_data();
        match serde_json::to_value(&data) {
            Ok(payload) => self.telemetry.send("npc_status", payload),
            Err(e) => tracing::warn!("could not serialize schedule payload: {}", e),
        }
    }

    fn restore_from(&mut self, data: ScheduleData) -> Result<(), RestoreError> {
        assert!(!self.computed, "schedule already computed for this session");
        let mut events = Vec::new();
        let mut adherence = AdherenceSets::default();
        let mut deaths = DeathTable::new();

        for (round_no, records) in data {
            if !in_sickness_phase(round_no) {
                return Err(RestoreError::RoundOutOfPhase { round_no });
            }
            for record in records {
                if !record.timestamp.is_finite() || record.timestamp < 0.0 {
                    return Err(RestoreError::BadTimestamp {
                        npc_id: record.npc_id,
                        round_no,
                        timestamp: record.timestamp,
                    });
                }
                let group = self
                    .populations
                    .group_of(record.npc_id)
                    .ok_or(RestoreError::UnknownNpc {
                        npc_id: record.npc_id,
                    })?;
                let event = record.into_event(round_no);
                match event.change {
                    // Only adhering NPCs ever visit the bathhouse, so the
                    // visit ids reproduce the adherence sets exactly.
                    StatusChange::GoToBathhouse => adherence.insert(group, event.npc_id),
                    StatusChange::Die => {
                        deaths.insert(
                            event.npc_id,
                            DeathRecord {
                                round_no,
                                timestamp: event.timestamp,
                            },
                        );
                    }
                    _ => {}
                }
                events.push(event);
            }
        }

        tracing::info!(events = events.len(), "restored sickness schedule from backend");
        self.adherence = adherence;
        self.deaths = deaths;
        self.queues = RoundQueues::from_events(events);
        self.computed = true;
        Ok(())
    }
}
