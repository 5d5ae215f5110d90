//! Per-round event queues and the death timestamp table.

use std::collections::{BTreeMap, HashMap, VecDeque};

use ashfall_events::{sickness_rounds, ScheduleData, SicknessEvent};

/// Where and when an NPC is scheduled to die.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeathRecord {
    pub round_no: u32,
    pub timestamp: f32,
}

/// npc id -> scheduled death. At most one entry per NPC per session.
pub type DeathTable = HashMap<u32, DeathRecord>;

/// The generated schedule, ordered for consumption.
///
/// One deque per round, sorted ascending by timestamp at build time. The
/// dispatcher only ever removes from the front; nothing reorders a queue
/// after construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundQueues {
    queues: BTreeMap<u32, VecDeque<SicknessEvent>>,
}

impl RoundQueues {
    /// Buckets events by round and sorts each bucket by timestamp.
    ///
    /// Events with equal timestamps keep their generation order.
    pub fn from_events(events: Vec<SicknessEvent>) -> Self {
        let mut buckets: BTreeMap<u32, Vec<SicknessEvent>> = BTreeMap::new();
        for event in events {
            buckets.entry(event.round_no).or_default().push(event);
        }
        let mut queues = BTreeMap::new();
        for (round_no, mut bucket) in buckets {
            bucket.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
            queues.insert(round_no, bucket.into());
        }
        Self { queues }
    }

    /// The next event due at or before `current_round`.
    ///
    /// Events left over from an earlier round come first; within a round,
    /// the front of the deque is always the earliest remaining timestamp.
    pub fn next_due(&self, current_round: u32) -> Option<&SicknessEvent> {
        self.queues
            .range(..=current_round)
            .find_map(|(_, queue)| queue.front())
    }

    /// Pops the event [`Self::next_due`] would return.
    pub fn pop_next_due(&mut self, current_round: u32) -> Option<SicknessEvent> {
        self.queues
            .range_mut(..=current_round)
            .find_map(|(_, queue)| queue.pop_front())
    }

    /// Total events remaining across all rounds.
    pub fn len(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }

    /// True when every round's queue is drained.
    pub fn is_empty(&self) -> bool {
        self.queues.values().all(VecDeque::is_empty)
    }

    /// The remaining events of one round, front first.
    pub fn round(&self, round_no: u32) -> impl Iterator<Item = &SicknessEvent> {
        self.queues.get(&round_no).into_iter().flatten()
    }

    /// Remaining events over all rounds, in (round, timestamp) order.
    pub fn iter(&self) -> impl Iterator<Item = &SicknessEvent> {
        self.queues.values().flatten()
    }

    /// Converts the remaining schedule into the wire shape.
    ///
    /// Every sickness round appears as a key, empty or not, matching what
    /// the telemetry backend stores per session.
    pub fn to_schedule_data(&self) -> ScheduleData {
        let mut data = ScheduleData::new();
        for round_no in sickness_rounds() {
            data.insert(
                round_no,
                self.round(round_no).map(|e| (*e).into()).collect(),
            );
        }
        data
    }
}
