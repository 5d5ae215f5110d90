//! Schedule generation.
//!
//! The whole sickness phase is rolled once, before gameplay reaches
//! round 7: who adheres, who dies and when, who merely falls sick, and
//! when every adhering NPC slips away to the bathhouse. Generation runs
//! in four passes over one mutable [`ScheduleContext`], consumed linearly:
//!
//! 1. [`adherence`]: pick the adhering ids per group
//! 2. [`deaths`]: roll deaths for rounds 7-12 under the per-group caps
//! 3. [`sickness`]: derive companion sickness for each death, then fill
//!    the per-round non-lethal quotas
//! 4. [`bathhouse`]: one visit per adhering NPC per round
//!
//! The passes only append events and shrink eligibility pools; nothing is
//! ever re-rolled. The result is bucketed into [`RoundQueues`] for the
//! dispatcher.

pub mod adherence;
pub mod bathhouse;
pub mod deaths;
pub mod queue;
pub mod sickness;

pub use queue::{DeathRecord, DeathTable, RoundQueues};

use rand::rngs::SmallRng;

use ashfall_events::SicknessEvent;

use crate::config::Config;
use crate::population::{AdherenceSets, Group, Populations};

/// First round of the late phase; several quotas and probabilities drop
/// once the session crosses this boundary.
pub const LATE_PHASE_ROUND: u32 = 10;

/// A fully generated session schedule.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub adherence: AdherenceSets,
    pub queues: RoundQueues,
    pub deaths: DeathTable,
}

/// Mutable state threaded through the generation passes.
pub(crate) struct ScheduleContext<'a> {
    pub config: &'a Config,
    pub populations: &'a Populations,
    pub adherence: &'a AdherenceSets,
    pub adherence_condition: bool,
    pub rng: &'a mut SmallRng,
    /// Non-adhering ids still eligible to be picked for death.
    pub ingroup_eligible: Vec<u32>,
    pub outgroup_eligible: Vec<u32>,
    /// Events accumulated so far, in generation order.
    pub events: Vec<SicknessEvent>,
    pub deaths: DeathTable,
}

impl<'a> ScheduleContext<'a> {
    fn new(
        config: &'a Config,
        populations: &'a Populations,
        adherence: &'a AdherenceSets,
        adherence_condition: bool,
        rng: &'a mut SmallRng,
    ) -> Self {
        let eligible = |group: Group| -> Vec<u32> {
            populations
                .ids(group)
                .filter(|id| !adherence.set(group).contains(id))
                .collect()
        };
        Self {
            ingroup_eligible: eligible(Group::Ingroup),
            outgroup_eligible: eligible(Group::Outgroup),
            config,
            populations,
            adherence,
            adherence_condition,
            rng,
            events: Vec::new(),
            deaths: DeathTable::new(),
        }
    }

    /// Ids scheduled to die in the given round.
    pub fn death_ids_in_round(&self, round_no: u32) -> Vec<u32> {
        self.deaths
            .iter()
            .filter(|(_, record)| record.round_no == round_no)
            .map(|(&npc_id, _)| npc_id)
            .collect()
    }

    /// Deaths scheduled in the given round for one group.
    pub fn deaths_in_round(&self, round_no: u32, group: Group) -> usize {
        self.death_ids_in_round(round_no)
            .iter()
            .filter(|&&id| self.populations.group_of(id) == Some(group))
            .count()
    }
}

/// Generates the complete schedule for one session.
///
/// Deterministic: the same config, condition and RNG state always produce
/// the same schedule.
pub fn generate(
    config: &Config,
    populations: &Populations,
    adherence_condition: bool,
    rng: &mut SmallRng,
) -> Schedule {
    let adherence = adherence::select_adhering(config, populations, adherence_condition, rng);

    let mut ctx = ScheduleContext::new(config, populations, &adherence, adherence_condition, rng);
    deaths::generate(&mut ctx);
    sickness::generate(&mut ctx);
    bathhouse::generate(&mut ctx);

    let ScheduleContext { events, deaths, .. } = ctx;
    tracing::info!(
        events = events.len(),
        deaths = deaths.len(),
        adherence_condition,
        "generated sickness schedule"
    );

    Schedule {
        adherence,
        queues: RoundQueues::from_events(events),
        deaths,
    }
}
