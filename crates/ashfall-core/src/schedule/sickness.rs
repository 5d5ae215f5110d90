//! Sickness scheduling.
//!
//! Two sources of sickness events: every scheduled death gets a companion
//! event in its round (the NPC visibly sickens before expiring), and each
//! round carries an independent quota of non-lethal cases per group so the
//! epidemic reads as widespread rather than only striking the doomed.

use rand::seq::SliceRandom;
use rand::Rng;

use ashfall_events::{sickness_rounds, SicknessEvent, StatusChange};

use crate::population::Group;

use super::{ScheduleContext, LATE_PHASE_ROUND};

/// Derives companion events for deaths, then fills the per-round quotas.
pub(crate) fn generate(ctx: &mut ScheduleContext<'_>) {
    companion_sickness(ctx);
    nonlethal_sickness(ctx);
}

/// One sickness event per scheduled death, in the same round.
///
/// The onset snaps to the checkpoint the death timestamp fell out of:
/// the 5-minute mark, or the 10-minute mark for late deaths.
fn companion_sickness(ctx: &mut ScheduleContext<'_>) {
    let interval = ctx.config.sickness.sick_interval;
    let deaths: Vec<(u32, u32, f32)> = ctx
        .events
        .iter()
        .filter(|e| e.change == StatusChange::Die)
        .map(|e| (e.npc_id, e.round_no, e.timestamp))
        .collect();
    for (npc_id, round_no, death_timestamp) in deaths {
        let onset = if death_timestamp > interval * 2.0 {
            interval * 2.0
        } else {
            interval
        };
        ctx.events.push(SicknessEvent::new(
            npc_id,
            round_no,
            onset,
            StatusChange::Sickness,
        ));
    }
}

/// Fills the non-lethal quotas, round by round.
///
/// Non-adhering pools are re-sampled every round (the same NPC can sicken
/// in several rounds) but leave permanently once dead. Adhering NPCs
/// sicken once per session at most: one fresh pick per round per group
/// until the unpicked pool runs dry.
fn nonlethal_sickness(ctx: &mut ScheduleContext<'_>) {
    let adherent = ctx.adherence_condition;

    let mut ingroup_pool: Vec<u32> = non_adhering(ctx, Group::Ingroup);
    let mut outgroup_pool: Vec<u32> = non_adhering(ctx, Group::Outgroup);
    let mut unpicked_ingroup_adh: Vec<u32> =
        ctx.adherence.set(Group::Ingroup).iter().copied().collect();
    let mut unpicked_outgroup_adh: Vec<u32> =
        ctx.adherence.set(Group::Outgroup).iter().copied().collect();

    for round_no in sickness_rounds() {
        let died = ctx.death_ids_in_round(round_no);
        ingroup_pool.retain(|id| !died.contains(id));
        outgroup_pool.retain(|id| !died.contains(id));

        // ingroup non-adhering
        let quota = 2
            + if !adherent { 4 } else { 0 }
            + if !adherent && round_no < LATE_PHASE_ROUND { 2 } else { 0 };
        sample_sick(ctx, &ingroup_pool, quota, round_no, Group::Ingroup);

        // ingroup adhering: one per round while any remain unpicked
        pick_adhering_sick(ctx, &mut unpicked_ingroup_adh, round_no);

        // outgroup non-adhering
        let quota = 4 + if round_no < LATE_PHASE_ROUND { 1 } else { 0 };
        sample_sick(ctx, &outgroup_pool, quota, round_no, Group::Outgroup);

        // outgroup adhering: one per round, every round
        pick_adhering_sick(ctx, &mut unpicked_outgroup_adh, round_no);
    }
}

fn non_adhering(ctx: &ScheduleContext<'_>, group: Group) -> Vec<u32> {
    ctx.populations
        .ids(group)
        .filter(|id| !ctx.adherence.set(group).contains(id))
        .collect()
}

/// Samples `quota - deaths_this_round` ids from the pool, clamped to the
/// pool size, and schedules a sickness for each.
fn sample_sick(
    ctx: &mut ScheduleContext<'_>,
    pool: &[u32],
    quota: usize,
    round_no: u32,
    group: Group,
) {
    let deaths = ctx.deaths_in_round(round_no, group);
    let target = quota.saturating_sub(deaths).min(pool.len());
    let chosen: Vec<u32> = pool
        .choose_multiple(&mut *ctx.rng, target)
        .copied()
        .collect();
    for npc_id in chosen {
        schedule_sickness(ctx, npc_id, round_no);
    }
}

fn pick_adhering_sick(ctx: &mut ScheduleContext<'_>, unpicked: &mut Vec<u32>, round_no: u32) {
    let chosen = unpicked.choose(&mut *ctx.rng).copied();
    if let Some(npc_id) = chosen {
        unpicked.retain(|&id| id != npc_id);
        schedule_sickness(ctx, npc_id, round_no);
    }
}

/// A sickness onset at one of the round's checkpoints.
fn schedule_sickness(ctx: &mut ScheduleContext<'_>, npc_id: u32, round_no: u32) {
    let interval = ctx.config.sickness.sick_interval;
    let checkpoints = ctx.config.sickness.checkpoints;
    let timestamp = interval * ctx.rng.gen_range(1..=checkpoints) as f32;
    ctx.events.push(SicknessEvent::new(
        npc_id,
        round_no,
        timestamp,
        StatusChange::Sickness,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::population::Populations;
    use crate::schedule::{generate as generate_schedule, Schedule};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn schedule(seed: u64, adherence_condition: bool) -> (Schedule, Populations) {
        let config = Config::default();
        let populations = Populations::new(config.population.pool_size);
        let mut rng = SmallRng::seed_from_u64(seed);
        (
            generate_schedule(&config, &populations, adherence_condition, &mut rng),
            populations,
        )
    }

    /// Sickness events for NPCs that do not die in that round.
    fn nonlethal_in_round(schedule: &Schedule, round_no: u32) -> Vec<SicknessEvent> {
        schedule
            .queues
            .round(round_no)
            .filter(|e| e.change == StatusChange::Sickness)
            .filter(|e| {
                schedule
                    .deaths
                    .get(&e.npc_id)
                    .map_or(true, |d| d.round_no != round_no)
            })
            .copied()
            .collect()
    }

    #[test]
    fn test_nonlethal_onsets_snap_to_checkpoints() {
        for seed in 0..20 {
            let (schedule, _) = schedule(seed, false);
            for round_no in sickness_rounds() {
                for event in nonlethal_in_round(&schedule, round_no) {
                    assert!(
                        event.timestamp == 300.0 || event.timestamp == 600.0,
                        "seed {}: {}",
                        seed,
                        event
                    );
                }
            }
        }
    }

    #[test]
    fn test_nobody_sickens_in_their_death_round_except_the_companion() {
        for seed in 0..20 {
            let (schedule, _) = schedule(seed, false);
            for (&npc_id, record) in &schedule.deaths {
                let sickness_count = schedule
                    .queues
                    .round(record.round_no)
                    .filter(|e| e.npc_id == npc_id && e.change == StatusChange::Sickness)
                    .count();
                assert_eq!(sickness_count, 1, "seed {} npc {}", seed, npc_id);
            }
        }
    }

    #[test]
    fn test_nonlethal_quota_matches_the_formula() {
        for seed in 0..20 {
            for &adherent in &[false, true] {
                let (schedule, populations) = schedule(seed, adherent);
                for round_no in sickness_rounds() {
                    let events = nonlethal_in_round(&schedule, round_no);
                    for &group in Group::all() {
                        let adhering = schedule.adherence.set(group);
                        let non_adh_sick = events
                            .iter()
                            .filter(|e| populations.group_of(e.npc_id) == Some(group))
                            .filter(|e| !adhering.contains(&e.npc_id))
                            .count();

                        let deaths = schedule
                            .deaths
                            .iter()
                            .filter(|(&id, d)| {
                                d.round_no == round_no
                                    && populations.group_of(id) == Some(group)
                            })
                            .count();
                        let dead_so_far = schedule
                            .deaths
                            .iter()
                            .filter(|(&id, d)| {
                                d.round_no <= round_no
                                    && populations.group_of(id) == Some(group)
                            })
                            .count();
                        let pool = populations.pool_size() as usize - adhering.len() - dead_so_far;

                        let quota: usize = match group {
                            Group::Ingroup => {
                                2 + if !adherent { 4 } else { 0 }
                                    + if !adherent && round_no < LATE_PHASE_ROUND { 2 } else { 0 }
                            }
                            Group::Outgroup => {
                                4 + if round_no < LATE_PHASE_ROUND { 1 } else { 0 }
                            }
                        };
                        let expected = quota.saturating_sub(deaths).min(pool);
                        assert_eq!(
                            non_adh_sick, expected,
                            "seed {} adherent {} round {} {}",
                            seed, adherent, round_no, group
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_adhering_npcs_sicken_at_most_once_per_session() {
        for seed in 0..20 {
            let (schedule, _) = schedule(seed, true);
            let mut seen: HashSet<u32> = HashSet::new();
            for round_no in sickness_rounds() {
                let adhering_sick: Vec<u32> = schedule
                    .queues
                    .round(round_no)
                    .filter(|e| e.change == StatusChange::Sickness)
                    .filter(|e| schedule.adherence.contains(e.npc_id))
                    .map(|e| e.npc_id)
                    .collect();
                for npc_id in adhering_sick {
                    assert!(seen.insert(npc_id), "seed {} npc {} sick twice", seed, npc_id);
                }
            }
        }
    }

    #[test]
    fn test_one_adhering_outgroup_case_every_round() {
        for seed in 0..20 {
            let (schedule, populations) = schedule(seed, false);
            for round_no in sickness_rounds() {
                let count = schedule
                    .queues
                    .round(round_no)
                    .filter(|e| e.change == StatusChange::Sickness)
                    .filter(|e| populations.group_of(e.npc_id) == Some(Group::Outgroup))
                    .filter(|e| schedule.adherence.contains(e.npc_id))
                    .count();
                assert_eq!(count, 1, "seed {} round {}", seed, round_no);
            }
        }
    }
}
