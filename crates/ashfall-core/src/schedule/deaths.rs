//! Death scheduling.
//!
//! Deaths are rolled round by round against per-group session caps.
//! Adhering NPCs are never candidates: the eligibility pools start as the
//! non-adhering ids and shrink as NPCs are picked, so nobody dies twice.

use rand::seq::SliceRandom;
use rand::Rng;

use ashfall_events::{sickness_rounds, SicknessEvent, StatusChange};

use super::queue::DeathRecord;
use super::{ScheduleContext, LATE_PHASE_ROUND};

/// Rolls and schedules all deaths for rounds 7-12.
pub(crate) fn generate(ctx: &mut ScheduleContext<'_>) {
    let cap = ctx.populations.max_deaths_per_group();
    let mut ingroup_deaths = 0usize;
    let mut outgroup_deaths = 0usize;

    for round_no in sickness_rounds() {
        if ingroup_deaths >= cap && outgroup_deaths >= cap {
            break;
        }

        if ingroup_deaths < cap {
            let rolled = roll_ingroup_death_count(ctx, round_no, ingroup_deaths, cap);
            let count = rolled
                .min(cap - ingroup_deaths)
                .min(ctx.ingroup_eligible.len());
            if count > 0 {
                let chosen: Vec<u32> = ctx
                    .ingroup_eligible
                    .choose_multiple(&mut *ctx.rng, count)
                    .copied()
                    .collect();
                for npc_id in chosen {
                    schedule_death(ctx, npc_id, round_no);
                    ctx.ingroup_eligible.retain(|&id| id != npc_id);
                }
                ingroup_deaths += count;
            }
        }

        if outgroup_deaths < cap && roll_death(ctx) {
            let chosen = ctx.outgroup_eligible.choose(&mut *ctx.rng).copied();
            if let Some(npc_id) = chosen {
                schedule_death(ctx, npc_id, round_no);
                ctx.outgroup_eligible.retain(|&id| id != npc_id);
                outgroup_deaths += 1;
            }
        }
    }
}

/// One weighted coin flip.
fn roll_death(ctx: &mut ScheduleContext<'_>) -> bool {
    ctx.rng.gen::<f64>() < ctx.config.mortality.death_likelihood
}

/// How many ingroup NPCs die this round, before capping.
///
/// Under the adherent condition the late phase is death-free. The second
/// flip only happens while the running total leaves room under the cap,
/// outside the adherent condition, in the early phase.
fn roll_ingroup_death_count(
    ctx: &mut ScheduleContext<'_>,
    round_no: u32,
    current_count: usize,
    cap: usize,
) -> usize {
    if ctx.adherence_condition && round_no >= LATE_PHASE_ROUND {
        return 0;
    }
    let mut count = roll_death(ctx) as usize;
    if current_count + count < cap && !ctx.adherence_condition && round_no < LATE_PHASE_ROUND {
        count += roll_death(ctx) as usize;
    }
    count
}

/// Stamps one death: sick at a checkpoint, dead one to three minutes later.
fn schedule_death(ctx: &mut ScheduleContext<'_>, npc_id: u32, round_no: u32) {
    let interval = ctx.config.sickness.sick_interval;
    let checkpoints = ctx.config.sickness.checkpoints;
    let delay_base = ctx.config.mortality.death_delay_base;
    let delay_span = ctx.config.mortality.death_delay_span;

    let checkpoint = interval * ctx.rng.gen_range(1..=checkpoints) as f32;
    let timestamp = checkpoint + delay_base + ctx.rng.gen::<f32>() * delay_span;

    ctx.events.push(SicknessEvent::new(
        npc_id,
        round_no,
        timestamp,
        StatusChange::Die,
    ));
    ctx.deaths.insert(npc_id, DeathRecord { round_no, timestamp });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::population::{Group, Populations};
    use crate::schedule::{generate as generate_schedule, Schedule};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn schedule(seed: u64, adherence_condition: bool) -> (Schedule, Populations) {
        let config = Config::default();
        let populations = Populations::new(config.population.pool_size);
        let mut rng = SmallRng::seed_from_u64(seed);
        (
            generate_schedule(&config, &populations, adherence_condition, &mut rng),
            populations,
        )
    }

    #[test]
    fn test_death_timestamps_fall_in_the_expected_window() {
        for seed in 0..30 {
            let (schedule, _) = schedule(seed, false);
            for record in schedule.deaths.values() {
                // checkpoint {300, 600} + 60 + [0, 120)
                assert!(record.timestamp >= 360.0, "seed {}", seed);
                assert!(record.timestamp < 780.0, "seed {}", seed);
            }
        }
    }

    #[test]
    fn test_adhering_npcs_never_die() {
        for seed in 0..30 {
            let (schedule, _) = schedule(seed, seed % 2 == 0);
            for npc_id in schedule.deaths.keys() {
                assert!(!schedule.adherence.contains(*npc_id));
            }
        }
    }

    #[test]
    fn test_each_npc_dies_at_most_once() {
        for seed in 0..30 {
            let (schedule, _) = schedule(seed, false);
            let die_events = schedule
                .queues
                .iter()
                .filter(|e| e.change == StatusChange::Die)
                .count();
            assert_eq!(die_events, schedule.deaths.len());
        }
    }

    #[test]
    fn test_adherent_condition_has_no_late_ingroup_deaths() {
        for seed in 0..50 {
            let (schedule, populations) = schedule(seed, true);
            for (&npc_id, record) in &schedule.deaths {
                if populations.group_of(npc_id) == Some(Group::Ingroup) {
                    assert!(
                        record.round_no < LATE_PHASE_ROUND,
                        "seed {}: ingroup death in round {}",
                        seed,
                        record.round_no
                    );
                }
            }
        }
    }

    #[test]
    fn test_per_round_death_limits() {
        for seed in 0..50 {
            let (schedule, populations) = schedule(seed, false);
            for round_no in ashfall_events::sickness_rounds() {
                let per_group = |group: Group| {
                    schedule
                        .deaths
                        .iter()
                        .filter(|(&id, r)| {
                            r.round_no == round_no && populations.group_of(id) == Some(group)
                        })
                        .count()
                };
                // outgroup rolls a single coin per round
                assert!(per_group(Group::Outgroup) <= 1);
                // ingroup rolls at most two coins, and only one from round 10 on
                let ingroup_limit = if round_no < LATE_PHASE_ROUND { 2 } else { 1 };
                assert!(per_group(Group::Ingroup) <= ingroup_limit);
            }
        }
    }
}
