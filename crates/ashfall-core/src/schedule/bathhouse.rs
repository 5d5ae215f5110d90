//! Bathhouse visit timing.
//!
//! Every adhering NPC leaves for the bathhouse once per round. A visit
//! keeps an NPC off the map for the round trip, so the departure windows
//! leave room to be back before the first sickness checkpoint: round 7
//! opens at the one-minute mark with a wide window, later rounds confine
//! the trip to the first three minutes.

use rand::Rng;

use ashfall_events::{sickness_rounds, SicknessEvent, StatusChange, FIRST_SICKNESS_ROUND};

use super::ScheduleContext;

/// Schedules one visit per adhering NPC per round.
pub(crate) fn generate(ctx: &mut ScheduleContext<'_>) {
    let first_start = ctx.config.bathhouse.first_round_start;
    let first_span = ctx.config.bathhouse.first_round_span;
    let later_span = ctx.config.bathhouse.later_round_span;

    let adhering: Vec<u32> = ctx.adherence.all_ids().collect();
    for round_no in sickness_rounds() {
        for &npc_id in &adhering {
            let timestamp = if round_no == FIRST_SICKNESS_ROUND {
                first_start + ctx.rng.gen::<f32>() * first_span
            } else {
                ctx.rng.gen::<f32>() * later_span
            };
            ctx.events.push(SicknessEvent::new(
                npc_id,
                round_no,
                timestamp,
                StatusChange::GoToBathhouse,
            ));
        }
    }
}
