//! Adherence selection.
//!
//! Which NPCs follow the protective measures is decided once per session.
//! The experimental condition only sways the ingroup; the outgroup always
//! lands on an even 50/50 split so the player sees the same baseline on
//! the far side of the river regardless of condition.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;

use crate::config::Config;
use crate::population::{AdherenceSets, Group, Populations};

/// Picks the adhering ids for both groups.
pub fn select_adhering(
    config: &Config,
    populations: &Populations,
    adherence_condition: bool,
    rng: &mut SmallRng,
) -> AdherenceSets {
    let ingroup_count = ingroup_adhering_count(config, populations, adherence_condition, rng);
    let outgroup_count = populations.max_deaths_per_group();

    let ingroup = sample_ids(populations, Group::Ingroup, ingroup_count, rng);
    let outgroup = sample_ids(populations, Group::Outgroup, outgroup_count, rng);
    tracing::debug!(?ingroup, ?outgroup, "selected adhering NPCs");

    AdherenceSets::new(ingroup, outgroup)
}

/// Number of adhering ingroup NPCs for the given condition.
///
/// The exact share of the pool can be non-integral, in which case the
/// count is drawn uniformly between its floor and ceiling.
fn ingroup_adhering_count(
    config: &Config,
    populations: &Populations,
    adherence_condition: bool,
    rng: &mut SmallRng,
) -> usize {
    let share = if adherence_condition {
        config.population.adherent_share
    } else {
        config.population.rebel_share
    };
    let exact = share * populations.pool_size() as f32;
    rng.gen_range(exact.floor() as usize..=exact.ceil() as usize)
}

/// Uniform sample without replacement from one group's pool.
fn sample_ids(
    populations: &Populations,
    group: Group,
    count: usize,
    rng: &mut SmallRng,
) -> BTreeSet<u32> {
    let pool: Vec<u32> = populations.ids(group).collect();
    pool.choose_multiple(rng, count).copied().collect()
}
