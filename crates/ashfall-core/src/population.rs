//! Population pools and adherence membership.
//!
//! Every NPC belongs to exactly one of two fixed experimental groups for
//! the whole session. Ids are dense integers: the ingroup occupies
//! `0..pool_size`, the outgroup `pool_size..2*pool_size`. The boundary is
//! resolved in one place here instead of being compared against a magic
//! number at every call site.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;

/// The experimental group an NPC belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    Ingroup,
    Outgroup,
}

impl Group {
    /// Returns both groups, ingroup first.
    pub fn all() -> &'static [Group] {
        &[Group::Ingroup, Group::Outgroup]
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::Ingroup => write!(f, "ingroup"),
            Group::Outgroup => write!(f, "outgroup"),
        }
    }
}

/// The fixed id pools of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Populations {
    pool_size: u32,
}

impl Populations {
    /// Creates pools of `pool_size` NPCs per group.
    pub fn new(pool_size: u32) -> Self {
        Self { pool_size }
    }

    /// NPCs per group.
    pub fn pool_size(&self) -> u32 {
        self.pool_size
    }

    /// The id range of a group.
    pub fn ids(&self, group: Group) -> Range<u32> {
        match group {
            Group::Ingroup => 0..self.pool_size,
            Group::Outgroup => self.pool_size..self.pool_size * 2,
        }
    }

    /// Resolves which group an id belongs to, or `None` for ids outside
    /// both pools.
    pub fn group_of(&self, npc_id: u32) -> Option<Group> {
        if npc_id < self.pool_size {
            Some(Group::Ingroup)
        } else if npc_id < self.pool_size * 2 {
            Some(Group::Outgroup)
        } else {
            None
        }
    }

    /// Session-wide cap on deaths per group.
    pub fn max_deaths_per_group(&self) -> usize {
        (self.pool_size / 2) as usize
    }
}

/// Which ids adhere to the protective measures, per group.
///
/// Selected once per session (or rebuilt from a restored schedule) and
/// read-only afterward.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdherenceSets {
    ingroup: BTreeSet<u32>,
    outgroup: BTreeSet<u32>,
}

impl AdherenceSets {
    /// Builds the sets from already-sampled ids.
    pub fn new(ingroup: BTreeSet<u32>, outgroup: BTreeSet<u32>) -> Self {
        Self { ingroup, outgroup }
    }

    /// The adhering ids of one group.
    pub fn set(&self, group: Group) -> &BTreeSet<u32> {
        match group {
            Group::Ingroup => &self.ingroup,
            Group::Outgroup => &self.outgroup,
        }
    }

    /// Adds an id to its group's set.
    pub fn insert(&mut self, group: Group, npc_id: u32) {
        match group {
            Group::Ingroup => self.ingroup.insert(npc_id),
            Group::Outgroup => self.outgroup.insert(npc_id),
        };
    }

    /// Checks whether an id adheres, regardless of group.
    pub fn contains(&self, npc_id: u32) -> bool {
        self.ingroup.contains(&npc_id) || self.outgroup.contains(&npc_id)
    }

    /// All adhering ids, ingroup first, ascending within each group.
    pub fn all_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.ingroup.iter().chain(self.outgroup.iter()).copied()
    }

    /// Number of adhering ids in one group.
    pub fn len(&self, group: Group) -> usize {
        self.set(group).len()
    }

    /// True when neither group has adhering ids.
    pub fn is_empty(&self) -> bool {
        self.ingroup.is_empty() && self.outgroup.is_empty()
    }
}

/// A pair of per-group counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupCounts {
    ingroup: usize,
    outgroup: usize,
}

impl GroupCounts {
    /// The count for one group.
    pub fn get(&self, group: Group) -> usize {
        match group {
            Group::Ingroup => self.ingroup,
            Group::Outgroup => self.outgroup,
        }
    }

    /// Increments the count for one group.
    pub fn increment(&mut self, group: Group) {
        match group {
            Group::Ingroup => self.ingroup += 1,
            Group::Outgroup => self.outgroup += 1,
        }
    }

    /// Sum over both groups.
    pub fn total(&self) -> usize {
        self.ingroup + self.outgroup
    }
}
