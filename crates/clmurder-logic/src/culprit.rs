//! Culprit selection by rejection sampling.
//!
//! A candidate is compared against everyone else on four predicates: same
//! sex, same height bucket, partial plate match (first three characters and
//! last digit), and identical membership set. The matches fall into three
//! pools:
//!
//! | Pool | Predicates |
//! |------|------------|
//! | tag-pool | sex + bucket + plate |
//! | membership-pool | sex + bucket + memberships |
//! | doppelgangers | all four |
//!
//! The candidate is kept when there are no doppelgangers (the puzzle would
//! have two answers), the tag-pool is within bounds (1..=4 by default: the
//! plate clue must leave some legwork but still narrow things down), and the
//! membership-pool is non-empty (a second clue path exists).

use std::collections::BTreeSet;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{MysteryConfig, PoolBounds};
use crate::error::{GenerationError, Stage};
use crate::population::{Individual, PersonId, Population};

/// Everyone who resembles a culprit candidate, excluding the candidate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SuspectPools {
    pub tag_pool: BTreeSet<PersonId>,
    pub membership_pool: BTreeSet<PersonId>,
    pub doppelgangers: BTreeSet<PersonId>,
}

/// Why a candidate was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Doppelgangers(usize),
    TagPoolSize(usize),
    MembershipPoolSize(usize),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Doppelgangers(n) => write!(f, "{n} doppelganger(s)"),
            Rejection::TagPoolSize(n) => write!(f, "too few/many tag matches ({n})"),
            Rejection::MembershipPoolSize(n) => write!(f, "too few membership matches ({n})"),
        }
    }
}

impl SuspectPools {
    pub fn verdict(&self, bounds: &PoolBounds) -> Result<(), Rejection> {
        if !self.doppelgangers.is_empty() {
            return Err(Rejection::Doppelgangers(self.doppelgangers.len()));
        }
        let tags = self.tag_pool.len();
        if tags < bounds.tag_pool_min || tags > bounds.tag_pool_max {
            return Err(Rejection::TagPoolSize(tags));
        }
        if self.membership_pool.len() < bounds.membership_pool_min {
            return Err(Rejection::MembershipPoolSize(self.membership_pool.len()));
        }
        Ok(())
    }
}

/// Partition everyone except `candidate` by the culprit predicates.
pub fn evaluate_candidate(population: &Population, candidate: &Individual) -> SuspectPools {
    let mut pools = SuspectPools::default();
    for other in population.iter() {
        if other.id == candidate.id {
            continue;
        }
        if other.sex != candidate.sex || other.height_bucket != candidate.height_bucket {
            continue;
        }
        let tag_match = other.vehicle.partial_tag_matches(&candidate.vehicle);
        let members_match = other.memberships == candidate.memberships;
        if tag_match {
            pools.tag_pool.insert(other.id);
        }
        if members_match {
            pools.membership_pool.insert(other.id);
        }
        if tag_match && members_match {
            pools.doppelgangers.insert(other.id);
        }
    }
    pools
}

/// An accepted culprit and its (doppelganger-free) suspect pools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CulpritSelection {
    pub culprit: PersonId,
    pub pools: SuspectPools,
}

pub fn select_culprit(
    population: &Population,
    config: &MysteryConfig,
    rng: &mut impl Rng,
) -> Result<CulpritSelection, GenerationError> {
    let attempts = config.retry.culprit_attempts;
    for attempt in 0..attempts {
        let candidate = population
            .random_member(rng)
            .ok_or_else(|| GenerationError::infeasible("empty population"))?;
        let pools = evaluate_candidate(population, candidate);
        match pools.verdict(&config.pools) {
            Ok(()) => {
                log::info!(
                    "Culprit {} accepted after {} attempt(s): {} tag suspects, {} membership suspects",
                    candidate.id,
                    attempt + 1,
                    pools.tag_pool.len(),
                    pools.membership_pool.len()
                );
                return Ok(CulpritSelection {
                    culprit: candidate.id,
                    pools,
                });
            }
            Err(reason) => log::debug!("Culprit candidate {} rejected: {reason}", candidate.id),
        }
    }
    Err(GenerationError::AllocationExhausted {
        stage: Stage::Culprit,
        attempts,
    })
}

/// An organization the culprit belongs to and the suspect does not; the
/// suspect's alibi for the membership clue.
pub fn missing_membership<'a>(culprit: &'a Individual, suspect: &Individual) -> Option<&'a str> {
    culprit.memberships.first_missing_from(&suspect.memberships)
}
