//! Post-hoc invariant checks on a finished mystery.
//!
//! The selectors already enforce these while sampling. The audit recomputes
//! them from the finished population so a caller can refuse to publish an
//! instance that was assembled or edited by other means.

use std::collections::HashSet;

use thiserror::Error;

use crate::config::MysteryConfig;
use crate::culprit::evaluate_candidate;
use crate::mystery::Mystery;
use crate::population::{Indices, PersonId};
use crate::witness::name_clashes;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditFinding {
    #[error("{id} has {count} memberships, expected {expected}")]
    MembershipCount {
        id: PersonId,
        count: usize,
        expected: usize,
    },
    #[error("plate {tag} issued more than once")]
    DuplicateTag { tag: String },
    #[error("{id} is referenced but not in the population")]
    UnknownPerson { id: PersonId },
    #[error("the witness is the culprit")]
    WitnessIsCulprit,
    #[error("culprit has {count} doppelganger(s)")]
    Doppelgangers { count: usize },
    #[error("tag-pool has {size} suspects, allowed {min}..={max}")]
    TagPoolOutOfBounds { size: usize, min: usize, max: usize },
    #[error("membership-pool has {size} suspects, need at least {min}")]
    MembershipPoolTooSmall { size: usize, min: usize },
    #[error("recorded suspect pools differ from the population")]
    StalePools,
    #[error("witness has {same} same-sex and {opposite} opposite-sex name clashes")]
    WitnessClashesOutOfBounds { same: usize, opposite: usize },
    #[error("recorded red herrings differ from the witness's name clashes")]
    StaleRedHerrings,
    #[error("the culprit is listed as a red herring")]
    CulpritIsRedHerring,
    #[error("lookup indices differ from the population")]
    StaleIndices,
}

/// Check every instance invariant; an empty result means the mystery is sound.
pub fn audit_mystery(mystery: &Mystery, config: &MysteryConfig) -> Vec<AuditFinding> {
    let mut findings = Vec::new();
    let population = &mystery.population;
    let expected = config.required_memberships;

    for person in population.iter() {
        if person.memberships.len() != expected {
            findings.push(AuditFinding::MembershipCount {
                id: person.id,
                count: person.memberships.len(),
                expected,
            });
        }
    }

    let mut tags = HashSet::with_capacity(population.len());
    for person in population.iter() {
        if !tags.insert(person.vehicle.tag.as_str()) {
            findings.push(AuditFinding::DuplicateTag {
                tag: person.vehicle.tag.clone(),
            });
        }
    }

    if Indices::rebuild(population) != mystery.indices {
        findings.push(AuditFinding::StaleIndices);
    }

    let culprit_id = mystery.culprit.culprit;
    let witness_id = mystery.witness.witness;
    let (Some(culprit), Some(witness)) = (population.get(culprit_id), population.get(witness_id)) else {
        for id in [culprit_id, witness_id] {
            if population.get(id).is_none() {
                findings.push(AuditFinding::UnknownPerson { id });
            }
        }
        return findings;
    };

    if culprit.id == witness.id {
        findings.push(AuditFinding::WitnessIsCulprit);
    }

    let pools = evaluate_candidate(population, culprit);
    if !pools.doppelgangers.is_empty() {
        findings.push(AuditFinding::Doppelgangers {
            count: pools.doppelgangers.len(),
        });
    }
    let bounds = &config.pools;
    let tag_size = pools.tag_pool.len();
    if tag_size < bounds.tag_pool_min || tag_size > bounds.tag_pool_max {
        findings.push(AuditFinding::TagPoolOutOfBounds {
            size: tag_size,
            min: bounds.tag_pool_min,
            max: bounds.tag_pool_max,
        });
    }
    if pools.membership_pool.len() < bounds.membership_pool_min {
        findings.push(AuditFinding::MembershipPoolTooSmall {
            size: pools.membership_pool.len(),
            min: bounds.membership_pool_min,
        });
    }
    if pools != mystery.culprit.pools {
        findings.push(AuditFinding::StalePools);
    }

    let clashes = name_clashes(&mystery.indices, witness, config.witness.clash_rule);
    if !clashes.within(&config.witness) {
        findings.push(AuditFinding::WitnessClashesOutOfBounds {
            same: clashes.same_sex.len(),
            opposite: clashes.opposite_sex.len(),
        });
    }
    if clashes.red_herrings() != mystery.witness.red_herrings {
        findings.push(AuditFinding::StaleRedHerrings);
    }
    if mystery.witness.red_herrings.contains(&culprit_id) {
        findings.push(AuditFinding::CulpritIsRedHerring);
    }

    findings
}
