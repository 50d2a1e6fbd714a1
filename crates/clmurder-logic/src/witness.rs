//! Witness selection by rejection sampling.
//!
//! The only identifying clue about the witness is a first name (written on a
//! coffee cup) and a sex. A good witness shares that name with a handful of
//! other people of both sexes: enough that the search takes some work, few
//! enough that each clash can be ruled out. Those clashes are the red
//! herrings.

use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{ClashRule, MysteryConfig, WitnessBounds};
use crate::error::{GenerationError, Stage};
use crate::population::{Indices, Individual, PersonId, Population};

/// Other people who answer to the witness's first name, split by sex
/// relative to the witness.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NameClashes {
    pub same_sex: BTreeSet<PersonId>,
    pub opposite_sex: BTreeSet<PersonId>,
}

impl NameClashes {
    pub fn within(&self, bounds: &WitnessBounds) -> bool {
        let same = self.same_sex.len();
        let opposite = self.opposite_sex.len();
        (0 < same && same < bounds.same_sex_bound) && (0 < opposite && opposite < bounds.opposite_sex_bound)
    }

    pub fn red_herrings(&self) -> BTreeSet<PersonId> {
        self.same_sex.union(&self.opposite_sex).copied().collect()
    }

    pub fn contains(&self, id: PersonId) -> bool {
        self.same_sex.contains(&id) || self.opposite_sex.contains(&id)
    }
}

/// Look up everyone the witness's first name points at, per `rule`.
pub fn name_clashes(indices: &Indices, witness: &Individual, rule: ClashRule) -> NameClashes {
    let mut clashes = NameClashes::default();
    let mut lookups = vec![indices.first_names.get(&witness.first_name)];
    if rule == ClashRule::GivenOrFamily {
        lookups.push(indices.last_names.get(&witness.first_name));
    }
    for partition in lookups.into_iter().flatten() {
        clashes.same_sex.extend(partition.of(witness.sex));
        clashes.opposite_sex.extend(partition.of(witness.sex.opposite()));
    }
    clashes.same_sex.remove(&witness.id);
    clashes.opposite_sex.remove(&witness.id);
    clashes
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessSelection {
    pub witness: PersonId,
    pub clashes: NameClashes,
    pub red_herrings: BTreeSet<PersonId>,
}

/// Draw witnesses until one's clash counts fit the bounds. The culprit is
/// neither eligible as the witness nor allowed among the red herrings.
pub fn select_witness(
    population: &Population,
    indices: &Indices,
    culprit: PersonId,
    config: &MysteryConfig,
    rng: &mut impl Rng,
) -> Result<WitnessSelection, GenerationError> {
    let bounds = &config.witness;
    let attempts = config.retry.witness_attempts;
    for attempt in 0..attempts {
        let candidate = population
            .random_member(rng)
            .ok_or_else(|| GenerationError::infeasible("empty population"))?;
        if candidate.id == culprit {
            continue;
        }
        let clashes = name_clashes(indices, candidate, bounds.clash_rule);
        if !clashes.within(bounds) || clashes.contains(culprit) {
            log::debug!(
                "Witness candidate {} rejected: {} same-sex / {} opposite-sex clashes",
                candidate.id,
                clashes.same_sex.len(),
                clashes.opposite_sex.len()
            );
            continue;
        }
        log::info!(
            "Witness {} ({}) accepted after {} attempt(s) with {} red herrings",
            candidate.id,
            candidate.first_name,
            attempt + 1,
            clashes.same_sex.len() + clashes.opposite_sex.len()
        );
        let red_herrings = clashes.red_herrings();
        return Ok(WitnessSelection {
            witness: candidate.id,
            clashes,
            red_herrings,
        });
    }
    Err(GenerationError::AllocationExhausted {
        stage: Stage::Witness,
        attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::Profile;
    use crate::sampler::{Height, HeightBucket, Sex};
    use crate::tags::Vehicle;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn person(id: u32, sex: Sex, first: &str, last: &str) -> Individual {
        Profile {
            id: PersonId::new(id),
            first_name: first.into(),
            last_name: last.into(),
            sex,
            street: "Oak Ave".into(),
            age: 25,
            height: Height::from_inches(65),
            height_bucket: HeightBucket::Medium,
            weight: 140,
        }
        .enroll(["Elks"].into_iter().collect())
        .register(Vehicle {
            make: "Saab".into(),
            color: "Green".into(),
            tag: format!("QQQQ{id:03}"),
        })
    }

    fn town() -> (Population, Indices) {
        let pop = Population::new(vec![
            person(0, Sex::Female, "Morgan", "Reed"),
            person(1, Sex::Female, "Morgan", "Hale"),
            person(2, Sex::Male, "Morgan", "Cole"),
            person(3, Sex::Male, "Dale", "Morgan"), // surname clash
            person(4, Sex::Female, "Ada", "Morgan"),  // surname clash
            person(5, Sex::Male, "Ed", "Stone"),
        ])
        .unwrap();
        let indices = Indices::rebuild(&pop);
        (pop, indices)
    }

    #[test]
    fn test_clashes_given_or_family() {
        let (pop, indices) = town();
        let witness = pop.get(PersonId::new(0)).unwrap();
        let clashes = name_clashes(&indices, witness, ClashRule::GivenOrFamily);
        assert_eq!(clashes.same_sex, BTreeSet::from([PersonId::new(1), PersonId::new(4)]));
        assert_eq!(clashes.opposite_sex, BTreeSet::from([PersonId::new(2), PersonId::new(3)]));
        assert!(!clashes.contains(witness.id));
        assert_eq!(clashes.red_herrings().len(), 4);
    }

    #[test]
    fn test_clashes_given_only() {
        let (pop, indices) = town();
        let witness = pop.get(PersonId::new(0)).unwrap();
        let clashes = name_clashes(&indices, witness, ClashRule::GivenOnly);
        assert_eq!(clashes.same_sex, BTreeSet::from([PersonId::new(1)]));
        assert_eq!(clashes.opposite_sex, BTreeSet::from([PersonId::new(2)]));
    }

    #[test]
    fn test_bounds_are_strict() {
        let bounds = WitnessBounds::default();
        let ids = |range: std::ops::Range<u32>| range.map(PersonId::new).collect::<BTreeSet<_>>();
        let ok = NameClashes {
            same_sex: ids(0..2),
            opposite_sex: ids(10..15),
        };
        assert!(ok.within(&bounds));
        let too_many_same = NameClashes {
            same_sex: ids(0..3),
            ..ok.clone()
        };
        assert!(!too_many_same.within(&bounds));
        let too_many_opposite = NameClashes {
            opposite_sex: ids(10..16),
            ..ok.clone()
        };
        assert!(!too_many_opposite.within(&bounds));
        let none_opposite = NameClashes {
            opposite_sex: BTreeSet::new(),
            ..ok
        };
        assert!(!none_opposite.within(&bounds));
    }

    #[test]
    fn test_select_skips_culprit() {
        let (pop, indices) = town();
        let config = MysteryConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        // Under GivenOnly only the two female Morgans qualify (1 same, 1 opposite).
        let config = MysteryConfig {
            witness: WitnessBounds {
                clash_rule: ClashRule::GivenOnly,
                ..config.witness
            },
            ..config
        };
        let selection = select_witness(&pop, &indices, PersonId::new(5), &config, &mut rng).unwrap();
        assert!([PersonId::new(0), PersonId::new(1)].contains(&selection.witness));
        assert_eq!(selection.red_herrings.len(), 2);
        assert!(!selection.red_herrings.contains(&selection.witness));

        // With Morgan #1 as culprit, #0 would list the culprit as a red herring,
        // and #2 has no same-sex clash left: nobody qualifies.
        let err = select_witness(&pop, &indices, PersonId::new(1), &config, &mut rng).unwrap_err();
        assert!(matches!(err, GenerationError::AllocationExhausted { stage: Stage::Witness, .. }));
    }
}
