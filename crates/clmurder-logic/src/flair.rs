//! Witness appearance and red-herring disambiguation.
//!
//! None of this feeds a selection predicate. It gives the witness a
//! hair color, hair style and accent for the coffee-shop clue, and gives
//! every red herring something that rules them out: a sex mismatch, or a
//! hair color and accent that differ from the witness's.

use std::collections::{BTreeMap, BTreeSet};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::population::{Individual, PersonId, Population};
use crate::seeds::FlairPools;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessFlair {
    pub hair_color: String,
    pub hair_style: String,
    pub nationality: String,
}

/// How a red herring is told apart from the real witness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Disambiguation {
    /// Not the witness's sex.
    SexMismatch,
    /// Same sex, but looks and sounds different.
    Appearance {
        hair_color: String,
        nationality: String,
    },
    /// Same sex and no flair available to separate them.
    Unmarked,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Flair {
    pub witness: Option<WitnessFlair>,
    pub red_herrings: BTreeMap<PersonId, Disambiguation>,
}

/// Every item of `items` except `taken`.
fn others<'a>(items: &'a [String], taken: &str) -> Vec<&'a str> {
    items
        .iter()
        .map(String::as_str)
        .filter(|item| *item != taken)
        .collect()
}

pub fn assign_flair(
    pools: Option<&FlairPools>,
    population: &Population,
    witness: &Individual,
    red_herrings: &BTreeSet<PersonId>,
    rng: &mut impl Rng,
) -> Result<Flair, GenerationError> {
    let witness_flair = pools.map(|pools| WitnessFlair {
        hair_color: pools.hair_colors.choose(rng).to_string(),
        hair_style: pools.hair_styles.choose(rng).to_string(),
        nationality: pools.nationalities.choose(rng).to_string(),
    });

    let (other_hair, other_nationalities) = match (pools, &witness_flair) {
        (Some(pools), Some(flair)) => (
            others(pools.hair_colors.items(), &flair.hair_color),
            others(pools.nationalities.items(), &flair.nationality),
        ),
        _ => (Vec::new(), Vec::new()),
    };

    let mut marks = BTreeMap::new();
    for &id in red_herrings {
        let herring = population
            .get(id)
            .ok_or_else(|| GenerationError::invalid("red herring id", id.to_string()))?;
        let mark = if herring.sex != witness.sex {
            Disambiguation::SexMismatch
        } else {
            match (other_hair.choose(rng), other_nationalities.choose(rng)) {
                (Some(hair), Some(nationality)) => Disambiguation::Appearance {
                    hair_color: hair.to_string(),
                    nationality: nationality.to_string(),
                },
                _ => Disambiguation::Unmarked,
            }
        };
        marks.insert(id, mark);
    }

    Ok(Flair {
        witness: witness_flair,
        red_herrings: marks,
    })
}
