//! Collision-free licence plate allocation.
//!
//! A plate is a 4-letter prefix followed by a 3-digit suffix. The prefix is a
//! pure function of the car's color and make positions in their seed lists:
//! two letters from the color index against `A..Z`, two from the make index
//! against `Z..A`, each index mapped through `(i + 1) % 26` and `(i * 2) % 26`.
//! Only the suffix is random, so a witness who saw the first three letters
//! and the last digit has seen color, make, and a tenth of the suffix space.

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Stage};
use crate::seeds::CategoricalPool;

const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Distinct plates available per prefix.
pub const SUFFIX_SPACE: u16 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vehicle {
    pub make: String,
    pub color: String,
    pub tag: String,
}

impl Vehicle {
    /// The part of the plate a witness reports: first three characters, last digit.
    pub fn partial_tag(&self) -> (&str, Option<char>) {
        let stem = self.tag.get(..3).unwrap_or(&self.tag);
        (stem, self.tag.chars().last())
    }

    pub fn partial_tag_matches(&self, other: &Vehicle) -> bool {
        self.partial_tag() == other.partial_tag()
    }
}

fn color_letter(index: usize) -> char {
    ALPHABET[index % 26] as char
}

fn make_letter(index: usize) -> char {
    ALPHABET[25 - index % 26] as char
}

/// Deterministic 4-letter prefix for a color/make pair.
pub fn tag_prefix(color_index: usize, make_index: usize) -> String {
    [
        color_letter(color_index.wrapping_add(1)),
        color_letter(color_index.wrapping_mul(2)),
        make_letter(make_index.wrapping_add(1)),
        make_letter(make_index.wrapping_mul(2)),
    ]
    .iter()
    .collect()
}

/// Hands out plates and remembers every one issued during a run.
#[derive(Debug, Clone)]
pub struct TagAllocator {
    history: HashSet<String>,
    max_attempts: u32,
}

impl TagAllocator {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            history: HashSet::new(),
            max_attempts,
        }
    }

    pub fn issued(&self) -> usize {
        self.history.len()
    }

    /// Draw suffixes for the fixed prefix until one is unused.
    pub fn allocate(
        &mut self,
        color_index: usize,
        make_index: usize,
        rng: &mut impl Rng,
    ) -> Result<String, GenerationError> {
        let prefix = tag_prefix(color_index, make_index);
        for _ in 0..self.max_attempts {
            let tag = format!("{prefix}{:03}", rng.gen_range(0..SUFFIX_SPACE));
            if !self.history.contains(&tag) {
                self.history.insert(tag.clone());
                return Ok(tag);
            }
        }
        Err(GenerationError::AllocationExhausted {
            stage: Stage::TagSuffix,
            attempts: self.max_attempts,
        })
    }

    /// Pick a color and make uniformly and register a plate for them.
    pub fn issue_vehicle(
        &mut self,
        colors: &CategoricalPool,
        makes: &CategoricalPool,
        rng: &mut impl Rng,
    ) -> Result<Vehicle, GenerationError> {
        let color_index = colors.sample_index(rng);
        let make_index = makes.sample_index(rng);
        let tag = self.allocate(color_index, make_index, rng)?;
        Ok(Vehicle {
            make: makes.items()[make_index].clone(),
            color: colors.items()[color_index].clone(),
            tag,
        })
    }
}
