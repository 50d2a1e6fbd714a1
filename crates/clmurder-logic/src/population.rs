//! Population sizing, the feasibility guard, and synthesis of people plus
//! their lookup indices.
//!
//! The target size is
//!
//! ```text
//! SAFETY_FACTOR × sexes × height buckets × odd digits × |colors| × |makes|
//! ```
//!
//! which leaves every (sex, height bucket, color, make, last digit) cell a
//! few occupants on average, enough for the culprit's tag-pool to be small
//! but non-empty. Before anyone is generated, the size is checked against
//! the number of possible membership sets: fewer than two people per
//! (sex, bucket, membership set) cell and the membership clue stops working.
//!
//! Individuals are completed in stages and only whole ones reach a
//! [`Population`]:
//!
//! ```text
//! Profile ──enroll(Memberships)──▶ Enrolled ──register(Vehicle)──▶ Individual
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Index;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::MysteryConfig;
use crate::error::GenerationError;
use crate::sampler::{sample_memberships, AttributeSampler, Height, HeightBucket, Memberships, Sex};
use crate::seeds::{SeedData, WeightedPool};
use crate::tags::{TagAllocator, Vehicle};

pub const NUM_SEXES: usize = 2;
pub const NUM_HEIGHT_BUCKETS: usize = 3;
/// Possible values of a plate's last digit once a witness reports it as odd or even.
pub const NUM_ODD_DIGITS: usize = 5;

/// Minimum people per (sex, bucket, membership set) cell.
const MIN_PEOPLE_PER_MEMBERSHIP_CELL: f64 = 2.0;

/// Stable identity assigned at creation time, in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(u32);

impl PersonId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Base attributes, fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: PersonId,
    pub first_name: String,
    pub last_name: String,
    pub sex: Sex,
    pub street: String,
    pub age: u8,
    pub height: Height,
    pub height_bucket: HeightBucket,
    /// Pounds.
    pub weight: u16,
}

impl Profile {
    pub fn enroll(self, memberships: Memberships) -> Enrolled {
        Enrolled {
            profile: self,
            memberships,
        }
    }
}

/// A profile with memberships, still waiting for a vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrolled {
    profile: Profile,
    memberships: Memberships,
}

impl Enrolled {
    pub fn register(self, vehicle: Vehicle) -> Individual {
        let Profile {
            id,
            first_name,
            last_name,
            sex,
            street,
            age,
            height,
            height_bucket,
            weight,
        } = self.profile;
        Individual {
            id,
            first_name,
            last_name,
            sex,
            street,
            age,
            height,
            height_bucket,
            weight,
            memberships: self.memberships,
            vehicle,
        }
    }
}

/// A fully built person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Individual {
    pub id: PersonId,
    pub first_name: String,
    pub last_name: String,
    pub sex: Sex,
    pub street: String,
    pub age: u8,
    pub height: Height,
    pub height_bucket: HeightBucket,
    pub weight: u16,
    pub memberships: Memberships,
    pub vehicle: Vehicle,
}

impl Individual {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// All individuals of one run, in listing order. Never grows or shrinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Population {
    people: Vec<Individual>,
    #[serde(skip)]
    slots: Vec<usize>,
}

impl Population {
    /// Ids must be exactly `0..people.len()`, in any order.
    pub fn new(people: Vec<Individual>) -> Result<Self, GenerationError> {
        let mut slots = vec![usize::MAX; people.len()];
        for (slot, person) in people.iter().enumerate() {
            match slots.get_mut(person.id.index()) {
                Some(entry) if *entry == usize::MAX => *entry = slot,
                _ => return Err(GenerationError::invalid("person id", person.id.to_string())),
            }
        }
        Ok(Self { people, slots })
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.people.iter()
    }

    pub fn as_slice(&self) -> &[Individual] {
        &self.people
    }

    pub fn get(&self, id: PersonId) -> Option<&Individual> {
        self.slots.get(id.index()).map(|&slot| &self.people[slot])
    }

    pub fn count_sex(&self, sex: Sex) -> usize {
        self.people.iter().filter(|p| p.sex == sex).count()
    }

    pub(crate) fn random_member(&self, rng: &mut impl Rng) -> Option<&Individual> {
        self.people.choose(rng)
    }
}

impl Index<PersonId> for Population {
    type Output = Individual;

    /// Panics if `id` was not issued for this population.
    fn index(&self, id: PersonId) -> &Individual {
        &self.people[self.slots[id.index()]]
    }
}

/// Ids split by sex.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SexPartition {
    pub female: BTreeSet<PersonId>,
    pub male: BTreeSet<PersonId>,
}

impl SexPartition {
    pub fn of(&self, sex: Sex) -> &BTreeSet<PersonId> {
        match sex {
            Sex::Female => &self.female,
            Sex::Male => &self.male,
        }
    }

    fn insert(&mut self, sex: Sex, id: PersonId) {
        match sex {
            Sex::Female => self.female.insert(id),
            Sex::Male => self.male.insert(id),
        };
    }
}

/// Derived lookup views over a population.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Indices {
    pub first_names: BTreeMap<String, SexPartition>,
    pub last_names: BTreeMap<String, SexPartition>,
    pub organizations: BTreeMap<String, BTreeSet<PersonId>>,
    pub streets: BTreeMap<String, BTreeSet<PersonId>>,
}

impl Indices {
    /// Recompute every index from scratch.
    pub fn rebuild(population: &Population) -> Self {
        let mut indices = Self::default();
        for person in population.iter() {
            indices.record_names(person.id, person.sex, &person.first_name, &person.last_name, &person.street);
            indices.record_memberships(person.id, &person.memberships);
        }
        indices
    }

    pub fn record_profile(&mut self, profile: &Profile) {
        self.record_names(
            profile.id,
            profile.sex,
            &profile.first_name,
            &profile.last_name,
            &profile.street,
        );
    }

    pub fn record_memberships(&mut self, id: PersonId, memberships: &Memberships) {
        for org in memberships.iter() {
            self.organizations.entry(org.to_string()).or_default().insert(id);
        }
    }

    fn record_names(&mut self, id: PersonId, sex: Sex, first: &str, last: &str, street: &str) {
        self.first_names.entry(first.to_string()).or_default().insert(sex, id);
        self.last_names.entry(last.to_string()).or_default().insert(sex, id);
        self.streets.entry(street.to_string()).or_default().insert(id);
    }
}

/// Target population size for the given pool sizes.
pub fn population_size(config: &MysteryConfig, colors: usize, makes: usize) -> usize {
    [
        config.safety_factor as usize,
        NUM_SEXES,
        NUM_HEIGHT_BUCKETS,
        NUM_ODD_DIGITS,
        colors,
        makes,
    ]
    .into_iter()
    .fold(1usize, usize::saturating_mul)
}

/// `n choose k`, saturating at `u64::MAX`.
pub fn binomial(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        // Exact at every step: acc holds C(n, i) and C(n, i) * (n - i) is divisible by i + 1.
        acc = acc * u128::from(n - i) / u128::from(i + 1);
        if acc > u128::from(u64::MAX) {
            return u64::MAX;
        }
    }
    acc as u64
}

/// Fail fast when the seed data is too small for the sizing formula.
pub fn check_feasibility(
    size: usize,
    organizations: usize,
    memberships: usize,
) -> Result<(), GenerationError> {
    if memberships > organizations {
        return Err(GenerationError::infeasible(format!(
            "{memberships} memberships per person but only {organizations} organizations"
        )));
    }
    if u32::try_from(size).is_err() {
        return Err(GenerationError::infeasible(format!(
            "population of {size} is too large"
        )));
    }
    let sets = binomial(organizations as u64, memberships as u64);
    let cells = (NUM_SEXES * NUM_HEIGHT_BUCKETS) as f64 * sets as f64;
    let per_cell = size as f64 / cells;
    if per_cell < MIN_PEOPLE_PER_MEMBERSHIP_CELL {
        return Err(GenerationError::infeasible(format!(
            "population of {size} leaves {per_cell:.2} people per membership cell \
             ({sets} membership sets); raise the safety factor or trim the organization list"
        )));
    }
    Ok(())
}

/// `(female, male)` counts; the female count is floored.
pub fn sex_split(size: usize, female_share: f64) -> (usize, usize) {
    let female = ((size as f64 * female_share).floor() as usize).min(size);
    (female, size - female)
}

fn draw_profile(
    id: PersonId,
    sex: Sex,
    first_names: &WeightedPool,
    seeds: &SeedData,
    sampler: &AttributeSampler,
    rng: &mut impl Rng,
) -> Profile {
    let first_name = first_names.choose(rng).to_string();
    let last_name = seeds.last_names.choose(rng).to_string();
    let street = seeds.streets.choose(rng).to_string();
    let age = sampler.age(rng);
    let height = sampler.height(sex, rng);
    let weight = sampler.weight(sex, rng);
    Profile {
        id,
        first_name,
        last_name,
        sex,
        street,
        age,
        height,
        height_bucket: sampler.bucket(height),
        weight,
    }
}

/// Build the whole population: base profiles, then memberships, then vehicles.
/// Indices are filled in as each stage produces its data.
pub fn synthesize_population(
    seeds: &SeedData,
    config: &MysteryConfig,
    rng: &mut impl Rng,
) -> Result<(Population, Indices), GenerationError> {
    let size = population_size(config, seeds.colors.len(), seeds.makes.len());
    check_feasibility(size, seeds.organizations.len(), config.required_memberships)?;
    let sampler = AttributeSampler::new(config)?;

    let (females, males) = sex_split(size, config.female_share);
    log::info!("Synthesizing {size} people ({females} female, {males} male)");

    let mut indices = Indices::default();
    let mut profiles = Vec::with_capacity(size);
    for (sex, count, names) in [
        (Sex::Male, males, &seeds.male_names),
        (Sex::Female, females, &seeds.female_names),
    ] {
        for _ in 0..count {
            let id = PersonId::new(profiles.len() as u32);
            let profile = draw_profile(id, sex, names, seeds, &sampler, rng);
            indices.record_profile(&profile);
            profiles.push(profile);
        }
    }

    if config.shuffle_population {
        profiles.shuffle(rng);
    }

    let mut enrolled = Vec::with_capacity(size);
    for profile in profiles {
        let memberships = sample_memberships(&seeds.organizations, config.required_memberships, rng)?;
        indices.record_memberships(profile.id, &memberships);
        enrolled.push(profile.enroll(memberships));
    }

    let mut allocator = TagAllocator::new(config.retry.tag_attempts);
    let mut people = Vec::with_capacity(size);
    for person in enrolled {
        let vehicle = allocator.issue_vehicle(&seeds.colors, &seeds.makes, rng)?;
        people.push(person.register(vehicle));
    }
    log::debug!("Issued {} plates", allocator.issued());

    Ok((Population::new(people)?, indices))
}
