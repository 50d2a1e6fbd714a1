//! End-to-end mystery generation.
//!
//! ```text
//! validate_config → synthesize_population → select_culprit → select_witness → assign_flair
//! ```
//!
//! [`generate_mystery`] runs the pipeline once against a caller-supplied RNG.
//! [`generate_with_reseed`] owns the RNG: it seeds a `ChaCha8Rng` and, when a
//! bounded loop gives up, starts over with the next seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::{validate_config, MysteryConfig};
use crate::culprit::{missing_membership, select_culprit, CulpritSelection};
use crate::error::{GenerationError, Stage};
use crate::flair::{assign_flair, Disambiguation, Flair, WitnessFlair};
use crate::population::{synthesize_population, Indices, Individual, PersonId, Population};
use crate::sampler::{HeightBucket, Sex};
use crate::seeds::SeedData;
use crate::tags::Vehicle;
use crate::witness::{select_witness, WitnessSelection};

/// A finished, solvable instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mystery {
    pub population: Population,
    pub indices: Indices,
    pub culprit: CulpritSelection,
    pub witness: WitnessSelection,
    pub flair: Flair,
}

impl Mystery {
    pub fn culprit(&self) -> &Individual {
        &self.population[self.culprit.culprit]
    }

    pub fn witness(&self) -> &Individual {
        &self.population[self.witness.witness]
    }

    pub fn report(&self, seed: u64) -> MysteryReport {
        let culprit = self.culprit();
        let summarize = |id: &PersonId| PersonSummary::from(&self.population[*id]);

        MysteryReport {
            seed,
            population: self.population.len(),
            females: self.population.count_sex(Sex::Female),
            males: self.population.count_sex(Sex::Male),
            culprit: PersonSummary::from(culprit),
            witness: PersonSummary::from(self.witness()),
            witness_flair: self.flair.witness.clone(),
            tag_pool: self
                .culprit
                .pools
                .tag_pool
                .iter()
                .map(|id| TagSuspect {
                    missing_membership: missing_membership(culprit, &self.population[*id])
                        .map(str::to_string),
                    person: summarize(id),
                })
                .collect(),
            membership_pool: self.culprit.pools.membership_pool.iter().map(summarize).collect(),
            red_herrings: self
                .witness
                .red_herrings
                .iter()
                .map(|id| RedHerring {
                    person: summarize(id),
                    disambiguation: self
                        .flair
                        .red_herrings
                        .get(id)
                        .cloned()
                        .unwrap_or(Disambiguation::Unmarked),
                })
                .collect(),
        }
    }
}

/// Run the pipeline once.
pub fn generate_mystery(
    seeds: &SeedData,
    config: &MysteryConfig,
    rng: &mut impl Rng,
) -> Result<Mystery, GenerationError> {
    ensure_valid(config)?;

    let (population, indices) = synthesize_population(seeds, config, rng)?;
    let culprit = select_culprit(&population, config, rng)?;
    let witness = select_witness(&population, &indices, culprit.culprit, config, rng)?;

    let flair_pools = if config.flair { seeds.flair.as_ref() } else { None };
    let flair = assign_flair(
        flair_pools,
        &population,
        &population[witness.witness],
        &witness.red_herrings,
        rng,
    )?;

    Ok(Mystery {
        population,
        indices,
        culprit,
        witness,
        flair,
    })
}

/// Run the pipeline from `base_seed`, moving to the next seed whenever a
/// bounded loop is exhausted. Returns the seed that produced the mystery.
pub fn generate_with_reseed(
    seeds: &SeedData,
    config: &MysteryConfig,
    base_seed: u64,
) -> Result<(u64, Mystery), GenerationError> {
    ensure_valid(config)?;

    let mut last_error = GenerationError::AllocationExhausted {
        stage: Stage::Culprit,
        attempts: 0,
    };
    for attempt in 0..config.retry.reseeds {
        let seed = base_seed.wrapping_add(u64::from(attempt));
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        match generate_mystery(seeds, config, &mut rng) {
            Ok(mystery) => return Ok((seed, mystery)),
            Err(e) if e.is_retryable() => {
                log::warn!("Seed {seed} failed ({e}); reseeding");
                last_error = e;
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_error)
}

fn ensure_valid(config: &MysteryConfig) -> Result<(), GenerationError> {
    let errors = validate_config(config);
    if errors.is_empty() {
        return Ok(());
    }
    let reason = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    Err(GenerationError::infeasible(reason))
}

// ── Report ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSummary {
    pub id: PersonId,
    pub name: String,
    pub sex: Sex,
    pub age: u8,
    pub height: String,
    pub height_bucket: HeightBucket,
    pub weight: u16,
    pub street: String,
    pub memberships: Vec<String>,
    pub vehicle: Vehicle,
}

impl From<&Individual> for PersonSummary {
    fn from(person: &Individual) -> Self {
        Self {
            id: person.id,
            name: person.full_name(),
            sex: person.sex,
            age: person.age,
            height: person.height.to_string(),
            height_bucket: person.height_bucket,
            weight: person.weight,
            street: person.street.clone(),
            memberships: person.memberships.iter().map(str::to_string).collect(),
            vehicle: person.vehicle.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSuspect {
    #[serde(flatten)]
    pub person: PersonSummary,
    /// The culprit's organization this suspect is not a member of.
    pub missing_membership: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedHerring {
    #[serde(flatten)]
    pub person: PersonSummary,
    pub disambiguation: Disambiguation,
}

/// The solution sheet: who did it, who saw it, and who merely looks the part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MysteryReport {
    pub seed: u64,
    pub population: usize,
    pub females: usize,
    pub males: usize,
    pub culprit: PersonSummary,
    pub witness: PersonSummary,
    pub witness_flair: Option<WitnessFlair>,
    pub tag_pool: Vec<TagSuspect>,
    pub membership_pool: Vec<PersonSummary>,
    pub red_herrings: Vec<RedHerring>,
}
