//! Per-individual attribute draws.
//!
//! Height and weight come from sex-conditioned Normal distributions and are
//! rounded to whole inches/pounds. Height is also classified into a coarse
//! [`HeightBucket`], which is what the culprit predicates compare. Weight and
//! age are flavor only.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::RangeInclusive;

use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::config::{HeightThresholds, MysteryConfig, NormalParams, SexConditioned};
use crate::error::GenerationError;
use crate::seeds::CategoricalPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Sex {
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "M")]
    Male,
}

impl Sex {
    /// Parse the one-letter code used by seed sources.
    pub fn from_code(code: &str) -> Result<Self, GenerationError> {
        match code.trim() {
            "F" => Ok(Sex::Female),
            "M" => Ok(Sex::Male),
            other => Err(GenerationError::invalid("sex", other)),
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Sex::Female => "F",
            Sex::Male => "M",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Sex::Female => Sex::Male,
            Sex::Male => Sex::Female,
        }
    }
}

impl TryFrom<String> for Sex {
    type Error = GenerationError;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        Sex::from_code(&code)
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sex::Female => "female",
            Sex::Male => "male",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeightBucket {
    #[serde(rename = "short")]
    Short,
    #[serde(rename = "medium-height")]
    Medium,
    #[serde(rename = "tall")]
    Tall,
}

impl HeightBucket {
    pub fn adjective(self) -> &'static str {
        match self {
            HeightBucket::Short => "short",
            HeightBucket::Medium => "medium-height",
            HeightBucket::Tall => "tall",
        }
    }
}

impl fmt::Display for HeightBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.adjective())
    }
}

/// Height in whole inches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Height(u16);

impl Height {
    pub const fn from_inches(inches: u16) -> Self {
        Self(inches)
    }

    pub fn total_inches(self) -> u16 {
        self.0
    }

    pub fn feet(self) -> u16 {
        self.0 / 12
    }

    /// Inches past the last whole foot.
    pub fn inches(self) -> u16 {
        self.0 % 12
    }

    pub fn bucket(self, thresholds: &HeightThresholds) -> HeightBucket {
        if self.feet() >= thresholds.tall_feet {
            HeightBucket::Tall
        } else if self.feet() < thresholds.short_feet || self.inches() < thresholds.short_inches {
            HeightBucket::Short
        } else {
            HeightBucket::Medium
        }
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'{}\"", self.feet(), self.inches())
    }
}

/// The organizations one person belongs to. Compared as a set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Memberships(BTreeSet<String>);

impl Memberships {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, org: &str) -> bool {
        self.0.contains(org)
    }

    /// Sorted iteration.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// First (in sorted order) organization in `self` that `other` lacks.
    pub fn first_missing_from(&self, other: &Memberships) -> Option<&str> {
        self.0
            .iter()
            .find(|org| !other.0.contains(*org))
            .map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Memberships {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Draw exactly `k` distinct organizations, uniformly without replacement.
pub fn sample_memberships(
    organizations: &CategoricalPool,
    k: usize,
    rng: &mut impl Rng,
) -> Result<Memberships, GenerationError> {
    if k > organizations.len() {
        return Err(GenerationError::infeasible(format!(
            "{k} memberships requested from only {} organizations",
            organizations.len()
        )));
    }
    let memberships: Memberships = organizations
        .items()
        .choose_multiple(rng, k)
        .cloned()
        .collect();
    if memberships.len() != k {
        // choose_multiple picks distinct positions; equal text means a duplicated seed line.
        return Err(GenerationError::invalid(
            organizations.name(),
            "duplicate organization names",
        ));
    }
    Ok(memberships)
}

#[derive(Debug, Clone)]
struct SexNormals {
    female: Normal<f64>,
    male: Normal<f64>,
}

impl SexNormals {
    fn new(label: &str, params: &SexConditioned) -> Result<Self, GenerationError> {
        let build = |sex: &str, p: NormalParams| {
            Normal::new(p.mean, p.std_dev)
                .map_err(|e| GenerationError::invalid(format!("{sex} {label} distribution"), e.to_string()))
        };
        Ok(Self {
            female: build("female", params.female)?,
            male: build("male", params.male)?,
        })
    }

    fn get(&self, sex: Sex) -> &Normal<f64> {
        match sex {
            Sex::Female => &self.female,
            Sex::Male => &self.male,
        }
    }
}

/// Continuous and flavor attribute draws, built once per run from the config.
#[derive(Debug, Clone)]
pub struct AttributeSampler {
    height: SexNormals,
    weight: SexNormals,
    thresholds: HeightThresholds,
    age: RangeInclusive<u8>,
}

impl AttributeSampler {
    pub fn new(config: &MysteryConfig) -> Result<Self, GenerationError> {
        Ok(Self {
            height: SexNormals::new("height", &config.height)?,
            weight: SexNormals::new("weight", &config.weight)?,
            thresholds: config.height_thresholds,
            age: config.age_min..=config.age_max,
        })
    }

    pub fn height(&self, sex: Sex, rng: &mut impl Rng) -> Height {
        Height::from_inches(round_positive(self.height.get(sex).sample(rng)))
    }

    /// Pounds.
    pub fn weight(&self, sex: Sex, rng: &mut impl Rng) -> u16 {
        round_positive(self.weight.get(sex).sample(rng))
    }

    pub fn age(&self, rng: &mut impl Rng) -> u8 {
        rng.gen_range(self.age.clone())
    }

    pub fn bucket(&self, height: Height) -> HeightBucket {
        height.bucket(&self.thresholds)
    }
}

/// Nearest integer, floored at 1; the far left tail of a wide Normal goes negative.
fn round_positive(value: f64) -> u16 {
    value.round().max(1.0) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn orgs(n: usize) -> CategoricalPool {
        CategoricalPool::new("member_orgs", (0..n).map(|i| format!("Org {i}")).collect()).unwrap()
    }

    #[test]
    fn test_bucket_boundaries() {
        let t = HeightThresholds::default();
        assert_eq!(Height::from_inches(72).bucket(&t), HeightBucket::Tall); // 6'0"
        assert_eq!(Height::from_inches(71).bucket(&t), HeightBucket::Medium); // 5'11"
        assert_eq!(Height::from_inches(64).bucket(&t), HeightBucket::Medium); // 5'4"
        assert_eq!(Height::from_inches(63).bucket(&t), HeightBucket::Short); // 5'3"
        assert_eq!(Height::from_inches(59).bucket(&t), HeightBucket::Short); // 4'11"
    }

    #[test]
    fn test_bucket_uses_configured_cutoff() {
        let t = HeightThresholds {
            short_inches: 6,
            ..HeightThresholds::default()
        };
        assert_eq!(Height::from_inches(65).bucket(&t), HeightBucket::Short);
        assert_eq!(Height::from_inches(66).bucket(&t), HeightBucket::Medium);
    }

    #[test]
    fn test_height_display() {
        assert_eq!(Height::from_inches(64).to_string(), "5'4\"");
        assert_eq!(Height::from_inches(72).to_string(), "6'0\"");
    }

    #[test]
    fn test_sex_codes() {
        assert_eq!(Sex::from_code("M").unwrap(), Sex::Male);
        assert_eq!(Sex::from_code("F").unwrap(), Sex::Female);
        assert!(matches!(
            Sex::from_code("X"),
            Err(GenerationError::InvalidAttribute { .. })
        ));
        assert_eq!(Sex::Female.opposite(), Sex::Male);
        assert_eq!(serde_json::to_string(&Sex::Male).unwrap(), "\"M\"");
        assert_eq!(serde_json::from_str::<Sex>("\"F\"").unwrap(), Sex::Female);
        assert!(serde_json::from_str::<Sex>("\"female\"").is_err());
    }

    #[test]
    fn test_first_missing_from_is_sorted_and_self_borrowed() {
        let culprit: Memberships = ["Rotary", "AAA", "Lions"].into_iter().collect();
        let missing = {
            let suspect: Memberships = ["AAA", "Elks", "Chess Club"].into_iter().collect();
            culprit.first_missing_from(&suspect)
        };
        assert_eq!(missing, Some("Lions"));

        let same: Memberships = ["Lions", "Rotary", "AAA"].into_iter().collect();
        assert_eq!(culprit.first_missing_from(&same), None);
    }

    #[test]
    fn test_memberships_are_k_distinct() {
        let pool = orgs(6);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..200 {
            let m = sample_memberships(&pool, 3, &mut rng).unwrap();
            assert_eq!(m.len(), 3);
            assert!(m.iter().all(|org| pool.items().iter().any(|i| i == org)));
        }
    }

    #[test]
    fn test_memberships_cannot_exceed_pool() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(matches!(
            sample_memberships(&orgs(2), 3, &mut rng),
            Err(GenerationError::ConfigurationInfeasible { .. })
        ));
    }

    #[test]
    fn test_duplicate_org_lines_detected() {
        let pool = CategoricalPool::new(
            "member_orgs",
            vec!["Elks".into(), "Elks".into()],
        )
        .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(sample_memberships(&pool, 2, &mut rng).is_err());
    }

    #[test]
    fn test_membership_set_equality_ignores_order() {
        let a: Memberships = ["Elks", "Rotary", "AAA"].into_iter().collect();
        let b: Memberships = ["AAA", "Elks", "Rotary"].into_iter().collect();
        let c: Memberships = ["AAA", "Elks", "Lions"].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.first_missing_from(&c), Some("Rotary"));
        assert_eq!(a.first_missing_from(&b), None);
    }

    #[test]
    fn test_sex_conditioned_means() {
        let sampler = AttributeSampler::new(&MysteryConfig::default()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let n = 5000;
        let mut mean = |sex| {
            (0..n)
                .map(|_| sampler.height(sex, &mut rng).total_inches() as f64)
                .sum::<f64>()
                / n as f64
        };
        let female = mean(Sex::Female);
        let male = mean(Sex::Male);
        assert!((female - 62.0).abs() < 0.5, "female={female}");
        assert!((male - 66.0).abs() < 0.5, "male={male}");
    }

    #[test]
    fn test_weight_and_age_in_range() {
        let sampler = AttributeSampler::new(&MysteryConfig::default()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..1000 {
            assert!(sampler.weight(Sex::Female, &mut rng) >= 1);
            let age = sampler.age(&mut rng);
            assert!((18..=80).contains(&age));
        }
    }
}
