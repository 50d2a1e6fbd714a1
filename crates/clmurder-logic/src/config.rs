//! Generation tunables and their validation.
//!
//! [`MysteryConfig`] gathers every knob the pipeline reads: population
//! sizing, the sex-conditioned height/weight models, the height bucket
//! cutoffs, the suspect-pool and witness-clash acceptance bounds, and the
//! retry ceilings on each rejection loop. Every field has a default, and the
//! struct deserializes with `#[serde(default)]`, so a config file only needs
//! to name what it overrides.
//!
//! ```
//! use clmurder_logic::config::{validate_config, MysteryConfig};
//!
//! let config: MysteryConfig = serde_json::from_str(r#"{ "safety_factor": 4 }"#).unwrap();
//! assert_eq!(config.safety_factor, 4);
//! assert_eq!(config.required_memberships, 3);
//! assert!(validate_config(&config).is_empty());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean and standard deviation of a Normal distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalParams {
    pub mean: f64,
    pub std_dev: f64,
}

impl NormalParams {
    pub const fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }
}

/// One distribution per sex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SexConditioned {
    pub female: NormalParams,
    pub male: NormalParams,
}

/// Feet/inches cutoffs for the short / medium-height / tall buckets.
///
/// `feet >= tall_feet` is tall; `feet < short_feet` or
/// `inches < short_inches` (past the foot mark) is short; anything else is
/// medium-height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightThresholds {
    pub tall_feet: u16,
    pub short_feet: u16,
    pub short_inches: u16,
}

impl Default for HeightThresholds {
    fn default() -> Self {
        Self {
            tall_feet: 6,
            short_feet: 5,
            short_inches: 4,
        }
    }
}

/// Which name index entries count as a clash with the witness's first name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClashRule {
    /// Anyone whose first *or* last name equals the witness's first name.
    /// A player searching the people listing for the latte name sees both.
    #[default]
    GivenOrFamily,
    /// Only people whose first name equals the witness's first name.
    GivenOnly,
}

/// Acceptance bounds for culprit suspect pools (sizes exclude the culprit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolBounds {
    /// Inclusive range for the tag-pool.
    pub tag_pool_min: usize,
    pub tag_pool_max: usize,
    /// Inclusive minimum for the membership-pool.
    pub membership_pool_min: usize,
}

impl Default for PoolBounds {
    fn default() -> Self {
        Self {
            tag_pool_min: 1,
            tag_pool_max: 4,
            membership_pool_min: 1,
        }
    }
}

/// Exclusive upper bounds on the witness's name-clash counts.
/// Both counts must also be strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessBounds {
    pub same_sex_bound: usize,
    pub opposite_sex_bound: usize,
    pub clash_rule: ClashRule,
}

impl Default for WitnessBounds {
    fn default() -> Self {
        Self {
            same_sex_bound: 3,
            opposite_sex_bound: 6,
            clash_rule: ClashRule::GivenOrFamily,
        }
    }
}

/// Ceilings on every loop that can otherwise spin forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryLimits {
    /// Suffix redraws per plate.
    pub tag_attempts: u32,
    pub culprit_attempts: u32,
    pub witness_attempts: u32,
    /// Whole-pipeline reruns with a fresh seed after an exhausted loop.
    pub reseeds: u32,
}

impl Default for RetryLimits {
    fn default() -> Self {
        Self {
            tag_attempts: 10_000,
            culprit_attempts: 10_000,
            witness_attempts: 10_000,
            reseeds: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MysteryConfig {
    /// Scales the population size formula.
    pub safety_factor: u32,
    /// Organizations every individual belongs to (`K`).
    pub required_memberships: usize,
    /// Share of the population that is female; the female count is floored.
    pub female_share: f64,
    /// Height in inches.
    pub height: SexConditioned,
    /// Weight in pounds.
    pub weight: SexConditioned,
    pub height_thresholds: HeightThresholds,
    pub age_min: u8,
    pub age_max: u8,
    pub pools: PoolBounds,
    pub witness: WitnessBounds,
    pub retry: RetryLimits,
    /// Shuffle the population after the base pass so listings interleave sexes.
    pub shuffle_population: bool,
    /// Give the witness hair/nationality details and red herrings distinguishing ones.
    pub flair: bool,
}

impl Default for MysteryConfig {
    fn default() -> Self {
        Self {
            safety_factor: 3,
            required_memberships: 3,
            female_share: 0.51,
            height: SexConditioned {
                female: NormalParams::new(62.0, 6.7),
                male: NormalParams::new(66.0, 8.6),
            },
            weight: SexConditioned {
                female: NormalParams::new(144.0, 57.0),
                male: NormalParams::new(163.0, 66.0),
            },
            height_thresholds: HeightThresholds::default(),
            age_min: 18,
            age_max: 80,
            pools: PoolBounds::default(),
            witness: WitnessBounds::default(),
            retry: RetryLimits::default(),
            shuffle_population: true,
            flair: true,
        }
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("safety factor must be at least 1")]
    ZeroSafetyFactor,
    #[error("at least one membership per individual is required")]
    ZeroMemberships,
    #[error("female share {0} is outside (0, 1)")]
    FemaleShareOutOfRange(f64),
    #[error("{0} distribution has a non-finite mean or non-positive standard deviation")]
    BadDistribution(&'static str),
    #[error("short cutoff of {0} inches is not below a foot")]
    ShortInchesOutOfRange(u16),
    #[error("short feet {short} must not exceed tall feet {tall}")]
    BucketsInverted { short: u16, tall: u16 },
    #[error("age range {min}..={max} is empty")]
    AgeRangeEmpty { min: u8, max: u8 },
    #[error("tag-pool bounds {min}..={max} are empty")]
    TagPoolBoundsEmpty { min: usize, max: usize },
    #[error("witness bound {0} admits no clash count (must be at least 2)")]
    WitnessBoundTooSmall(usize),
    #[error("every retry ceiling must be at least 1")]
    ZeroRetryLimit,
}

/// Validate a configuration, returning all errors found.
pub fn validate_config(config: &MysteryConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.safety_factor == 0 {
        errors.push(ConfigError::ZeroSafetyFactor);
    }
    if config.required_memberships == 0 {
        errors.push(ConfigError::ZeroMemberships);
    }
    if !(config.female_share > 0.0 && config.female_share < 1.0) {
        errors.push(ConfigError::FemaleShareOutOfRange(config.female_share));
    }

    let distributions = [
        ("female height", config.height.female),
        ("male height", config.height.male),
        ("female weight", config.weight.female),
        ("male weight", config.weight.male),
    ];
    for (label, params) in distributions {
        if !params.mean.is_finite() || !(params.std_dev > 0.0 && params.std_dev.is_finite()) {
            errors.push(ConfigError::BadDistribution(label));
        }
    }

    let thresholds = config.height_thresholds;
    if thresholds.short_inches > 11 {
        errors.push(ConfigError::ShortInchesOutOfRange(thresholds.short_inches));
    }
    if thresholds.short_feet > thresholds.tall_feet {
        errors.push(ConfigError::BucketsInverted {
            short: thresholds.short_feet,
            tall: thresholds.tall_feet,
        });
    }

    if config.age_min > config.age_max {
        errors.push(ConfigError::AgeRangeEmpty {
            min: config.age_min,
            max: config.age_max,
        });
    }

    if config.pools.tag_pool_min > config.pools.tag_pool_max {
        errors.push(ConfigError::TagPoolBoundsEmpty {
            min: config.pools.tag_pool_min,
            max: config.pools.tag_pool_max,
        });
    }

    // 0 < count < bound needs bound >= 2.
    for bound in [config.witness.same_sex_bound, config.witness.opposite_sex_bound] {
        if bound < 2 {
            errors.push(ConfigError::WitnessBoundTooSmall(bound));
        }
    }

    let retry = config.retry;
    if retry.tag_attempts == 0
        || retry.culprit_attempts == 0
        || retry.witness_attempts == 0
        || retry.reseeds == 0
    {
        errors.push(ConfigError::ZeroRetryLimit);
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(validate_config(&MysteryConfig::default()).is_empty());
    }

    #[test]
    fn test_reports_every_problem() {
        let config = MysteryConfig {
            safety_factor: 0,
            female_share: 1.0,
            age_min: 90,
            ..MysteryConfig::default()
        };
        let errors = validate_config(&config);
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(errors.contains(&ConfigError::ZeroSafetyFactor));
        assert!(errors.contains(&ConfigError::FemaleShareOutOfRange(1.0)));
        assert!(errors.contains(&ConfigError::AgeRangeEmpty { min: 90, max: 80 }));
    }

    #[test]
    fn test_bad_distribution() {
        let mut config = MysteryConfig::default();
        config.weight.male.std_dev = 0.0;
        assert_eq!(
            validate_config(&config),
            vec![ConfigError::BadDistribution("male weight")]
        );
    }

    #[test]
    fn test_witness_bound_must_admit_a_count() {
        let mut config = MysteryConfig::default();
        config.witness.same_sex_bound = 1;
        assert_eq!(
            validate_config(&config),
            vec![ConfigError::WitnessBoundTooSmall(1)]
        );
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{
            "required_memberships": 2,
            "witness": { "same_sex_bound": 4, "opposite_sex_bound": 6, "clash_rule": "given_only" }
        }"#;
        let config: MysteryConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.required_memberships, 2);
        assert_eq!(config.witness.clash_rule, ClashRule::GivenOnly);
        assert_eq!(config.safety_factor, 3);
        assert_eq!(config.height_thresholds, HeightThresholds::default());
    }
}
