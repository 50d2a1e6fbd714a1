//! Generation error taxonomy.
//!
//! Three families, all fatal to a single generation run:
//! - [`GenerationError::ConfigurationInfeasible`]: the tunables or seed data
//!   cannot support a solvable instance. Raised before anyone is generated.
//! - [`GenerationError::InvalidAttribute`]: a seed source or value is outside
//!   its recognized domain.
//! - [`GenerationError::AllocationExhausted`]: a bounded retry loop ran out of
//!   attempts. Only this one is worth retrying with a fresh seed.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The bounded loop that gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Redrawing a plate suffix for a fixed color/make prefix.
    TagSuffix,
    /// Drawing culprit candidates.
    Culprit,
    /// Drawing witness candidates.
    Witness,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::TagSuffix => "tag suffix allocation",
            Stage::Culprit => "culprit selection",
            Stage::Witness => "witness selection",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("configuration infeasible: {reason}")]
    ConfigurationInfeasible { reason: String },
    #[error("invalid {attribute}: {value}")]
    InvalidAttribute { attribute: String, value: String },
    #[error("{stage} did not converge after {attempts} attempts")]
    AllocationExhausted { stage: Stage, attempts: u32 },
}

impl GenerationError {
    pub fn infeasible(reason: impl Into<String>) -> Self {
        Self::ConfigurationInfeasible {
            reason: reason.into(),
        }
    }

    pub fn invalid(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Whether rerunning the whole generation with a different seed can help.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::AllocationExhausted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_exhaustion_is_retryable() {
        let exhausted = GenerationError::AllocationExhausted {
            stage: Stage::Witness,
            attempts: 10,
        };
        assert!(exhausted.is_retryable());
        assert!(!GenerationError::infeasible("too few orgs").is_retryable());
        assert!(!GenerationError::invalid("sex", "X").is_retryable());
    }

    #[test]
    fn test_messages() {
        let e = GenerationError::AllocationExhausted {
            stage: Stage::Culprit,
            attempts: 500,
        };
        assert_eq!(e.to_string(), "culprit selection did not converge after 500 attempts");
        assert_eq!(
            GenerationError::invalid("sex", "X").to_string(),
            "invalid sex: X"
        );
    }
}
