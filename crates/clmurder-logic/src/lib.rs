//! Pure generation logic for Command Line Murders mysteries.
//!
//! This crate synthesizes a population of people, hands each of them a car
//! with a unique licence plate, and then picks a culprit and a witness so
//! that the resulting mystery has exactly one solution reachable through a
//! short chain of cross-referenced clues. Functions take plain data and an
//! explicit RNG handle and return plain data, so everything is reproducible
//! from a seed and unit-testable without touching the filesystem.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`audit`] | Re-checks every instance invariant on a finished mystery |
//! | [`config`] | Tunables (sizing, distributions, bounds, retry ceilings) and validation |
//! | [`culprit`] | Rejection sampling of the culprit and its suspect pools |
//! | [`error`] | The generation error taxonomy |
//! | [`flair`] | Witness appearance and red-herring disambiguation |
//! | [`mystery`] | End-to-end pipeline, reseed fallback, JSON-ready report |
//! | [`population`] | Population sizing, feasibility guard, people and indices |
//! | [`sampler`] | Per-individual attribute draws (height, weight, names, memberships) |
//! | [`seeds`] | Seed-list parsing into categorical pools |
//! | [`tags`] | Collision-free licence plate allocation |
//! | [`witness`] | Rejection sampling of the witness and the red-herring pool |
//!
//! ```
//! use clmurder_logic::config::MysteryConfig;
//! use clmurder_logic::population::population_size;
//!
//! let config = MysteryConfig::default();
//! // 3 × 2 sexes × 3 height buckets × 5 odd digits × 4 colors × 4 makes
//! assert_eq!(population_size(&config, 4, 4), 1440);
//! ```

pub mod audit;
pub mod config;
pub mod culprit;
pub mod error;
pub mod flair;
pub mod mystery;
pub mod population;
pub mod sampler;
pub mod seeds;
pub mod tags;
pub mod witness;

pub use error::{GenerationError, Stage};
pub use mystery::{generate_mystery, generate_with_reseed, Mystery, MysteryReport};
