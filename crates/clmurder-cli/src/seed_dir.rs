//! Loads a seed directory into [`SeedData`].
//!
//! Files are looked up by fixed names. The three flair lists are optional;
//! when any of them is missing the mystery is generated without flair.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use clmurder_logic::seeds::{CategoricalPool, FlairPools, SeedData, WeightedPool};

pub const FEMALE_NAMES: &str = "female_names";
pub const MALE_NAMES: &str = "male_names";
pub const LAST_NAMES: &str = "last_names";
pub const CAR_COLORS: &str = "car_colors";
pub const CAR_MAKES: &str = "car_makes";
pub const STREET_NAMES: &str = "street_names";
pub const MEMBER_ORGS: &str = "member_orgs";
pub const HAIR_COLORS: &str = "hair_colors";
pub const HAIR_STYLES: &str = "hair_styles";
pub const NATIONALITIES: &str = "nationality_adjectives";

fn read(dir: &Path, name: &str) -> Result<String> {
    let path = dir.join(name);
    fs::read_to_string(&path).with_context(|| format!("reading seed file {}", path.display()))
}

fn read_optional(dir: &Path, name: &str) -> Result<Option<String>> {
    let path = dir.join(name);
    match fs::read_to_string(&path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("reading seed file {}", path.display())),
    }
}

fn weighted(dir: &Path, name: &str) -> Result<WeightedPool> {
    Ok(WeightedPool::parse(name, &read(dir, name)?)?)
}

fn plain(dir: &Path, name: &str) -> Result<CategoricalPool> {
    Ok(CategoricalPool::parse(name, &read(dir, name)?)?)
}

fn flair(dir: &Path) -> Result<Option<FlairPools>> {
    let texts = (
        read_optional(dir, HAIR_COLORS)?,
        read_optional(dir, HAIR_STYLES)?,
        read_optional(dir, NATIONALITIES)?,
    );
    match texts {
        (Some(hair_colors), Some(hair_styles), Some(nationalities)) => Ok(Some(FlairPools {
            hair_colors: CategoricalPool::parse(HAIR_COLORS, &hair_colors)?,
            hair_styles: CategoricalPool::parse(HAIR_STYLES, &hair_styles)?,
            nationalities: CategoricalPool::parse(NATIONALITIES, &nationalities)?,
        })),
        (None, None, None) => Ok(None),
        _ => {
            log::warn!(
                "Incomplete flair lists in {}; generating without flair",
                dir.display()
            );
            Ok(None)
        }
    }
}

pub fn load_seed_dir(dir: &Path) -> Result<SeedData> {
    let seeds = SeedData {
        female_names: weighted(dir, FEMALE_NAMES)?,
        male_names: weighted(dir, MALE_NAMES)?,
        last_names: weighted(dir, LAST_NAMES)?,
        colors: plain(dir, CAR_COLORS)?,
        makes: plain(dir, CAR_MAKES)?,
        streets: plain(dir, STREET_NAMES)?,
        organizations: plain(dir, MEMBER_ORGS)?,
        flair: flair(dir)?,
    };
    log::info!(
        "Loaded seeds from {}: {} colors, {} makes, {} organizations, {} streets",
        dir.display(),
        seeds.colors.len(),
        seeds.makes.len(),
        seeds.organizations.len(),
        seeds.streets.len()
    );
    Ok(seeds)
}
