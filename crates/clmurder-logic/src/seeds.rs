//! Seed-list parsing into categorical pools.
//!
//! Two text formats feed the generator:
//! - plain lists, one item per line (colors, makes, streets, organizations,
//!   and the optional flair lists);
//! - weighted lists, `<count> <item>` per line (first and last names), where
//!   an item's selection probability is proportional to its count.
//!
//! Where the text comes from is the caller's business; see the CLI crate for
//! the directory loader.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::error::GenerationError;

/// Split a plain seed list into trimmed, non-empty items.
pub fn parse_seed_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a weighted seed list. `source` names the list in error messages.
pub fn parse_weighted_seed_list(
    source: &str,
    text: &str,
) -> Result<Vec<(u32, String)>, GenerationError> {
    let mut entries = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let malformed = || GenerationError::invalid(source, format!("line {}: {line:?}", line_no + 1));
        let (count, item) = line.split_once(char::is_whitespace).ok_or_else(malformed)?;
        let count: u32 = count.parse().map_err(|_| malformed())?;
        let item = item.trim();
        if count == 0 || item.is_empty() {
            return Err(malformed());
        }
        entries.push((count, item.to_string()));
    }
    Ok(entries)
}

/// An unweighted pool. Items keep their list order, which matters: plate
/// prefixes are derived from color and make positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoricalPool {
    name: String,
    items: Vec<String>,
}

impl CategoricalPool {
    pub fn new(name: impl Into<String>, items: Vec<String>) -> Result<Self, GenerationError> {
        let name = name.into();
        if items.is_empty() {
            return Err(GenerationError::invalid(name, "empty pool"));
        }
        Ok(Self { name, items })
    }

    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self, GenerationError> {
        Self::new(name, parse_seed_list(text))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    /// Uniform index into the pool.
    pub fn sample_index(&self, rng: &mut impl Rng) -> usize {
        rng.gen_range(0..self.items.len())
    }

    pub fn choose(&self, rng: &mut impl Rng) -> &str {
        &self.items[self.sample_index(rng)]
    }
}

/// A pool whose items are drawn proportionally to an integer weight.
#[derive(Debug, Clone)]
pub struct WeightedPool {
    name: String,
    items: Vec<String>,
    index: WeightedIndex<u32>,
}

impl WeightedPool {
    pub fn new(
        name: impl Into<String>,
        entries: Vec<(u32, String)>,
    ) -> Result<Self, GenerationError> {
        let name = name.into();
        let (weights, items): (Vec<u32>, Vec<String>) = entries.into_iter().unzip();
        let index = WeightedIndex::new(&weights)
            .map_err(|e| GenerationError::invalid(name.clone(), e.to_string()))?;
        Ok(Self { name, items, index })
    }

    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self, GenerationError> {
        let name = name.into();
        let entries = parse_weighted_seed_list(&name, text)?;
        Self::new(name, entries)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn choose(&self, rng: &mut impl Rng) -> &str {
        &self.items[self.index.sample(rng)]
    }
}

/// Optional lists used only for witness/red-herring flair.
#[derive(Debug, Clone)]
pub struct FlairPools {
    pub hair_colors: CategoricalPool,
    pub hair_styles: CategoricalPool,
    pub nationalities: CategoricalPool,
}

/// Everything the generator draws from.
#[derive(Debug, Clone)]
pub struct SeedData {
    pub female_names: WeightedPool,
    pub male_names: WeightedPool,
    pub last_names: WeightedPool,
    pub colors: CategoricalPool,
    pub makes: CategoricalPool,
    pub streets: CategoricalPool,
    pub organizations: CategoricalPool,
    pub flair: Option<FlairPools>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_plain_list_trims_and_skips_blanks() {
        let items = parse_seed_list("  Blue \n\nRed\r\n   \nGreen");
        assert_eq!(items, vec!["Blue", "Red", "Green"]);
    }

    #[test]
    fn test_weighted_list_keeps_multiword_items() {
        let entries = parse_weighted_seed_list("last_names", "12 Smith\n3   Van der Berg\n").unwrap();
        assert_eq!(
            entries,
            vec![(12, "Smith".to_string()), (3, "Van der Berg".to_string())]
        );
    }

    #[test]
    fn test_weighted_list_rejects_malformed_lines() {
        for text in ["Smith", "x Smith", "0 Smith", "-2 Smith"] {
            let err = parse_weighted_seed_list("last_names", text).unwrap_err();
            assert!(
                matches!(err, GenerationError::InvalidAttribute { ref attribute, .. } if attribute == "last_names"),
                "{text:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_empty_pools_are_invalid() {
        assert!(CategoricalPool::parse("car_colors", "\n\n").is_err());
        assert!(WeightedPool::parse("male_names", "").is_err());
    }

    #[test]
    fn test_weighted_choice_follows_weights() {
        let pool = WeightedPool::parse("female_names", "1 Ada\n99 Grace").unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let grace = (0..2000).filter(|_| pool.choose(&mut rng) == "Grace").count();
        assert!(grace > 1900, "grace={grace}");
    }

    #[test]
    fn test_categorical_index_in_range() {
        let pool = CategoricalPool::parse("car_makes", "Honda\nFord\nKia").unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..100 {
            let i = pool.sample_index(&mut rng);
            assert!(i < 3);
            assert_eq!(pool.get(i), Some(pool.items()[i].as_str()));
        }
    }
}
