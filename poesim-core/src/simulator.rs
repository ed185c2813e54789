//! Recombinator outcome simulation.
//!
//! Prefixes and suffixes of both inputs form two pools. For each pool the
//! transition table says how many modifiers survive; every same-size subset
//! of the pool is equally likely. The two pools combine independently, each
//! outcome lands on either input's base with equal chance, and non-valuable
//! modifiers collapse into a per-slot junk placeholder.
//!
//! Not modelled: modifier weighting, mod-group exclusivity, influence
//! requirements and doubling.

use crate::config::SimConfig;
use crate::frequency::TransitionTable;
use poetxt::{Item, ModSlot, Modifier, ValuableMod};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Number of bases an outcome can land on.
pub const BASE_VARIANTS: u8 = 2;

/// Tier reported for junk placeholders.
pub const JUNK_TIER: i32 = -1;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("No valuable mods so no point recombining")]
    NoValuableMods,
    #[error("No observed recombinations with a pool of {pool} modifiers")]
    UnobservedPoolSize { pool: usize },
    #[error("{slot} pool of {size} modifiers exceeds the limit of {max}")]
    PoolTooLarge {
        slot: ModSlot,
        size: usize,
        max: usize,
    },
}

/// A modifier in a compressed outcome.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OutcomeMod {
    Valuable { description: String, tier: i32 },
    /// Any non-valuable modifier of the given slot.
    Junk(ModSlot),
}

impl OutcomeMod {
    pub fn description(&self) -> &str {
        match self {
            OutcomeMod::Valuable { description, .. } => description,
            OutcomeMod::Junk(ModSlot::Prefix) => "Junk Prefix",
            OutcomeMod::Junk(ModSlot::Suffix) => "Junk Suffix",
            OutcomeMod::Junk(_) => "Junk",
        }
    }

    pub fn tier(&self) -> i32 {
        match self {
            OutcomeMod::Valuable { tier, .. } => *tier,
            OutcomeMod::Junk(_) => JUNK_TIER,
        }
    }

    pub fn is_junk(&self) -> bool {
        matches!(self, OutcomeMod::Junk(_))
    }

    fn from_modifier(modifier: &Modifier, valuable: bool, slot: ModSlot) -> Self {
        if valuable {
            OutcomeMod::Valuable {
                description: modifier.description(),
                tier: modifier.tier,
            }
        } else {
            OutcomeMod::Junk(slot)
        }
    }
}

/// Output item reduced to what matters: which base, and the sorted
/// valuable/junk modifiers per slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompressedState {
    /// Which input's base the output uses (`0..BASE_VARIANTS`).
    pub base: u8,
    pub prefixes: Vec<OutcomeMod>,
    pub suffixes: Vec<OutcomeMod>,
}

impl CompressedState {
    /// `(prefix count, suffix count)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.prefixes.len(), self.suffixes.len())
    }

    pub fn valuable_prefixes(&self) -> Vec<&str> {
        valuable_descriptions(&self.prefixes)
    }

    pub fn valuable_suffixes(&self) -> Vec<&str> {
        valuable_descriptions(&self.suffixes)
    }
}

fn valuable_descriptions(mods: &[OutcomeMod]) -> Vec<&str> {
    let mut descriptions: Vec<&str> = mods
        .iter()
        .filter(|m| !m.is_junk())
        .map(OutcomeMod::description)
        .collect();
    descriptions.sort_unstable();
    descriptions
}

/// Probability of each compressed outcome.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutcomeDistribution {
    states: BTreeMap<CompressedState, f64>,
}

impl OutcomeDistribution {
    pub fn get(&self, state: &CompressedState) -> Option<f64> {
        self.states.get(state).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CompressedState, f64)> + '_ {
        self.states.iter().map(|(state, &p)| (state, p))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.states.values().sum()
    }

    fn add(&mut self, state: CompressedState, probability: f64) {
        *self.states.entry(state).or_insert(0.0) += probability;
    }
}

/// Recombining without any valuable modifier has no upside to measure.
pub fn check_applicable(valuable: &[ValuableMod]) -> Result<(), SimError> {
    if valuable.is_empty() {
        return Err(SimError::NoValuableMods);
    }
    Ok(())
}

/// All `k`-element subsets of `0..n`, in lexicographic order.
pub fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    if k > n {
        return Vec::new();
    }
    let mut result = Vec::new();
    let mut indices: Vec<usize> = (0..k).collect();
    loop {
        result.push(indices.clone());

        // Rightmost position not yet at its maximum
        let mut i = k;
        while i > 0 && indices[i - 1] == i - 1 + n - k {
            i -= 1;
        }
        if i == 0 {
            return result;
        }
        indices[i - 1] += 1;
        for j in i..k {
            indices[j] = indices[j - 1] + 1;
        }
    }
}

pub struct Simulator<'a> {
    table: &'a TransitionTable,
    max_pool_size: usize,
}

impl<'a> Simulator<'a> {
    pub fn new(table: &'a TransitionTable, config: &SimConfig) -> Self {
        Self {
            table,
            max_pool_size: config.max_pool_size,
        }
    }

    /// Distribution over compressed outcomes of recombining `item1` and `item2`.
    pub fn simulate(
        &self,
        item1: &Item,
        item2: &Item,
        valuable: &[ValuableMod],
    ) -> Result<OutcomeDistribution, SimError> {
        check_applicable(valuable)?;

        let prefixes = self.pool_outcomes(ModSlot::Prefix, item1, item2, valuable)?;
        let suffixes = self.pool_outcomes(ModSlot::Suffix, item1, item2, valuable)?;

        let base_share = 1.0 / f64::from(BASE_VARIANTS);
        let mut distribution = OutcomeDistribution::default();
        for (prefix_p, prefix_mods) in &prefixes {
            for (suffix_p, suffix_mods) in &suffixes {
                let joint = prefix_p * suffix_p;
                for base in 0..BASE_VARIANTS {
                    distribution.add(
                        CompressedState {
                            base,
                            prefixes: prefix_mods.clone(),
                            suffixes: suffix_mods.clone(),
                        },
                        joint * base_share,
                    );
                }
            }
        }

        log::debug!(
            "Simulated {}x{} pool outcomes into {} compressed states",
            prefixes.len(),
            suffixes.len(),
            distribution.len()
        );
        Ok(distribution)
    }

    /// Every surviving subset of one slot's pool with its probability,
    /// already compressed.
    fn pool_outcomes(
        &self,
        slot: ModSlot,
        item1: &Item,
        item2: &Item,
        valuable: &[ValuableMod],
    ) -> Result<Vec<(f64, Vec<OutcomeMod>)>, SimError> {
        let pool: Vec<&Modifier> = item1.mods_in(slot).chain(item2.mods_in(slot)).collect();
        if pool.len() > self.max_pool_size {
            return Err(SimError::PoolTooLarge {
                slot,
                size: pool.len(),
                max: self.max_pool_size,
            });
        }
        let valuable_flags: Vec<bool> = pool.iter().map(|m| m.is_valuable(valuable)).collect();
        let distribution = self.table.distribution(pool.len())?;
        log::debug!("{} pool of {}: {:?}", slot, pool.len(), distribution);

        let mut outcomes = Vec::new();
        for (&count, &probability) in distribution {
            if probability <= 0.0 {
                continue;
            }
            if count > pool.len() {
                log::warn!(
                    "{} pool of {} was observed yielding {}; treating as all kept",
                    slot,
                    pool.len(),
                    count
                );
            }
            let subsets = combinations(pool.len(), count.min(pool.len()));
            let share = probability / subsets.len() as f64;
            for subset in subsets {
                let mut mods: Vec<OutcomeMod> = subset
                    .iter()
                    .map(|&i| OutcomeMod::from_modifier(pool[i], valuable_flags[i], slot))
                    .collect();
                mods.sort_by(|a, b| {
                    a.description()
                        .cmp(b.description())
                        .then(a.tier().cmp(&b.tier()))
                });
                outcomes.push((share, mods));
            }
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ItemBuilder;
    use proptest::prelude::*;

    const PHYS: &str = "X% increased Physical Damage";
    const HYBRID: &str = "X% increased Physical Damage|+X to Accuracy Rating";
    const SPEED: &str = "X% increased Attack Speed";
    const BLEED: &str = "+X% to Damage over Time Multiplier for Bleeding";
    const LIFE: &str = "+X to maximum Life";

    fn two_of_two(p_two: f64) -> TransitionTable {
        TransitionTable::from_probabilities(BTreeMap::from([(
            2,
            BTreeMap::from([(2, p_two), (1, 1.0 - p_two)]),
        )]))
    }

    fn inputs() -> (Item, Item) {
        let item1 = ItemBuilder::new()
            .with_prefix(PHYS, 1)
            .with_suffix(SPEED, 1)
            .build();
        let item2 = ItemBuilder::new()
            .with_prefix(HYBRID, 2)
            .with_suffix(BLEED, 1)
            .build();
        (item1, item2)
    }

    fn all_valuable() -> Vec<ValuableMod> {
        [PHYS, HYBRID, SPEED, BLEED]
            .iter()
            .map(|d| ValuableMod::new(*d, 4))
            .collect()
    }

    fn shape_probability(dist: &OutcomeDistribution, shape: (usize, usize)) -> f64 {
        dist.iter()
            .filter(|(s, _)| s.shape() == shape)
            .map(|(_, p)| p)
            .sum()
    }

    #[test]
    fn test_combinations() {
        assert_eq!(combinations(3, 2), vec![vec![0, 1], vec![0, 2], vec![1, 2]]);
        assert_eq!(combinations(2, 0), vec![Vec::<usize>::new()]);
        assert_eq!(combinations(2, 2), vec![vec![0, 1]]);
        assert!(combinations(1, 2).is_empty());
        assert_eq!(combinations(6, 3).len(), 20);
    }

    #[test]
    fn test_two_by_two_scenario() {
        let table = two_of_two(0.6);
        let sim = Simulator::new(&table, &SimConfig::default());
        let (item1, item2) = inputs();

        let dist = sim.simulate(&item1, &item2, &all_valuable()).unwrap();

        // 3 prefix subsets x 3 suffix subsets x 2 bases, all distinct
        assert_eq!(dist.len(), 18);
        assert!((dist.total() - 1.0).abs() < 1e-9);
        assert!((shape_probability(&dist, (2, 2)) - 0.36).abs() < 1e-9);
        let lower: f64 = shape_probability(&dist, (1, 2))
            + shape_probability(&dist, (2, 1))
            + shape_probability(&dist, (1, 1));
        assert!((lower - 0.64).abs() < 1e-9);

        for (state, p) in dist.iter().filter(|(s, _)| s.shape() == (2, 2)) {
            assert!(state.base < BASE_VARIANTS);
            assert!((p - 0.18).abs() < 1e-9);
        }
    }

    #[test]
    fn test_junk_compression_merges_states() {
        let table = two_of_two(0.6);
        let sim = Simulator::new(&table, &SimConfig::default());
        let (item1, item2) = inputs();
        let valuable = vec![ValuableMod::new(PHYS, 1)];

        let dist = sim.simulate(&item1, &item2, &valuable).unwrap();
        assert!((dist.total() - 1.0).abs() < 1e-9);

        let phys = OutcomeMod::Valuable {
            description: PHYS.to_string(),
            tier: 1,
        };
        let junk_prefix = OutcomeMod::Junk(ModSlot::Prefix);
        let both_suffixes = vec![
            OutcomeMod::Junk(ModSlot::Suffix),
            OutcomeMod::Junk(ModSlot::Suffix),
        ];
        let one_suffix = vec![OutcomeMod::Junk(ModSlot::Suffix)];

        // Junk sorts before "X% ..."
        let kept_both = CompressedState {
            base: 0,
            prefixes: vec![junk_prefix.clone(), phys.clone()],
            suffixes: both_suffixes.clone(),
        };
        assert!((dist.get(&kept_both).unwrap() - 0.6 * 0.6 / 2.0).abs() < 1e-9);

        // Either single suffix collapses into the same junk state
        let phys_only = CompressedState {
            base: 1,
            prefixes: vec![phys],
            suffixes: one_suffix.clone(),
        };
        assert!((dist.get(&phys_only).unwrap() - 0.2 * 0.4 / 2.0).abs() < 1e-9);

        let bricked = CompressedState {
            base: 0,
            prefixes: vec![junk_prefix],
            suffixes: one_suffix,
        };
        assert!((dist.get(&bricked).unwrap() - 0.2 * 0.4 / 2.0).abs() < 1e-9);

        // 3 prefix states x 2 suffix states x 2 bases
        assert_eq!(dist.len(), 12);
    }

    #[test]
    fn test_tier_above_ceiling_is_junk() {
        let table = two_of_two(1.0);
        let sim = Simulator::new(&table, &SimConfig::default());
        let (item1, item2) = inputs();
        // The hybrid prefix is tier 2
        let valuable = vec![ValuableMod::new(HYBRID, 1)];

        let dist = sim.simulate(&item1, &item2, &valuable).unwrap();
        assert_eq!(dist.len(), 2);
        for (state, _) in dist.iter() {
            assert!(state.prefixes.iter().all(OutcomeMod::is_junk));
            assert!(state.valuable_prefixes().is_empty());
        }
    }

    #[test]
    fn test_no_valuable_mods_is_not_applicable() {
        let table = two_of_two(0.6);
        let sim = Simulator::new(&table, &SimConfig::default());
        let (item1, item2) = inputs();
        assert_eq!(
            sim.simulate(&item1, &item2, &[]),
            Err(SimError::NoValuableMods)
        );
    }

    #[test]
    fn test_unobserved_pool_size() {
        let table = two_of_two(0.6);
        let sim = Simulator::new(&table, &SimConfig::default());
        let (item1, _) = inputs();
        let item2 = ItemBuilder::new()
            .with_prefix(HYBRID, 2)
            .with_prefix(LIFE, 3)
            .with_suffix(BLEED, 1)
            .build();
        assert_eq!(
            sim.simulate(&item1, &item2, &all_valuable()),
            Err(SimError::UnobservedPoolSize { pool: 3 })
        );
    }

    #[test]
    fn test_pool_size_limit() {
        let table = two_of_two(0.6);
        let config = SimConfig {
            max_pool_size: 1,
            ..SimConfig::default()
        };
        let sim = Simulator::new(&table, &config);
        let (item1, item2) = inputs();
        assert_eq!(
            sim.simulate(&item1, &item2, &all_valuable()),
            Err(SimError::PoolTooLarge {
                slot: ModSlot::Prefix,
                size: 2,
                max: 1
            })
        );
    }

    #[test]
    fn test_outcome_larger_than_pool_keeps_everything() {
        let table = TransitionTable::from_probabilities(BTreeMap::from([(
            2,
            BTreeMap::from([(3, 0.5), (2, 0.5)]),
        )]));
        let sim = Simulator::new(&table, &SimConfig::default());
        let (item1, item2) = inputs();
        let dist = sim.simulate(&item1, &item2, &all_valuable()).unwrap();
        assert!((dist.total() - 1.0).abs() < 1e-9);
        assert!((shape_probability(&dist, (2, 2)) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_simulation_is_deterministic() {
        let table = two_of_two(0.6);
        let sim = Simulator::new(&table, &SimConfig::default());
        let (item1, item2) = inputs();
        let valuable = vec![ValuableMod::new(PHYS, 1), ValuableMod::new(BLEED, 2)];
        assert_eq!(
            sim.simulate(&item1, &item2, &valuable).unwrap(),
            sim.simulate(&item1, &item2, &valuable).unwrap()
        );
    }

    const DESCRIPTIONS: [&str; 5] = [PHYS, HYBRID, SPEED, BLEED, LIFE];

    fn random_item() -> impl Strategy<Value = Item> {
        (
            prop::collection::vec((0usize..5, 1i32..6), 0..4),
            prop::collection::vec((0usize..5, 1i32..6), 0..4),
        )
            .prop_map(|(prefixes, suffixes)| {
                let mut builder = ItemBuilder::new();
                for (d, tier) in prefixes {
                    builder = builder.with_prefix(DESCRIPTIONS[d], tier);
                }
                for (d, tier) in suffixes {
                    builder = builder.with_suffix(DESCRIPTIONS[d], tier);
                }
                builder.build()
            })
    }

    proptest! {
        /// Property: compressed probabilities always sum to one
        #[test]
        fn probability_is_conserved(
            item1 in random_item(),
            item2 in random_item(),
            outcomes in prop::collection::vec(prop::collection::vec(0usize..8, 1..6), 7),
            valuable_tiers in prop::collection::vec(1i32..6, 1..5),
        ) {
            let observations = outcomes
                .iter()
                .enumerate()
                .flat_map(|(pool, seen)| seen.iter().map(move |&k| (pool, k)));
            let table = TransitionTable::from_observations(observations);
            let valuable: Vec<ValuableMod> = valuable_tiers
                .iter()
                .enumerate()
                .map(|(i, &tier)| ValuableMod::new(DESCRIPTIONS[i], tier))
                .collect();

            let sim = Simulator::new(&table, &SimConfig::default());
            let first = sim.simulate(&item1, &item2, &valuable).unwrap();
            prop_assert!((first.total() - 1.0).abs() < 1e-6);

            let second = sim.simulate(&item1, &item2, &valuable).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
