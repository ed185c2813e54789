//! Empirical slot-count transitions: given `n` modifiers of one slot across
//! both inputs, how likely is the output to end up with `k` of that slot.
//!
//! Prefix and suffix observations share one table, keyed by pool size.

use crate::corpus::Corpus;
use crate::simulator::SimError;
use poetxt::ModSlot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pool size -> (output count -> probability).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionTable {
    counts: BTreeMap<usize, BTreeMap<usize, u32>>,
    probabilities: BTreeMap<usize, BTreeMap<usize, f64>>,
}

impl TransitionTable {
    /// Build from `(pool size, output count)` observations.
    pub fn from_observations<I>(observations: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut counts: BTreeMap<usize, BTreeMap<usize, u32>> = BTreeMap::new();
        for (pool, outcome) in observations {
            *counts.entry(pool).or_default().entry(outcome).or_insert(0) += 1;
        }

        let probabilities = counts
            .iter()
            .map(|(&pool, outcomes)| {
                let total: u32 = outcomes.values().sum();
                let dist: BTreeMap<usize, f64> = outcomes
                    .iter()
                    .map(|(&k, &n)| (k, f64::from(n) / f64::from(total)))
                    .collect();
                log::debug!("Pool {}: {} observations, {:?}", pool, total, dist);
                (pool, dist)
            })
            .collect();

        Self {
            counts,
            probabilities,
        }
    }

    /// One prefix and one suffix observation per record.
    pub fn from_corpus(corpus: &Corpus) -> Self {
        let observations = corpus.records.iter().flat_map(|record| {
            [ModSlot::Prefix, ModSlot::Suffix]
                .map(|slot| (record.input_pool(slot), record.output_count(slot)))
        });
        let table = Self::from_observations(observations);
        log::info!(
            "Transition table: {} pool sizes from {} records",
            table.probabilities.len(),
            corpus.len()
        );
        table
    }

    /// A table from explicit distributions, without observation counts.
    pub fn from_probabilities(probabilities: BTreeMap<usize, BTreeMap<usize, f64>>) -> Self {
        Self {
            counts: BTreeMap::new(),
            probabilities,
        }
    }

    /// Output-count distribution for `pool`.
    ///
    /// Pool sizes never observed are an error, not an empty distribution.
    pub fn distribution(&self, pool: usize) -> Result<&BTreeMap<usize, f64>, SimError> {
        self.probabilities
            .get(&pool)
            .ok_or(SimError::UnobservedPoolSize { pool })
    }

    pub fn observations(&self, pool: usize) -> u32 {
        self.counts.get(&pool).map_or(0, |c| c.values().sum())
    }

    pub fn pool_sizes(&self) -> impl Iterator<Item = usize> + '_ {
        self.probabilities.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &BTreeMap<usize, f64>)> + '_ {
        self.probabilities.iter().map(|(&pool, dist)| (pool, dist))
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }
}
