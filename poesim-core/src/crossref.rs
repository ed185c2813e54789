//! Cross-item modifier relationships within one recombination sample.
//!
//! Two modifiers are "the same" when their effect descriptions match exactly,
//! in order. This is a textual comparison, not a mod-group comparison:
//! same tier and category with different wording do not match.
//!
//! Indices point into the owning items' `mods` lists and are only valid while
//! those lists keep their order.

use poetxt::Modifier;
use serde::{Deserialize, Serialize};

/// Every `(left index, right index)` pair of describing-identical modifiers.
pub fn match_modifiers(left: &[Modifier], right: &[Modifier]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (l, lm) in left.iter().enumerate() {
        for (r, rm) in right.iter().enumerate() {
            if lm.describes_same_as(rm) {
                pairs.push((l, r));
            }
        }
    }
    pairs
}

/// Which input of a sample a modifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputSide {
    First,
    Second,
}

/// Overlay of matches computed once per sample.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossRefs {
    /// `(input1 index, input2 index)`: the modifier appears on both inputs.
    /// Implicits are included even though they never mix.
    pub doubled: Vec<(usize, usize)>,
    /// `(input1 index, output index)`: the modifier survived from input 1.
    pub kept_first: Vec<(usize, usize)>,
    /// `(input2 index, output index)`: the modifier survived from input 2.
    pub kept_second: Vec<(usize, usize)>,
}

impl CrossRefs {
    pub fn compute(input1: &[Modifier], input2: &[Modifier], output: &[Modifier]) -> Self {
        Self {
            doubled: match_modifiers(input1, input2),
            kept_first: match_modifiers(input1, output),
            kept_second: match_modifiers(input2, output),
        }
    }

    /// `doubled` pairs involving modifier `index` of `side`.
    pub fn doubled_for(&self, side: InputSide, index: usize) -> Vec<(usize, usize)> {
        self.doubled
            .iter()
            .filter(|(first, second)| match side {
                InputSide::First => *first == index,
                InputSide::Second => *second == index,
            })
            .copied()
            .collect()
    }

    /// `kept` pairs for modifier `index` of `side`: `(index, output index)`.
    pub fn kept_for(&self, side: InputSide, index: usize) -> Vec<(usize, usize)> {
        let kept = match side {
            InputSide::First => &self.kept_first,
            InputSide::Second => &self.kept_second,
        };
        kept.iter().filter(|(i, _)| *i == index).copied().collect()
    }

    pub fn is_doubled(&self, side: InputSide, index: usize) -> bool {
        !self.doubled_for(side, index).is_empty()
    }

    pub fn is_kept(&self, side: InputSide, index: usize) -> bool {
        !self.kept_for(side, index).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{prefix, suffix};

    #[test]
    fn test_match_is_exact_and_ordered() {
        let left = vec![
            prefix("X% increased Physical Damage", 1),
            suffix("X% increased Attack Speed", 2),
        ];
        let right = vec![
            suffix("X% increased Attack Speed", 5),
            prefix("X% increased physical damage", 1),
            prefix("X% increased Physical Damage", 3),
        ];
        assert_eq!(match_modifiers(&left, &right), vec![(0, 2), (1, 0)]);
        assert!(match_modifiers(&left, &[]).is_empty());
    }

    #[test]
    fn test_cross_refs() {
        let input1 = vec![prefix("A", 1), suffix("B", 1)];
        let input2 = vec![suffix("C", 1), prefix("A", 2)];
        let output = vec![prefix("A", 1), suffix("C", 1)];

        let refs = CrossRefs::compute(&input1, &input2, &output);
        assert_eq!(refs.doubled, vec![(0, 1)]);
        assert_eq!(refs.kept_first, vec![(0, 0)]);
        assert_eq!(refs.kept_second, vec![(0, 1), (1, 0)]);

        assert_eq!(refs.doubled_for(InputSide::First, 0), vec![(0, 1)]);
        assert_eq!(refs.doubled_for(InputSide::Second, 1), vec![(0, 1)]);
        assert!(!refs.is_doubled(InputSide::Second, 0));
        assert!(refs.is_kept(InputSide::First, 0));
        assert!(!refs.is_kept(InputSide::First, 1));
        assert_eq!(refs.kept_for(InputSide::Second, 1), vec![(1, 0)]);
    }
}
