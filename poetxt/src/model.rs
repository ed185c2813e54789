//! Typed representation of a parsed item.
//!
//! Everything here is produced by [`crate::ItemParser`] and is not mutated
//! afterwards. Cross-item relationships (doubled/kept modifiers) live in a
//! separate overlay computed by the corpus loader.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Token substituted for every numeric quantity in an effect description.
pub const PLACEHOLDER: &str = "X";

/// Joins effect descriptions when a modifier is described as a single string.
pub const DESCRIPTION_JOINER: &str = "|";

/// One clause of a modifier, e.g. `+25(24-28) to maximum Life`.
///
/// `actual_stats` and `ranges` are parallel: `ranges[i]` is the roll range of
/// `actual_stats[i]`, or `[v, v]` when the text carried no range.
///
/// A literal `X` already in the client text (e.g. "X-Ray") is kept as is, so
/// `description` may hold more [`PLACEHOLDER`]s than there are stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub actual_stats: Vec<f64>,
    pub ranges: Vec<[f64; 2]>,
    /// Line text with each quantity replaced by [`PLACEHOLDER`].
    pub description: String,
    /// Parenthetical lines following the effect, e.g. `(implicit)`.
    pub comment_lines: Vec<String>,
}

impl Effect {
    /// An effect without numeric quantities ("Hits have Culling Strike").
    pub fn plain(description: impl Into<String>) -> Self {
        Self {
            actual_stats: Vec::new(),
            ranges: Vec::new(),
            description: description.into(),
            comment_lines: Vec::new(),
        }
    }
}

/// Which affix slot a modifier occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModSlot {
    Prefix,
    Suffix,
    Implicit,
    /// Category text names none of the known slots (e.g. enchantments).
    Other,
}

impl ModSlot {
    /// Classify a modifier category such as `"Master Crafted Suffix Modifier"`.
    ///
    /// Checked in the order Implicit, Prefix, Suffix; the first substring hit wins.
    pub fn classify(category: &str) -> Self {
        if category.contains("Implicit") {
            ModSlot::Implicit
        } else if category.contains("Prefix") {
            ModSlot::Prefix
        } else if category.contains("Suffix") {
            ModSlot::Suffix
        } else {
            ModSlot::Other
        }
    }

    pub fn is_affix(self) -> bool {
        matches!(self, ModSlot::Prefix | ModSlot::Suffix)
    }
}

impl std::fmt::Display for ModSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ModSlot::Prefix => "Prefix",
            ModSlot::Suffix => "Suffix",
            ModSlot::Implicit => "Implicit",
            ModSlot::Other => "Other",
        };
        f.write_str(name)
    }
}

/// One `{ ... }` modifier block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    /// Free text such as `"Prefix Modifier"` or `"Eater of Worlds Implicit Modifier"`.
    pub category: String,
    /// Quoted title (`"of the Apt"`), empty when absent.
    pub title: String,
    /// `(Tier: N)`, 0 when absent. Lower is stronger.
    pub tier: i32,
    pub tags: Vec<String>,
    pub effects: Vec<Effect>,
    /// Slot derived from `category` at construction.
    pub slot: ModSlot,
    /// Bases required to keep this modifier; reserved for planning tools.
    #[serde(default)]
    pub requirements: Option<Vec<String>>,
}

impl Modifier {
    pub fn new(
        category: impl Into<String>,
        title: impl Into<String>,
        tier: i32,
        tags: Vec<String>,
        effects: Vec<Effect>,
    ) -> Self {
        let category = category.into();
        let slot = ModSlot::classify(&category);
        Self {
            category,
            title: title.into(),
            tier,
            tags,
            effects,
            slot,
            requirements: None,
        }
    }

    /// All effect descriptions joined with [`DESCRIPTION_JOINER`].
    ///
    /// This is the string a [`ValuableMod`] is compared against.
    pub fn description(&self) -> String {
        self.effects
            .iter()
            .map(|e| e.description.as_str())
            .collect::<Vec<_>>()
            .join(DESCRIPTION_JOINER)
    }

    /// True when both modifiers have the same effect descriptions in the same order.
    pub fn describes_same_as(&self, other: &Modifier) -> bool {
        self.effects.len() == other.effects.len()
            && self
                .effects
                .iter()
                .zip(&other.effects)
                .all(|(a, b)| a.description == b.description)
    }

    /// True when this modifier satisfies `wanted`: same description, tier at or below the ceiling.
    pub fn matches(&self, wanted: &ValuableMod) -> bool {
        self.tier <= wanted.max_tier && self.description() == wanted.description
    }

    pub fn is_valuable(&self, valuable: &[ValuableMod]) -> bool {
        valuable.iter().any(|vm| self.matches(vm))
    }
}

/// Attribute and level thresholds from the `Requirements:` block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirements {
    pub level: u32,
    pub str: u32,
    pub dex: u32,
    pub int: u32,
}

/// Field of [`Requirements`] addressed by a requirement line's key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementKey {
    Level,
    Str,
    Dex,
    Int,
}

impl RequirementKey {
    /// Map a lowercased key (`"level"`, `"str"`, `"dex"`, `"int"`).
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "level" => Some(RequirementKey::Level),
            "str" => Some(RequirementKey::Str),
            "dex" => Some(RequirementKey::Dex),
            "int" => Some(RequirementKey::Int),
            _ => None,
        }
    }
}

impl Requirements {
    pub fn set(&mut self, key: RequirementKey, value: u32) {
        match key {
            RequirementKey::Level => self.level = value,
            RequirementKey::Str => self.str = value,
            RequirementKey::Dex => self.dex = value,
            RequirementKey::Int => self.int = value,
        }
    }
}

/// A caller-supplied definition of a modifier worth keeping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValuableMod {
    /// Exact [`Modifier::description`] text.
    pub description: String,
    /// Worst tier still considered valuable.
    pub max_tier: i32,
}

impl ValuableMod {
    pub fn new(description: impl Into<String>, max_tier: i32) -> Self {
        Self {
            description: description.into(),
            max_tier,
        }
    }
}

/// A fully parsed item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub class: String,
    pub rarity: String,
    pub name: Option<String>,
    pub base: String,
    /// Weapon/armour properties; percentages as fractions, ranges averaged.
    pub traits: HashMap<String, f64>,
    pub requirements: Requirements,
    /// Socket layout such as `R-G-B`, empty when unsocketed.
    pub sockets: String,
    pub item_level: u32,
    pub mods: Vec<Modifier>,
    /// Trailing markers like `Synthesised Item`; `None` for normal items.
    pub special_types: Option<Vec<String>>,
}

impl Item {
    pub fn mods_in(&self, slot: ModSlot) -> impl Iterator<Item = &Modifier> {
        self.mods.iter().filter(move |m| m.slot == slot)
    }

    pub fn prefixes(&self) -> Vec<&Modifier> {
        self.mods_in(ModSlot::Prefix).collect()
    }

    pub fn suffixes(&self) -> Vec<&Modifier> {
        self.mods_in(ModSlot::Suffix).collect()
    }

    pub fn affixes(&self) -> Vec<&Modifier> {
        self.mods.iter().filter(|m| m.slot.is_affix()).collect()
    }

    pub fn count_in(&self, slot: ModSlot) -> usize {
        self.mods_in(slot).count()
    }

    /// Number of modifiers (implicits included) matching any of `valuable`.
    pub fn valuable_count(&self, valuable: &[ValuableMod]) -> usize {
        self.mods.iter().filter(|m| m.is_valuable(valuable)).count()
    }
}
