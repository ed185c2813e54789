//! Builders for items and modifiers without going through item text.

use poetxt::{Effect, Item, Modifier, Requirements};
use std::collections::HashMap;

fn modifier(category: &str, description: &str, tier: i32) -> Modifier {
    let effects = description.split(poetxt::DESCRIPTION_JOINER).map(Effect::plain).collect();
    Modifier::new(category, "", tier, Vec::new(), effects)
}

/// A prefix whose effect descriptions are `description` split on `|`.
pub fn prefix(description: &str, tier: i32) -> Modifier {
    modifier("Prefix Modifier", description, tier)
}

pub fn suffix(description: &str, tier: i32) -> Modifier {
    modifier("Suffix Modifier", description, tier)
}

pub fn implicit(description: &str) -> Modifier {
    modifier("Implicit Modifier", description, 0)
}

pub struct ItemBuilder {
    item: Item,
}

impl ItemBuilder {
    pub fn new() -> Self {
        Self {
            item: Item {
                class: "Two Hand Swords".to_string(),
                rarity: "Rare".to_string(),
                name: Some("Test Blade".to_string()),
                base: "Corroded Blade".to_string(),
                traits: HashMap::new(),
                requirements: Requirements::default(),
                sockets: String::new(),
                item_level: 84,
                mods: Vec::new(),
                special_types: None,
            },
        }
    }

    pub fn base(mut self, base: &str) -> Self {
        self.item.base = base.to_string();
        self
    }

    pub fn with_mod(mut self, modifier: Modifier) -> Self {
        self.item.mods.push(modifier);
        self
    }

    pub fn with_prefix(self, description: &str, tier: i32) -> Self {
        self.with_mod(prefix(description, tier))
    }

    pub fn with_suffix(self, description: &str, tier: i32) -> Self {
        self.with_mod(suffix(description, tier))
    }

    pub fn build(self) -> Item {
        self.item
    }
}

impl Default for ItemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poetxt::ModSlot;

    #[test]
    fn test_builder_methods() {
        let item = ItemBuilder::default()
            .base("Jewelled Foil")
            .with_mod(implicit("+X% to Global Critical Strike Multiplier"))
            .with_prefix("X% increased Physical Damage|+X to Accuracy Rating", 2)
            .with_suffix("X% increased Attack Speed", 1)
            .build();

        assert_eq!(item.base, "Jewelled Foil");
        assert_eq!(item.mods.len(), 3);
        assert_eq!(item.mods[0].slot, ModSlot::Implicit);
        assert_eq!(item.prefixes()[0].effects.len(), 2);
        assert_eq!(
            item.prefixes()[0].description(),
            "X% increased Physical Damage|+X to Accuracy Rating"
        );
        assert_eq!(item.suffixes()[0].tier, 1);
    }
}
