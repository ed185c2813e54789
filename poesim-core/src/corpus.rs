//! Historical recombination corpus: stored samples parsed into items and
//! annotated with cross-item modifier matches.

use crate::crossref::CrossRefs;
use crate::store::{CorpusError, Sample, SampleStore};
use poetxt::{Item, ItemParser, ModSlot};

/// A fully parsed sample.
#[derive(Debug, Clone)]
pub struct CorpusRecord {
    /// Storage label (file name) of the sample.
    pub id: String,
    pub input1: Item,
    pub input2: Item,
    pub output: Item,
    pub refs: CrossRefs,
}

impl CorpusRecord {
    /// Total `slot` modifiers across both inputs: the pool size.
    pub fn input_pool(&self, slot: ModSlot) -> usize {
        self.input1.count_in(slot) + self.input2.count_in(slot)
    }

    pub fn output_count(&self, slot: ModSlot) -> usize {
        self.output.count_in(slot)
    }
}

/// Parsed samples in storage order.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub records: Vec<CorpusRecord>,
    /// Labels of samples dropped because one of their items failed to parse.
    pub skipped: Vec<String>,
}

impl Corpus {
    /// Parse every sample. A sample is kept only if all three items parse.
    pub fn from_samples<I>(parser: &mut ItemParser, samples: I) -> Self
    where
        I: IntoIterator<Item = (String, Sample)>,
    {
        let mut corpus = Corpus::default();
        for (id, sample) in samples {
            let input1 = parser.parse_or_log(&sample.input1, &id);
            let input2 = parser.parse_or_log(&sample.input2, &id);
            let output = parser.parse_or_log(&sample.output, &id);

            let (Some(input1), Some(input2), Some(output)) = (input1, input2, output) else {
                log::warn!("Skipping sample {}: not all items parsed", id);
                corpus.skipped.push(id);
                continue;
            };

            let refs = CrossRefs::compute(&input1.mods, &input2.mods, &output.mods);
            corpus.records.push(CorpusRecord {
                id,
                input1,
                input2,
                output,
                refs,
            });
        }
        log::info!(
            "Corpus: {} records, {} skipped",
            corpus.records.len(),
            corpus.skipped.len()
        );
        corpus
    }

    pub fn load(store: &SampleStore, parser: &mut ItemParser) -> Result<Self, CorpusError> {
        Ok(Self::from_samples(parser, store.load_all()?))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_text(name: &str, mods: &[&str]) -> Vec<String> {
        let mut lines: Vec<String> = [
            "Item Class: Two Hand Swords",
            "Rarity: Rare",
            name,
            "Corroded Blade",
            "--------",
            "Requirements:",
            "Level: 44",
            "--------",
            "Item Level: 84",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        for m in mods {
            lines.push("--------".to_string());
            lines.extend(m.lines().map(str::to_string));
        }
        lines
    }

    const PHYS: &str = "{ Prefix Modifier \"Tyrannical\" (Tier: 2) — Damage, Physical, Attack }\n160(155-169)% increased Physical Damage";
    const SPEED: &str = "{ Suffix Modifier \"of Celebration\" (Tier: 3) — Attack, Speed }\n19(17-19)% increased Attack Speed";
    const LIFE: &str = "{ Prefix Modifier \"Healthy\" (Tier: 8) — Life }\n+28(25-29) to maximum Life";

    #[test]
    fn test_records_and_cross_refs() {
        let sample = Sample {
            input1: item_text("Left", &[PHYS, SPEED]),
            input2: item_text("Right", &[LIFE, SPEED]),
            output: item_text("Out", &[PHYS, SPEED]),
        };
        let corpus = Corpus::from_samples(&mut ItemParser::new(), vec![("00001.json".to_string(), sample)]);

        assert_eq!(corpus.len(), 1);
        let record = &corpus.records[0];
        assert_eq!(record.id, "00001.json");
        assert_eq!(record.input_pool(ModSlot::Prefix), 2);
        assert_eq!(record.input_pool(ModSlot::Suffix), 2);
        assert_eq!(record.output_count(ModSlot::Prefix), 1);
        assert_eq!(record.refs.doubled, vec![(1, 1)]);
        assert_eq!(record.refs.kept_first, vec![(0, 0), (1, 1)]);
        assert_eq!(record.refs.kept_second, vec![(1, 1)]);
    }

    #[test]
    fn test_sample_with_unparsable_item_is_skipped() {
        let good = Sample {
            input1: item_text("Left", &[PHYS]),
            input2: item_text("Right", &[LIFE]),
            output: item_text("Out", &[LIFE]),
        };
        let bad = Sample {
            input1: item_text("Left", &[PHYS]),
            input2: item_text("Right", &[LIFE]),
            output: vec!["Item Class: Two Hand Swords".to_string()],
        };
        let corpus = Corpus::from_samples(
            &mut ItemParser::new(),
            vec![
                ("00001.json".to_string(), bad),
                ("00002.json".to_string(), good),
            ],
        );
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.records[0].id, "00002.json");
        assert_eq!(corpus.skipped, vec!["00001.json".to_string()]);
    }
}
