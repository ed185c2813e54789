//! Line-oriented parser for item text copied from the game client
//! (Ctrl+Alt+C "advanced" copy).
//!
//! Layout of the text, group by group (groups are split by [`SEPARATOR`]):
//!
//! ```text
//! Item Class: Two Hand Swords      <- class, rarity, [name], base
//! Rarity: Rare
//! Apocalypse Blade
//! Corroded Blade
//! --------
//! Physical Damage: 54-113          <- optional traits
//! --------
//! Requirements:                    <- mandatory requirements
//! Level: 44
//! Str: 80
//! --------
//! Sockets: R-R-G                   <- sockets / item level / anything else
//! --------
//! Item Level: 84
//! --------
//! { Prefix Modifier "Dictator's" (Tier: 2) — Damage, Physical, Attack }
//! 90(80-99)% increased Physical Damage     <- one or more modifier groups
//! +96(83-100) to Accuracy Rating
//! --------
//! Synthesised Item                 <- optional trailing markers
//! ```

use crate::error::{ParseError, ParseFailure};
use crate::model::{Effect, Item, Modifier, RequirementKey, Requirements, PLACEHOLDER};
use crate::pattern::PatternCache;
use std::collections::HashMap;

/// Line separating groups of an item's text.
pub const SEPARATOR: &str = "--------";
/// Prefix of a modifier block header line.
pub const MOD_DELIMITER: &str = "{";

const REQUIREMENTS_HEADER: &str = "Requirements:";

const ITEM_CLASS: &str = r"Item Class: (.*)";
const RARITY: &str = r"Rarity: (.*)";
const SOCKETS: &str = r"Sockets: (.*)";
const ITEM_LEVEL: &str = r"Item Level: (.*)";
const TRAIT_VALUE: &str = r"[\d.\-]*\d[\d.\-]*%?";
const MOD_TITLE: &str = r#""(.*)""#;
const MOD_TIER: &str = r"\(Tier: (-?\d+)\)";
const MOD_TAGS: &str = r"— (.*) }";
const MOD_CATEGORY: &str = r#"\{ (.*?) ["(—}]"#;
/// A number, optionally followed directly by its roll range: `20(20-26)`.
const QUANTITY: &str = r"(\d+(?:\.\d+)?)(\([\d\-.][^)]*\))?";
const RANGE: &str = r"^\((-?\d+(?:\.\d+)?)-(-?\d+(?:\.\d+)?)\)$";

/// Parses item text into [`Item`]s.
///
/// Holds the compiled patterns so repeated parses don't recompile them.
#[derive(Debug, Default)]
pub struct ItemParser {
    patterns: PatternCache,
}

impl ItemParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing (possibly pre-warmed) pattern cache.
    pub fn with_cache(patterns: PatternCache) -> Self {
        Self { patterns }
    }

    pub fn patterns(&self) -> &PatternCache {
        &self.patterns
    }

    /// Parse one item. `source` labels the text for diagnostics.
    pub fn parse<S: AsRef<str>>(&mut self, lines: &[S], source: &str) -> Result<Item, ParseFailure> {
        let mut reader = ItemReader {
            lines: lines.iter().map(AsRef::as_ref).collect(),
            patterns: &mut self.patterns,
            line: None,
            name: None,
        };

        match reader.read_item() {
            Ok(item) => Ok(item),
            Err(kind) => Err(ParseFailure {
                source_label: source.to_string(),
                name: reader.name.clone(),
                line: reader.line,
                line_text: reader
                    .line
                    .and_then(|i| reader.lines.get(i))
                    .map(|s| s.to_string()),
                kind,
            }),
        }
    }

    /// Like [`ItemParser::parse`], but logs the failure and yields `None`.
    pub fn parse_or_log<S: AsRef<str>>(&mut self, lines: &[S], source: &str) -> Option<Item> {
        match self.parse(lines, source) {
            Ok(item) => Some(item),
            Err(failure) => {
                log::error!("{}", failure);
                None
            }
        }
    }
}

/// Position-tracking state for a single parse.
struct ItemReader<'a, 'p> {
    lines: Vec<&'a str>,
    patterns: &'p mut PatternCache,
    /// Last line touched; reported on failure.
    line: Option<usize>,
    name: Option<String>,
}

impl<'a> ItemReader<'a, '_> {
    fn at(&mut self, index: usize) -> Result<&'a str, ParseError> {
        self.line = Some(index);
        self.lines
            .get(index)
            .copied()
            .ok_or(ParseError::UnexpectedEof { line: index })
    }

    /// Lines from `start` up to the next separator, and the separator's index
    /// (or the line count when the text ends first).
    fn group(&mut self, start: usize) -> Result<(Vec<&'a str>, usize), ParseError> {
        self.at(start)?;
        let end = self.lines[start..]
            .iter()
            .position(|l| *l == SEPARATOR)
            .map_or(self.lines.len(), |offset| start + offset);
        Ok((self.lines[start..end].to_vec(), end))
    }

    fn expect_separator(&mut self, index: usize) -> Result<(), ParseError> {
        let line = self.at(index)?;
        if line != SEPARATOR {
            return Err(ParseError::ExpectedSeparator {
                found: line.to_string(),
            });
        }
        Ok(())
    }

    fn capture(&mut self, text: &str, pattern: &str) -> Result<Option<String>, ParseError> {
        self.patterns.capture(text, pattern)
    }

    fn required(
        &mut self,
        text: &str,
        pattern: &str,
        field: &'static str,
    ) -> Result<String, ParseError> {
        self.capture(text, pattern)?
            .ok_or(ParseError::MissingField { field })
    }

    fn read_item(&mut self) -> Result<Item, ParseError> {
        let class_line = self.at(0)?;
        let class = self.required(class_line, ITEM_CLASS, "item class")?;
        let rarity_line = self.at(1)?;
        let rarity = self.required(rarity_line, RARITY, "rarity")?;

        // Magic/normal items often carry no name: the base sits directly
        // above the first separator.
        let (name, base, mut sep) = if self.at(3)? == SEPARATOR {
            (None, self.at(2)?.to_string(), 3)
        } else {
            (Some(self.at(2)?.to_string()), self.at(3)?.to_string(), 4)
        };
        self.name = name.clone();
        self.expect_separator(sep)?;

        let traits = if self.at(sep + 1)? != REQUIREMENTS_HEADER {
            let start = sep + 1;
            let (lines, next) = self.group(start)?;
            sep = next;
            self.read_traits(start, &lines)?
        } else {
            HashMap::new()
        };

        let header = self.at(sep + 1)?;
        if header != REQUIREMENTS_HEADER {
            return Err(ParseError::MissingRequirements {
                found: header.to_string(),
            });
        }
        let start = sep + 2;
        let (lines, next) = self.group(start)?;
        sep = next;
        let requirements = self.read_requirements(start, &lines)?;

        // Sockets, item level and whatever else sits between requirements
        // and the first modifier group.
        let last_sep = self.lines.iter().rposition(|l| *l == SEPARATOR);
        let mut sockets = String::new();
        let mut item_level = 0;
        while last_sep.is_some_and(|last| sep < last) {
            let (lines, next) = self.group(sep + 1)?;
            let first = *lines.first().ok_or(ParseError::EmptyGroup)?;
            if first.starts_with(MOD_DELIMITER) {
                break;
            }
            sep = next;
            if first.starts_with("Sockets") {
                sockets = self
                    .required(first, SOCKETS, "sockets")?
                    .trim_matches(' ')
                    .to_string();
            } else if first.starts_with("Item Level") {
                let level = self.required(first, ITEM_LEVEL, "item level")?;
                item_level = parse_int(&level)?;
            }
        }

        let mut mods = Vec::new();
        let mut leftover = None;
        while sep + 1 < self.lines.len() {
            let start = sep + 1;
            let (lines, next) = self.group(start)?;
            sep = next;
            let first = *lines.first().ok_or(ParseError::EmptyGroup)?;
            if !first.starts_with(MOD_DELIMITER) {
                leftover = Some(lines);
                break;
            }
            for (offset, block) in split_blocks(&lines) {
                mods.push(self.read_modifier(start + offset, block)?);
            }
        }

        // Trailing text: either a late "Item Level" group or markers such as
        // "Synthesised Item" / "Fractured Item".
        let mut special_types = None;
        if let Some(lines) = leftover {
            match self.capture(lines[0], ITEM_LEVEL)? {
                Some(level) => item_level = parse_int(&level)?,
                None => special_types = Some(lines.iter().map(|s| s.to_string()).collect()),
            }
        }

        Ok(Item {
            class,
            rarity,
            name,
            base,
            traits,
            requirements,
            sockets,
            item_level,
            mods,
            special_types,
        })
    }

    /// `Key: value` lines. Percentages become fractions, `lo-hi` ranges their midpoint.
    fn read_traits(
        &mut self,
        start: usize,
        lines: &[&str],
    ) -> Result<HashMap<String, f64>, ParseError> {
        let mut traits = HashMap::new();
        for (i, raw) in lines.iter().enumerate() {
            self.line = Some(start + i);
            let Some((key, rest)) = raw.split_once(':') else {
                // The item class is sometimes repeated here on its own
                log::debug!("Ignoring trait line without key: {}", raw);
                continue;
            };
            let Some(token) = self.patterns.get(TRAIT_VALUE)?.find(rest) else {
                log::debug!("Ignoring non-numeric trait: {}", raw);
                continue;
            };
            traits.insert(key.to_string(), parse_trait_value(token.as_str())?);
        }
        Ok(traits)
    }

    fn read_requirements(&mut self, start: usize, lines: &[&str]) -> Result<Requirements, ParseError> {
        let mut requirements = Requirements::default();
        for (i, raw) in lines.iter().enumerate() {
            self.line = Some(start + i);
            let (key, value) = raw
                .split_once(':')
                .ok_or(ParseError::MalformedRequirement)?;
            if value.contains(':') {
                return Err(ParseError::MalformedRequirement);
            }
            // "Str: 155 (138)" - the parenthetical is the unmodified value
            let value = value.find('(').map_or(value, |paren| &value[..paren]);
            let field = RequirementKey::from_key(&key.trim().to_lowercase()).ok_or_else(|| {
                ParseError::UnknownRequirement {
                    key: key.to_string(),
                }
            })?;
            requirements.set(field, parse_int(value)?);
        }
        Ok(requirements)
    }

    fn read_modifier(&mut self, start: usize, block: &[&str]) -> Result<Modifier, ParseError> {
        self.line = Some(start);
        let header = block[0];
        let title = self.capture(header, MOD_TITLE)?.unwrap_or_default();
        let tier = match self.capture(header, MOD_TIER)? {
            Some(tier) => tier
                .parse::<i32>()
                .map_err(|_| ParseError::InvalidNumber { text: tier })?,
            None => 0,
        };
        let tags = self
            .capture(header, MOD_TAGS)?
            .map(|tags| tags.split(", ").map(str::to_string).collect())
            .unwrap_or_default();
        let category = self.required(header, MOD_CATEGORY, "modifier category")?;

        let mut effects: Vec<Effect> = Vec::new();
        for (i, line) in block.iter().enumerate().skip(1) {
            self.line = Some(start + i);
            if line.starts_with('(') {
                effects
                    .last_mut()
                    .ok_or(ParseError::OrphanComment)?
                    .comment_lines
                    .push(line.to_string());
                continue;
            }
            effects.push(self.read_effect(line)?);
        }

        Ok(Modifier::new(category, title, tier, tags, effects))
    }

    fn read_effect(&mut self, line: &str) -> Result<Effect, ParseError> {
        let quantity = self.patterns.get(QUANTITY)?;
        let mut description = String::with_capacity(line.len());
        let mut actual_stats = Vec::new();
        let mut ranges = Vec::new();
        let mut last = 0;

        for caps in quantity.captures_iter(line) {
            let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let mut start = whole.start();
            let mut stat = parse_float(number.as_str())?;
            let range = match caps.get(2) {
                Some(text) => {
                    let range = self.read_range(text.as_str())?;
                    // "-9(-10--5)": the sign belongs to the stat
                    if range[0] < 0.0 && start > last && line[..start].ends_with('-') {
                        start -= 1;
                        stat = -stat;
                    }
                    if stat < range[0] || stat > range[1] {
                        return Err(ParseError::MalformedRange {
                            range: text.as_str().to_string(),
                        });
                    }
                    range
                }
                None => [stat, stat],
            };
            description.push_str(&line[last..start]);
            description.push_str(PLACEHOLDER);
            last = whole.end();

            actual_stats.push(stat);
            ranges.push(range);
        }

        if actual_stats.is_empty() {
            return Ok(Effect::plain(line));
        }
        description.push_str(&line[last..]);

        Ok(Effect {
            actual_stats,
            ranges,
            description,
            comment_lines: Vec::new(),
        })
    }

    fn read_range(&mut self, text: &str) -> Result<[f64; 2], ParseError> {
        let caps = self
            .patterns
            .get(RANGE)?
            .captures(text)
            .ok_or_else(|| ParseError::MalformedRange {
                range: text.to_string(),
            })?;
        match (caps.get(1), caps.get(2)) {
            (Some(lo), Some(hi)) => Ok([parse_float(lo.as_str())?, parse_float(hi.as_str())?]),
            _ => Err(ParseError::MalformedRange {
                range: text.to_string(),
            }),
        }
    }
}

/// Split a modifier group into blocks, each starting at a header line.
/// Yields each block with its offset inside the group.
fn split_blocks<'g, 'a>(lines: &'g [&'a str]) -> Vec<(usize, &'g [&'a str])> {
    let mut blocks = Vec::new();
    let mut start = 0;
    for (i, line) in lines.iter().enumerate().skip(1) {
        if line.starts_with(MOD_DELIMITER) {
            blocks.push((start, &lines[start..i]));
            start = i;
        }
    }
    blocks.push((start, &lines[start..]));
    blocks
}

fn parse_trait_value(token: &str) -> Result<f64, ParseError> {
    let (number, percent) = match token.strip_suffix('%') {
        Some(number) => (number, true),
        None => (token, false),
    };
    let value = if number.contains('-') && !number.starts_with('-') {
        // "Elemental Damage: 30-50 (augmented)"
        let bounds: Vec<&str> = number.split('-').collect();
        if bounds.len() != 2 {
            return Err(ParseError::MalformedTrait {
                value: token.to_string(),
            });
        }
        (parse_float(bounds[0])? + parse_float(bounds[1])?) / 2.0
    } else {
        parse_float(number)?
    };
    Ok(if percent { value / 100.0 } else { value })
}

fn parse_float(text: &str) -> Result<f64, ParseError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| ParseError::InvalidNumber {
            text: text.to_string(),
        })
}

fn parse_int(text: &str) -> Result<u32, ParseError> {
    text.trim()
        .parse::<u32>()
        .map_err(|_| ParseError::InvalidNumber {
            text: text.to_string(),
        })
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
