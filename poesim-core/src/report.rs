//! Successive summaries of a simulated outcome distribution.
//!
//! Level 0 lists every compressed state. Level 1 merges bases and hides
//! junk. Level 2 classifies outcomes against the better input. Level 3 keeps
//! one line per class with a shape breakdown.

use crate::simulator::{CompressedState, OutcomeDistribution, OutcomeMod};
use poetxt::ModSlot;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

/// `(prefix count, suffix count)`.
pub type Shape = (usize, usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum CompressionLevel {
    Raw = 0,
    UserOutcome = 1,
    Goodness = 2,
    Summary = 3,
}

impl TryFrom<u8> for CompressionLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CompressionLevel::Raw),
            1 => Ok(CompressionLevel::UserOutcome),
            2 => Ok(CompressionLevel::Goodness),
            3 => Ok(CompressionLevel::Summary),
            other => Err(format!("compression level must be 0-3, got {}", other)),
        }
    }
}

/// How an outcome compares to the better of the two inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Goodness {
    Worse,
    Same,
    Better,
}

impl Goodness {
    pub fn classify(survivors: usize, best_input: usize) -> Self {
        match survivors.cmp(&best_input) {
            std::cmp::Ordering::Less => Goodness::Worse,
            std::cmp::Ordering::Equal => Goodness::Same,
            std::cmp::Ordering::Greater => Goodness::Better,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Goodness::Worse => "Lose mods",
            Goodness::Same => "Stay max mods",
            Goodness::Better => "Gain mods",
        }
    }
}

/// Level 3 bucket: zero survivors are a brick whatever their goodness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryClass {
    Class(Goodness),
    Brick,
}

impl SummaryClass {
    pub fn label(self) -> &'static str {
        match self {
            SummaryClass::Class(goodness) => goodness.label(),
            SummaryClass::Brick => "BRICK",
        }
    }
}

impl fmt::Display for SummaryClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawOutcome {
    pub state: CompressedState,
    pub probability: f64,
}

/// Level 1: bases merged, junk dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserOutcome {
    pub shape: Shape,
    pub prefixes: Vec<String>,
    pub suffixes: Vec<String>,
    pub goodness: Goodness,
    pub probability: f64,
}

impl UserOutcome {
    pub fn survivors(&self) -> usize {
        self.prefixes.len() + self.suffixes.len()
    }
}

/// Level 2: shapes merged, outcomes grouped by class and surviving mods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassOutcome {
    pub goodness: Goodness,
    pub prefixes: Vec<String>,
    pub suffixes: Vec<String>,
    pub probability: f64,
}

impl ClassOutcome {
    pub fn is_brick(&self) -> bool {
        self.prefixes.is_empty() && self.suffixes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeShare {
    pub shape: Shape,
    pub probability: f64,
}

/// Level 3 line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSummary {
    pub class: SummaryClass,
    pub probability: f64,
    /// The level 2 shape breakdown of this class, bricks included; empty
    /// for the brick line itself.
    pub shapes: Vec<ShapeShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Valuable-modifier counts of the two inputs.
    pub input_valuable: (usize, usize),
    pub raw: Vec<RawOutcome>,
    pub user_outcomes: Vec<UserOutcome>,
    pub class_outcomes: Vec<ClassOutcome>,
    /// Level 2 shape breakdown per class, bricks included.
    pub class_shapes: BTreeMap<Goodness, Vec<ShapeShare>>,
    pub summary: Vec<ClassSummary>,
}

impl Report {
    pub fn best_input(&self) -> usize {
        self.input_valuable.0.max(self.input_valuable.1)
    }

    pub fn summary_probability(&self, class: SummaryClass) -> f64 {
        self.summary
            .iter()
            .find(|line| line.class == class)
            .map_or(0.0, |line| line.probability)
    }
}

fn sort_descending<T>(entries: &mut [T], probability: impl Fn(&T) -> f64) {
    entries.sort_by(|a, b| probability(b).total_cmp(&probability(a)));
}

fn shape_shares(shapes: BTreeMap<Shape, f64>) -> Vec<ShapeShare> {
    let mut shares: Vec<ShapeShare> = shapes
        .into_iter()
        .map(|(shape, probability)| ShapeShare { shape, probability })
        .collect();
    sort_descending(&mut shares, |s| s.probability);
    shares
}

fn descriptions(mods: &[&str]) -> Vec<String> {
    mods.iter().map(|d| d.to_string()).collect()
}

/// Build every level from one distribution.
pub fn summarize(distribution: &OutcomeDistribution, input_valuable: (usize, usize)) -> Report {
    let best_input = input_valuable.0.max(input_valuable.1);

    let mut raw: Vec<RawOutcome> = distribution
        .iter()
        .map(|(state, probability)| RawOutcome {
            state: state.clone(),
            probability,
        })
        .collect();
    sort_descending(&mut raw, |o| o.probability);

    // Level 1
    let mut merged: BTreeMap<(Shape, Vec<String>, Vec<String>), f64> = BTreeMap::new();
    for (state, probability) in distribution.iter() {
        let key = (
            state.shape(),
            descriptions(&state.valuable_prefixes()),
            descriptions(&state.valuable_suffixes()),
        );
        *merged.entry(key).or_insert(0.0) += probability;
    }
    let mut user_outcomes: Vec<UserOutcome> = merged
        .into_iter()
        .map(|((shape, prefixes, suffixes), probability)| {
            let goodness = Goodness::classify(prefixes.len() + suffixes.len(), best_input);
            UserOutcome {
                shape,
                prefixes,
                suffixes,
                goodness,
                probability,
            }
        })
        .collect();
    sort_descending(&mut user_outcomes, |o| o.probability);

    // Level 2
    let mut by_class: BTreeMap<(Goodness, Vec<String>, Vec<String>), f64> = BTreeMap::new();
    let mut class_shape_totals: BTreeMap<Goodness, BTreeMap<Shape, f64>> = BTreeMap::new();
    for outcome in &user_outcomes {
        let key = (
            outcome.goodness,
            outcome.prefixes.clone(),
            outcome.suffixes.clone(),
        );
        *by_class.entry(key).or_insert(0.0) += outcome.probability;
        *class_shape_totals
            .entry(outcome.goodness)
            .or_default()
            .entry(outcome.shape)
            .or_insert(0.0) += outcome.probability;
    }
    let mut class_outcomes: Vec<ClassOutcome> = by_class
        .into_iter()
        .map(|((goodness, prefixes, suffixes), probability)| ClassOutcome {
            goodness,
            prefixes,
            suffixes,
            probability,
        })
        .collect();
    sort_descending(&mut class_outcomes, |o| o.probability);
    let class_shapes: BTreeMap<Goodness, Vec<ShapeShare>> = class_shape_totals
        .into_iter()
        .map(|(goodness, shapes)| (goodness, shape_shares(shapes)))
        .collect();

    // Level 3
    let mut totals: BTreeMap<SummaryClass, f64> = BTreeMap::new();
    for outcome in &class_outcomes {
        let class = if outcome.is_brick() {
            SummaryClass::Brick
        } else {
            SummaryClass::Class(outcome.goodness)
        };
        *totals.entry(class).or_insert(0.0) += outcome.probability;
    }
    let mut summary: Vec<ClassSummary> = totals
        .into_iter()
        .map(|(class, probability)| {
            let shapes = match class {
                SummaryClass::Class(goodness) => {
                    class_shapes.get(&goodness).cloned().unwrap_or_default()
                }
                SummaryClass::Brick => Vec::new(),
            };
            ClassSummary {
                class,
                probability,
                shapes,
            }
        })
        .collect();
    sort_descending(&mut summary, |s| s.probability);

    log::debug!(
        "Report: {} raw states, {} user outcomes, {} classes",
        raw.len(),
        user_outcomes.len(),
        summary.len()
    );

    Report {
        input_valuable,
        raw,
        user_outcomes,
        class_outcomes,
        class_shapes,
        summary,
    }
}

fn percent(probability: f64) -> f64 {
    probability * 100.0
}

fn write_mods(writer: &mut impl Write, slot: ModSlot, mods: &[String]) -> std::io::Result<()> {
    for description in mods {
        writeln!(writer, "({}) {}", slot, description)?;
    }
    Ok(())
}

fn write_state_mods(writer: &mut impl Write, slot: ModSlot, mods: &[OutcomeMod]) -> std::io::Result<()> {
    for m in mods {
        if m.is_junk() {
            writeln!(writer, "({}) {}", slot, m.description())?;
        } else {
            writeln!(writer, "({}) {} (Tier: {})", slot, m.description(), m.tier())?;
        }
    }
    Ok(())
}

/// Generate a human-readable report at `level`
pub fn print_report(
    report: &Report,
    level: CompressionLevel,
    writer: &mut impl Write,
) -> std::io::Result<()> {
    writeln!(writer, "\n=== Recombination Outcomes ===")?;
    writeln!(
        writer,
        "Valuable mods: left={} | right={} | best={}",
        report.input_valuable.0,
        report.input_valuable.1,
        report.best_input()
    )?;
    writeln!(writer)?;

    match level {
        CompressionLevel::Raw => {
            for outcome in &report.raw {
                let (p, s) = outcome.state.shape();
                writeln!(
                    writer,
                    "{:.2}% ({}, {}) base {}",
                    percent(outcome.probability),
                    p,
                    s,
                    outcome.state.base
                )?;
                write_state_mods(writer, ModSlot::Prefix, &outcome.state.prefixes)?;
                write_state_mods(writer, ModSlot::Suffix, &outcome.state.suffixes)?;
                writeln!(writer)?;
            }
        }
        CompressionLevel::UserOutcome => {
            for outcome in &report.user_outcomes {
                writeln!(
                    writer,
                    "{:.2}% {:?} [{}]",
                    percent(outcome.probability),
                    outcome.shape,
                    outcome.goodness.label()
                )?;
                write_mods(writer, ModSlot::Prefix, &outcome.prefixes)?;
                write_mods(writer, ModSlot::Suffix, &outcome.suffixes)?;
                writeln!(writer)?;
            }
        }
        CompressionLevel::Goodness => {
            for outcome in &report.class_outcomes {
                writeln!(
                    writer,
                    "{:.2}% [{}]",
                    percent(outcome.probability),
                    outcome.goodness.label()
                )?;
                write_mods(writer, ModSlot::Prefix, &outcome.prefixes)?;
                write_mods(writer, ModSlot::Suffix, &outcome.suffixes)?;
                if outcome.is_brick() {
                    writeln!(writer, "BRICK")?;
                }
                writeln!(writer)?;
            }
        }
        CompressionLevel::Summary => {
            for line in &report.summary {
                writeln!(writer, "{}: {:.1}%", line.class, percent(line.probability))?;
                for share in &line.shapes {
                    writeln!(
                        writer,
                        "    {:?} {:>5.1}%",
                        share.shape,
                        percent(share.probability)
                    )?;
                }
            }
        }
    }

    Ok(())
}

/// Generate a JSON report of the entries shown at `level`
pub fn json_report(report: &Report, level: CompressionLevel) -> serde_json::Result<String> {
    match level {
        CompressionLevel::Raw => serde_json::to_string_pretty(&report.raw),
        CompressionLevel::UserOutcome => serde_json::to_string_pretty(&report.user_outcomes),
        CompressionLevel::Goodness => serde_json::to_string_pretty(&report.class_outcomes),
        CompressionLevel::Summary => serde_json::to_string_pretty(&report.summary),
    }
}
