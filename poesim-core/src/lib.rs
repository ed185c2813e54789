//! # Recombinator Simulation Core
//!
//! Predicts what a recombinator does to two items, based on what it has
//! done to past pairs.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────────┐
//! │ SampleStore │────▶│ Corpus       │────▶│ TransitionTable │
//! │ (json)      │     │ (+CrossRefs) │     │ (pool -> k)     │
//! └─────────────┘     └──────────────┘     └────────┬────────┘
//!                                                   │
//!                     ┌──────────────┐     ┌────────▼────────┐
//!                     │ Report       │◀────│ Simulator       │
//!                     │ (levels 0-3) │     │ (distribution)  │
//!                     └──────────────┘     └─────────────────┘
//! ```
//!
//! ## Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`SampleStore`] | Directory of recorded input/input/output samples |
//! | [`Corpus`] | Parsed samples with cross-item modifier matches |
//! | [`TransitionTable`] | Empirical output-count distribution per pool size |
//! | [`Simulator`] | Enumerates and compresses outcomes for two items |
//! | [`Report`] | Successive summaries of a distribution |

pub mod config;
pub mod corpus;
pub mod crossref;
pub mod frequency;
pub mod report;
pub mod simulator;
pub mod store;
pub mod testing;

pub use config::{ConfigError, SimConfig};
pub use corpus::{Corpus, CorpusRecord};
pub use crossref::{match_modifiers, CrossRefs, InputSide};
pub use frequency::TransitionTable;
pub use report::{
    json_report, print_report, summarize, ClassSummary, CompressionLevel, Goodness, Report,
    SummaryClass,
};
pub use simulator::{
    check_applicable, CompressedState, OutcomeDistribution, OutcomeMod, SimError, Simulator,
};
pub use store::{CorpusError, Sample, SampleStore};
