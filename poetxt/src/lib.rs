//! A parser library for Path of Exile item text.
//!
//! The game client copies items to the clipboard as line-oriented text with
//! `--------` separators and `{ ... }` modifier headers. [`ItemParser`] turns
//! those lines into an [`Item`]: class, rarity, name/base, traits,
//! requirements, sockets, item level, and a list of [`Modifier`]s made of
//! numeric [`Effect`]s.

pub mod error;
pub mod model;
pub mod parser;
pub mod pattern;

pub use error::{ParseError, ParseFailure};
pub use model::{
    Effect, Item, ModSlot, Modifier, RequirementKey, Requirements, ValuableMod,
    DESCRIPTION_JOINER, PLACEHOLDER,
};
pub use parser::{ItemParser, MOD_DELIMITER, SEPARATOR};
pub use pattern::PatternCache;
