//! Lazily compiled regular expressions, keyed by pattern string.

use crate::error::ParseError;
use regex::Regex;
use std::collections::HashMap;

/// Read-through cache of compiled patterns owned by one parser.
///
/// `Regex` clones share the compiled program, so handing out clones is cheap.
#[derive(Debug, Default, Clone)]
pub struct PatternCache {
    compiled: HashMap<String, Regex>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `pattern` on first use and return the cached program afterwards.
    pub fn get(&mut self, pattern: &str) -> Result<Regex, ParseError> {
        if let Some(re) = self.compiled.get(pattern) {
            return Ok(re.clone());
        }
        let re = Regex::new(pattern).map_err(|e| ParseError::Pattern(e.to_string()))?;
        self.compiled.insert(pattern.to_string(), re.clone());
        Ok(re)
    }

    /// First capture group of the first match, if any.
    pub fn capture(&mut self, text: &str, pattern: &str) -> Result<Option<String>, ParseError> {
        let re = self.get(pattern)?;
        Ok(re
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string()))
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}
