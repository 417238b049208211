use regex::Regex;

use crate::errors::{ScanError, ScanResult};

/// Stateless predicate applied to each line.
///
/// Literal mode is substring containment; pattern mode is an unanchored
/// regex search, so anchors behave only when written into the pattern.
#[derive(Debug, Clone)]
pub enum Matcher {
    Literal(String),
    Pattern(Regex),
}

impl Matcher {
    /// Compiles the query into a matcher.
    ///
    /// An invalid regex is a fatal configuration error surfaced before any
    /// line is read. Silently degrading to literal matching would change
    /// semantics, so it is never done.
    pub fn new(query: &str, is_regex: bool) -> ScanResult<Self> {
        if is_regex {
            let regex =
                Regex::new(query).map_err(|e| ScanError::invalid_pattern(e.to_string()))?;
            Ok(Self::Pattern(regex))
        } else {
            Ok(Self::Literal(query.to_string()))
        }
    }

    /// Whether the line satisfies the predicate.
    pub fn is_match(&self, line: &str) -> bool {
        match self {
            Self::Literal(query) => line.contains(query),
            Self::Pattern(regex) => regex.is_match(line),
        }
    }
}
