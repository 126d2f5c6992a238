//! Symptom vocabulary and symptom sets
//!
//! The vocabulary fixes the order of feature slots. Identifiers are
//! normalized the same way on both sides of every lookup, so `"Skin Rash"`
//! and `"skin_rash"` name the same symptom.

use crate::errors::{PredictError, Result};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Canonical form of a symptom identifier
///
/// Trims, lowercases and collapses every run of whitespace, `-` or `_` into
/// a single `_`.
pub fn normalize_symptom(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for ch in raw.trim().chars() {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_sep = true;
            continue;
        }
        if pending_sep && !out.is_empty() {
            out.push('_');
        }
        pending_sep = false;
        out.extend(ch.to_lowercase());
    }
    out
}

/// Ordered list of known symptoms; position equals feature slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomVocabulary {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl SymptomVocabulary {
    /// Build a vocabulary, normalizing entries and rejecting duplicates
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ordered = Vec::new();
        let mut index = HashMap::new();
        for raw in names {
            let name = normalize_symptom(raw.as_ref());
            if name.is_empty() {
                return Err(PredictError::ConfigError(format!(
                    "empty symptom name at position {}",
                    ordered.len()
                )));
            }
            if index.insert(name.clone(), ordered.len()).is_some() {
                return Err(PredictError::ConfigError(format!(
                    "duplicate symptom '{}' in vocabulary",
                    name
                )));
            }
            ordered.push(name);
        }
        Ok(Self {
            names: ordered,
            index,
        })
    }

    /// Parse a vocabulary file: one symptom per line, `#` comments and blank lines ignored
    pub fn parse(text: &str) -> Result<Self> {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            PredictError::ConfigError(format!(
                "Failed to read vocabulary {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&text)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Feature slot of an already-normalized identifier
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.position(&normalize_symptom(raw)).is_some()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Unordered, de-duplicated set of normalized symptom identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymptomSet(BTreeSet<String>);

impl SymptomSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw identifier; blank input is ignored
    pub fn insert(&mut self, raw: &str) -> bool {
        let name = normalize_symptom(raw);
        if name.is_empty() {
            return false;
        }
        self.0.insert(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Symptoms in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for SymptomSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = SymptomSet::new();
        for s in iter {
            set.insert(s.as_ref());
        }
        set
    }
}
