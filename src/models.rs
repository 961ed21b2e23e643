use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// --- Translation Record ---

/// Everything known about the translation of one word.
///
/// Stored whole as a single JSON blob; the store never looks inside it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    /// Primary translation text.
    pub text: String,
    /// Phonetic transcription of the source word, if the service provided one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    /// Alternate translations, grouped by part of speech.
    #[serde(default, skip_serializing_if = "Grouped::is_empty")]
    pub alternates: Grouped<String>,
    /// Definitions of the source word, grouped by part of speech.
    #[serde(default, skip_serializing_if = "Grouped::is_empty")]
    pub definitions: Grouped<Definition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

impl Translation {
    pub fn new(text: impl Into<String>) -> Self {
        Translation {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Items grouped under an optional label.
///
/// Items without a label live in `default` rather than under a sentinel key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grouped<T> {
    #[serde(default = "Vec::new", skip_serializing_if = "Vec::is_empty")]
    pub default: Vec<T>,
    #[serde(default = "BTreeMap::new", skip_serializing_if = "BTreeMap::is_empty")]
    pub labeled: BTreeMap<String, Vec<T>>,
}

impl<T> Default for Grouped<T> {
    fn default() -> Self {
        Grouped {
            default: Vec::new(),
            labeled: BTreeMap::new(),
        }
    }
}

impl<T> Grouped<T> {
    pub fn is_empty(&self) -> bool {
        self.default.is_empty() && self.labeled.values().all(Vec::is_empty)
    }

    /// Appends items under `label`; a missing or blank label means the default bucket.
    pub fn extend_label<I>(&mut self, label: Option<&str>, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        match label.map(str::trim).filter(|l| !l.is_empty()) {
            Some(label) => self
                .labeled
                .entry(label.to_string())
                .or_default()
                .extend(items),
            None => self.default.extend(items),
        }
    }

    /// Iterates over groups, default bucket first (with `None` as its label).
    pub fn groups(&self) -> impl Iterator<Item = (Option<&str>, &[T])> {
        std::iter::once((None, self.default.as_slice()))
            .filter(|(_, items)| !items.is_empty())
            .chain(
                self.labeled
                    .iter()
                    .filter(|(_, items)| !items.is_empty())
                    .map(|(label, items)| (Some(label.as_str()), items.as_slice())),
            )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

// --- Stored Entry ---

/// A saved word together with its quiz counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEntry {
    pub word: String,
    pub translation: Translation,
    /// 1-based insertion position, never reused.
    pub ordinal: i64,
    pub guesses: u32,
    pub misses: u32,
}

/// Counters of one word after a quiz outcome was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub guesses: u32,
    pub misses: u32,
}

/// Position in the saved vocabulary as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// 1-based page number, 0 when there are no pages.
    pub current: u64,
    pub total_pages: u64,
}

impl std::fmt::Display for PageInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Page {} of {}", self.current, self.total_pages)
    }
}
