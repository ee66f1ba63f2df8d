//! The two-level localization dictionary: culture → key → text.

use crate::i18n::Culture;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// All translations held by a store, keyed by culture and then by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Translations {
    cultures: HashMap<Culture, HashMap<String, String>>,
}

impl Translations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite one translation, returning the previous text.
    pub fn insert(
        &mut self,
        culture: Culture,
        key: impl Into<String>,
        text: impl Into<String>,
    ) -> Option<String> {
        self.cultures
            .entry(culture)
            .or_default()
            .insert(key.into(), text.into())
    }

    pub fn get(&self, culture: &Culture, key: &str) -> Option<&str> {
        self.cultures
            .get(culture)
            .and_then(|entries| entries.get(key))
            .map(String::as_str)
    }

    /// All entries for one culture.
    pub fn culture(&self, culture: &Culture) -> Option<&HashMap<String, String>> {
        self.cultures.get(culture)
    }

    pub fn contains_culture(&self, culture: &Culture) -> bool {
        self.cultures.contains_key(culture)
    }

    /// Cultures in tag order.
    pub fn cultures(&self) -> Vec<&Culture> {
        let mut cultures: Vec<_> = self.cultures.keys().collect();
        cultures.sort();
        cultures
    }

    pub fn culture_count(&self) -> usize {
        self.cultures.len()
    }

    pub fn key_count(&self, culture: &Culture) -> usize {
        self.cultures.get(culture).map_or(0, HashMap::len)
    }

    /// Total number of (culture, key) entries.
    pub fn len(&self) -> usize {
        self.cultures.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop a key from every culture. Returns whether anything was removed.
    pub fn remove_key(&mut self, key: &str) -> bool {
        let mut removed = false;
        for entries in self.cultures.values_mut() {
            removed |= entries.remove(key).is_some();
        }
        self.cultures.retain(|_, entries| !entries.is_empty());
        removed
    }

    /// Flip the dictionary into key → [(culture, text)].
    ///
    /// Keys iterate in sorted order and cultures within a key in tag order, so
    /// the merge engine visits the grid in a stable sequence.
    pub fn by_key(&self) -> BTreeMap<&str, Vec<(&Culture, &str)>> {
        let mut flipped: BTreeMap<&str, Vec<(&Culture, &str)>> = BTreeMap::new();
        for (culture, entries) in &self.cultures {
            for (key, text) in entries {
                flipped
                    .entry(key.as_str())
                    .or_default()
                    .push((culture, text.as_str()));
            }
        }
        for translations in flipped.values_mut() {
            translations.sort_by(|a, b| a.0.cmp(b.0));
        }
        flipped
    }

    /// Merge every entry of `other` into this dictionary, overwriting on conflict.
    pub fn extend(&mut self, other: Translations) {
        for (culture, entries) in other.cultures {
            self.cultures.entry(culture).or_default().extend(entries);
        }
    }
}
