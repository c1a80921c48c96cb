//! The published, immutable, query-ready dataset
//!
//! A cache is built wholesale by a reload and never mutated afterwards.
//! Consumers hold it behind `Arc`; a newer generation replaces the shared
//! reference but leaves every outstanding handle intact.

use crate::merge::MergedEntry;
use crate::types::{ContentCategory, FieldMap};
use std::collections::HashMap;

/// Immutable snapshot of all resolved content
#[derive(Debug, Clone, Default)]
pub struct ConvertedCache {
    generation: u64,
    layer_names: Vec<String>,
    entries: HashMap<ContentCategory, HashMap<String, MergedEntry>>,
}

impl ConvertedCache {
    pub(crate) fn new(
        generation: u64,
        layer_names: Vec<String>,
        entries: HashMap<ContentCategory, HashMap<String, MergedEntry>>,
    ) -> Self {
        ConvertedCache {
            generation,
            layer_names,
            entries,
        }
    }

    /// Monotonically increasing counter identifying this snapshot
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Names of the layers that produced this snapshot, base first
    pub fn layer_names(&self) -> &[String] {
        &self.layer_names
    }

    /// Look up one key's merged entry
    pub fn get(&self, category: ContentCategory, key: &str) -> Option<&MergedEntry> {
        self.entries.get(&category).and_then(|keys| keys.get(key))
    }

    /// Absolute field map for one key at one level (1-based)
    pub fn get_level(&self, category: ContentCategory, key: &str, level: u32) -> Option<&FieldMap> {
        self.get(category, key).and_then(|entry| entry.level(level))
    }

    /// All keys resolved for a category
    ///
    /// The iterator is restartable and reads only this snapshot; a newer
    /// published generation is never observed mid-iteration.
    pub fn all_keys(&self, category: ContentCategory) -> impl Iterator<Item = &str> {
        self.entries
            .get(&category)
            .into_iter()
            .flat_map(|keys| keys.keys().map(|k| k.as_str()))
    }

    /// Number of resolved keys in a category
    pub fn key_count(&self, category: ContentCategory) -> usize {
        self.entries.get(&category).map_or(0, |keys| keys.len())
    }

    /// Total number of resolved keys across all categories
    pub fn len(&self) -> usize {
        self.entries.values().map(|keys| keys.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compare resolved content, ignoring generation and layer names
    ///
    /// Two back-to-back reloads over unchanged layers produce caches for
    /// which this returns true even though their generations differ.
    pub fn content_eq(&self, other: &ConvertedCache) -> bool {
        self.entries == other.entries
    }
}
