//! Cross-layer merge for one content key
//!
//! Layers merge field-wise in op space: at each level, a field explicitly
//! written by a higher-order layer overrides the same field from lower
//! layers; untouched fields keep the lower layer's op. The merged op
//! sequence is then re-accumulated, so an overlay override on an
//! accumulating field rebases the levels that follow it (they carry the
//! overlay's new base plus the lower layer's original deltas).

use crate::resolve::{accumulate, FieldOpMap, ResolvedEntry};
use crate::types::FieldMap;

/// Final absolute per-level entry set for one content key
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergedEntry {
    levels: Vec<FieldMap>,
}

impl MergedEntry {
    pub(crate) fn new(levels: Vec<FieldMap>) -> Self {
        MergedEntry { levels }
    }

    /// Absolute field map for one level (1-based)
    pub fn level(&self, level: u32) -> Option<&FieldMap> {
        if level == 0 {
            return None;
        }
        self.levels.get(level as usize - 1)
    }

    /// Number of levels this key defines
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// All levels in order, index 0 = level 1
    pub fn levels(&self) -> &[FieldMap] {
        &self.levels
    }
}

/// Merge one key's per-layer resolved sequences, lowest order first
///
/// The result length is the maximum level count across contributing layers.
/// A single-element input (key defined by one layer only) passes through
/// unchanged.
pub fn merge_layers(per_layer: &[Vec<ResolvedEntry>]) -> MergedEntry {
    let max_levels = per_layer.iter().map(|seq| seq.len()).max().unwrap_or(0);
    let mut merged_ops: Vec<FieldOpMap> = vec![FieldOpMap::new(); max_levels];

    for layer_seq in per_layer {
        for (index, entry) in layer_seq.iter().enumerate() {
            for (name, op) in &entry.ops {
                merged_ops[index].insert(name.clone(), op.clone());
            }
        }
    }

    let resolved = accumulate(merged_ops);
    MergedEntry::new(resolved.into_iter().map(|entry| entry.values).collect())
}
