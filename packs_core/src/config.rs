use balance_core::{ContentCategory, RawFieldMap};
use serde::Deserialize;

/// Manifest at the root of a pack directory (`pack.toml`)
#[derive(Debug, Deserialize)]
pub struct PackManifest {
    pub pack: PackConfig,
}

/// The layer this pack registers as
#[derive(Debug, Deserialize)]
pub struct PackConfig {
    pub name: String,
    /// Layer order; 0 is the base set, overlays use 1..N
    #[serde(default)]
    pub order: u32,
}

/// One content entry file: header plus per-level field maps
///
/// The first `[[levels]]` table is level 1 (absolute values); later tables
/// carry deltas for accumulating fields.
#[derive(Debug, Deserialize)]
pub struct EntryFileConfig {
    pub entry: EntryHeader,
    #[serde(default)]
    pub levels: Vec<RawFieldMap>,
}

/// Which (category, key) an entry file defines
#[derive(Debug, Deserialize)]
pub struct EntryHeader {
    pub category: ContentCategory,
    pub key: String,
}
