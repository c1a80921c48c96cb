//! balance_core - Layered content-resolution engine for game-balance data
//!
//! This library provides:
//! - RawLayerStore: ordered raw layers (one base set plus overlay packs)
//! - Delta resolution: per-level incremental deltas to absolute values
//! - Layer merge: ordered override/extend combination across layers
//! - ContentEngine: the reload pipeline publishing immutable snapshots
//! - ConvertedCache: the query-ready dataset consumed by other systems
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use balance_core::{CategorySchema, ContentCategory, ContentEngine, FieldKind, MergePolicy};
//!
//! let mut engine = ContentEngine::new();
//! engine.register_category_schema(
//!     ContentCategory::Weapon,
//!     CategorySchema::new().with_field("power", FieldKind::Float, MergePolicy::Accumulate),
//! );
//! engine.register_layer("core", 0, base_documents)?;
//! engine.register_layer("expansion", 1, overlay_documents)?;
//!
//! let report = engine.reload();
//! println!("generation {} ({} keys failed)", report.generation, report.failed_keys.len());
//!
//! let cache = engine.cache();
//! let whip = cache.get_level(ContentCategory::Weapon, "whip", 3);
//! ```

mod cache;
mod engine;
mod layer;
mod merge;
mod resolve;
mod schema;
mod types;

pub use cache::ConvertedCache;
pub use engine::{ContentEngine, FailedKey, ReloadReport};
pub use layer::{Layer, RawLayerStore};
pub use merge::{merge_layers, MergedEntry};
pub use resolve::{resolve_levels, ResolvedEntry};
pub use schema::{CategorySchema, FieldKind, FieldSpec, MergePolicy, SchemaRegistry};
pub use types::{ContentCategory, FieldMap, FieldValue, RawDocumentSet, RawFieldMap, RawValue};

use thiserror::Error;

/// Error registering a second base layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("base layer '{existing}' is already registered; cannot register '{rejected}' at order 0")]
pub struct DuplicateBaseLayer {
    pub existing: String,
    pub rejected: String,
}

/// Per-key resolution error
///
/// These are collected into the [`ReloadReport`] and drop only the
/// offending key; they never abort a reload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("no schema registered for category '{0}'")]
    NoSchemaForCategory(ContentCategory),
    #[error("unknown field '{field}' for category '{category}'")]
    UnknownFieldForCategory {
        category: ContentCategory,
        field: String,
    },
    #[error("field '{field}' expects {expected}, got {found}")]
    FieldTypeMismatch {
        field: String,
        expected: String,
        found: String,
    },
    #[error("reset marker on field '{field}' is unresolvable: {reason}")]
    UnresolvableResetMarker { field: String, reason: String },
}
