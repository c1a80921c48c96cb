//! Reload coordination: ingest, resolve, merge, publish
//!
//! The engine owns the raw layer store, the schema registry, and the
//! currently published cache. `reload()` is a full re-derivation from the
//! registered layers on every call; it never reads the previous cache, so
//! repeated calls over unchanged inputs publish identical content under
//! fresh generation numbers.

use crate::cache::ConvertedCache;
use crate::layer::{Layer, RawLayerStore};
use crate::merge::{merge_layers, MergedEntry};
use crate::resolve::{resolve_levels, ResolvedEntry};
use crate::schema::{CategorySchema, SchemaRegistry};
use crate::types::{ContentCategory, FieldMap, RawDocumentSet};
use crate::{DuplicateBaseLayer, ResolveError};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// One key dropped from a reload, with the error that dropped it
#[derive(Debug, Clone)]
pub struct FailedKey {
    pub category: ContentCategory,
    pub key: String,
    pub error: ResolveError,
}

/// Outcome of one reload
///
/// A reload always publishes; `failed_keys` lists entries excluded from the
/// new cache. The generation number is the notification boundary: hosts
/// announce "content updated" from it, the engine fires no events itself.
#[derive(Debug)]
pub struct ReloadReport {
    pub generation: u64,
    pub failed_keys: Vec<FailedKey>,
}

impl ReloadReport {
    /// Whether every key resolved
    pub fn is_clean(&self) -> bool {
        self.failed_keys.is_empty()
    }
}

/// The content-resolution engine: layer ingestion, reload, and queries
///
/// Single-threaded by design; mutation (`register_layer`, `reload`) takes
/// `&mut self` and is serialized by the host's tick. Published caches are
/// immutable and freely shared via [`ContentEngine::cache`].
#[derive(Debug, Default)]
pub struct ContentEngine {
    store: RawLayerStore,
    schemas: SchemaRegistry,
    published: Arc<ConvertedCache>,
}

impl ContentEngine {
    /// Create an engine with no layers, no schemas, and an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a category schema, replacing any existing one
    ///
    /// A category must have a schema before any layer referencing it can
    /// resolve; until then its keys fail with `NoSchemaForCategory`.
    pub fn register_category_schema(&mut self, category: ContentCategory, schema: CategorySchema) {
        self.schemas.register(category, schema);
    }

    /// Register a raw layer, replacing any same-named layer wholesale
    pub fn register_layer(
        &mut self,
        name: impl Into<String>,
        order: u32,
        documents: RawDocumentSet,
    ) -> Result<(), DuplicateBaseLayer> {
        self.store.register_layer(Layer::new(name, order, documents))
    }

    /// Re-derive and publish a new cache from the registered layers
    pub fn reload(&mut self) -> ReloadReport {
        let generation = self.published.generation() + 1;
        let span = tracing::info_span!("reload", generation);
        let _guard = span.enter();

        // Step 1: snapshot the layer list, base first
        let layers = self.store.layers_in_order();
        tracing::debug!(layers = layers.len(), "ingesting raw layers");

        // Step 2: per-layer delta resolution, collecting per-key failures
        let mut failed_keys = Vec::new();
        let mut resolved: Vec<(ContentCategory, String, Vec<Vec<ResolvedEntry>>)> = Vec::new();

        for &category in ContentCategory::all() {
            let keys: BTreeSet<&str> = layers.iter().flat_map(|l| l.keys(category)).collect();
            if keys.is_empty() {
                continue;
            }

            let Some(schema) = self.schemas.get(category) else {
                for key in keys {
                    failed_keys.push(FailedKey {
                        category,
                        key: key.to_string(),
                        error: ResolveError::NoSchemaForCategory(category),
                    });
                }
                continue;
            };

            'keys: for key in keys {
                let mut per_layer = Vec::new();
                for layer in layers {
                    if let Some(raw) = layer.levels(category, key) {
                        match resolve_levels(category, schema, raw) {
                            Ok(entries) => per_layer.push(entries),
                            Err(error) => {
                                tracing::warn!(%category, key, %error, "dropping key");
                                failed_keys.push(FailedKey {
                                    category,
                                    key: key.to_string(),
                                    error,
                                });
                                continue 'keys;
                            }
                        }
                    }
                }
                resolved.push((category, key.to_string(), per_layer));
            }
        }
        tracing::debug!(keys = resolved.len(), "delta resolution complete");

        // Step 3: merge layers per key
        let mut entries: HashMap<ContentCategory, HashMap<String, MergedEntry>> = HashMap::new();
        for (category, key, per_layer) in resolved {
            entries
                .entry(category)
                .or_default()
                .insert(key, merge_layers(&per_layer));
        }

        // Step 4: construct the next snapshot
        let layer_names: Vec<String> = layers.iter().map(|l| l.name().to_string()).collect();
        let cache = ConvertedCache::new(generation, layer_names, entries);

        // Step 5: atomic publish, previous cache stays valid for its holders
        tracing::info!(
            entries = cache.len(),
            failed = failed_keys.len(),
            "publishing converted cache"
        );
        self.published = Arc::new(cache);

        ReloadReport {
            generation,
            failed_keys,
        }
    }

    /// The currently published cache snapshot
    pub fn cache(&self) -> Arc<ConvertedCache> {
        Arc::clone(&self.published)
    }

    /// Generation of the currently published cache
    pub fn generation(&self) -> u64 {
        self.published.generation()
    }

    /// Look up one key in the current cache
    pub fn get(&self, category: ContentCategory, key: &str) -> Option<&MergedEntry> {
        self.published.get(category, key)
    }

    /// Absolute field map for one key at one level (1-based)
    pub fn get_level(&self, category: ContentCategory, key: &str, level: u32) -> Option<&FieldMap> {
        self.published.get_level(category, key, level)
    }

    /// All keys resolved for a category in the current cache
    pub fn all_keys(&self, category: ContentCategory) -> impl Iterator<Item = &str> {
        self.published.all_keys(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldKind, MergePolicy};
    use crate::types::{FieldValue, RawFieldMap, RawValue};

    fn weapon_schema() -> CategorySchema {
        CategorySchema::new()
            .with_field("power", FieldKind::Float, MergePolicy::Accumulate)
            .with_field("area", FieldKind::Float, MergePolicy::Accumulate)
    }

    fn enemy_schema() -> CategorySchema {
        CategorySchema::new().with_field("health", FieldKind::Float, MergePolicy::Accumulate)
    }

    fn docs(
        category: ContentCategory,
        key: &str,
        levels: &[&[(&str, i64)]],
    ) -> RawDocumentSet {
        let level_maps: Vec<RawFieldMap> = levels
            .iter()
            .map(|fields| {
                fields
                    .iter()
                    .map(|(name, value)| {
                        (name.to_string(), RawValue::Plain(FieldValue::Int(*value)))
                    })
                    .collect()
            })
            .collect();
        let mut keys = HashMap::new();
        keys.insert(key.to_string(), level_maps);
        let mut set = HashMap::new();
        set.insert(category, keys);
        set
    }

    fn merge_docs(into: &mut RawDocumentSet, from: RawDocumentSet) {
        for (category, keys) in from {
            into.entry(category).or_default().extend(keys);
        }
    }

    fn power(engine: &ContentEngine, key: &str, level: u32) -> f64 {
        engine
            .get_level(ContentCategory::Weapon, key, level)
            .unwrap()["power"]
            .as_f64()
            .unwrap()
    }

    #[test]
    fn test_empty_state_reload_is_valid() {
        let mut engine = ContentEngine::new();
        let report = engine.reload();

        assert_eq!(report.generation, 1);
        assert!(report.is_clean());
        for &category in ContentCategory::all() {
            assert_eq!(engine.all_keys(category).count(), 0);
        }
    }

    #[test]
    fn test_idempotent_rederivation() {
        let mut engine = ContentEngine::new();
        engine.register_category_schema(ContentCategory::Weapon, weapon_schema());
        engine
            .register_layer(
                "core",
                0,
                docs(ContentCategory::Weapon, "whip", &[&[("power", 10)], &[("power", 5)]]),
            )
            .unwrap();

        let first = engine.reload();
        let first_cache = engine.cache();
        let second = engine.reload();
        let second_cache = engine.cache();

        assert_eq!(first.generation, 1);
        assert_eq!(second.generation, 2);
        assert!(first_cache.content_eq(&second_cache));
    }

    #[test]
    fn test_round_trip_scenario() {
        let mut engine = ContentEngine::new();
        engine.register_category_schema(ContentCategory::Weapon, weapon_schema());
        engine
            .register_layer(
                "core",
                0,
                docs(
                    ContentCategory::Weapon,
                    "whip",
                    &[&[("power", 10)], &[("power", 5)], &[("power", 5)]],
                ),
            )
            .unwrap();
        engine.reload();
        assert_eq!(power(&engine, "whip", 3), 20.0);

        engine
            .register_layer(
                "expansion",
                1,
                docs(ContentCategory::Weapon, "whip", &[&[("power", 100)]]),
            )
            .unwrap();
        engine.reload();

        assert_eq!(power(&engine, "whip", 1), 100.0);
        assert_eq!(power(&engine, "whip", 3), 110.0);
    }

    #[test]
    fn test_overlay_pure_addition() {
        let mut engine = ContentEngine::new();
        engine.register_category_schema(ContentCategory::Weapon, weapon_schema());
        engine
            .register_layer(
                "core",
                0,
                docs(ContentCategory::Weapon, "whip", &[&[("power", 10)]]),
            )
            .unwrap();
        engine
            .register_layer(
                "expansion",
                1,
                docs(ContentCategory::Weapon, "laser", &[&[("power", 3)], &[("power", 2)]]),
            )
            .unwrap();
        engine.reload();

        let laser = engine.get(ContentCategory::Weapon, "laser").unwrap();
        assert_eq!(laser.level_count(), 2);
        assert_eq!(power(&engine, "laser", 2), 5.0);
        assert_eq!(power(&engine, "whip", 1), 10.0);
    }

    #[test]
    fn test_per_key_failure_isolation() {
        let mut engine = ContentEngine::new();
        engine.register_category_schema(ContentCategory::Weapon, weapon_schema());
        engine.register_category_schema(ContentCategory::Enemy, enemy_schema());

        let mut set = docs(ContentCategory::Weapon, "whip", &[&[("power", 10)]]);
        merge_docs(
            &mut set,
            docs(ContentCategory::Weapon, "cursed", &[&[("banana", 1)]]),
        );
        merge_docs(
            &mut set,
            docs(ContentCategory::Enemy, "bat", &[&[("health", 20)]]),
        );
        engine.register_layer("core", 0, set).unwrap();

        let report = engine.reload();

        assert_eq!(report.failed_keys.len(), 1);
        assert_eq!(report.failed_keys[0].key, "cursed");
        assert!(matches!(
            report.failed_keys[0].error,
            ResolveError::UnknownFieldForCategory { .. }
        ));
        assert!(engine.get(ContentCategory::Weapon, "cursed").is_none());
        assert!(engine.get(ContentCategory::Weapon, "whip").is_some());
        assert!(engine.get(ContentCategory::Enemy, "bat").is_some());
    }

    #[test]
    fn test_missing_schema_fails_whole_category() {
        let mut engine = ContentEngine::new();
        engine.register_category_schema(ContentCategory::Weapon, weapon_schema());

        let mut set = docs(ContentCategory::Weapon, "whip", &[&[("power", 10)]]);
        merge_docs(
            &mut set,
            docs(ContentCategory::Enemy, "bat", &[&[("health", 20)]]),
        );
        engine.register_layer("core", 0, set).unwrap();

        let report = engine.reload();

        assert_eq!(report.failed_keys.len(), 1);
        assert!(matches!(
            report.failed_keys[0].error,
            ResolveError::NoSchemaForCategory(ContentCategory::Enemy)
        ));
        assert!(engine.get(ContentCategory::Weapon, "whip").is_some());

        // Registering the schema repairs the category on the next reload
        engine.register_category_schema(ContentCategory::Enemy, enemy_schema());
        let report = engine.reload();
        assert!(report.is_clean());
        assert!(engine.get(ContentCategory::Enemy, "bat").is_some());
    }

    #[test]
    fn test_previous_cache_survives_republish() {
        let mut engine = ContentEngine::new();
        engine.register_category_schema(ContentCategory::Weapon, weapon_schema());
        engine
            .register_layer(
                "core",
                0,
                docs(ContentCategory::Weapon, "whip", &[&[("power", 10)]]),
            )
            .unwrap();
        engine.reload();
        let old = engine.cache();

        engine
            .register_layer(
                "core",
                0,
                docs(ContentCategory::Weapon, "whip", &[&[("power", 99)]]),
            )
            .unwrap();
        engine.reload();

        assert_eq!(old.generation(), 1);
        assert_eq!(
            old.get_level(ContentCategory::Weapon, "whip", 1).unwrap()["power"],
            FieldValue::Float(10.0)
        );
        assert_eq!(power(&engine, "whip", 1), 99.0);
    }

    #[test]
    fn test_duplicate_base_layer_rejected() {
        let mut engine = ContentEngine::new();
        engine.register_layer("core", 0, HashMap::new()).unwrap();
        let err = engine
            .register_layer("other", 0, HashMap::new())
            .unwrap_err();
        assert_eq!(err.existing, "core");
    }

    #[test]
    fn test_cache_records_layer_names_in_order() {
        let mut engine = ContentEngine::new();
        engine.register_category_schema(ContentCategory::Weapon, weapon_schema());
        engine
            .register_layer("expansion", 1, HashMap::new())
            .unwrap();
        engine.register_layer("core", 0, HashMap::new()).unwrap();
        engine.reload();

        assert_eq!(engine.cache().layer_names(), ["core", "expansion"]);
    }
}
