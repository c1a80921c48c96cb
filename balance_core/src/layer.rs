//! Raw layer storage
//!
//! Layers are pure containers: no field validation happens here. A layer's
//! raw content is replace-only; re-registering the same name swaps the
//! documents wholesale.

use crate::types::{ContentCategory, RawDocumentSet, RawFieldMap};
use crate::DuplicateBaseLayer;

/// One ordered raw data source: the base definition set (order 0) or an
/// overlay pack (order 1..N)
#[derive(Debug, Clone)]
pub struct Layer {
    name: String,
    order: u32,
    documents: RawDocumentSet,
}

impl Layer {
    pub fn new(name: impl Into<String>, order: u32, documents: RawDocumentSet) -> Self {
        Layer {
            name: name.into(),
            order,
            documents,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    /// Whether this is the base layer
    pub fn is_base(&self) -> bool {
        self.order == 0
    }

    /// Raw per-level maps for one key, if this layer defines it
    pub fn levels(&self, category: ContentCategory, key: &str) -> Option<&[RawFieldMap]> {
        self.documents
            .get(&category)
            .and_then(|keys| keys.get(key))
            .map(|levels| levels.as_slice())
    }

    /// Keys this layer defines for a category
    pub fn keys(&self, category: ContentCategory) -> impl Iterator<Item = &str> {
        self.documents
            .get(&category)
            .into_iter()
            .flat_map(|keys| keys.keys().map(|k| k.as_str()))
    }
}

/// Ordered collection of raw layers, base first
///
/// Order 0 is reserved for the single base layer. Equal non-zero orders are
/// tie-broken by layer name so iteration never depends on registration time.
#[derive(Debug, Default)]
pub struct RawLayerStore {
    layers: Vec<Layer>,
}

impl RawLayerStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a layer, replacing any existing layer with the same name
    ///
    /// Fails with [`DuplicateBaseLayer`] if a differently-named layer is
    /// already registered at order 0.
    pub fn register_layer(&mut self, layer: Layer) -> Result<(), DuplicateBaseLayer> {
        if layer.order == 0 {
            if let Some(base) = self.layers.iter().find(|l| l.order == 0) {
                if base.name != layer.name {
                    return Err(DuplicateBaseLayer {
                        existing: base.name.clone(),
                        rejected: layer.name,
                    });
                }
            }
        }

        self.layers.retain(|l| l.name != layer.name);
        let at = self
            .layers
            .partition_point(|l| (l.order, l.name.as_str()) < (layer.order, layer.name.as_str()));
        self.layers.insert(at, layer);
        Ok(())
    }

    /// Layers sorted by order, base first
    pub fn layers_in_order(&self) -> &[Layer] {
        &self.layers
    }

    /// The base layer, if one has been registered
    pub fn base(&self) -> Option<&Layer> {
        self.layers.first().filter(|l| l.is_base())
    }

    /// Look up a layer by name
    pub fn get(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawValue;
    use crate::FieldValue;
    use std::collections::HashMap;

    fn docs_with(category: ContentCategory, key: &str, levels: usize) -> RawDocumentSet {
        let mut level_maps = Vec::new();
        for i in 0..levels {
            let mut map: RawFieldMap = HashMap::new();
            map.insert(
                "power".to_string(),
                RawValue::Plain(FieldValue::Int(i as i64)),
            );
            level_maps.push(map);
        }
        let mut keys = HashMap::new();
        keys.insert(key.to_string(), level_maps);
        let mut docs = HashMap::new();
        docs.insert(category, keys);
        docs
    }

    #[test]
    fn test_layers_sorted_by_order() {
        let mut store = RawLayerStore::new();
        store
            .register_layer(Layer::new("dlc_two", 2, HashMap::new()))
            .unwrap();
        store
            .register_layer(Layer::new("core", 0, HashMap::new()))
            .unwrap();
        store
            .register_layer(Layer::new("dlc_one", 1, HashMap::new()))
            .unwrap();

        let names: Vec<&str> = store.layers_in_order().iter().map(|l| l.name()).collect();
        assert_eq!(names, vec!["core", "dlc_one", "dlc_two"]);
        assert_eq!(store.base().unwrap().name(), "core");
    }

    #[test]
    fn test_second_base_layer_rejected() {
        let mut store = RawLayerStore::new();
        store
            .register_layer(Layer::new("core", 0, HashMap::new()))
            .unwrap();

        let err = store
            .register_layer(Layer::new("other_core", 0, HashMap::new()))
            .unwrap_err();
        assert_eq!(err.existing, "core");
        assert_eq!(err.rejected, "other_core");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_reregister_replaces_wholesale() {
        let mut store = RawLayerStore::new();
        store
            .register_layer(Layer::new(
                "core",
                0,
                docs_with(ContentCategory::Weapon, "whip", 3),
            ))
            .unwrap();
        store
            .register_layer(Layer::new(
                "core",
                0,
                docs_with(ContentCategory::Weapon, "axe", 2),
            ))
            .unwrap();

        assert_eq!(store.len(), 1);
        let base = store.base().unwrap();
        assert!(base.levels(ContentCategory::Weapon, "whip").is_none());
        assert_eq!(base.levels(ContentCategory::Weapon, "axe").unwrap().len(), 2);
    }

    #[test]
    fn test_equal_orders_tie_break_by_name() {
        let mut store = RawLayerStore::new();
        store
            .register_layer(Layer::new("zeta", 1, HashMap::new()))
            .unwrap();
        store
            .register_layer(Layer::new("alpha", 1, HashMap::new()))
            .unwrap();

        let names: Vec<&str> = store.layers_in_order().iter().map(|l| l.name()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_layer_keys_iteration() {
        let mut docs = docs_with(ContentCategory::Weapon, "whip", 1);
        docs.get_mut(&ContentCategory::Weapon)
            .unwrap()
            .insert("axe".to_string(), Vec::new());
        let layer = Layer::new("core", 0, docs);

        let mut keys: Vec<&str> = layer.keys(ContentCategory::Weapon).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["axe", "whip"]);
        assert_eq!(layer.keys(ContentCategory::Enemy).count(), 0);
    }
}
