use crate::config::{EntryFileConfig, PackManifest};
use crate::PackError;
use balance_core::{ContentEngine, RawDocumentSet};
use std::path::Path;

/// Manifest file name expected at the root of every pack directory
pub const MANIFEST_FILE: &str = "pack.toml";

/// A pack directory loaded into registrable form
#[derive(Debug, Clone)]
pub struct LayerPack {
    pub name: String,
    pub order: u32,
    pub documents: RawDocumentSet,
}

/// Load a pack directory (recursively) into a [`LayerPack`]
pub fn load_pack(dir: &Path) -> Result<LayerPack, PackError> {
    let manifest_path = dir.join(MANIFEST_FILE);
    let content = std::fs::read_to_string(&manifest_path).map_err(|e| PackError::Io {
        error: e,
        path: Some(manifest_path.clone()),
    })?;
    let manifest: PackManifest = toml::from_str(&content).map_err(|e| PackError::ParseToml {
        error: e,
        path: manifest_path.clone(),
    })?;
    if manifest.pack.name.is_empty() {
        return Err(PackError::Validation {
            message: "pack name must not be empty".to_string(),
            path: manifest_path,
        });
    }

    let mut documents = RawDocumentSet::new();
    load_dir(dir, &mut documents)?;

    let entries: usize = documents.values().map(|keys| keys.len()).sum();
    tracing::debug!(
        pack = %manifest.pack.name,
        order = manifest.pack.order,
        entries,
        "loaded content pack"
    );

    Ok(LayerPack {
        name: manifest.pack.name,
        order: manifest.pack.order,
        documents,
    })
}

/// Load a pack and register it as a layer in one call
pub fn register_pack(engine: &mut ContentEngine, dir: &Path) -> Result<(), PackError> {
    let pack = load_pack(dir)?;
    engine.register_layer(pack.name, pack.order, pack.documents)?;
    Ok(())
}

/// Walk a directory recursively, parsing every entry file
fn load_dir(dir: &Path, documents: &mut RawDocumentSet) -> Result<(), PackError> {
    let entries = std::fs::read_dir(dir).map_err(|e| PackError::Io {
        error: e,
        path: Some(dir.to_path_buf()),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| PackError::Io {
            error: e,
            path: Some(dir.to_path_buf()),
        })?;
        let path = entry.path();

        if path.is_dir() {
            load_dir(&path, documents)?;
        } else if path.file_name().is_some_and(|name| name == MANIFEST_FILE) {
            continue;
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            let config = load_toml_entry(&path)?;
            insert_entry(documents, config, &path);
        } else if path.extension().is_some_and(|ext| ext == "json") {
            let config = load_json_entry(&path)?;
            insert_entry(documents, config, &path);
        }
    }

    Ok(())
}

fn load_toml_entry(path: &Path) -> Result<EntryFileConfig, PackError> {
    let content = std::fs::read_to_string(path).map_err(|e| PackError::Io {
        error: e,
        path: Some(path.to_path_buf()),
    })?;
    toml::from_str(&content).map_err(|e| PackError::ParseToml {
        error: e,
        path: path.to_path_buf(),
    })
}

fn load_json_entry(path: &Path) -> Result<EntryFileConfig, PackError> {
    let content = std::fs::read_to_string(path).map_err(|e| PackError::Io {
        error: e,
        path: Some(path.to_path_buf()),
    })?;
    serde_json::from_str(&content).map_err(|e| PackError::ParseJson {
        error: e,
        path: path.to_path_buf(),
    })
}

fn insert_entry(documents: &mut RawDocumentSet, config: EntryFileConfig, path: &Path) {
    let keys = documents.entry(config.entry.category).or_default();
    if keys.insert(config.entry.key.clone(), config.levels).is_some() {
        tracing::warn!(
            category = %config.entry.category,
            key = %config.entry.key,
            path = %path.display(),
            "duplicate entry replaces earlier definition"
        );
    }
}
