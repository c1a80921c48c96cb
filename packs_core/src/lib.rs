//! packs_core - Content pack loading for the balance engine
//!
//! A pack is a directory holding a `pack.toml` manifest (layer name and
//! order) plus one file per content entry, TOML or JSON, walked
//! recursively. Loading produces the raw document shape `balance_core`
//! ingests; no delta resolution happens here.
//!
//! ```text
//! my_expansion/
//!   pack.toml
//!   weapon/
//!     whip.toml
//!   enemy/
//!     bat.json
//! ```

mod config;
mod loader;

pub use config::{EntryFileConfig, EntryHeader, PackConfig, PackManifest};
pub use loader::{load_pack, register_pack, LayerPack, MANIFEST_FILE};

use balance_core::DuplicateBaseLayer;
use std::path::PathBuf;
use thiserror::Error;

/// Error loading a content pack directory
#[derive(Debug, Error)]
pub enum PackError {
    #[error("IO error reading '{path:?}': {error}")]
    Io {
        error: std::io::Error,
        path: Option<PathBuf>,
    },
    #[error("Parse error in '{path}': {error}")]
    ParseToml {
        error: toml::de::Error,
        path: PathBuf,
    },
    #[error("Parse error in '{path}': {error}")]
    ParseJson {
        error: serde_json::Error,
        path: PathBuf,
    },
    #[error("Validation error in '{path}': {message}")]
    Validation { message: String, path: PathBuf },
    #[error(transparent)]
    Register(#[from] DuplicateBaseLayer),
}
