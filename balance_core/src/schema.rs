//! Category schemas: field types and per-field merge policy
//!
//! A schema must be registered for a category before any layer referencing
//! that category can be resolved. Schemas are serde types so hosts can load
//! them from data files alongside the content itself.

use crate::types::{ContentCategory, FieldValue};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The declared type of a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Float,
    Int,
    Bool,
    Text,
    /// Closed set of allowed string variants
    Enum(Vec<String>),
}

impl FieldKind {
    /// Whether values of this kind can participate in delta accumulation
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldKind::Float | FieldKind::Int)
    }

    /// Check a value against this kind, widening integers for float fields
    ///
    /// Returns `None` on a type mismatch (including an enum value outside
    /// the declared variant set).
    pub fn coerce(&self, value: FieldValue) -> Option<FieldValue> {
        match (self, value) {
            (FieldKind::Float, FieldValue::Float(v)) => Some(FieldValue::Float(v)),
            (FieldKind::Float, FieldValue::Int(v)) => Some(FieldValue::Float(v as f64)),
            (FieldKind::Int, FieldValue::Int(v)) => Some(FieldValue::Int(v)),
            (FieldKind::Bool, FieldValue::Bool(v)) => Some(FieldValue::Bool(v)),
            (FieldKind::Text, FieldValue::Text(v)) => Some(FieldValue::Text(v)),
            (FieldKind::Enum(variants), FieldValue::Text(v)) => {
                if variants.iter().any(|var| var == &v) {
                    Some(FieldValue::Text(v))
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Float => write!(f, "float"),
            FieldKind::Int => write!(f, "int"),
            FieldKind::Bool => write!(f, "bool"),
            FieldKind::Text => write!(f, "text"),
            FieldKind::Enum(variants) => write!(f, "enum[{}]", variants.join(", ")),
        }
    }
}

/// How values of a field combine across levels and layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Levels 2..N carry deltas added to the running total (numeric only)
    #[default]
    Accumulate,
    /// Every level's value replaces the running value outright
    Replace,
}

/// Declared type and merge policy for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub kind: FieldKind,
    #[serde(default)]
    pub policy: MergePolicy,
}

impl FieldSpec {
    pub fn new(kind: FieldKind, policy: MergePolicy) -> Self {
        FieldSpec { kind, policy }
    }
}

/// Field declarations for one content category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorySchema {
    fields: HashMap<String, FieldSpec>,
}

impl CategorySchema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field, replacing any previous declaration (builder style)
    pub fn with_field(
        mut self,
        name: impl Into<String>,
        kind: FieldKind,
        policy: MergePolicy,
    ) -> Self {
        self.fields.insert(name.into(), FieldSpec::new(kind, policy));
        self
    }

    /// Look up one field's declaration
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Number of declared fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Registered schemas, one per content category
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<ContentCategory, CategorySchema>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema, replacing any existing one for the category
    pub fn register(&mut self, category: ContentCategory, schema: CategorySchema) {
        self.schemas.insert(category, schema);
    }

    /// Get the schema for a category
    pub fn get(&self, category: ContentCategory) -> Option<&CategorySchema> {
        self.schemas.get(&category)
    }

    /// Check if a category has a schema
    pub fn contains(&self, category: ContentCategory) -> bool {
        self.schemas.contains_key(&category)
    }
}
