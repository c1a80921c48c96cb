use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Content categories, each a namespace of content keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    Weapon,
    PowerUp,
    Character,
    Enemy,
    Stage,
    Item,
    Arcana,
}

impl ContentCategory {
    /// Get all content categories
    pub fn all() -> &'static [ContentCategory] {
        &[
            ContentCategory::Weapon,
            ContentCategory::PowerUp,
            ContentCategory::Character,
            ContentCategory::Enemy,
            ContentCategory::Stage,
            ContentCategory::Item,
            ContentCategory::Arcana,
        ]
    }

    /// Stable identifier used in data files and diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCategory::Weapon => "weapon",
            ContentCategory::PowerUp => "power_up",
            ContentCategory::Character => "character",
            ContentCategory::Enemy => "enemy",
            ContentCategory::Stage => "stage",
            ContentCategory::Item => "item",
            ContentCategory::Arcana => "arcana",
        }
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single typed field value; all values in a resolved entry are absolute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric view; integers widen to f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Whether this value can participate in delta accumulation
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldValue::Int(_) | FieldValue::Float(_))
    }

    /// Human-readable type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Bool(_) => "bool",
            FieldValue::Int(_) => "int",
            FieldValue::Float(_) => "float",
            FieldValue::Text(_) => "text",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(v) => write!(f, "{}", v),
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(v) => write!(f, "{}", v),
        }
    }
}

/// A raw field value as written in a layer document
///
/// Level 1 values are absolute. From level 2 on, a plain value on an
/// accumulating numeric field is a delta; `field = { set = v }` forces the
/// running value to `v` instead of adding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Reset { set: FieldValue },
    Plain(FieldValue),
}

/// One level's raw field map as ingested from a layer document
pub type RawFieldMap = HashMap<String, RawValue>;

/// One level's fully absolute field map
pub type FieldMap = HashMap<String, FieldValue>;

/// Everything one layer contributes: category -> key -> per-level raw maps
/// (index 0 = level 1)
pub type RawDocumentSet = HashMap<ContentCategory, HashMap<String, Vec<RawFieldMap>>>;
