//! Delta resolution: one layer's raw level sequence to absolute values
//!
//! Level 1 is absolute. For levels 2..N a present value on an accumulating
//! numeric field is a delta added to the running total; replace-policy and
//! non-numeric fields replace outright; absent fields carry forward. A
//! `{ set = v }` reset marker forces the running total for fields that are
//! otherwise cumulative.

use crate::schema::{CategorySchema, MergePolicy};
use crate::types::{ContentCategory, FieldMap, FieldValue, RawFieldMap, RawValue};
use crate::ResolveError;
use std::collections::HashMap;

/// What one level explicitly does to one field
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FieldOp {
    /// Force the running value
    Set(FieldValue),
    /// Add to the running total (numeric accumulating fields only)
    Add(FieldValue),
}

/// Per-level op map: only fields the raw document explicitly mentioned
pub(crate) type FieldOpMap = HashMap<String, FieldOp>;

/// One level of one key within one layer, every field absolute
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedEntry {
    /// Absolute field values, carried forward from earlier levels
    pub values: FieldMap,
    /// The operations this level explicitly declared
    pub(crate) ops: FieldOpMap,
}

/// Resolve one key's raw level sequence against a category schema
///
/// The output has the same length as the input; an empty input resolves to
/// an empty output. Overflow is not clamped here.
pub fn resolve_levels(
    category: ContentCategory,
    schema: &CategorySchema,
    raw_levels: &[RawFieldMap],
) -> Result<Vec<ResolvedEntry>, ResolveError> {
    let mut level_ops = Vec::with_capacity(raw_levels.len());
    for (index, raw) in raw_levels.iter().enumerate() {
        level_ops.push(validate_level(category, schema, raw, index)?);
    }
    Ok(accumulate(level_ops))
}

/// Validate one raw level map into typed field operations
fn validate_level(
    category: ContentCategory,
    schema: &CategorySchema,
    raw: &RawFieldMap,
    level_index: usize,
) -> Result<FieldOpMap, ResolveError> {
    let mut ops = FieldOpMap::with_capacity(raw.len());

    for (name, raw_value) in raw {
        let spec = schema
            .field(name)
            .ok_or_else(|| ResolveError::UnknownFieldForCategory {
                category,
                field: name.clone(),
            })?;

        let op = match raw_value {
            RawValue::Reset { set } => {
                if !spec.kind.is_numeric() {
                    return Err(ResolveError::UnresolvableResetMarker {
                        field: name.clone(),
                        reason: format!("field type {} is not cumulative", spec.kind),
                    });
                }
                if spec.policy == MergePolicy::Replace {
                    return Err(ResolveError::UnresolvableResetMarker {
                        field: name.clone(),
                        reason: "field already replaces on every level".to_string(),
                    });
                }
                FieldOp::Set(coerce_value(spec, name, set)?)
            }
            RawValue::Plain(value) => {
                let coerced = coerce_value(spec, name, value)?;
                if level_index == 0 {
                    FieldOp::Set(coerced)
                } else {
                    match spec.policy {
                        MergePolicy::Replace => FieldOp::Set(coerced),
                        MergePolicy::Accumulate => {
                            if spec.kind.is_numeric() {
                                FieldOp::Add(coerced)
                            } else {
                                FieldOp::Set(coerced)
                            }
                        }
                    }
                }
            }
        };

        ops.insert(name.clone(), op);
    }

    Ok(ops)
}

fn coerce_value(
    spec: &crate::schema::FieldSpec,
    name: &str,
    value: &FieldValue,
) -> Result<FieldValue, ResolveError> {
    spec.kind
        .coerce(value.clone())
        .ok_or_else(|| ResolveError::FieldTypeMismatch {
            field: name.to_string(),
            expected: spec.kind.to_string(),
            found: value.type_name().to_string(),
        })
}

/// Run a validated op sequence into absolute per-level entries
///
/// Shared between the per-layer resolver and the layer merger: merging
/// happens in op space, then this routine re-derives absolutes.
pub(crate) fn accumulate(level_ops: Vec<FieldOpMap>) -> Vec<ResolvedEntry> {
    let mut running: FieldMap = FieldMap::new();
    let mut resolved = Vec::with_capacity(level_ops.len());

    for ops in level_ops {
        for (name, op) in &ops {
            match op {
                FieldOp::Set(value) => {
                    running.insert(name.clone(), value.clone());
                }
                FieldOp::Add(value) => {
                    let next = match (running.get(name), value) {
                        (Some(FieldValue::Int(a)), FieldValue::Int(b)) => FieldValue::Int(a + b),
                        (Some(FieldValue::Float(a)), FieldValue::Float(b)) => {
                            FieldValue::Float(a + b)
                        }
                        // First appearance of the field: the delta counts from zero
                        (_, value) => value.clone(),
                    };
                    running.insert(name.clone(), next);
                }
            }
        }
        resolved.push(ResolvedEntry {
            values: running.clone(),
            ops,
        });
    }

    resolved
}
