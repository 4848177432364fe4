//! Pure table-to-table transform steps.
//!
//! This module provides:
//! - `sort`: stable ascending sort by a numeric field
//! - `normalize`: per-record rescaling of numeric fields
//! - [`TransformSpec`]: the serde-tagged plan entry a run config carries
//!
//! Every transform consumes a borrowed table and produces a fresh one;
//! the input is never mutated.

pub mod normalize;
pub mod sort;

use serde::{Deserialize, Serialize};

use crate::error::TransformResult;
use crate::table::Table;

// Re-exports for convenience
pub use normalize::normalize_by_factor;
pub use sort::sort_by_field;

/// One planned transform step, as carried by a run config.
///
/// ```json
/// { "op": "sort_by", "field": "calories" }
/// { "op": "normalize", "fields": ["calories", "protein"], "by": "cups" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TransformSpec {
    /// Stable ascending sort by a numeric field.
    SortBy { field: String },

    /// Divide the listed fields by a per-record factor field.
    Normalize { fields: Vec<String>, by: String },
}

impl TransformSpec {
    /// Apply this step to a table, producing a new table.
    pub fn apply(&self, table: &Table) -> TransformResult<Table> {
        match self {
            TransformSpec::SortBy { field } => sort_by_field(table, field),
            TransformSpec::Normalize { fields, by } => normalize_by_factor(table, fields, by),
        }
    }

    /// Short human-readable name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            TransformSpec::SortBy { .. } => "sort_by",
            TransformSpec::Normalize { .. } => "normalize",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_json_roundtrip() {
        let json = r#"[
            { "op": "sort_by", "field": "calories" },
            { "op": "normalize", "fields": ["calories"], "by": "cups" }
        ]"#;
        let specs: Vec<TransformSpec> = serde_json::from_str(json).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name(), "sort_by");
        assert_eq!(specs[1].name(), "normalize");

        let back = serde_json::to_string(&specs).unwrap();
        assert!(back.contains("\"op\":\"sort_by\""));
    }
}
