//! Structural validation for tables.
//!
//! A table is structurally valid when it is non-empty and every record's
//! ordered field-name sequence equals the first record's. Key *order*
//! matters: two records with the same field-name set in different order
//! do not match.
//!
//! Failure is reported as an `Err` value, never a panic - callers decide
//! how to surface a structural mismatch.

use tracing::debug;

use crate::error::{StructureError, StructureResult};
use crate::table::{Schema, Table};

/// Validate a table's structure and return its schema.
///
/// The schema is computed once from the first record, then checked by
/// ordered equality against every record.
///
/// An empty table is invalid: with no first record there is no schema
/// for the rest of the table to agree on.
pub fn validate(table: &Table) -> StructureResult<Schema> {
    let first = table.records().first().ok_or(StructureError::EmptyTable)?;
    let schema = first.schema();

    for (row, record) in table.iter().enumerate() {
        if !schema.matches(record) {
            return Err(StructureError::Mismatch {
                row,
                expected: schema.to_string(),
                found: record.schema().to_string(),
            });
        }
    }

    debug!(rows = table.len(), fields = schema.len(), "table is structurally valid");
    Ok(schema)
}

/// Quick check: does the table validate?
pub fn is_valid(table: &Table) -> bool {
    validate(table).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Record;

    fn record(pairs: &[(&str, &str)]) -> Record {
        let mut r = Record::new();
        for (k, v) in pairs {
            r.push(*k, *v);
        }
        r
    }

    #[test]
    fn test_uniform_table_is_valid() {
        let table = Table::from_records(vec![
            record(&[("name", "A"), ("calories", "120")]),
            record(&[("name", "B"), ("calories", "80")]),
        ]);
        let schema = validate(&table).unwrap();
        assert_eq!(schema.fields(), ["name", "calories"]);
    }

    #[test]
    fn test_empty_table_is_invalid() {
        let err = validate(&Table::new()).unwrap_err();
        assert!(matches!(err, StructureError::EmptyTable));
    }

    #[test]
    fn test_field_set_mismatch() {
        let table = Table::from_records(vec![
            record(&[("name", "A"), ("calories", "120")]),
            record(&[("name", "B"), ("protein", "4")]),
        ]);
        match validate(&table).unwrap_err() {
            StructureError::Mismatch { row, .. } => assert_eq!(row, 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_field_order_mismatch() {
        // Same field-name set, different order: invalid.
        let table = Table::from_records(vec![
            record(&[("name", "A"), ("calories", "120")]),
            record(&[("calories", "80"), ("name", "B")]),
        ]);
        assert!(!is_valid(&table));
    }

    #[test]
    fn test_length_mismatch() {
        let table = Table::from_records(vec![
            record(&[("name", "A"), ("calories", "120")]),
            record(&[("name", "B")]),
        ]);
        assert!(!is_valid(&table));
    }

    #[test]
    fn test_single_record_is_valid() {
        let table = Table::from_records(vec![record(&[("foo", "1")])]);
        assert!(is_valid(&table));
    }
}
