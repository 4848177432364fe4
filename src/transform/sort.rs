//! Stable sort of a table by a numeric field.

use tracing::debug;

use crate::error::{TransformError, TransformResult};
use crate::table::Table;

/// Sort a table ascending by the numeric value of `field`.
///
/// The sort is stable: records with equal values keep their original
/// relative order. The input table is left untouched.
///
/// Fails when `field` is not in the table's schema or when any record's
/// value does not parse as a number.
pub fn sort_by_field(table: &Table, field: &str) -> TransformResult<Table> {
    if let Some(schema) = table.schema() {
        if !schema.contains(field) {
            return Err(TransformError::UnknownField(field.to_string()));
        }
    }

    let mut keyed: Vec<(f64, &crate::table::Record)> = Vec::with_capacity(table.len());
    for (row, record) in table.iter().enumerate() {
        let value = record
            .get(field)
            .ok_or_else(|| TransformError::UnknownField(field.to_string()))?;
        let key = value.as_f64().ok_or_else(|| TransformError::NotNumeric {
            field: field.to_string(),
            row,
            value: value.to_string(),
        })?;
        keyed.push((key, record));
    }

    // Vec::sort_by is stable, which is what gives equal keys their
    // original relative order.
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

    if let (Some(first), Some(last)) = (keyed.first(), keyed.last()) {
        debug!(
            field,
            least = first.0,
            greatest = last.0,
            "sorted {} records",
            keyed.len()
        );
    }

    Ok(keyed.into_iter().map(|(_, r)| r.clone()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Record;

    fn row(name: &str, calories: &str) -> Record {
        let mut r = Record::new();
        r.push("name", name);
        r.push("calories", calories);
        r
    }

    #[test]
    fn test_sorts_numerically_not_lexically() {
        let table = Table::from_records(vec![
            row("A", "120"),
            row("B", "80"),
            row("C", "200"),
        ]);
        let sorted = sort_by_field(&table, "calories").unwrap();

        let names: Vec<String> = sorted
            .iter()
            .map(|r| r.get("name").unwrap().to_string())
            .collect();
        // lexical order would put "120" before "80"
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let table = Table::from_records(vec![row("A", "3"), row("B", "3"), row("C", "1")]);
        let sorted = sort_by_field(&table, "calories").unwrap();

        let names: Vec<String> = sorted
            .iter()
            .map(|r| r.get("name").unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_input_not_mutated() {
        let table = Table::from_records(vec![row("A", "2"), row("B", "1")]);
        let before = table.clone();
        let _ = sort_by_field(&table, "calories").unwrap();
        assert_eq!(table, before);
    }

    #[test]
    fn test_unknown_field() {
        let table = Table::from_records(vec![row("A", "1")]);
        let err = sort_by_field(&table, "protein").unwrap_err();
        assert!(matches!(err, TransformError::UnknownField(f) if f == "protein"));
    }

    #[test]
    fn test_non_numeric_value() {
        let table = Table::from_records(vec![row("A", "1"), row("B", "n/a")]);
        let err = sort_by_field(&table, "calories").unwrap_err();
        match err {
            TransformError::NotNumeric { row, value, .. } => {
                assert_eq!(row, 1);
                assert_eq!(value, "n/a");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_sorting_empty_table() {
        let sorted = sort_by_field(&Table::new(), "calories").unwrap();
        assert!(sorted.is_empty());
    }

    #[test]
    fn test_handles_real_values() {
        let mut a = Record::new();
        a.push("name", "A");
        a.push("calories", 1.5);
        let mut b = Record::new();
        b.push("name", "B");
        b.push("calories", 0.5);

        let sorted = sort_by_field(&Table::from_records(vec![a, b]), "calories").unwrap();
        assert_eq!(sorted.records()[0].get("name").unwrap().to_string(), "B");
    }
}
