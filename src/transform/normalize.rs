//! Per-record rescaling of numeric fields.

use tracing::debug;

use crate::error::{TransformError, TransformResult};
use crate::table::{Table, Value};

/// Divide each listed field by a per-record factor.
///
/// For every record, the divisor is that record's `factor_field` value
/// coerced to a number, and each field in `fields` is replaced by
/// `value / divisor` as a real. The factor field itself is left
/// untouched, as are all unlisted fields.
///
/// A zero divisor fails the whole operation with
/// [`TransformError::DivisionByZero`] - no partial output is produced.
pub fn normalize_by_factor(
    table: &Table,
    fields: &[String],
    factor_field: &str,
) -> TransformResult<Table> {
    if let Some(schema) = table.schema() {
        for field in fields {
            if !schema.contains(field) {
                return Err(TransformError::UnknownField(field.clone()));
            }
        }
        if !schema.contains(factor_field) {
            return Err(TransformError::UnknownField(factor_field.to_string()));
        }
    }

    let mut out = Table::new();
    for (row, record) in table.iter().enumerate() {
        let factor = record
            .get(factor_field)
            .ok_or_else(|| TransformError::UnknownField(factor_field.to_string()))?;
        let divisor = factor.as_f64().ok_or_else(|| TransformError::NotNumeric {
            field: factor_field.to_string(),
            row,
            value: factor.to_string(),
        })?;
        if divisor == 0.0 {
            return Err(TransformError::DivisionByZero {
                field: factor_field.to_string(),
                row,
            });
        }

        let mut rescaled = record.clone();
        for field in fields {
            let value = rescaled
                .get(field)
                .ok_or_else(|| TransformError::UnknownField(field.clone()))?;
            let number = value.as_f64().ok_or_else(|| TransformError::NotNumeric {
                field: field.clone(),
                row,
                value: value.to_string(),
            })?;
            rescaled.set(field, Value::Real(number / divisor));
        }
        out.push(rescaled);
    }

    debug!(
        fields = fields.len(),
        factor = factor_field,
        "normalized {} records",
        out.len()
    );
    Ok(out)
}
