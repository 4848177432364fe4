//! Core data model for the tabload pipeline.
//!
//! This module contains the data structures handed from stage to stage:
//!
//! - [`Value`] - one scalar cell (text, integer or real)
//! - [`Record`] - one row as an ordered field-to-value mapping
//! - [`Schema`] - the ordered field-name list a table is validated against
//! - [`Table`] - an ordered sequence of records sharing one schema
//!
//! A `Table` is constructed once by the row source, replaced (never
//! mutated in place) by each transform step and consumed by a sink.
//! Records keep their own key order so that structural validation can
//! compare ordered field names, not just field-name sets.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Value
// =============================================================================

/// One scalar cell.
///
/// The row source reads everything as [`Value::Text`]; transforms coerce
/// values to numbers where their contract requires it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Raw text, exactly as read.
    Text(String),
    /// A whole number.
    Int(i64),
    /// A floating-point number.
    Real(f64),
}

impl Value {
    /// Coerce this value to a float.
    ///
    /// Text is parsed (after trimming); returns `None` when it does not
    /// parse as a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Text(s) => s.trim().parse().ok(),
            Value::Int(i) => Some(*i as f64),
            Value::Real(r) => Some(*r),
        }
    }

    /// Whether this value coerces to a number.
    pub fn is_numeric(&self) -> bool {
        self.as_f64().is_some()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Real(r)
    }
}

// =============================================================================
// Record
// =============================================================================

/// One row: an ordered mapping from field name to value.
///
/// Field order is the order fields were pushed, which for rows read from
/// delimited text is the header order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Order of insertion is preserved.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Replace the value of an existing field, keeping its position.
    ///
    /// Returns `false` if the field does not exist.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => {
                *v = value;
                true
            }
            None => false,
        }
    }

    /// Iterate over `(name, value)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The ordered field-name list of this record.
    pub fn schema(&self) -> Schema {
        Schema::new(self.field_names().map(str::to_string).collect())
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// Schema
// =============================================================================

/// The ordered list of field names defining a table's structure.
///
/// Computed once from the first record and checked by equality against
/// every record, rather than inferring shape per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    fields: Vec<String>,
}

impl Schema {
    /// Create a schema from an ordered field-name list.
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// The schema of a single record.
    pub fn of(record: &Record) -> Self {
        record.schema()
    }

    /// Field names in order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Whether `name` is one of the schema's fields.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }

    /// Whether `record`'s ordered field names equal this schema.
    pub fn matches(&self, record: &Record) -> bool {
        record.len() == self.fields.len()
            && record.field_names().zip(&self.fields).all(|(a, b)| a == b)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fields.join(", "))
    }
}

// =============================================================================
// Table
// =============================================================================

/// An ordered sequence of records sharing one schema.
///
/// The sharing invariant is validated by [`crate::validate::validate`],
/// not merely assumed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    records: Vec<Record>,
}

impl Table {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an ordered record list.
    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// The records in order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consume the table, yielding its records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Append a record.
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The first record's schema, if any.
    ///
    /// Only meaningful once the table passed structural validation.
    pub fn schema(&self) -> Option<Schema> {
        self.records.first().map(Record::schema)
    }

    /// Iterate over records in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

impl FromIterator<Record> for Table {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Table {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> Record {
        let mut r = Record::new();
        for (k, v) in pairs {
            r.push(*k, *v);
        }
        r
    }

    #[test]
    fn test_value_coercion() {
        assert_eq!(Value::Text("120".into()).as_f64(), Some(120.0));
        assert_eq!(Value::Text(" 3.5 ".into()).as_f64(), Some(3.5));
        assert_eq!(Value::Text("abc".into()).as_f64(), None);
        assert_eq!(Value::Int(7).as_f64(), Some(7.0));
        assert_eq!(Value::Real(0.5).as_f64(), Some(0.5));
        assert!(!Value::Text("".into()).is_numeric());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Text("oats".into()).to_string(), "oats");
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Real(120.0).to_string(), "120");
        assert_eq!(Value::Real(1.5).to_string(), "1.5");
    }

    #[test]
    fn test_record_preserves_order() {
        let r = record(&[("name", "A"), ("calories", "120"), ("cups", "1")]);
        let names: Vec<&str> = r.field_names().collect();
        assert_eq!(names, vec!["name", "calories", "cups"]);
        assert_eq!(r.get("calories"), Some(&Value::Text("120".into())));
        assert_eq!(r.get("missing"), None);
    }

    #[test]
    fn test_record_set_keeps_position() {
        let mut r = record(&[("name", "A"), ("calories", "120")]);
        assert!(r.set("calories", Value::Real(60.0)));
        assert!(!r.set("missing", Value::Int(1)));

        let names: Vec<&str> = r.field_names().collect();
        assert_eq!(names, vec!["name", "calories"]);
        assert_eq!(r.get("calories"), Some(&Value::Real(60.0)));
    }

    #[test]
    fn test_schema_matches_is_ordered() {
        let a = record(&[("name", "A"), ("calories", "120")]);
        let b = record(&[("calories", "120"), ("name", "A")]);

        let schema = a.schema();
        assert!(schema.matches(&a));
        // same field-name set, different order: not a match
        assert!(!schema.matches(&b));
    }

    #[test]
    fn test_schema_length_mismatch() {
        let a = record(&[("name", "A"), ("calories", "120")]);
        let short = record(&[("name", "A")]);
        assert!(!a.schema().matches(&short));
    }

    #[test]
    fn test_table_schema_is_first_records() {
        let table = Table::from_records(vec![
            record(&[("name", "A"), ("calories", "120")]),
            record(&[("name", "B"), ("calories", "80")]),
        ]);
        let schema = table.schema().unwrap();
        assert_eq!(schema.fields(), ["name", "calories"]);
        assert!(Table::new().schema().is_none());
    }
}
