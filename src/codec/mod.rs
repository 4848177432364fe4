//! Pluggable table (de)serialization.
//!
//! A [`TableCodec`] turns a byte stream into a [`Table`] and back. The
//! row source and the file sinks are both expressed through codecs, and
//! [`codec_for`] selects an implementation by configured name instead of
//! dispatching on anything dynamic.
//!
//! Two codecs ship in the box:
//! - [`CsvCodec`]: delimited text, header row first, configurable delimiter
//! - [`JsonCodec`]: an array of key-value objects, one per record

use std::io::{Read, Write};

use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde_json::{Map, Number, Value as JsonValue};

use crate::error::{SinkResult, SourceError, SourceResult};
use crate::table::{Record, Table, Value};

/// Reads and writes one external representation of a table.
pub trait TableCodec {
    /// Codec name used for configuration lookup.
    fn name(&self) -> &'static str;

    /// Parse a full table from a reader.
    fn read(&self, reader: &mut dyn Read) -> SourceResult<Table>;

    /// Write a full table to a writer.
    fn write(&self, table: &Table, writer: &mut dyn Write) -> SinkResult<()>;
}

/// Select a codec by configured name (`"csv"` or `"json"`).
pub fn codec_for(name: &str) -> Option<Box<dyn TableCodec>> {
    match name {
        "csv" => Some(Box::new(CsvCodec::default())),
        "json" => Some(Box::new(JsonCodec)),
        _ => None,
    }
}

/// Map a delimiter char to the single byte the csv crate expects.
///
/// Non-ASCII delimiters fall back to comma.
pub fn delimiter_byte(delimiter: char) -> u8 {
    if delimiter.is_ascii() {
        delimiter as u8
    } else {
        b','
    }
}

// =============================================================================
// CSV
// =============================================================================

/// Delimited-text codec: header row, then one line per record in the
/// table's column order.
#[derive(Debug, Clone)]
pub struct CsvCodec {
    delimiter: char,
}

impl CsvCodec {
    /// Codec with an explicit delimiter.
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }
}

impl Default for CsvCodec {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

impl TableCodec for CsvCodec {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn read(&self, reader: &mut dyn Read) -> SourceResult<Table> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(delimiter_byte(self.delimiter))
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(SourceError::NoHeaders);
        }

        let mut table = Table::new();
        for row in csv_reader.records() {
            let row = row?;
            if row.iter().all(str::is_empty) {
                continue;
            }
            table.push(
                headers
                    .iter()
                    .enumerate()
                    .map(|(i, h)| (h.clone(), row.get(i).unwrap_or("").into()))
                    .collect(),
            );
        }
        Ok(table)
    }

    fn write(&self, table: &Table, writer: &mut dyn Write) -> SinkResult<()> {
        // Without a first record there is no header to derive; an empty
        // table writes as an empty file.
        let Some(schema) = table.schema() else {
            return Ok(());
        };

        let mut csv_writer = WriterBuilder::new()
            .delimiter(delimiter_byte(self.delimiter))
            .from_writer(writer);

        csv_writer.write_record(schema.fields())?;
        for record in table {
            csv_writer.write_record(record.iter().map(|(_, v)| v.to_string()))?;
        }
        csv_writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

// =============================================================================
// JSON
// =============================================================================

/// Structured-text codec: a JSON array of objects, one per record, with
/// key order preserved.
#[derive(Debug, Clone, Default)]
pub struct JsonCodec;

impl TableCodec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn read(&self, reader: &mut dyn Read) -> SourceResult<Table> {
        let parsed: JsonValue = serde_json::from_reader(reader)?;
        let rows = parsed
            .as_array()
            .ok_or_else(|| SourceError::Invalid("expected a JSON array of objects".into()))?;

        let mut table = Table::new();
        for row in rows {
            let object = row
                .as_object()
                .ok_or_else(|| SourceError::Invalid("expected a JSON array of objects".into()))?;
            let mut record = Record::new();
            for (name, value) in object {
                record.push(name.clone(), json_to_value(value));
            }
            table.push(record);
        }
        Ok(table)
    }

    fn write(&self, table: &Table, writer: &mut dyn Write) -> SinkResult<()> {
        let rows: Vec<JsonValue> = table.iter().map(record_to_json).collect();
        serde_json::to_writer_pretty(writer, &rows)?;
        Ok(())
    }
}

/// Convert a record to a JSON object, keeping field order.
///
/// Relies on serde_json's `preserve_order` feature, which the crate
/// enables: without it the map would alphabetize keys and ordered-key
/// validation of hydrated tables would break.
pub fn record_to_json(record: &Record) -> JsonValue {
    let mut object = Map::new();
    for (name, value) in record.iter() {
        object.insert(name.to_string(), value_to_json(value));
    }
    JsonValue::Object(object)
}

fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Text(s) => JsonValue::String(s.clone()),
        Value::Int(i) => JsonValue::Number((*i).into()),
        Value::Real(r) => Number::from_f64(*r)
            .map(JsonValue::Number)
            // non-finite reals have no JSON form; fall back to text
            .unwrap_or_else(|| JsonValue::String(r.to_string())),
    }
}

fn json_to_value(value: &JsonValue) -> Value {
    match value {
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Real(n.as_f64().unwrap_or(0.0)),
        },
        JsonValue::Bool(b) => Value::Text(b.to_string()),
        JsonValue::Null => Value::Text(String::new()),
        other => Value::Text(other.to_string()),
    }
}
