//! Multi-format materializer.
//!
//! A [`MaterializeConfig`] names up to three independent output targets:
//! delimited text, structured text and a relational warehouse table.
//! [`materialize`] attempts each configured target in that order and
//! aborts on the first failure - no partial cleanup is performed, so
//! targets written before the failing one stay on disk.

pub mod warehouse;

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::codec::{CsvCodec, JsonCodec, TableCodec};
use crate::error::{SinkError, SinkResult};
use crate::table::Table;

pub use warehouse::SqliteWarehouse;

/// Requested output targets. Every target is optional and independent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterializeConfig {
    /// Delimited-text target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv: Option<CsvTarget>,

    /// Structured-text target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<JsonTarget>,

    /// Relational warehouse target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<WarehouseTarget>,
}

impl MaterializeConfig {
    /// Whether any target is configured.
    pub fn is_empty(&self) -> bool {
        self.csv.is_none() && self.json.is_none() && self.warehouse.is_none()
    }
}

/// Delimited-text output: header row then one line per record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvTarget {
    pub path: PathBuf,

    /// Field separator, comma unless configured otherwise.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

/// Structured-text output: an array of key-value objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonTarget {
    pub path: PathBuf,
}

/// Relational output: a SQLite database file and a table name.
///
/// The table is dropped and recreated on every write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseTarget {
    pub db: PathBuf,
    pub table: String,
}

fn default_delimiter() -> char {
    ','
}

/// Write `table` to every configured target.
///
/// Targets are attempted in csv, json, warehouse order; the first
/// failure aborts the remaining targets. Returns the names of the
/// targets actually written.
pub fn materialize(table: &Table, config: &MaterializeConfig) -> SinkResult<Vec<String>> {
    let mut written = Vec::new();

    if let Some(target) = &config.csv {
        write_csv(table, target)?;
        info!(path = %target.path.display(), "materialized csv");
        written.push("csv".to_string());
    }

    if let Some(target) = &config.json {
        write_json(table, target)?;
        info!(path = %target.path.display(), "materialized json");
        written.push("json".to_string());
    }

    if let Some(target) = &config.warehouse {
        let mut store = SqliteWarehouse::open(&target.db)?;
        store.replace_table(&target.table, table)?;
        info!(db = %target.db.display(), table = %target.table, "materialized warehouse");
        written.push("warehouse".to_string());
    }

    Ok(written)
}

/// Write a table as delimited text to `target.path`.
pub fn write_csv(table: &Table, target: &CsvTarget) -> SinkResult<()> {
    let mut file = create_file(&target.path)?;
    CsvCodec::new(target.delimiter).write(table, &mut file)
}

/// Write a table as a JSON array of objects to `target.path`.
pub fn write_json(table: &Table, target: &JsonTarget) -> SinkResult<()> {
    let mut file = create_file(&target.path)?;
    JsonCodec.write(table, &mut file)
}

/// Create a target file, making parent directories as needed.
fn create_file(path: &Path) -> SinkResult<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| SinkError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
    }
    File::create(path).map_err(|e| SinkError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
