//! Explicit pipeline composition and the one-shot run entry point.
//!
//! A pipeline is a plain ordered list of named stage closures built by
//! the caller - there is no global registry and nothing is registered at
//! load time. [`run`] wires the standard flow together:
//!
//! ```text
//! ┌────────────┐   ┌────────────┐   ┌────────────┐   ┌────────────┐
//! │ Row Source │──▶│ Structural │──▶│ Transforms │──▶│    Sink    │
//! │  (source)  │   │ (validate) │   │(transform) │   │   (sink)   │
//! └────────────┘   └────────────┘   └────────────┘   └────────────┘
//! ```
//!
//! All stages execute sequentially to completion; each consumes the full
//! table produced by the previous one.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PipelineError, PipelineResult, TransformResult};
use crate::sink::{self, MaterializeConfig};
use crate::source;
use crate::table::{Schema, Table};
use crate::transform::TransformSpec;
use crate::validate;

/// One composed stage: borrows a table, produces a fresh one.
pub type Stage = Box<dyn Fn(&Table) -> TransformResult<Table>>;

/// An explicit, caller-built ordered list of stages.
///
/// # Example
/// ```ignore
/// let pipeline = Pipeline::new()
///     .stage("sort_by_calories", |t| sort_by_field(t, "calories"));
/// let sorted = pipeline.run(table)?;
/// ```
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<(String, Stage)>,
}

impl Pipeline {
    /// An empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a named stage.
    pub fn stage<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Table) -> TransformResult<Table> + 'static,
    {
        self.stages.push((name.into(), Box::new(f)));
        self
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the pipeline has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Validate the input table, then run every stage in order.
    ///
    /// Each stage's output replaces the previous table; the first
    /// failing stage aborts the run.
    pub fn run(&self, input: Table) -> PipelineResult<Table> {
        validate::validate(&input)?;

        let mut table = input;
        for (name, stage) in &self.stages {
            table = stage(&table)?;
            info!(stage = %name, rows = table.len(), "stage complete");
        }
        Ok(table)
    }
}

/// Everything one `run` needs, loadable from a JSON file.
///
/// ```json
/// {
///   "input": "data/cereal.csv",
///   "transforms": [
///     { "op": "normalize", "fields": ["calories"], "by": "cups" },
///     { "op": "sort_by", "field": "calories" }
///   ],
///   "outputs": {
///     "csv": { "path": "out/cereal.csv" },
///     "warehouse": { "db": "out/warehouse.db", "table": "normalized_cereals" }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Input delimited-text file.
    pub input: PathBuf,

    /// Fixed input delimiter; auto-detected when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,

    /// Transform steps, applied in order.
    #[serde(default)]
    pub transforms: Vec<TransformSpec>,

    /// Output targets.
    #[serde(default)]
    pub outputs: MaterializeConfig,
}

impl RunConfig {
    /// Parse a run config from JSON text.
    pub fn from_json(json: &str) -> PipelineResult<Self> {
        serde_json::from_str(json).map_err(|e| PipelineError::Config(e.to_string()))
    }

    /// Load a run config from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> PipelineResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("cannot read '{}': {}", path.display(), e)))?;
        Self::from_json(&json)
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Detected or requested input encoding.
    pub encoding: String,
    /// Detected or requested input delimiter.
    pub delimiter: char,
    /// Rows in the final table.
    pub rows: usize,
    /// The validated schema.
    pub schema: Schema,
    /// Transform steps applied.
    pub transforms: usize,
    /// Output targets written, in order.
    pub written: Vec<String>,
}

/// Execute a full pipeline run: read, validate, transform, materialize.
pub fn run(config: &RunConfig) -> PipelineResult<RunReport> {
    info!(input = %config.input.display(), "starting pipeline run");

    // Row source
    let read = match config.delimiter {
        Some(delimiter) => source::read_file(&config.input, delimiter)?,
        None => source::read_file_auto(&config.input)?,
    };

    // Structural validator
    let schema = validate::validate(&read.table)?;

    // Transform steps, in config order
    let mut table = read.table;
    for spec in &config.transforms {
        table = spec.apply(&table)?;
        info!(stage = spec.name(), rows = table.len(), "stage complete");
    }

    // Sink
    let written = sink::materialize(&table, &config.outputs)?;

    Ok(RunReport {
        encoding: read.encoding,
        delimiter: read.delimiter,
        rows: table.len(),
        schema,
        transforms: config.transforms.len(),
        written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use crate::table::Record;
    use crate::transform::sort_by_field;

    fn cereal_csv() -> &'static str {
        "name,calories\nA,120\nB,80\nC,200\n"
    }

    fn record(pairs: &[(&str, &str)]) -> Record {
        let mut r = Record::new();
        for (k, v) in pairs {
            r.push(*k, *v);
        }
        r
    }

    #[test]
    fn test_explicit_composition() {
        let table = Table::from_records(vec![
            record(&[("name", "A"), ("calories", "120")]),
            record(&[("name", "B"), ("calories", "80")]),
        ]);

        let pipeline = Pipeline::new().stage("sort", |t| sort_by_field(t, "calories"));
        assert_eq!(pipeline.len(), 1);

        let out = pipeline.run(table).unwrap();
        assert_eq!(out.records()[0].get("name").unwrap().to_string(), "B");
    }

    #[test]
    fn test_pipeline_validates_input() {
        let pipeline = Pipeline::new();
        let err = pipeline.run(Table::new()).unwrap_err();
        assert!(matches!(err, PipelineError::Structure(_)));
    }

    #[test]
    fn test_pipeline_stage_error_aborts() {
        let table = Table::from_records(vec![record(&[("name", "A")])]);
        let pipeline = Pipeline::new()
            .stage("boom", |_| Err(TransformError::UnknownField("x".into())))
            .stage("never", |t| Ok(t.clone()));
        assert!(pipeline.run(table).is_err());
    }

    #[test]
    fn test_run_config_parsing() {
        let config = RunConfig::from_json(
            r#"{
                "input": "cereal.csv",
                "transforms": [{ "op": "sort_by", "field": "calories" }],
                "outputs": { "csv": { "path": "out.csv" } }
            }"#,
        )
        .unwrap();
        assert_eq!(config.transforms.len(), 1);
        assert!(config.outputs.csv.is_some());
        assert!(config.delimiter.is_none());
    }

    #[test]
    fn test_run_config_rejects_garbage() {
        assert!(matches!(
            RunConfig::from_json("{ not json"),
            Err(PipelineError::Config(_))
        ));
        assert!(matches!(
            RunConfig::from_file("/no/such/config.json"),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn test_end_to_end_sort_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("cereal.csv");
        std::fs::write(&input, cereal_csv()).unwrap();

        let out_csv = dir.path().join("sorted.csv");
        let config = RunConfig {
            input,
            delimiter: None,
            transforms: vec![TransformSpec::SortBy {
                field: "calories".into(),
            }],
            outputs: MaterializeConfig {
                csv: Some(crate::sink::CsvTarget {
                    path: out_csv.clone(),
                    delimiter: ',',
                }),
                json: None,
                warehouse: None,
            },
        };

        let report = run(&config).unwrap();
        assert_eq!(report.rows, 3);
        assert_eq!(report.written, vec!["csv"]);
        assert_eq!(report.schema.fields(), ["name", "calories"]);

        let text = std::fs::read_to_string(out_csv).unwrap();
        assert_eq!(text, "name,calories\nB,80\nA,120\nC,200\n");
    }

    #[test]
    fn test_end_to_end_normalize_to_warehouse() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("cereal.csv");
        std::fs::write(&input, "name,calories,cups\nA,120,0.5\nB,90,3\n").unwrap();

        let db = dir.path().join("warehouse.db");
        let config = RunConfig {
            input,
            delimiter: None,
            transforms: vec![TransformSpec::Normalize {
                fields: vec!["calories".into()],
                by: "cups".into(),
            }],
            outputs: MaterializeConfig {
                csv: None,
                json: None,
                warehouse: Some(crate::sink::WarehouseTarget {
                    db: db.clone(),
                    table: "normalized_cereals".into(),
                }),
            },
        };

        let report = run(&config).unwrap();
        assert_eq!(report.written, vec!["warehouse"]);

        let store = crate::sink::SqliteWarehouse::open(&db).unwrap();
        assert_eq!(store.row_count("normalized_cereals").unwrap(), 2);
        let calories: f64 = store
            .connection()
            .query_row(
                "SELECT \"calories\" FROM \"normalized_cereals\" ORDER BY rowid LIMIT 1",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!((calories - 240.0).abs() < 1e-9);
    }

    #[test]
    fn test_run_rejects_structural_mismatch() {
        let table = Table::from_records(vec![
            record(&[("name", "A")]),
            record(&[("calories", "120")]),
        ]);
        let err = Pipeline::new().run(table).unwrap_err();
        assert!(err.to_string().contains("structural mismatch"));
    }

    #[test]
    fn test_run_division_by_zero_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("cereal.csv");
        std::fs::write(&input, "name,calories,cups\nA,120,0\n").unwrap();

        let out_json = dir.path().join("out.json");
        let config = RunConfig {
            input,
            delimiter: None,
            transforms: vec![TransformSpec::Normalize {
                fields: vec!["calories".into()],
                by: "cups".into(),
            }],
            outputs: MaterializeConfig {
                csv: None,
                json: Some(crate::sink::JsonTarget {
                    path: out_json.clone(),
                }),
                warehouse: None,
            },
        };

        let err = run(&config).unwrap_err();
        assert!(err.to_string().contains("division by zero"));
        assert!(!out_json.exists());
    }
}
