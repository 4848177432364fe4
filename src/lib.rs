//! # Tabload - typed tabular pipeline
//!
//! Tabload reads delimited text into a structurally-validated table,
//! applies pure transform steps and materializes the result to one or
//! more output formats.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV File   │────▶│  Validator  │────▶│ Transforms  │────▶│    Sinks    │
//! │ (auto-enc)  │     │ (schema eq) │     │(sort, norm) │     │(csv/json/db)│
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tabload::{RunConfig, run};
//!
//! fn main() {
//!     let config = RunConfig::from_file("pipeline.json").unwrap();
//!     let report = run(&config).unwrap();
//!     println!("wrote {} rows to {:?}", report.rows, report.written);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Per-stage error types
//! - [`table`] - Core data model (Value, Record, Schema, Table)
//! - [`source`] - Delimited-text row source with auto-detection
//! - [`validate`] - Structural validation
//! - [`transform`] - Sort and normalize steps
//! - [`codec`] - Pluggable table (de)serialization
//! - [`sink`] - Multi-format materializer
//! - [`pipeline`] - Explicit composition and the run entry point

// Core modules
pub mod error;
pub mod table;

// Row source
pub mod source;

// Validation
pub mod validate;

// Transforms
pub mod transform;

// Serialization
pub mod codec;

// Sinks
pub mod sink;

// Orchestration
pub mod pipeline;

// Logging
pub mod logging;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    PipelineError,
    SinkError,
    SourceError,
    StructureError,
    TransformError,
};

// =============================================================================
// Re-exports - Data model
// =============================================================================

pub use table::{Record, Schema, Table, Value};

// =============================================================================
// Re-exports - Row source
// =============================================================================

pub use source::{
    detect_delimiter,
    detect_encoding,
    read_bytes_auto,
    read_file,
    read_file_auto,
    read_str,
    ReadResult,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validate::{is_valid, validate};

// =============================================================================
// Re-exports - Transforms
// =============================================================================

pub use transform::{normalize_by_factor, sort_by_field, TransformSpec};

// =============================================================================
// Re-exports - Codecs
// =============================================================================

pub use codec::{codec_for, CsvCodec, JsonCodec, TableCodec};

// =============================================================================
// Re-exports - Sinks
// =============================================================================

pub use sink::{
    materialize,
    CsvTarget,
    JsonTarget,
    MaterializeConfig,
    SqliteWarehouse,
    WarehouseTarget,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{run, Pipeline, RunConfig, RunReport, Stage};
