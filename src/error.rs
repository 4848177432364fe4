//! Error types for the tabload pipeline.
//!
//! This module defines one error enum per pipeline stage:
//!
//! - [`SourceError`] - row source (delimited-text reading) errors
//! - [`StructureError`] - structural validation errors
//! - [`TransformError`] - transform step errors
//! - [`SinkError`] - materializer errors
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across stage boundaries.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Row Source Errors
// =============================================================================

/// Errors while reading delimited text into a table.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Input file missing or unreadable.
    #[error("cannot read '{}': {source}", .path.display())]
    MissingFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Raw bytes could not be decoded to text.
    #[error("failed to decode input: {0}")]
    Encoding(String),

    /// Malformed delimited data.
    #[error("invalid delimited input: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed structured-text (JSON) data.
    #[error("invalid structured input: {0}")]
    Json(#[from] serde_json::Error),

    /// Input is not the expected shape (e.g. JSON that is not an
    /// array of objects).
    #[error("unexpected input shape: {0}")]
    Invalid(String),

    /// Input contained no data at all.
    #[error("input is empty")]
    Empty,

    /// Header row missing or empty.
    #[error("input has no header row")]
    NoHeaders,
}

// =============================================================================
// Structural Validation Errors
// =============================================================================

/// Structural mismatch between records of a table.
#[derive(Debug, Error)]
pub enum StructureError {
    /// A table with no records has no schema to agree on.
    #[error("structural mismatch: table has no records")]
    EmptyTable,

    /// A record's ordered field names differ from the first record's.
    #[error("structural mismatch: record {row} has fields [{found}], expected [{expected}]")]
    Mismatch {
        row: usize,
        expected: String,
        found: String,
    },
}

// =============================================================================
// Transform Errors
// =============================================================================

/// Errors from a transform step.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Referenced field is not part of the table's schema.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A value could not be coerced to a number.
    #[error("field '{field}' in record {row} is not numeric: '{value}'")]
    NotNumeric {
        field: String,
        row: usize,
        value: String,
    },

    /// Per-record divisor was zero.
    #[error("division by zero: '{field}' is zero in record {row}")]
    DivisionByZero { field: String, row: usize },
}

// =============================================================================
// Sink Errors
// =============================================================================

/// Errors while materializing a table to an output target.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Target path could not be created or written.
    #[error("cannot write '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Delimited-text write failed.
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    /// Structured-text write failed.
    #[error("JSON write failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Relational store write failed.
    #[error("warehouse write failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::pipeline::run`].
/// It wraps all stage errors and adds configuration variants.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Row source error.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Structural validation error.
    #[error("{0}")]
    Structure(#[from] StructureError),

    /// Transform step error.
    #[error("transform error: {0}")]
    Transform(#[from] TransformError),

    /// Materializer error.
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    /// Invalid run configuration.
    #[error("invalid run config: {0}")]
    Config(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for row source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for structural validation.
pub type StructureResult<T> = Result<T, StructureError>;

/// Result type for transform steps.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
