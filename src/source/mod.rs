//! Delimited-text row source with encoding and delimiter auto-detection.
//!
//! Reads a header row plus data rows into a [`Table`]. Field names come
//! from the header; every value is read as text. No structural checks
//! happen here - that is [`crate::validate`]'s job.

use std::path::Path;

use csv::{ReaderBuilder, Trim};
use tracing::{debug, info};

use crate::codec::delimiter_byte;
use crate::error::{SourceError, SourceResult};
use crate::table::{Record, Schema, Table};

/// Delimiters considered during auto-detection, most common first.
const CANDIDATE_DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

/// Result of reading a source, with detection metadata.
#[derive(Debug, Clone)]
pub struct ReadResult {
    /// The parsed table.
    pub table: Table,
    /// Detected or requested encoding.
    pub encoding: String,
    /// Detected or requested delimiter.
    pub delimiter: char,
    /// Header-derived schema.
    pub schema: Schema,
}

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let detected = chardet::detect(bytes);
    let charset = detected.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the given encoding name.
pub fn decode_content(bytes: &[u8], encoding: &str) -> SourceResult<String> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8(bytes.to_vec())
            .map_err(|e| SourceError::Encoding(format!("invalid UTF-8: {}", e))),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => {
            Ok(encoding_rs::ISO_8859_15.decode(bytes).0.to_string())
        }
        "windows-1252" | "cp1252" => Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.to_string()),
        // Unknown charset: fall back to lossy UTF-8
        _ => Ok(String::from_utf8_lossy(bytes).to_string()),
    }
}

/// Detect the delimiter by counting occurrences in the header line.
///
/// Defaults to comma when nothing wins outright.
pub fn detect_delimiter(content: &str) -> char {
    let header = content.lines().next().unwrap_or("");

    let mut best_sep = ',';
    let mut best_count = 0;

    for sep in CANDIDATE_DELIMITERS {
        let count = header.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse delimited text into a [`Table`].
///
/// Values are trimmed and unquoted; rows shorter than the header are
/// padded with empty text, extra columns are ignored.
///
/// # Example
/// ```ignore
/// let table = read_str("name,calories\nA,120\nB,80", ',')?;
/// assert_eq!(table.len(), 2);
/// ```
pub fn read_str(content: &str, delimiter: char) -> SourceResult<Table> {
    if content.trim().is_empty() {
        return Err(SourceError::Empty);
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter_byte(delimiter))
        .trim(Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(SourceError::NoHeaders);
    }

    let mut table = Table::new();
    for row in reader.records() {
        let row = row?;
        if row.iter().all(|v| v.is_empty()) {
            continue;
        }
        let record: Record = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), row.get(i).unwrap_or("").into()))
            .collect();
        table.push(record);
    }

    info!(rows = table.len(), "read {} data rows", table.len());
    Ok(table)
}

/// Read a file with a fixed delimiter; encoding is still auto-detected.
pub fn read_file<P: AsRef<Path>>(path: P, delimiter: char) -> SourceResult<ReadResult> {
    let bytes = read_bytes_from(path.as_ref())?;
    read_bytes(&bytes, Some(delimiter))
}

/// Read a file with auto-detection of encoding and delimiter.
///
/// # Example
/// ```ignore
/// let result = read_file_auto("cereal.csv")?;
/// println!("{} ('{}'): {} rows", result.encoding, result.delimiter, result.table.len());
/// ```
pub fn read_file_auto<P: AsRef<Path>>(path: P) -> SourceResult<ReadResult> {
    let bytes = read_bytes_from(path.as_ref())?;
    read_bytes(&bytes, None)
}

/// Read raw bytes with auto-detection of encoding and delimiter.
pub fn read_bytes_auto(bytes: &[u8]) -> SourceResult<ReadResult> {
    read_bytes(bytes, None)
}

fn read_bytes_from(path: &Path) -> SourceResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| SourceError::MissingFile {
        path: path.to_path_buf(),
        source: e,
    })
}

fn read_bytes(bytes: &[u8], delimiter: Option<char>) -> SourceResult<ReadResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));
    debug!(%encoding, %delimiter, "detected input format");

    let table = read_str(&content, delimiter)?;
    let schema = header_schema(&content, delimiter);

    Ok(ReadResult {
        table,
        encoding,
        delimiter,
        schema,
    })
}

/// Schema straight from the header line, available even for header-only
/// input (the table itself would be empty then).
fn header_schema(content: &str, delimiter: char) -> Schema {
    let fields = content
        .lines()
        .next()
        .unwrap_or("")
        .split(delimiter)
        .map(|h| h.trim().trim_matches('"').to_string())
        .collect();
    Schema::new(fields)
}
