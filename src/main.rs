//! Tabload CLI - validate, transform and load delimited tabular data
//!
//! # Main Commands
//!
//! ```bash
//! tabload run pipeline.json         # Full pipeline from a run config
//! tabload load input.csv --db out.db --table cereals
//! ```
//!
//! # Inspection Commands
//!
//! ```bash
//! tabload parse input.csv           # Parse + validate, JSON to stdout
//! tabload schema input.csv          # Show detected encoding/delimiter/schema
//! tabload sort input.csv --by calories
//! tabload normalize input.csv --fields calories,protein --by cups
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tabload::{
    codec::record_to_json, normalize_by_factor, read_file, read_file_auto, sort_by_field,
    validate, CsvTarget, ReadResult, RunConfig, SqliteWarehouse, Table,
};

#[derive(Parser)]
#[command(name = "tabload")]
#[command(about = "Validate, transform and load delimited tabular data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a delimited file, validate its structure and output JSON
    Parse {
        /// Input file
        input: PathBuf,

        /// Delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show detected encoding, delimiter and schema
    Schema {
        /// Input file
        input: PathBuf,

        /// Delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// Sort by a numeric field (stable, ascending)
    Sort {
        /// Input file
        input: PathBuf,

        /// Field to sort by
        #[arg(short, long)]
        by: String,

        /// Delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// JSON output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the result as delimited text
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Rescale numeric fields by a per-record factor field
    Normalize {
        /// Input file
        input: PathBuf,

        /// Comma-separated list of fields to rescale
        #[arg(short, long)]
        fields: String,

        /// Field holding the per-record divisor
        #[arg(short, long)]
        by: String,

        /// Delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// JSON output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the result as delimited text
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Load a delimited file straight into a SQLite warehouse table
    Load {
        /// Input file
        input: PathBuf,

        /// SQLite database file
        #[arg(long)]
        db: PathBuf,

        /// Warehouse table name (dropped and recreated)
        #[arg(short, long)]
        table: String,

        /// Delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// Run a full pipeline from a JSON run config
    Run {
        /// Run config file
        config: PathBuf,
    },
}

fn main() {
    tabload::logging::init("info");

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse {
            input,
            delimiter,
            output,
        } => cmd_parse(&input, delimiter, output.as_deref()),

        Commands::Schema { input, delimiter } => cmd_schema(&input, delimiter),

        Commands::Sort {
            input,
            by,
            delimiter,
            output,
            csv,
        } => cmd_sort(&input, &by, delimiter, output.as_deref(), csv.as_deref()),

        Commands::Normalize {
            input,
            fields,
            by,
            delimiter,
            output,
            csv,
        } => cmd_normalize(
            &input,
            &fields,
            &by,
            delimiter,
            output.as_deref(),
            csv.as_deref(),
        ),

        Commands::Load {
            input,
            db,
            table,
            delimiter,
        } => cmd_load(&input, &db, &table, delimiter),

        Commands::Run { config } => cmd_run(&config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn read_input(input: &Path, delimiter: Option<char>) -> Result<ReadResult, Box<dyn std::error::Error>> {
    let result = match delimiter {
        Some(d) => read_file(input, d)?,
        None => read_file_auto(input)?,
    };
    Ok(result)
}

fn cmd_parse(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Parsing: {}", input.display());

    let result = read_input(input, delimiter)?;
    let schema = validate(&result.table)?;

    eprintln!("   Encoding: {}", result.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(result.delimiter));
    eprintln!("   Fields: {}", schema);
    eprintln!("Parsed {} records", result.table.len());

    write_output(&table_json(&result.table)?, output)?;
    Ok(())
}

fn cmd_schema(input: &Path, delimiter: Option<char>) -> Result<(), Box<dyn std::error::Error>> {
    let result = read_input(input, delimiter)?;
    let schema = validate(&result.table)?;

    println!("encoding:  {}", result.encoding);
    println!("delimiter: '{}'", format_delimiter(result.delimiter));
    println!("rows:      {}", result.table.len());
    println!("schema:    {}", schema);
    Ok(())
}

fn cmd_sort(
    input: &Path,
    by: &str,
    delimiter: Option<char>,
    output: Option<&Path>,
    csv_out: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Sorting {} by '{}'", input.display(), by);

    let result = read_input(input, delimiter)?;
    validate(&result.table)?;

    let sorted = sort_by_field(&result.table, by)?;
    eprintln!("Sorted {} records", sorted.len());

    write_results(&sorted, output, csv_out)
}

fn cmd_normalize(
    input: &Path,
    fields: &str,
    by: &str,
    delimiter: Option<char>,
    output: Option<&Path>,
    csv_out: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let field_list: Vec<String> = fields
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect();

    eprintln!(
        "Normalizing {} field(s) of {} by '{}'",
        field_list.len(),
        input.display(),
        by
    );

    let result = read_input(input, delimiter)?;
    validate(&result.table)?;

    let normalized = normalize_by_factor(&result.table, &field_list, by)?;
    eprintln!("Normalized {} records", normalized.len());

    write_results(&normalized, output, csv_out)
}

fn cmd_load(
    input: &Path,
    db: &Path,
    table: &str,
    delimiter: Option<char>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Loading {} into {}:{}", input.display(), db.display(), table);

    let result = read_input(input, delimiter)?;
    validate(&result.table)?;

    let mut store = SqliteWarehouse::open(db)?;
    store.replace_table(table, &result.table)?;

    eprintln!("Loaded {} rows", store.row_count(table)?);
    Ok(())
}

fn cmd_run(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Running pipeline: {}", config_path.display());

    let config = RunConfig::from_file(config_path)?;
    let report = tabload::run(&config)?;

    eprintln!("   Encoding: {}", report.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(report.delimiter));
    eprintln!("   Schema: {}", report.schema);
    eprintln!("   Rows: {}", report.rows);
    eprintln!("   Transforms applied: {}", report.transforms);
    if report.written.is_empty() {
        eprintln!("   No outputs configured");
    } else {
        eprintln!("   Written: {}", report.written.join(", "));
    }
    eprintln!("Done");
    Ok(())
}

/// Serialize a table as pretty JSON, preserving field order.
fn table_json(table: &Table) -> Result<String, Box<dyn std::error::Error>> {
    let rows: Vec<serde_json::Value> = table.iter().map(record_to_json).collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}

/// Print JSON to stdout or a file, optionally also writing a CSV copy.
fn write_results(
    table: &Table,
    output: Option<&Path>,
    csv_out: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    write_output(&table_json(table)?, output)?;

    if let Some(path) = csv_out {
        tabload::sink::write_csv(
            table,
            &CsvTarget {
                path: path.to_path_buf(),
                delimiter: ',',
            },
        )?;
        eprintln!("CSV written to: {}", path.display());
    }
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}
