//! SQLite-backed relational warehouse.
//!
//! Writes use drop-and-recreate semantics: the target table is dropped
//! if it exists, recreated with one column per field, and all records
//! are inserted in table order inside a single transaction. Writing the
//! same table twice therefore leaves the same row set.

use std::fs;
use std::path::Path;

use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};
use tracing::debug;

use crate::error::{SinkError, SinkResult};
use crate::table::{Schema, Table, Value};

/// Column storage class, decided per field from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Text,
    Real,
}

impl ColumnKind {
    fn sql_type(self) -> &'static str {
        match self {
            ColumnKind::Text => "TEXT",
            ColumnKind::Real => "REAL",
        }
    }
}

/// A local SQLite warehouse.
///
/// Create with [`SqliteWarehouse::open`] for file-backed storage or
/// [`SqliteWarehouse::in_memory`] for tests. The connection lives for
/// the scope of the value and is released on drop, error paths included.
pub struct SqliteWarehouse {
    conn: Connection,
}

impl SqliteWarehouse {
    /// Open or create a SQLite database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> SinkResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| SinkError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })?;
            }
        }
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    /// Create an in-memory warehouse (for testing).
    pub fn in_memory() -> SinkResult<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Replace `name` with the contents of `table`.
    ///
    /// Drops any existing table of that name, creates it with one
    /// column per field (REAL when every value in the column is
    /// numeric, TEXT otherwise) and inserts all records in order. The
    /// whole write is one transaction.
    pub fn replace_table(&mut self, name: &str, table: &Table) -> SinkResult<()> {
        let tx = self.conn.transaction()?;

        tx.execute(&format!("DROP TABLE IF EXISTS {}", quote_ident(name)), [])?;

        // An empty table has no first record to derive columns from;
        // replacing with it just drops.
        let Some(schema) = table.schema() else {
            tx.commit()?;
            return Ok(());
        };

        let kinds = column_kinds(&schema, table);
        let columns: Vec<String> = schema
            .fields()
            .iter()
            .zip(&kinds)
            .map(|(field, kind)| format!("{} {}", quote_ident(field), kind.sql_type()))
            .collect();
        tx.execute(
            &format!(
                "CREATE TABLE {} ({})",
                quote_ident(name),
                columns.join(", ")
            ),
            [],
        )?;

        let placeholders = vec!["?"; schema.len()].join(", ");
        let insert = format!(
            "INSERT INTO {} VALUES ({})",
            quote_ident(name),
            placeholders
        );
        {
            let mut stmt = tx.prepare(&insert)?;
            for record in table {
                let params = schema
                    .fields()
                    .iter()
                    .zip(&kinds)
                    .map(|(field, kind)| bind_value(record.get(field), *kind));
                stmt.execute(params_from_iter(params))?;
            }
        }

        tx.commit()?;
        debug!(table = name, rows = table.len(), "replaced warehouse table");
        Ok(())
    }

    /// Number of rows currently in `name`.
    pub fn row_count(&self, name: &str) -> SinkResult<i64> {
        self.conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {}", quote_ident(name)),
                [],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    /// Borrow the underlying connection (tests and ad-hoc queries).
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Quote an identifier coming from untrusted header text.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// REAL iff every value in the column coerces to a number.
fn column_kinds(schema: &Schema, table: &Table) -> Vec<ColumnKind> {
    schema
        .fields()
        .iter()
        .map(|field| {
            let numeric = table
                .iter()
                .all(|record| record.get(field).is_some_and(Value::is_numeric));
            if numeric {
                ColumnKind::Real
            } else {
                ColumnKind::Text
            }
        })
        .collect()
}

fn bind_value(value: Option<&Value>, kind: ColumnKind) -> SqlValue {
    match (value, kind) {
        (None, _) => SqlValue::Null,
        (Some(v), ColumnKind::Real) => v
            .as_f64()
            .map(SqlValue::Real)
            .unwrap_or_else(|| SqlValue::Text(v.to_string())),
        (Some(v), ColumnKind::Text) => SqlValue::Text(v.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Record;

    fn cereal_table() -> Table {
        let mut a = Record::new();
        a.push("name", "A");
        a.push("calories", "120");
        let mut b = Record::new();
        b.push("name", "B");
        b.push("calories", "80");
        Table::from_records(vec![a, b])
    }

    #[test]
    fn test_replace_and_count() {
        let mut store = SqliteWarehouse::in_memory().unwrap();
        store.replace_table("cereals", &cereal_table()).unwrap();
        assert_eq!(store.row_count("cereals").unwrap(), 2);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let mut store = SqliteWarehouse::in_memory().unwrap();
        store.replace_table("cereals", &cereal_table()).unwrap();
        store.replace_table("cereals", &cereal_table()).unwrap();

        assert_eq!(store.row_count("cereals").unwrap(), 2);
        let names: Vec<String> = store
            .connection()
            .prepare("SELECT \"name\" FROM \"cereals\" ORDER BY rowid")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_rows_kept_in_table_order() {
        let mut store = SqliteWarehouse::in_memory().unwrap();
        let mut table = cereal_table();
        let mut c = Record::new();
        c.push("name", "C");
        c.push("calories", "200");
        table.push(c);

        store.replace_table("cereals", &table).unwrap();
        let first: String = store
            .connection()
            .query_row(
                "SELECT \"name\" FROM \"cereals\" ORDER BY rowid LIMIT 1",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(first, "A");
    }

    #[test]
    fn test_column_typing() {
        let mut store = SqliteWarehouse::in_memory().unwrap();
        store.replace_table("cereals", &cereal_table()).unwrap();

        // numeric column reads back as a float
        let calories: f64 = store
            .connection()
            .query_row(
                "SELECT \"calories\" FROM \"cereals\" ORDER BY rowid LIMIT 1",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!((calories - 120.0).abs() < f64::EPSILON);

        // mixed column stays text
        let kind: String = store
            .connection()
            .query_row(
                "SELECT type FROM pragma_table_info('cereals') WHERE name = 'name'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(kind, "TEXT");
    }

    #[test]
    fn test_replace_with_empty_table_drops() {
        let mut store = SqliteWarehouse::in_memory().unwrap();
        store.replace_table("cereals", &cereal_table()).unwrap();
        store.replace_table("cereals", &Table::new()).unwrap();
        assert!(store.row_count("cereals").is_err());
    }

    #[test]
    fn test_quote_ident_escapes() {
        assert_eq!(quote_ident("name"), "\"name\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_file_backed_store() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested/warehouse.db");

        let mut store = SqliteWarehouse::open(&db).unwrap();
        store.replace_table("cereals", &cereal_table()).unwrap();
        drop(store);

        // reopen: data persisted
        let store = SqliteWarehouse::open(&db).unwrap();
        assert_eq!(store.row_count("cereals").unwrap(), 2);
    }
}
