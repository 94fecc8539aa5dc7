//! Database adapter
//!
//! A single SQLite connection, opened once and reused for the lifetime of
//! the process. [`Database::setup`] idempotently creates and seeds the demo
//! table; [`Database::query`] runs LLM-supplied SQL verbatim and reports
//! failure as a value rather than an error, because the result goes back to
//! the model either way.

mod seed;

pub use seed::SyntheticWell;

use parking_lot::Mutex;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::{Result, WellspokenError};

/// The one table the demo exposes to the model
pub const TABLE_NAME: &str = "ExplorationProduction";

/// Number of synthetic rows `setup()` seeds into a fresh database
pub const SEED_ROW_COUNT: usize = 1000;

/// Sentinel handed to the model when a query cannot produce rows
pub const NO_RESULT_FOUND: &str = "No Result Found";

const CREATE_TABLE_SQL: &str = "\
CREATE TABLE ExplorationProduction (
    WellID            INTEGER PRIMARY KEY,
    WellName          TEXT NOT NULL,
    Location          TEXT NOT NULL,
    ProductionDate    TEXT NOT NULL,
    ProductionVolume  REAL NOT NULL,
    Depth             REAL NOT NULL,
    GeologicalData    TEXT NOT NULL,
    ReservoirPressure REAL NOT NULL
)";

/// A single column value from a query result
#[derive(Clone, Debug, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Integer(v) => write!(f, "{}", v),
            SqlValue::Real(v) => write!(f, "{}", v),
            SqlValue::Text(v) => write!(f, "{}", v),
        }
    }
}

/// Result of executing one LLM-supplied query.
///
/// Execution errors of any kind (bad syntax, missing table, connection
/// trouble) collapse into `Failure` carrying the [`NO_RESULT_FOUND`]
/// sentinel; an empty row set is still `Rows`.
#[derive(Clone, Debug)]
pub enum QueryOutcome {
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<SqlValue>>,
    },
    Failure(String),
}

impl QueryOutcome {
    /// Whether this outcome is the failure sentinel
    pub fn is_failure(&self) -> bool {
        matches!(self, QueryOutcome::Failure(_))
    }

    /// Number of rows, zero for failures
    pub fn row_count(&self) -> usize {
        match self {
            QueryOutcome::Rows { rows, .. } => rows.len(),
            QueryOutcome::Failure(_) => 0,
        }
    }
}

/// Thread-safe handle to the demo database
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).map_err(|e| {
            WellspokenError::DatabaseError(format!(
                "Failed to open database {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            WellspokenError::DatabaseError(format!("Failed to open in-memory database: {}", e))
        })?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create and seed the demo table if it does not already exist.
    ///
    /// Idempotent: when the table is present this does nothing, so the seed
    /// data survives restarts. Single-process assumption; there is no
    /// cross-process locking.
    pub fn setup(&self) -> Result<()> {
        let mut conn = self.conn.lock();

        if table_exists(&conn, TABLE_NAME)? {
            debug!("Table {} already exists, skipping setup", TABLE_NAME);
            return Ok(());
        }

        info!(
            "Creating {} and seeding {} synthetic wells",
            TABLE_NAME, SEED_ROW_COUNT
        );

        let tx = conn.transaction().map_err(db_err)?;
        tx.execute(CREATE_TABLE_SQL, []).map_err(db_err)?;
        seed::insert_synthetic_wells(&tx, SEED_ROW_COUNT).map_err(db_err)?;
        tx.commit().map_err(db_err)?;

        debug!("Database setup completed");
        Ok(())
    }

    /// Execute a caller-supplied SQL string verbatim.
    ///
    /// Never returns an error: anything that prevents rows from coming back
    /// becomes [`QueryOutcome::Failure`] with the sentinel string.
    pub fn query(&self, sql: &str) -> QueryOutcome {
        debug!("Querying database with: {}", sql);

        match self.run_query(sql) {
            Ok(outcome) => {
                debug!("Query returned {} rows", outcome.row_count());
                outcome
            }
            Err(e) => {
                error!("Error querying database: {}", e);
                QueryOutcome::Failure(NO_RESULT_FOUND.to_string())
            }
        }
    }

    fn run_query(&self, sql: &str) -> rusqlite::Result<QueryOutcome> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql)?;

        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let column_count = columns.len();

        let mut rows = Vec::new();
        let mut result = stmt.query([])?;
        while let Some(row) = result.next()? {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                values.push(match row.get_ref(i)? {
                    ValueRef::Null => SqlValue::Null,
                    ValueRef::Integer(v) => SqlValue::Integer(v),
                    ValueRef::Real(v) => SqlValue::Real(v),
                    ValueRef::Text(v) => SqlValue::Text(String::from_utf8_lossy(v).into_owned()),
                    ValueRef::Blob(v) => SqlValue::Text(format!("<{} byte blob>", v.len())),
                });
            }
            rows.push(values);
        }

        Ok(QueryOutcome::Rows { columns, rows })
    }
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )
        .map_err(db_err)?;
    Ok(count > 0)
}

fn db_err(e: rusqlite::Error) -> WellspokenError {
    WellspokenError::DatabaseError(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.setup().unwrap();
        db
    }

    #[test]
    fn test_setup_seeds_exact_row_count() {
        let db = seeded_db();
        match db.query("SELECT COUNT(*) FROM ExplorationProduction") {
            QueryOutcome::Rows { rows, .. } => {
                assert_eq!(rows[0][0], SqlValue::Integer(SEED_ROW_COUNT as i64));
            }
            QueryOutcome::Failure(_) => panic!("count query failed"),
        }
    }

    #[test]
    fn test_setup_is_idempotent() {
        let db = seeded_db();
        db.setup().unwrap();
        db.setup().unwrap();

        match db.query("SELECT COUNT(*) FROM ExplorationProduction") {
            QueryOutcome::Rows { rows, .. } => {
                assert_eq!(rows[0][0], SqlValue::Integer(SEED_ROW_COUNT as i64));
            }
            QueryOutcome::Failure(_) => panic!("count query failed"),
        }
    }

    #[test]
    fn test_primary_keys_are_positive() {
        let db = seeded_db();
        match db.query("SELECT MIN(WellID), MAX(WellID) FROM ExplorationProduction") {
            QueryOutcome::Rows { rows, .. } => {
                assert_eq!(rows[0][0], SqlValue::Integer(1));
                assert_eq!(rows[0][1], SqlValue::Integer(SEED_ROW_COUNT as i64));
            }
            QueryOutcome::Failure(_) => panic!("min/max query failed"),
        }
    }

    #[test]
    fn test_valid_query_returns_rows() {
        let db = seeded_db();
        match db.query("SELECT 1") {
            QueryOutcome::Rows { columns, rows } => {
                assert_eq!(columns.len(), 1);
                assert_eq!(rows, vec![vec![SqlValue::Integer(1)]]);
            }
            QueryOutcome::Failure(_) => panic!("SELECT 1 failed"),
        }
    }

    #[test]
    fn test_invalid_query_returns_sentinel() {
        let db = seeded_db();
        match db.query("SELEKT * FROM nowhere") {
            QueryOutcome::Failure(msg) => assert_eq!(msg, NO_RESULT_FOUND),
            QueryOutcome::Rows { .. } => panic!("invalid SQL should not return rows"),
        }
    }

    #[test]
    fn test_empty_result_is_rows_not_failure() {
        let db = seeded_db();
        let outcome = db.query("SELECT * FROM ExplorationProduction WHERE WellID = -1");
        match outcome {
            QueryOutcome::Rows { rows, .. } => assert!(rows.is_empty()),
            QueryOutcome::Failure(_) => panic!("empty result must not be a failure"),
        }
    }

    #[test]
    fn test_query_before_setup_fails_with_sentinel() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.query("SELECT * FROM ExplorationProduction").is_failure());
    }
}
