//! Prediction record store
//!
//! Provides:
//! - The `anemia_data` table holding one row per prediction
//! - Startup bootstrap that makes sure the database file and table exist
//! - An explicitly owned SQLite handle for inserts and read-only queries

pub mod sqlite;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

pub use sqlite::{RecordStore, StoreStats};

/// Name of the prediction table
pub const TABLE_NAME: &str = "anemia_data";

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS anemia_data (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        gender INTEGER NOT NULL CHECK (gender IN (0, 1)),
        hemoglobin REAL NOT NULL,
        mch REAL NOT NULL,
        mchc REAL NOT NULL,
        mcv REAL NOT NULL,
        result INTEGER NOT NULL CHECK (result IN (0, 1))
    );
"#;

/// A prediction about to be persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    pub gender: u8,
    pub hemoglobin: f64,
    pub mch: f64,
    pub mchc: f64,
    pub mcv: f64,
    pub result: u8,
}

/// A persisted prediction row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Auto-assigned row id
    pub id: i64,
    /// Encoded gender (0 = Male, 1 = other)
    pub gender: u8,
    pub hemoglobin: f64,
    pub mch: f64,
    pub mchc: f64,
    pub mcv: f64,
    /// Classifier label (1 = anemia)
    pub result: u8,
}

/// What the bootstrap step had to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// No database file existed; directory, file and table were created
    CreatedStore,
    /// The file existed without the table; the table was created
    CreatedTable,
    /// The file and table were already in place
    AlreadyPresent,
    /// Inspecting the existing file failed; the schema was created unconditionally
    Recovered,
}

impl std::fmt::Display for BootstrapOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BootstrapOutcome::CreatedStore => write!(f, "database and tables created"),
            BootstrapOutcome::CreatedTable => write!(f, "tables created"),
            BootstrapOutcome::AlreadyPresent => write!(f, "database already initialized"),
            BootstrapOutcome::Recovered => write!(f, "schema recreated after failed inspection"),
        }
    }
}

/// Make sure the database file and the prediction table exist
pub fn bootstrap(path: &Path) -> Result<BootstrapOutcome> {
    open_and_bootstrap(path).map(|(_, outcome)| outcome)
}

/// Open the database at `path`, creating the schema where needed
pub(crate) fn open_and_bootstrap(path: &Path) -> Result<(Connection, BootstrapOutcome)> {
    if !path.exists() {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory {}", parent.display()))?;
        }

        info!("Creating database at {}", path.display());
        let conn = open_connection(path)?;
        create_schema(&conn)?;
        info!("Database and tables created");
        set_pragmas(&conn)?;
        return Ok((conn, BootstrapOutcome::CreatedStore));
    }

    let conn = open_connection(path)?;
    let inspection = table_exists(&conn);
    let outcome = bootstrap_existing(&conn, path, inspection)?;
    set_pragmas(&conn)?;

    Ok((conn, outcome))
}

/// Act on the inspection of an existing database file.
///
/// A failed inspection is logged and the schema is created unconditionally.
fn bootstrap_existing(conn: &Connection, path: &Path, inspection: Result<bool>) -> Result<BootstrapOutcome> {
    match inspection {
        Ok(true) => Ok(BootstrapOutcome::AlreadyPresent),
        Ok(false) => {
            info!("Creating tables in {}", path.display());
            create_schema(conn)?;
            info!("Tables created");
            Ok(BootstrapOutcome::CreatedTable)
        }
        Err(e) => {
            warn!("Error inspecting database {}: {:#}", path.display(), e);
            create_schema(conn)
                .with_context(|| format!("Schema creation after failed inspection of {}", path.display()))?;
            Ok(BootstrapOutcome::Recovered)
        }
    }
}

fn open_connection(path: &Path) -> Result<Connection> {
    Connection::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))
}

// Runs after bootstrap so that inspection sees the file first
fn set_pragmas(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
        .context("Failed to configure database connection")?;
    Ok(())
}

/// Create the prediction table if it does not exist yet
pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Failed to create prediction table")?;
    Ok(())
}

/// Check `sqlite_master` for the prediction table
pub fn table_exists(conn: &Connection) -> Result<bool> {
    let found: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [TABLE_NAME],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}
