//! SQLite-backed record store

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{open_and_bootstrap, BootstrapOutcome, NewRecord, PredictionRecord};

/// Aggregate counts over the stored predictions
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreStats {
    pub total_records: usize,
    pub anemia_records: usize,
}

/// Owns the single database connection for the lifetime of the process
pub struct RecordStore {
    conn: Mutex<Connection>,
    path: PathBuf,
    bootstrap: BootstrapOutcome,
}

impl RecordStore {
    /// Open the store at `path`, creating the file and table if needed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let (conn, bootstrap) = open_and_bootstrap(&path)?;

        info!("Record store ready at {} ({})", path.display(), bootstrap);

        Ok(Self {
            conn: Mutex::new(conn),
            path,
            bootstrap,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// What bootstrap did when this store was opened
    pub fn bootstrap_outcome(&self) -> BootstrapOutcome {
        self.bootstrap
    }

    /// Insert one prediction and return its id
    pub async fn insert(&self, record: &NewRecord) -> Result<i64> {
        let conn = self.conn.lock().await;

        conn.execute(
            r#"INSERT INTO anemia_data (gender, hemoglobin, mch, mchc, mcv, result)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
            params![
                record.gender,
                record.hemoglobin,
                record.mch,
                record.mchc,
                record.mcv,
                record.result,
            ],
        )
        .context("Failed to insert prediction record")?;

        let id = conn.last_insert_rowid();
        debug!("Stored prediction record {}", id);
        Ok(id)
    }

    /// Load a single record by id
    pub async fn get(&self, id: i64) -> Result<Option<PredictionRecord>> {
        let conn = self.conn.lock().await;

        let record = conn
            .query_row(
                "SELECT id, gender, hemoglobin, mch, mchc, mcv, result FROM anemia_data WHERE id = ?1",
                params![id],
                row_to_record,
            )
            .optional()?;

        Ok(record)
    }

    /// Most recent records, newest first
    pub async fn recent(&self, limit: usize) -> Result<Vec<PredictionRecord>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(
            "SELECT id, gender, hemoglobin, mch, mchc, mcv, result FROM anemia_data ORDER BY id DESC LIMIT ?1",
        )?;

        let records = stmt
            .query_map(params![limit as i64], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Number of stored records
    pub async fn count(&self) -> Result<usize> {
        let conn = self.conn.lock().await;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM anemia_data", [], |row| row.get(0))?;

        Ok(count as usize)
    }

    pub async fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn.lock().await;

        let (total, anemia): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(result), 0) FROM anemia_data",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(StoreStats {
            total_records: total as usize,
            anemia_records: anemia as usize,
        })
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<PredictionRecord> {
    Ok(PredictionRecord {
        id: row.get(0)?,
        gender: row.get(1)?,
        hemoglobin: row.get(2)?,
        mch: row.get(3)?,
        mchc: row.get(4)?,
        mcv: row.get(5)?,
        result: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample(gender: u8, hemoglobin: f64, result: u8) -> NewRecord {
        NewRecord {
            gender,
            hemoglobin,
            mch: 27.0,
            mchc: 33.0,
            mcv: 85.0,
            result,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path().join("test.db")).unwrap();

        let record = NewRecord {
            gender: 0,
            hemoglobin: 13.5,
            mch: 27.1,
            mchc: 33.3,
            mcv: 85.25,
            result: 1,
        };
        let id = store.insert(&record).await.unwrap();

        let loaded = store.get(id).await.unwrap().unwrap();
        assert_eq!(loaded.id, id);
        assert_eq!(loaded.gender, record.gender);
        assert_eq!(loaded.hemoglobin, record.hemoglobin);
        assert_eq!(loaded.mch, record.mch);
        assert_eq!(loaded.mchc, record.mchc);
        assert_eq!(loaded.mcv, record.mcv);
        assert_eq!(loaded.result, record.result);
    }

    #[tokio::test]
    async fn test_ids_are_monotonic() {
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path().join("test.db")).unwrap();

        let first = store.insert(&sample(0, 14.0, 0)).await.unwrap();
        let second = store.insert(&sample(1, 9.0, 1)).await.unwrap();
        assert!(second > first);

        let recent = store.recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, second);
        assert_eq!(recent[1].id, first);
    }

    #[tokio::test]
    async fn test_count_and_stats() {
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path().join("test.db")).unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_records, 0);
        assert_eq!(stats.anemia_records, 0);

        store.insert(&sample(1, 9.5, 1)).await.unwrap();
        store.insert(&sample(0, 15.0, 0)).await.unwrap();
        store.insert(&sample(1, 10.0, 1)).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 3);
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.anemia_records, 2);
    }

    #[tokio::test]
    async fn test_reopen_keeps_records() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let store = RecordStore::open(&db_path).unwrap();
        assert_eq!(store.bootstrap_outcome(), BootstrapOutcome::CreatedStore);
        store.insert(&sample(0, 13.0, 0)).await.unwrap();
        drop(store);

        let store = RecordStore::open(&db_path).unwrap();
        assert_eq!(store.bootstrap_outcome(), BootstrapOutcome::AlreadyPresent);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_record() {
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path().join("test.db")).unwrap();
        assert!(store.get(42).await.unwrap().is_none());
    }
}
