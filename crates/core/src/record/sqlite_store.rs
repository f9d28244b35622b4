//! SQLite-backed record store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::store::{ArtifactRecord, RecordError, RecordStore, TransformationUpdate, UpdateOutcome};
use crate::aging::JobState;

/// SQLite-backed record store.
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

impl SqliteRecordStore {
    /// Create a new SQLite record store, creating the database file and
    /// tables if needed.
    pub fn new(path: &Path) -> Result<Self, RecordError> {
        let conn = Connection::open(path).map_err(|e| RecordError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite record store (useful for testing).
    pub fn in_memory() -> Result<Self, RecordError> {
        let conn =
            Connection::open_in_memory().map_err(|e| RecordError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), RecordError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS artifact_records (
                owner_id TEXT PRIMARY KEY,
                original_url TEXT NOT NULL,
                result_url TEXT,
                transformation_status TEXT,
                job_id TEXT,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_artifact_records_job_id ON artifact_records(job_id);
            "#,
        )
        .map_err(|e| RecordError::Database(e.to_string()))?;

        Ok(())
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<ArtifactRecord> {
        let owner_id: String = row.get(0)?;
        let original_url: String = row.get(1)?;
        let result_url: Option<String> = row.get(2)?;
        let status_str: Option<String> = row.get(3)?;
        let job_id: Option<String> = row.get(4)?;
        let updated_at_str: String = row.get(5)?;

        let transformation_status = status_str.and_then(|s| s.parse::<JobState>().ok());

        let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(ArtifactRecord {
            owner_id,
            original_url,
            result_url,
            transformation_status,
            job_id,
            updated_at,
        })
    }
}

impl RecordStore for SqliteRecordStore {
    fn upsert_original(&self, owner_id: &str, original_url: &str) -> Result<(), RecordError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();

        conn.execute(
            r#"
            INSERT INTO artifact_records (owner_id, original_url, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(owner_id) DO UPDATE SET
                original_url = excluded.original_url,
                updated_at = excluded.updated_at
            "#,
            params![owner_id, original_url, now],
        )
        .map_err(|e| RecordError::Database(e.to_string()))?;

        Ok(())
    }

    fn begin_transformation(
        &self,
        owner_id: &str,
        update: &TransformationUpdate,
    ) -> Result<(), RecordError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();

        let changed = conn
            .execute(
                r#"
                UPDATE artifact_records SET
                    job_id = ?1,
                    transformation_status = ?2,
                    result_url = NULL,
                    updated_at = ?3
                WHERE owner_id = ?4
                "#,
                params![update.job_id, update.status.as_str(), now, owner_id],
            )
            .map_err(|e| RecordError::Database(e.to_string()))?;

        if changed == 0 {
            return Err(RecordError::NotFound(owner_id.to_string()));
        }

        Ok(())
    }

    fn apply_transformation(
        &self,
        owner_id: &str,
        update: &TransformationUpdate,
    ) -> Result<UpdateOutcome, RecordError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();

        // The job_id match is the staleness guard: a poller for a
        // superseded job changes zero rows here.
        let changed = conn
            .execute(
                r#"
                UPDATE artifact_records SET
                    transformation_status = ?1,
                    result_url = ?2,
                    updated_at = ?3
                WHERE owner_id = ?4 AND job_id = ?5
                "#,
                params![
                    update.status.as_str(),
                    update.result_url,
                    now,
                    owner_id,
                    update.job_id
                ],
            )
            .map_err(|e| RecordError::Database(e.to_string()))?;

        if changed == 0 {
            Ok(UpdateOutcome::Stale)
        } else {
            Ok(UpdateOutcome::Applied)
        }
    }

    fn get(&self, owner_id: &str) -> Result<Option<ArtifactRecord>, RecordError> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            r#"
            SELECT owner_id, original_url, result_url, transformation_status, job_id, updated_at
            FROM artifact_records
            WHERE owner_id = ?1
            "#,
            params![owner_id],
            Self::row_to_record,
        )
        .optional()
        .map_err(|e| RecordError::Database(e.to_string()))
    }
}
