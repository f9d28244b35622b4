//! In-memory record store for testing.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use crate::record::{
    ArtifactRecord, RecordError, RecordStore, TransformationUpdate, UpdateOutcome,
};

/// [`RecordStore`] backed by a process-local map. Mirrors the guarded
/// update semantics of the SQLite store.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<String, ArtifactRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryRecordStore {
    fn upsert_original(&self, owner_id: &str, original_url: &str) -> Result<(), RecordError> {
        let mut records = self.records.write().unwrap();
        records
            .entry(owner_id.to_string())
            .and_modify(|r| {
                r.original_url = original_url.to_string();
                r.updated_at = Utc::now();
            })
            .or_insert_with(|| ArtifactRecord {
                owner_id: owner_id.to_string(),
                original_url: original_url.to_string(),
                result_url: None,
                transformation_status: None,
                job_id: None,
                updated_at: Utc::now(),
            });
        Ok(())
    }

    fn begin_transformation(
        &self,
        owner_id: &str,
        update: &TransformationUpdate,
    ) -> Result<(), RecordError> {
        let mut records = self.records.write().unwrap();
        let record = records
            .get_mut(owner_id)
            .ok_or_else(|| RecordError::NotFound(owner_id.to_string()))?;

        record.job_id = Some(update.job_id.clone());
        record.transformation_status = Some(update.status);
        record.result_url = None;
        record.updated_at = Utc::now();
        Ok(())
    }

    fn apply_transformation(
        &self,
        owner_id: &str,
        update: &TransformationUpdate,
    ) -> Result<UpdateOutcome, RecordError> {
        let mut records = self.records.write().unwrap();
        let Some(record) = records.get_mut(owner_id) else {
            return Ok(UpdateOutcome::Stale);
        };

        if record.job_id.as_deref() != Some(update.job_id.as_str()) {
            return Ok(UpdateOutcome::Stale);
        }

        record.transformation_status = Some(update.status);
        record.result_url = update.result_url.clone();
        record.updated_at = Utc::now();
        Ok(UpdateOutcome::Applied)
    }

    fn get(&self, owner_id: &str) -> Result<Option<ArtifactRecord>, RecordError> {
        Ok(self.records.read().unwrap().get(owner_id).cloned())
    }
}
