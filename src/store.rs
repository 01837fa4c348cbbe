//! Record storage seam.
//!
//! The host owns persistence; the engine only needs to load and save
//! session records. [`MemoryStore`] backs tests and hosts that keep
//! everything in memory and snapshot it themselves.

use thiserror::Error;

use crate::migrate;
use crate::types::SessionRecord;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Failure inside a host-supplied store
    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Load/save interface for session records
pub trait RecordStore {
    fn load_all(&self) -> StoreResult<Vec<SessionRecord>>;

    /// A missing id is `Ok(None)`, not an error
    fn load(&self, id: &str) -> StoreResult<Option<SessionRecord>>;

    /// Insert or replace by id
    fn save(&mut self, record: &SessionRecord) -> StoreResult<()>;

    fn load_by_subject(&self, subject_id: &str) -> StoreResult<Vec<SessionRecord>> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|r| r.subject_id == subject_id)
            .collect())
    }
}

/// In-memory store preserving insertion order
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<SessionRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<SessionRecord>) -> Self {
        Self { records }
    }

    /// Build from a persisted JSON array, normalizing legacy records
    pub fn from_snapshot(json: &str) -> StoreResult<Self> {
        let records =
            migrate::load_records(json).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Self { records })
    }

    /// Serialize all records in the current persisted shape
    pub fn snapshot(&self) -> StoreResult<String> {
        migrate::save_records(&self.records).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn load_all(&self) -> StoreResult<Vec<SessionRecord>> {
        Ok(self.records.clone())
    }

    fn load(&self, id: &str) -> StoreResult<Option<SessionRecord>> {
        Ok(self.records.iter().find(|r| r.id == id).cloned())
    }

    fn save(&mut self, record: &SessionRecord) -> StoreResult<()> {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => self.records.push(record.clone()),
        }
        Ok(())
    }
}
