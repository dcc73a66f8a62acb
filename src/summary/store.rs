//! Keyed record store behind the reconciler.

use std::sync::Mutex;

use rusqlite::Connection;

use crate::db::{self, DatabaseError};
use crate::models::HealthSummary;

/// Select-by-key, atomic upsert-by-key and erase over summary rows.
pub trait SummaryStore: Send + Sync {
    fn find_by_profile(&self, profile_id: &str) -> Result<Option<HealthSummary>, DatabaseError>;

    /// Insert the row, or overwrite content, source and update time of the
    /// profile's existing row. Must be a single atomic write.
    fn upsert(&self, summary: &HealthSummary) -> Result<(), DatabaseError>;

    /// Remove the profile's summary. Returns rows removed.
    fn delete_for_profile(&self, profile_id: &str) -> Result<u64, DatabaseError>;
}

/// SQLite-backed store. One connection, serialized through a mutex.
pub struct SqliteSummaryStore {
    conn: Mutex<Connection>,
}

impl SqliteSummaryStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Open (and migrate) the database file at `path`.
    pub fn open(path: &std::path::Path) -> Result<Self, DatabaseError> {
        Ok(Self::new(db::open_database(path)?))
    }

    pub fn in_memory() -> Result<Self, DatabaseError> {
        Ok(Self::new(db::open_memory_database()?))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)
    }
}

impl SummaryStore for SqliteSummaryStore {
    fn find_by_profile(&self, profile_id: &str) -> Result<Option<HealthSummary>, DatabaseError> {
        let conn = self.lock()?;
        db::get_summary_by_profile(&conn, profile_id)
    }

    fn upsert(&self, summary: &HealthSummary) -> Result<(), DatabaseError> {
        let conn = self.lock()?;
        db::upsert_summary(&conn, summary)
    }

    fn delete_for_profile(&self, profile_id: &str) -> Result<u64, DatabaseError> {
        let conn = self.lock()?;
        db::delete_summary_for_profile(&conn, profile_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trait_is_object_safe() {
        fn _assert_store(_: &dyn SummaryStore) {}
    }

    #[test]
    fn upsert_then_overwrite() {
        let store = SqliteSummaryStore::in_memory().unwrap();
        let first = HealthSummary::new("p-1", "first", "initial_profile_creation");
        store.upsert(&first).unwrap();
        store
            .upsert(&HealthSummary::new("p-1", "second", "transcription:t-1"))
            .unwrap();

        let found = store.find_by_profile("p-1").unwrap().unwrap();
        assert_eq!(found.summary_content, "second");
        assert_eq!(found.last_updated_source, "transcription:t-1");
        assert_eq!(found.id, first.id);
    }

    #[test]
    fn delete_for_profile_clears_row() {
        let store = SqliteSummaryStore::in_memory().unwrap();
        store.upsert(&HealthSummary::new("p-1", "x", "s")).unwrap();
        assert_eq!(store.delete_for_profile("p-1").unwrap(), 1);
        assert!(store.find_by_profile("p-1").unwrap().is_none());
    }

    #[test]
    fn concurrent_upserts_for_one_profile_all_succeed() {
        let store = std::sync::Arc::new(SqliteSummaryStore::in_memory().unwrap());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store.upsert(&HealthSummary::new("p-1", &format!("v{i}"), &format!("document:d-{i}")))
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }
        let found = store.find_by_profile("p-1").unwrap().unwrap();
        assert!(found.summary_content.starts_with('v'));
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summaries.db");
        {
            let store = SqliteSummaryStore::open(&path).unwrap();
            store.upsert(&HealthSummary::new("p-9", "kept", "s")).unwrap();
        }
        let store = SqliteSummaryStore::open(&path).unwrap();
        assert_eq!(
            store.find_by_profile("p-9").unwrap().unwrap().summary_content,
            "kept"
        );
    }
}
