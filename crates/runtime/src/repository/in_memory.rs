//! In-memory record store for tests and local runs.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use super::changeset::{Changeset, WriteOp};
use super::error::{RepositoryError, Result};
use super::traits::{RecordStore, Versioned};

type Table = BTreeMap<String, Versioned>;

/// In-memory implementation of [`RecordStore`].
///
/// A single write lock covers validation and application, which makes every
/// commit atomic.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    tables: RwLock<HashMap<&'static str, Table>>,
}

impl InMemoryRecordStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn get(&self, table: &str, key: &str) -> Result<Option<Versioned>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(tables.get(table).and_then(|t| t.get(key)).cloned())
    }

    fn scan(&self, table: &str) -> Result<Vec<(String, Versioned)>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(tables
            .get(table)
            .map(|t| t.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    fn commit(&self, changeset: Changeset) -> Result<()> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        for write in changeset.writes() {
            let current = tables
                .get(write.table)
                .and_then(|t| t.get(&write.key))
                .map(|v| v.version);
            write.check(current)?;
        }

        for write in changeset.writes() {
            let table = tables.entry(write.table).or_default();
            match &write.op {
                WriteOp::Put(value) => {
                    let version = table.get(&write.key).map_or(1, |v| v.version + 1);
                    table.insert(
                        write.key.clone(),
                        Versioned {
                            version,
                            value: value.clone(),
                        },
                    );
                }
                WriteOp::Delete => {
                    table.remove(&write.key);
                }
            }
        }

        tracing::trace!(writes = changeset.len(), "committed changeset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{Expected, Record, RecordStoreExt};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        text: String,
    }

    impl Record for Note {
        const TABLE: &'static str = "notes";

        fn key(&self) -> String {
            self.id.clone()
        }
    }

    fn note(id: &str, text: &str) -> Note {
        Note {
            id: id.into(),
            text: text.into(),
        }
    }

    #[test]
    fn put_then_fetch_bumps_versions() {
        let store = InMemoryRecordStore::new();

        let mut changes = Changeset::new();
        changes.put(Expected::Absent, &note("a", "one")).unwrap();
        store.commit(changes).unwrap();

        let stored = store.fetch::<Note>("a").unwrap().unwrap();
        assert_eq!(stored.version, 1);

        let mut updated = stored.clone();
        updated.record.text = "two".into();
        let mut changes = Changeset::new();
        changes.update(&updated).unwrap();
        store.commit(changes).unwrap();

        let stored = store.fetch::<Note>("a").unwrap().unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(stored.record.text, "two");
    }

    #[test]
    fn stale_write_rejects_the_whole_changeset() {
        let store = InMemoryRecordStore::new();
        let mut changes = Changeset::new();
        changes.put(Expected::Absent, &note("a", "one")).unwrap();
        store.commit(changes).unwrap();

        let mut changes = Changeset::new();
        changes.put(Expected::Absent, &note("b", "new")).unwrap();
        changes.put(Expected::Version(7), &note("a", "stale")).unwrap();
        let err = store.commit(changes).unwrap_err();

        assert!(err.is_conflict());
        assert!(store.fetch::<Note>("b").unwrap().is_none());
        assert_eq!(store.fetch::<Note>("a").unwrap().unwrap().record.text, "one");
    }

    #[test]
    fn delete_and_scan() {
        let store = InMemoryRecordStore::new();
        let mut changes = Changeset::new();
        changes.put(Expected::Absent, &note("b", "2")).unwrap();
        changes.put(Expected::Absent, &note("a", "1")).unwrap();
        store.commit(changes).unwrap();

        let keys: Vec<String> = store
            .fetch_all::<Note>()
            .unwrap()
            .into_iter()
            .map(|s| s.record.id)
            .collect();
        assert_eq!(keys, vec!["a", "b"]);

        let mut changes = Changeset::new();
        changes.delete::<Note>(Expected::Version(1), "a");
        store.commit(changes).unwrap();
        assert!(store.fetch::<Note>("a").unwrap().is_none());
    }
}
