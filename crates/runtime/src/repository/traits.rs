//! Record store contracts.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::changeset::{Changeset, Expected};
use super::error::{RepositoryError, Result};

/// A stored value and its version. Versions start at 1 and grow by one per write.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Versioned {
    pub version: u64,
    pub value: serde_json::Value,
}

/// Record-oriented store keyed by `(table, key)`.
///
/// Implementations must apply a [`Changeset`] all-or-nothing: either every
/// write's [`Expected`] version holds and all writes land, or nothing changes
/// and [`RepositoryError::VersionConflict`] is returned.
pub trait RecordStore: Send + Sync {
    fn get(&self, table: &str, key: &str) -> Result<Option<Versioned>>;

    /// Every record in a table, ordered by key.
    fn scan(&self, table: &str) -> Result<Vec<(String, Versioned)>>;

    fn commit(&self, changeset: Changeset) -> Result<()>;
}

/// A typed row.
pub trait Record: Serialize + DeserializeOwned {
    const TABLE: &'static str;

    fn key(&self) -> String;
}

/// A typed record together with the version it was read at.
#[derive(Clone, Debug, PartialEq)]
pub struct Stored<R> {
    pub version: u64,
    pub record: R,
}

impl<R> Stored<R> {
    pub fn expected(&self) -> Expected {
        Expected::Version(self.version)
    }

    pub fn into_inner(self) -> R {
        self.record
    }
}

fn decode<R: Record>(key: &str, versioned: Versioned) -> Result<Stored<R>> {
    let record = serde_json::from_value(versioned.value).map_err(|e| {
        RepositoryError::CorruptedData(format!("{}/{}: {}", R::TABLE, key, e))
    })?;
    Ok(Stored {
        version: versioned.version,
        record,
    })
}

/// Typed access on top of any [`RecordStore`].
pub trait RecordStoreExt: RecordStore {
    fn fetch<R: Record>(&self, key: &str) -> Result<Option<Stored<R>>> {
        self.get(R::TABLE, key)?
            .map(|versioned| decode(key, versioned))
            .transpose()
    }

    fn fetch_all<R: Record>(&self) -> Result<Vec<Stored<R>>> {
        self.scan(R::TABLE)?
            .into_iter()
            .map(|(key, versioned)| decode(&key, versioned))
            .collect()
    }
}

impl<S: RecordStore + ?Sized> RecordStoreExt for S {}
