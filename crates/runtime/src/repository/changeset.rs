//! Optimistic write batches.
//!
//! Every write names the version it expects to replace. A store applies a
//! [`Changeset`] only if every expectation still holds, so two requests that
//! read the same record cannot both commit a mutation of it.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{RepositoryError, Result};
use super::traits::{Record, Stored};

/// Version a write expects to find in the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expected {
    /// The record must not exist yet.
    Absent,
    /// The record must exist at exactly this version.
    Version(u64),
    /// Blind write; last writer wins.
    Any,
}

impl Expected {
    /// `Version` of the stored copy, or `Absent` when there was none.
    pub fn of<R>(stored: Option<&Stored<R>>) -> Self {
        match stored {
            Some(stored) => Self::Version(stored.version),
            None => Self::Absent,
        }
    }

    pub fn matches(self, current: Option<u64>) -> bool {
        match (self, current) {
            (Self::Any, _) => true,
            (Self::Absent, None) => true,
            (Self::Version(expected), Some(found)) => expected == found,
            _ => false,
        }
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("absent"),
            Self::Version(v) => write!(f, "version {v}"),
            Self::Any => f.write_str("any"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum WriteOp {
    Put(serde_json::Value),
    Delete,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Write {
    pub table: &'static str,
    pub key: String,
    pub expected: Expected,
    pub op: WriteOp,
}

impl Write {
    pub(crate) fn check(&self, current: Option<u64>) -> Result<()> {
        if self.expected.matches(current) {
            Ok(())
        } else {
            Err(RepositoryError::VersionConflict {
                table: self.table.to_owned(),
                key: self.key.clone(),
                expected: self.expected,
                found: current,
            })
        }
    }
}

/// Ordered set of writes committed together.
///
/// Writing the same record twice keeps the first expectation and the last
/// operation, so a request can stage a record incrementally.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Changeset {
    writes: Vec<Write>,
}

impl Changeset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put<R: Record>(&mut self, expected: Expected, record: &R) -> Result<&mut Self> {
        let value = serde_json::to_value(record)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        self.stage(R::TABLE, record.key(), expected, WriteOp::Put(value));
        Ok(self)
    }

    /// Stage the new value of a record loaded earlier.
    pub fn update<R: Record>(&mut self, stored: &Stored<R>) -> Result<&mut Self> {
        self.put(stored.expected(), &stored.record)
    }

    pub fn delete<R: Record>(&mut self, expected: Expected, key: impl Into<String>) -> &mut Self {
        self.stage(R::TABLE, key.into(), expected, WriteOp::Delete);
        self
    }

    fn stage(&mut self, table: &'static str, key: String, expected: Expected, op: WriteOp) {
        if let Some(existing) = self
            .writes
            .iter_mut()
            .find(|w| w.table == table && w.key == key)
        {
            existing.op = op;
            return;
        }
        self.writes.push(Write {
            table,
            key,
            expected,
            op,
        });
    }

    pub fn writes(&self) -> &[Write] {
        &self.writes
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expectations_match_versions() {
        assert!(Expected::Absent.matches(None));
        assert!(!Expected::Absent.matches(Some(1)));
        assert!(Expected::Version(3).matches(Some(3)));
        assert!(!Expected::Version(3).matches(Some(4)));
        assert!(!Expected::Version(3).matches(None));
        assert!(Expected::Any.matches(None));
        assert!(Expected::Any.matches(Some(9)));
    }
}
