//! File-backed record store.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::changeset::{Changeset, WriteOp};
use super::error::{RepositoryError, Result};
use super::traits::{RecordStore, Versioned};

/// File-based implementation of [`RecordStore`].
///
/// # File Format
///
/// One JSON document per record at `<base_dir>/<table>/<key>.json`, holding
/// `{ "version": n, "value": ... }`. Keys are escaped so any user id maps to
/// a valid file name.
///
/// Commits are serialised by a process-wide lock. Every expectation is
/// checked and every new document is written to a temp file before the first
/// rename, so a rejected changeset leaves no trace. Temp files are removed
/// when a write or rename fails.
pub struct FileRecordStore {
    base_dir: PathBuf,
    commit_lock: Mutex<()>,
}

impl FileRecordStore {
    /// Create a store rooted at `base_dir`, creating the directory if needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self {
            base_dir,
            commit_lock: Mutex::new(()),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn table_dir(&self, table: &str) -> PathBuf {
        self.base_dir.join(table)
    }

    fn record_path(&self, table: &str, key: &str) -> PathBuf {
        self.table_dir(table).join(format!("{}.json", encode_key(key)))
    }

    fn read(&self, path: &Path) -> Result<Option<Versioned>> {
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(path).map_err(RepositoryError::Io)?;
        let versioned = serde_json::from_slice(&bytes)
            .map_err(|e| RepositoryError::CorruptedData(format!("{}: {}", path.display(), e)))?;
        Ok(Some(versioned))
    }
}

impl FileRecordStore {
    /// Write every new document to its temp file, then rename them all into place.
    fn write_and_swap(staged: &[(PathBuf, Option<u64>, &WriteOp)]) -> Result<()> {
        let mut renames = Vec::new();
        for (path, current, op) in staged {
            if let WriteOp::Put(value) = op {
                let document = Versioned {
                    version: current.map_or(1, |v| v + 1),
                    value: value.clone(),
                };
                let bytes = serde_json::to_vec_pretty(&document)
                    .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).map_err(RepositoryError::Io)?;
                }
                let temp = temp_path(path);
                fs::write(&temp, bytes).map_err(RepositoryError::Io)?;
                renames.push((temp, path));
            }
        }

        for (temp, path) in renames {
            fs::rename(&temp, path).map_err(RepositoryError::Io)?;
        }
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    path.with_extension("json.tmp")
}

impl RecordStore for FileRecordStore {
    fn get(&self, table: &str, key: &str) -> Result<Option<Versioned>> {
        self.read(&self.record_path(table, key))
    }

    fn scan(&self, table: &str) -> Result<Vec<(String, Versioned)>> {
        let dir = self.table_dir(table);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in fs::read_dir(&dir).map_err(RepositoryError::Io)? {
            let path = entry.map_err(RepositoryError::Io)?.path();

            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(encoded) = filename.strip_suffix(".json")
            {
                let key = decode_key(encoded)?;
                if let Some(versioned) = self.read(&path)? {
                    records.push((key, versioned));
                }
            }
        }

        records.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(records)
    }

    fn commit(&self, changeset: Changeset) -> Result<()> {
        let _guard = self
            .commit_lock
            .lock()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        let mut staged = Vec::with_capacity(changeset.len());
        for write in changeset.writes() {
            let path = self.record_path(write.table, &write.key);
            let current = self.read(&path)?.map(|v| v.version);
            write.check(current)?;
            staged.push((path, current, &write.op));
        }

        if let Err(err) = Self::write_and_swap(&staged) {
            // nothing is left half-staged; renames already done stay in place
            for (path, _, op) in &staged {
                if matches!(op, WriteOp::Put(_)) {
                    let _ = fs::remove_file(temp_path(path));
                }
            }
            return Err(err);
        }
        for (path, current, op) in &staged {
            if matches!(op, WriteOp::Delete) && current.is_some() {
                fs::remove_file(path).map_err(RepositoryError::Io)?;
            }
        }

        tracing::debug!(
            writes = changeset.len(),
            dir = %self.base_dir.display(),
            "committed changeset"
        );
        Ok(())
    }
}

/// Keep `[A-Za-z0-9_-]`, escape every other byte as `%XX`.
fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

fn decode_key(encoded: &str) -> Result<String> {
    let corrupted = || RepositoryError::CorruptedData(format!("bad record file name `{encoded}`"));

    let mut bytes = Vec::with_capacity(encoded.len());
    let mut iter = encoded.bytes();
    while let Some(byte) = iter.next() {
        if byte == b'%' {
            let hi = iter.next().ok_or_else(corrupted)?;
            let lo = iter.next().ok_or_else(corrupted)?;
            let pair = [hi, lo];
            let hex = std::str::from_utf8(&pair).map_err(|_| corrupted())?;
            bytes.push(u8::from_str_radix(hex, 16).map_err(|_| corrupted())?);
        } else {
            bytes.push(byte);
        }
    }
    String::from_utf8(bytes).map_err(|_| corrupted())
}
