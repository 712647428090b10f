//! Content factory for loading every static table from a data directory.

use std::path::{Path, PathBuf};

use arena_core::{BossTable, ClassTable};

use crate::loaders::{BossLoader, ClassLoader, LoadResult};

/// Content factory that loads all arena content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── classes.ron
/// └── bosses.toml
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub const CLASSES_FILE: &'static str = "classes.ron";
    pub const BOSSES_FILE: &'static str = "bosses.toml";

    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load the class table from `classes.ron`.
    pub fn load_classes(&self) -> LoadResult<ClassTable> {
        let path = self.data_dir.join(Self::CLASSES_FILE);
        let table = ClassLoader::load(&path)?;
        tracing::debug!(path = %path.display(), "loaded class table");
        Ok(table)
    }

    /// Load the boss table from `bosses.toml`.
    pub fn load_bosses(&self) -> LoadResult<BossTable> {
        let path = self.data_dir.join(Self::BOSSES_FILE);
        let table = BossLoader::load(&path)?;
        tracing::debug!(
            path = %path.display(),
            bosses = table.names().count(),
            "loaded boss table"
        );
        Ok(table)
    }

    /// Load both tables.
    pub fn load_all(&self) -> LoadResult<(ClassTable, BossTable)> {
        Ok((self.load_classes()?, self.load_bosses()?))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn loads_tables_from_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(ContentFactory::CLASSES_FILE),
            include_str!("../../data/classes.ron"),
        )
        .unwrap();
        std::fs::write(
            dir.path().join(ContentFactory::BOSSES_FILE),
            include_str!("../../data/bosses.toml"),
        )
        .unwrap();

        let (classes, bosses) = ContentFactory::new(dir.path()).load_all().unwrap();
        assert_eq!(classes, ClassTable::standard());
        assert!(bosses.get("Ancient Dragon").is_some());
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = ContentFactory::new(dir.path()).load_bosses().unwrap_err();
        assert!(err.to_string().contains("bosses.toml"));
    }
}
