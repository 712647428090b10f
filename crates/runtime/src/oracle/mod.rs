//! Read-only access to static content.
//!
//! The class and boss tables are loaded once and shared behind `Arc`s; every
//! clone of [`ContentOracle`] sees the same data.

use std::path::Path;
use std::sync::Arc;

use arena_content::{BossLoader, ClassLoader, ContentFactory, LoadResult};
use arena_core::{BossDefinition, BossTable, ClassTable, StatResolver};

#[derive(Clone, Debug)]
pub struct ContentOracle {
    classes: Arc<ClassTable>,
    bosses: Arc<BossTable>,
}

impl ContentOracle {
    pub fn new(classes: ClassTable, bosses: BossTable) -> Self {
        Self {
            classes: Arc::new(classes),
            bosses: Arc::new(bosses),
        }
    }

    /// Stock tables, optionally replaced by content files.
    pub fn load(classes: Option<&Path>, bosses: Option<&Path>) -> LoadResult<Self> {
        let classes = match classes {
            Some(path) => ClassLoader::load(path)?,
            None => ClassTable::standard(),
        };
        let bosses = match bosses {
            Some(path) => BossLoader::load(path)?,
            None => BossTable::standard(),
        };
        Ok(Self::new(classes, bosses))
    }

    /// Both tables from a directory holding `classes.ron` and `bosses.toml`.
    pub fn from_dir(dir: &Path) -> LoadResult<Self> {
        let (classes, bosses) = ContentFactory::new(dir).load_all()?;
        Ok(Self::new(classes, bosses))
    }

    pub fn classes(&self) -> &ClassTable {
        &self.classes
    }

    pub fn bosses(&self) -> &BossTable {
        &self.bosses
    }

    pub fn boss(&self, name: &str) -> Option<&BossDefinition> {
        self.bosses.get(name)
    }

    pub fn resolver(&self) -> StatResolver<'_> {
        StatResolver::new(&self.classes)
    }
}

impl Default for ContentOracle {
    fn default() -> Self {
        Self::new(ClassTable::standard(), BossTable::standard())
    }
}
