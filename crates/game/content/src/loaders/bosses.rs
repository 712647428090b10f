//! Boss table loader.

use std::path::Path;

use anyhow::Context;
use arena_core::{BossDefinition, BossTable};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Boss catalog structure for TOML files (`[[bosses]]` array of tables).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossCatalog {
    pub bosses: Vec<BossDefinition>,
}

/// Loader for the boss table from TOML files.
pub struct BossLoader;

impl BossLoader {
    pub fn load(path: &Path) -> LoadResult<BossTable> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("Invalid boss table {}", path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<BossTable> {
        let catalog: BossCatalog = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse boss catalog TOML: {}", e))?;

        if catalog.bosses.is_empty() {
            anyhow::bail!("Boss catalog defines no bosses");
        }

        Ok(BossTable::new(catalog.bosses)?)
    }
}
