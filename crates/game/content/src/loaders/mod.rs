//! Content loaders for reading arena data from files.

pub mod bosses;
pub mod classes;
pub mod factory;

pub use bosses::{BossCatalog, BossLoader};
pub use classes::{ClassCatalog, ClassLoader};
pub use factory::ContentFactory;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
