//! Static arena content and its loaders.
//!
//! Class balance and raid bosses are read-only data loaded once at process
//! start. Files use RON for classes and TOML for bosses:
//! - `classes.ron`: one [`ClassDefinition`](arena_core::ClassDefinition) per class
//! - `bosses.toml`: `[[bosses]]` entries of [`BossDefinition`](arena_core::BossDefinition)
//!
//! Content never appears in stored records; the runtime keeps it in memory.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{BossCatalog, BossLoader, ClassCatalog, ClassLoader, ContentFactory, LoadResult};
