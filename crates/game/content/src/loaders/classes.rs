//! Class table loader.

use std::path::Path;

use anyhow::Context;
use arena_core::{ClassDefinition, ClassTable};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Class catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassCatalog {
    pub classes: Vec<ClassDefinition>,
}

/// Loader for the class table from RON files.
pub struct ClassLoader;

impl ClassLoader {
    /// Load and validate a class table from a RON file.
    ///
    /// The file must define every class exactly once.
    pub fn load(path: &Path) -> LoadResult<ClassTable> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("Invalid class table {}", path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<ClassTable> {
        let catalog: ClassCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse class catalog RON: {}", e))?;

        Ok(ClassTable::new(catalog.classes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::CharacterClass;

    #[test]
    fn bundled_classes_match_the_stock_table() {
        let table = ClassLoader::parse(include_str!("../../data/classes.ron")).unwrap();
        assert_eq!(table, ClassTable::standard());
    }

    #[test]
    fn incomplete_catalog_is_rejected() {
        let err = ClassLoader::parse(
            "(classes: [(class: Warrior, base_attack: 10, base_defense: 5)])",
        )
        .unwrap_err();
        assert!(err.to_string().contains("has no definition"));
    }

    #[test]
    fn relationship_lists_default_to_empty() {
        let source = "(classes: [
            (class: Warrior, base_attack: 1, base_defense: 1),
            (class: Mage, base_attack: 2, base_defense: 1),
            (class: Rogue, base_attack: 3, base_defense: 1),
            (class: Ranger, base_attack: 4, base_defense: 1),
            (class: Cleric, base_attack: 5, base_defense: 1),
            (class: Paladin, base_attack: 6, base_defense: 1, synergies: [Cleric]),
        ])";
        let table = ClassLoader::parse(source).unwrap();
        assert!(table.get(CharacterClass::Warrior).resistances.is_empty());
        assert_eq!(
            table.get(CharacterClass::Paladin).synergies,
            vec![CharacterClass::Cleric]
        );
    }

    #[test]
    fn unknown_class_name_fails_to_parse() {
        assert!(ClassLoader::parse("(classes: [(class: Bard, base_attack: 1, base_defense: 1)])").is_err());
    }
}
