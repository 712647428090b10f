//! Character classes and their effectiveness relationships.
//!
//! The set of classes is closed ([`CharacterClass`]); the numbers and the
//! relationship lists live in a [`ClassTable`] so content files can rebalance
//! them without touching the rules.

use strum::{Display, EnumCount, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::{ErrorSeverity, GameError};

/// Combat archetype a character picks once.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    EnumCount,
    IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CharacterClass {
    Warrior,
    Mage,
    Rogue,
    Ranger,
    Cleric,
    Paladin,
}

impl CharacterClass {
    /// Position of this class inside a [`ClassTable`].
    const fn index(self) -> usize {
        self as usize
    }
}

/// Static definition of a class.
///
/// Relationship semantics, read from the point of view of the class that owns
/// the definition:
/// - `vulnerabilities`: attackers of these classes hit this class harder (×1.5)
/// - `resistances`: attackers of these classes hit this class softer (×0.5)
/// - `synergies`: allies of these classes boost this class in raids (×1.1)
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassDefinition {
    pub class: CharacterClass,
    pub base_attack: u32,
    pub base_defense: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub vulnerabilities: Vec<CharacterClass>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub resistances: Vec<CharacterClass>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub synergies: Vec<CharacterClass>,
}

impl ClassDefinition {
    pub fn new(class: CharacterClass, base_attack: u32, base_defense: u32) -> Self {
        Self {
            class,
            base_attack,
            base_defense,
            vulnerabilities: Vec::new(),
            resistances: Vec::new(),
            synergies: Vec::new(),
        }
    }

    /// Set the classes this class is vulnerable against (builder pattern).
    #[must_use]
    pub fn vulnerable_to(mut self, classes: &[CharacterClass]) -> Self {
        self.vulnerabilities = classes.to_vec();
        self
    }

    /// Set the classes this class resists (builder pattern).
    #[must_use]
    pub fn resistant_to(mut self, classes: &[CharacterClass]) -> Self {
        self.resistances = classes.to_vec();
        self
    }

    /// Set the classes this class has synergy with (builder pattern).
    #[must_use]
    pub fn synergizes_with(mut self, classes: &[CharacterClass]) -> Self {
        self.synergies = classes.to_vec();
        self
    }

    /// Whether this class resists attacks coming from `attacker`.
    pub fn resists(&self, attacker: CharacterClass) -> bool {
        self.resistances.contains(&attacker)
    }

    /// Whether this class is vulnerable to attacks coming from `attacker`.
    pub fn is_vulnerable_to(&self, attacker: CharacterClass) -> bool {
        self.vulnerabilities.contains(&attacker)
    }
}

/// Errors raised while assembling static tables.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("class {0} has no definition")]
    MissingClass(CharacterClass),

    #[error("class {0} is defined more than once")]
    DuplicateClass(CharacterClass),

    #[error("boss `{0}` is defined more than once")]
    DuplicateBoss(String),

    #[error("boss `{name}` is invalid: {reason}")]
    InvalidBoss { name: String, reason: &'static str },
}

impl GameError for TableError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingClass(_) => "TABLE_MISSING_CLASS",
            Self::DuplicateClass(_) => "TABLE_DUPLICATE_CLASS",
            Self::DuplicateBoss(_) => "TABLE_DUPLICATE_BOSS",
            Self::InvalidBoss { .. } => "TABLE_INVALID_BOSS",
        }
    }
}

/// Complete, validated set of class definitions.
///
/// Every [`CharacterClass`] has exactly one definition, so lookups never fail.
/// Relationship lists are typed, which keeps them restricted to known classes.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassTable {
    definitions: Vec<ClassDefinition>,
}

impl ClassTable {
    /// Build a table, requiring one definition per class.
    pub fn new(definitions: Vec<ClassDefinition>) -> Result<Self, TableError> {
        let mut slots: Vec<Option<ClassDefinition>> = vec![None; CharacterClass::COUNT];

        for definition in definitions {
            let slot = &mut slots[definition.class.index()];
            if slot.is_some() {
                return Err(TableError::DuplicateClass(definition.class));
            }
            *slot = Some(definition);
        }

        let mut ordered = Vec::with_capacity(CharacterClass::COUNT);
        for (class, slot) in CharacterClass::iter().zip(slots) {
            ordered.push(slot.ok_or(TableError::MissingClass(class))?);
        }

        Ok(Self {
            definitions: ordered,
        })
    }

    /// Stock balance used when no content file overrides it.
    pub fn standard() -> Self {
        use CharacterClass::*;

        Self {
            definitions: vec![
                ClassDefinition::new(Warrior, 12, 8)
                    .vulnerable_to(&[Mage])
                    .resistant_to(&[Rogue])
                    .synergizes_with(&[Cleric]),
                ClassDefinition::new(Mage, 15, 4)
                    .vulnerable_to(&[Rogue])
                    .resistant_to(&[Cleric])
                    .synergizes_with(&[Warrior, Paladin]),
                ClassDefinition::new(Rogue, 14, 5)
                    .vulnerable_to(&[Warrior, Paladin])
                    .resistant_to(&[Mage])
                    .synergizes_with(&[Ranger]),
                ClassDefinition::new(Ranger, 13, 5)
                    .vulnerable_to(&[Rogue])
                    .resistant_to(&[Warrior])
                    .synergizes_with(&[Rogue, Cleric]),
                ClassDefinition::new(Cleric, 9, 7)
                    .vulnerable_to(&[Rogue])
                    .resistant_to(&[Mage])
                    .synergizes_with(&[Warrior, Paladin]),
                ClassDefinition::new(Paladin, 11, 9)
                    .vulnerable_to(&[Mage])
                    .resistant_to(&[Rogue, Warrior])
                    .synergizes_with(&[Cleric]),
            ],
        }
    }

    pub fn get(&self, class: CharacterClass) -> &ClassDefinition {
        &self.definitions[class.index()]
    }

    /// Look a class up by its (case-insensitive) name.
    pub fn by_name(&self, name: &str) -> Option<&ClassDefinition> {
        name.trim()
            .parse::<CharacterClass>()
            .ok()
            .map(|class| self.get(class))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassDefinition> {
        self.definitions.iter()
    }
}

impl Default for ClassTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_is_complete() {
        let table = ClassTable::standard();
        let rebuilt = ClassTable::new(table.iter().cloned().collect()).unwrap();
        assert_eq!(rebuilt, table);

        for class in CharacterClass::iter() {
            assert_eq!(table.get(class).class, class);
        }
    }

    #[test]
    fn missing_class_is_rejected() {
        let definitions: Vec<_> = ClassTable::standard()
            .iter()
            .filter(|def| def.class != CharacterClass::Cleric)
            .cloned()
            .collect();

        assert_eq!(
            ClassTable::new(definitions),
            Err(TableError::MissingClass(CharacterClass::Cleric))
        );
    }

    #[test]
    fn duplicate_class_is_rejected() {
        let mut definitions: Vec<_> = ClassTable::standard().iter().cloned().collect();
        definitions.push(ClassDefinition::new(CharacterClass::Mage, 1, 1));

        assert_eq!(
            ClassTable::new(definitions),
            Err(TableError::DuplicateClass(CharacterClass::Mage))
        );
    }

    #[test]
    fn lookup_by_name_ignores_case() {
        let table = ClassTable::standard();
        assert_eq!(
            table.by_name("warrior").map(|def| def.class),
            Some(CharacterClass::Warrior)
        );
        assert_eq!(
            table.by_name(" PALADIN ").map(|def| def.class),
            Some(CharacterClass::Paladin)
        );
        assert!(table.by_name("bard").is_none());
    }

    #[test]
    fn warrior_has_no_relationship_with_itself() {
        let warrior = ClassTable::standard().get(CharacterClass::Warrior).clone();
        assert!(!warrior.resists(CharacterClass::Warrior));
        assert!(!warrior.is_vulnerable_to(CharacterClass::Warrior));
    }
}
