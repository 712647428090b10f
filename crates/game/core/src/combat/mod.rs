//! Combat resolution.
//!
//! Pure engines for the three encounter kinds. Each engine validates its
//! roster, draws rolls from a [`RollSource`](crate::rng::RollSource) in a
//! fixed order, mutates the characters it was handed and returns a report.
//! Nothing is mutated when validation fails.
//!
//! - [`resolve_duel`]: one simultaneous exchange between two combatants
//! - [`resolve_team_battle`]: the same exchange between two teams of 1 to 4
//! - [`resolve_boss_fight`]: a raid party against a boss, with retaliation
//!   and loot split

pub mod boss;
pub mod duel;
pub mod modifier;
pub mod result;
pub mod team;

use std::fmt;

pub use boss::{BossFightOutcome, RaidFighter, RaidFighterReport, resolve_boss_fight};
pub use duel::{DuelOutcome, resolve_duel};
pub use modifier::{
    RESISTANCE_MODIFIER, SYNERGY_BONUS, VULNERABILITY_MODIFIER, attack_modifier, synergy_bonus,
};
pub use result::{DuelSide, FighterReport, TeamSide, Verdict};
pub use team::{MAX_TEAM_SIZE, TeamOutcome, TeamTally, resolve_team_battle};

use crate::class::CharacterClass;
use crate::error::{ErrorSeverity, GameError};
use crate::rng::CombatRolls;
use crate::state::{CharacterState, FactionUpgrades, UserId};
use crate::stats::{EffectiveStats, StatResolver};

/// Why a character cannot enter a fight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidReason {
    NoClass,
    Defeated,
    Duplicate,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoClass => "no class selected",
            Self::Defeated => "no health left",
            Self::Duplicate => "already on the field",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CombatError {
    #[error("{id} has not chosen a class")]
    NoClassSelected { id: UserId },

    #[error("{id} cannot fight: {reason}")]
    InvalidCombatant { id: UserId, reason: InvalidReason },

    #[error("{side} has {len} members, teams need between 1 and {MAX_TEAM_SIZE}")]
    TeamSize { side: TeamSide, len: usize },

    #[error("a boss fight needs at least one participant")]
    EmptyRoster,
}

impl GameError for CombatError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoClassSelected { .. } => "COMBAT_NO_CLASS",
            Self::InvalidCombatant { .. } => "COMBAT_INVALID_COMBATANT",
            Self::TeamSize { .. } => "COMBAT_TEAM_SIZE",
            Self::EmptyRoster => "COMBAT_EMPTY_ROSTER",
        }
    }
}

/// A character prepared for a duel or team battle.
///
/// Stats are resolved once, when the combatant is built; the engines then
/// mutate `character` and the caller persists it.
#[derive(Clone, Debug, PartialEq)]
pub struct Combatant {
    pub character: CharacterState,
    pub class: CharacterClass,
    pub stats: EffectiveStats,
}

impl Combatant {
    /// # Errors
    ///
    /// [`CombatError::InvalidCombatant`] when the character has no class or
    /// no health left.
    pub fn new(
        character: CharacterState,
        upgrades: Option<&FactionUpgrades>,
        resolver: &StatResolver<'_>,
    ) -> Result<Self, CombatError> {
        let Some(class) = character.class else {
            return Err(CombatError::InvalidCombatant {
                id: character.id,
                reason: InvalidReason::NoClass,
            });
        };
        let stats = resolver.resolve(&character, upgrades)?;
        let combatant = Self {
            character,
            class,
            stats,
        };
        combatant.ensure_standing()?;
        Ok(combatant)
    }

    pub fn id(&self) -> &UserId {
        &self.character.id
    }

    pub fn into_character(self) -> CharacterState {
        self.character
    }

    fn ensure_standing(&self) -> Result<(), CombatError> {
        if self.character.is_alive() {
            Ok(())
        } else {
            Err(CombatError::InvalidCombatant {
                id: self.id().clone(),
                reason: InvalidReason::Defeated,
            })
        }
    }

    /// `(final_attack + attack roll) × modifier`
    fn effective_attack(&self, rolls: CombatRolls, modifier: f64) -> f64 {
        (f64::from(self.stats.final_attack) + f64::from(rolls.attack)) * modifier
    }

    /// `final_defense + defense roll`
    fn effective_defense(&self, rolls: CombatRolls) -> f64 {
        f64::from(self.stats.final_defense) + f64::from(rolls.defense)
    }

    /// Apply incoming damage, settle a defeat, and describe what happened.
    fn take_hit(
        &mut self,
        rolls: CombatRolls,
        modifier: f64,
        attack: f64,
        defense: f64,
        damage: f64,
    ) -> FighterReport {
        let health_after = self.character.apply_damage(damage);
        let defeated = self.character.settle_defeat();
        FighterReport {
            id: self.id().clone(),
            class: self.class,
            rolls,
            modifier,
            effective_attack: attack,
            effective_defense: defense,
            damage_taken: damage,
            health_after,
            defeated,
        }
    }
}

/// Reject repeated ids anywhere in the given rosters.
fn ensure_distinct<'a>(ids: impl IntoIterator<Item = &'a UserId>) -> Result<(), CombatError> {
    let mut seen = std::collections::BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CombatError::InvalidCombatant {
                id: id.clone(),
                reason: InvalidReason::Duplicate,
            });
        }
    }
    Ok(())
}

/// `max(0, attack - defense)`
fn damage_through(attack: f64, defense: f64) -> f64 {
    (attack - defense).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::ClassTable;

    #[test]
    fn combatant_requires_class_and_health() {
        let classes = ClassTable::standard();
        let resolver = StatResolver::new(&classes);

        let classless = CharacterState::new(UserId::from("ada"));
        assert_eq!(
            Combatant::new(classless, None, &resolver),
            Err(CombatError::InvalidCombatant {
                id: UserId::from("ada"),
                reason: InvalidReason::NoClass
            })
        );

        let fallen = CharacterState::new(UserId::from("bo"))
            .with_class(CharacterClass::Cleric)
            .with_health(0.0);
        assert_eq!(
            Combatant::new(fallen, None, &resolver),
            Err(CombatError::InvalidCombatant {
                id: UserId::from("bo"),
                reason: InvalidReason::Defeated
            })
        );
    }

    #[test]
    fn duplicates_are_reported_by_id() {
        let a = UserId::from("a");
        let b = UserId::from("b");
        assert!(ensure_distinct([&a, &b]).is_ok());
        assert_eq!(
            ensure_distinct([&a, &b, &a]),
            Err(CombatError::InvalidCombatant {
                id: a.clone(),
                reason: InvalidReason::Duplicate
            })
        );
    }
}
