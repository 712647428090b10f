//! Effective stat resolution.
//!
//! Combines a character's persisted base values with its class definition and
//! the upgrades of the faction it belongs to:
//!
//! ```text
//! final_power    = power + faction.power_bonus
//! final_attack   = class.base_attack + final_power + faction.attack_bonus
//! final_defense  = BASE_DEFENSE + faction.defense_bonus
//! final_hourly   = hourly_multiplier × (1 + faction.hourly_bonus)
//! ```
//!
//! Characters without a faction resolve as if every bonus were zero.

use crate::class::ClassTable;
use crate::combat::CombatError;
use crate::state::{CharacterState, FactionUpgrades};

/// Flat defense every character starts from, regardless of class.
pub const BASE_DEFENSE: u32 = 5;

/// Resolved combat and economy stats for one character.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectiveStats {
    pub final_power: u32,
    pub final_attack: u32,
    pub final_defense: u32,
    pub final_hourly_multiplier: f64,
}

/// Read-only view over the class table that turns records into stats.
#[derive(Clone, Copy, Debug)]
pub struct StatResolver<'a> {
    classes: &'a ClassTable,
}

impl<'a> StatResolver<'a> {
    pub fn new(classes: &'a ClassTable) -> Self {
        Self { classes }
    }

    pub fn classes(&self) -> &'a ClassTable {
        self.classes
    }

    pub fn final_power(character: &CharacterState, upgrades: Option<&FactionUpgrades>) -> u32 {
        let bonus = upgrades.map_or(0, |u| u.power_bonus);
        character.power.saturating_add(bonus)
    }

    pub fn final_hourly_multiplier(
        character: &CharacterState,
        upgrades: Option<&FactionUpgrades>,
    ) -> f64 {
        let bonus = upgrades.map_or(0.0, |u| u.hourly_bonus);
        character.hourly_multiplier * (1.0 + bonus)
    }

    /// Resolve every effective stat.
    ///
    /// # Errors
    ///
    /// [`CombatError::NoClassSelected`] when the character has no class yet.
    pub fn resolve(
        &self,
        character: &CharacterState,
        upgrades: Option<&FactionUpgrades>,
    ) -> Result<EffectiveStats, CombatError> {
        let class = character
            .class
            .ok_or_else(|| CombatError::NoClassSelected {
                id: character.id.clone(),
            })?;
        let definition = self.classes.get(class);

        let final_power = Self::final_power(character, upgrades);
        let attack_bonus = upgrades.map_or(0, |u| u.attack_bonus);
        let defense_bonus = upgrades.map_or(0, |u| u.defense_bonus);

        Ok(EffectiveStats {
            final_power,
            final_attack: definition
                .base_attack
                .saturating_add(final_power)
                .saturating_add(attack_bonus),
            final_defense: BASE_DEFENSE.saturating_add(defense_bonus),
            final_hourly_multiplier: Self::final_hourly_multiplier(character, upgrades),
        })
    }
}
