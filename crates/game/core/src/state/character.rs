//! Per-user character record.

use chrono::{DateTime, Utc};

use super::UserId;
use crate::class::CharacterClass;

/// Health and max health of a freshly created character.
pub const DEFAULT_MAX_HEALTH: u32 = 100;

/// Everything stored about one user.
///
/// Invariant: `0.0 <= health <= max_health`. All mutators below clamp, so the
/// only way to break it is to write the fields directly.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterState {
    pub id: UserId,
    pub class: Option<CharacterClass>,
    pub health: f64,
    pub max_health: u32,
    pub power: u32,
    pub gold: u64,
    pub faction: Option<String>,
    pub raid_wins: u32,
    /// Personal multiplier applied to hourly claims before faction bonuses.
    pub hourly_multiplier: f64,
    pub last_hourly_claim: Option<DateTime<Utc>>,
    pub last_heal: Option<DateTime<Utc>>,
}

impl CharacterState {
    /// Defaults used for lazy creation on first interaction.
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            class: None,
            health: f64::from(DEFAULT_MAX_HEALTH),
            max_health: DEFAULT_MAX_HEALTH,
            power: 0,
            gold: 0,
            faction: None,
            raid_wins: 0,
            hourly_multiplier: 1.0,
            last_hourly_claim: None,
            last_heal: None,
        }
    }

    /// Set the class (builder pattern).
    #[must_use]
    pub fn with_class(mut self, class: CharacterClass) -> Self {
        self.class = Some(class);
        self
    }

    /// Set current health, clamped to `[0, max_health]` (builder pattern).
    #[must_use]
    pub fn with_health(mut self, health: f64) -> Self {
        self.set_health(health);
        self
    }

    pub fn max_health_f64(&self) -> f64 {
        f64::from(self.max_health)
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Overwrite health, clamped to `[0, max_health]`.
    pub fn set_health(&mut self, health: f64) {
        self.health = if health.is_nan() {
            0.0
        } else {
            health.clamp(0.0, self.max_health_f64())
        };
    }

    /// Subtract damage and return the new health.
    pub fn apply_damage(&mut self, damage: f64) -> f64 {
        self.set_health(self.health - damage.max(0.0));
        self.health
    }

    /// Restore health, clamped to max. Returns the amount actually restored.
    pub fn heal(&mut self, amount: f64) -> f64 {
        let before = self.health;
        self.set_health(before + amount.max(0.0));
        self.health - before
    }

    /// Defeat penalty: full health, empty purse. Class, faction and power persist.
    pub fn reset_after_defeat(&mut self) {
        self.health = self.max_health_f64();
        self.gold = 0;
    }

    /// Apply the defeat penalty if health reached zero. Returns whether it did.
    pub fn settle_defeat(&mut self) -> bool {
        if self.is_alive() {
            return false;
        }
        self.reset_after_defeat();
        true
    }

    pub fn can_afford(&self, amount: u64) -> bool {
        self.gold >= amount
    }

    /// Remove gold if the balance covers it.
    pub fn try_debit(&mut self, amount: u64) -> bool {
        match self.gold.checked_sub(amount) {
            Some(rest) => {
                self.gold = rest;
                true
            }
            None => false,
        }
    }

    pub fn credit(&mut self, amount: u64) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// Raise max health. Current health is left untouched.
    pub fn raise_max_health(&mut self, amount: u32) {
        self.max_health = self.max_health.saturating_add(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_character_uses_defaults() {
        let character = CharacterState::new(UserId::from("ada"));
        assert_eq!(character.health, 100.0);
        assert_eq!(character.max_health, 100);
        assert_eq!(character.gold, 0);
        assert!(character.class.is_none());
        assert!(character.faction.is_none());
    }

    #[test]
    fn damage_is_clamped_at_zero() {
        let mut character = CharacterState::new(UserId::from("ada")).with_health(12.0);
        assert_eq!(character.apply_damage(30.5), 0.0);
        assert!(!character.is_alive());
    }

    #[test]
    fn heal_is_clamped_at_max() {
        let mut character = CharacterState::new(UserId::from("ada")).with_health(95.0);
        assert_eq!(character.heal(10.0), 5.0);
        assert_eq!(character.health, 100.0);
    }

    #[test]
    fn settle_defeat_resets_health_and_gold_only() {
        let mut character = CharacterState::new(UserId::from("ada"))
            .with_class(CharacterClass::Rogue)
            .with_health(3.0);
        character.gold = 250;
        character.power = 4;
        character.faction = Some("Night Owls".into());
        character.raise_max_health(20);

        character.apply_damage(10.0);
        assert!(character.settle_defeat());
        assert_eq!(character.health, 120.0);
        assert_eq!(character.gold, 0);
        assert_eq!(character.power, 4);
        assert_eq!(character.class, Some(CharacterClass::Rogue));
        assert_eq!(character.faction.as_deref(), Some("Night Owls"));
    }

    #[test]
    fn settle_defeat_ignores_living_characters() {
        let mut character = CharacterState::new(UserId::from("ada")).with_health(1.0);
        character.gold = 10;
        assert!(!character.settle_defeat());
        assert_eq!(character.gold, 10);
    }

    #[test]
    fn debit_requires_funds() {
        let mut character = CharacterState::new(UserId::from("ada"));
        character.credit(50);
        assert!(!character.try_debit(51));
        assert_eq!(character.gold, 50);
        assert!(character.try_debit(50));
        assert_eq!(character.gold, 0);
    }
}
