//! Raid bosses.

use std::collections::BTreeMap;

use chrono::Duration;

use crate::class::TableError;

/// Static definition of a raid boss.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BossDefinition {
    pub name: String,
    pub health: f64,
    pub attack: u32,
    pub defense: u32,
    pub reward_gold: u64,
    /// Minimum seconds between two attempts by the same character.
    pub cooldown_secs: u64,
}

impl BossDefinition {
    pub fn new(
        name: impl Into<String>,
        health: f64,
        attack: u32,
        defense: u32,
        reward_gold: u64,
        cooldown_secs: u64,
    ) -> Self {
        Self {
            name: name.into(),
            health,
            attack,
            defense,
            reward_gold,
            cooldown_secs,
        }
    }

    pub fn cooldown(&self) -> Duration {
        i64::try_from(self.cooldown_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX)
    }
}

/// Bosses keyed by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BossTable {
    bosses: BTreeMap<String, BossDefinition>,
}

impl BossTable {
    /// Build a table, rejecting duplicate names and bosses that cannot be fought.
    pub fn new(bosses: Vec<BossDefinition>) -> Result<Self, TableError> {
        let mut table = BTreeMap::new();

        for boss in bosses {
            if boss.name.trim().is_empty() {
                return Err(TableError::InvalidBoss {
                    name: boss.name,
                    reason: "name is empty",
                });
            }
            if !(boss.health.is_finite() && boss.health > 0.0) {
                return Err(TableError::InvalidBoss {
                    name: boss.name,
                    reason: "health must be a positive number",
                });
            }
            if table.contains_key(&boss.name) {
                return Err(TableError::DuplicateBoss(boss.name));
            }
            table.insert(boss.name.clone(), boss);
        }

        Ok(Self { bosses: table })
    }

    /// Stock bosses used when no content file overrides them.
    pub fn standard() -> Self {
        let bosses = [
            BossDefinition::new("Goblin King", 250.0, 18, 8, 400, 60 * 60),
            BossDefinition::new("Frost Wyrm", 600.0, 30, 15, 1_200, 6 * 60 * 60),
            BossDefinition::new("Ancient Dragon", 1_500.0, 45, 25, 5_000, 24 * 60 * 60),
        ];

        Self {
            bosses: bosses
                .into_iter()
                .map(|boss| (boss.name.clone(), boss))
                .collect(),
        }
    }

    /// Exact name first, then a case-insensitive match.
    pub fn get(&self, name: &str) -> Option<&BossDefinition> {
        let name = name.trim();
        self.bosses.get(name).or_else(|| {
            self.bosses
                .values()
                .find(|boss| boss.name.eq_ignore_ascii_case(name))
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bosses.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BossDefinition> {
        self.bosses.values()
    }

    pub fn is_empty(&self) -> bool {
        self.bosses.is_empty()
    }
}
