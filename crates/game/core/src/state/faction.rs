//! Factions and their upgrade levels.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use strum::{Display, EnumIter, EnumString};

use super::UserId;

/// Bonuses purchased by a faction. Every field only ever grows.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FactionUpgrades {
    pub power_bonus: u32,
    /// Fraction added to members' hourly multiplier (0.05 = +5%).
    pub hourly_bonus: f64,
    pub attack_bonus: u32,
    pub defense_bonus: u32,
}

impl FactionUpgrades {
    /// Weighted value of the upgrades, used for the faction leaderboard.
    pub fn score(&self) -> f64 {
        f64::from(self.power_bonus) * 1_000.0
            + self.hourly_bonus * 2_000.0
            + f64::from(self.attack_bonus) * 500.0
            + f64::from(self.defense_bonus) * 500.0
    }
}

/// Upgrade a faction leader can buy with the resource pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UpgradeKind {
    Power,
    Hourly,
    Attack,
    Defense,
}

impl UpgradeKind {
    /// Resource cost of one level.
    pub const fn cost(self) -> u64 {
        match self {
            Self::Power => 1_000,
            Self::Hourly => 2_000,
            Self::Attack | Self::Defense => 1_500,
        }
    }

    fn apply(self, upgrades: &mut FactionUpgrades) {
        match self {
            Self::Power => upgrades.power_bonus += 1,
            Self::Hourly => upgrades.hourly_bonus += 0.05,
            Self::Attack => upgrades.attack_bonus += 1,
            Self::Defense => upgrades.defense_bonus += 1,
        }
    }
}

/// A named group sharing a resource pool and upgrades.
///
/// Invariant: `leader` is always in `members`. Characters point back at the
/// faction through [`super::CharacterState::faction`]; the runtime writes both
/// sides in the same commit.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Faction {
    pub name: String,
    pub leader: UserId,
    pub members: BTreeSet<UserId>,
    pub resources: u64,
    pub upgrades: FactionUpgrades,
    pub last_income: Option<DateTime<Utc>>,
}

impl Faction {
    pub fn new(name: impl Into<String>, leader: UserId) -> Self {
        let mut members = BTreeSet::new();
        members.insert(leader.clone());
        Self {
            name: name.into(),
            leader,
            members,
            resources: 0,
            upgrades: FactionUpgrades::default(),
            last_income: None,
        }
    }

    pub fn is_leader(&self, user: &UserId) -> bool {
        &self.leader == user
    }

    pub fn is_member(&self, user: &UserId) -> bool {
        self.members.contains(user)
    }

    pub fn add_member(&mut self, user: UserId) -> bool {
        self.members.insert(user)
    }

    /// Remove a non-leader member. The leader can only leave by disbanding.
    pub fn remove_member(&mut self, user: &UserId) -> bool {
        if self.is_leader(user) {
            return false;
        }
        self.members.remove(user)
    }

    pub fn deposit(&mut self, amount: u64) {
        self.resources = self.resources.saturating_add(amount);
    }

    /// Spend resources on one upgrade level. Returns false when the pool is short.
    pub fn purchase(&mut self, kind: UpgradeKind) -> bool {
        match self.resources.checked_sub(kind.cost()) {
            Some(rest) => {
                self.resources = rest;
                kind.apply(&mut self.upgrades);
                true
            }
            None => false,
        }
    }

    /// Grow the pool by 5%, rounded down. Returns the new pool size.
    pub fn collect_income(&mut self, now: DateTime<Utc>) -> u64 {
        self.resources = self.resources.saturating_add(self.resources / 20);
        self.last_income = Some(now);
        self.resources
    }

    /// Leaderboard score: resources plus weighted upgrades.
    pub fn score(&self) -> f64 {
        self.resources as f64 + self.upgrades.score()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leader_is_a_member_and_cannot_be_removed() {
        let leader = UserId::from("lead");
        let mut faction = Faction::new("Iron Pact", leader.clone());
        assert!(faction.is_member(&leader));
        assert!(!faction.remove_member(&leader));

        let member = UserId::from("grunt");
        assert!(faction.add_member(member.clone()));
        assert!(faction.remove_member(&member));
        assert!(!faction.is_member(&member));
    }

    #[test]
    fn purchase_spends_resources_and_raises_level() {
        let mut faction = Faction::new("Iron Pact", UserId::from("lead"));
        faction.deposit(2_600);

        assert!(faction.purchase(UpgradeKind::Attack));
        assert_eq!(faction.resources, 1_100);
        assert_eq!(faction.upgrades.attack_bonus, 1);

        assert!(!faction.purchase(UpgradeKind::Hourly));
        assert_eq!(faction.resources, 1_100);
        assert_eq!(faction.upgrades.hourly_bonus, 0.0);
    }

    #[test]
    fn upgrade_names_parse_case_insensitively() {
        assert_eq!("Defense".parse::<UpgradeKind>(), Ok(UpgradeKind::Defense));
        assert_eq!(UpgradeKind::Hourly.to_string(), "hourly");
        assert!("speed".parse::<UpgradeKind>().is_err());
    }

    #[test]
    fn income_adds_five_percent() {
        let mut faction = Faction::new("Iron Pact", UserId::from("lead"));
        faction.deposit(1_010);
        assert_eq!(faction.collect_income(Utc::now()), 1_060);
        assert!(faction.last_income.is_some());
    }

    #[test]
    fn score_weights_upgrades() {
        let mut faction = Faction::new("Iron Pact", UserId::from("lead"));
        faction.deposit(100);
        faction.upgrades.power_bonus = 1;
        faction.upgrades.defense_bonus = 2;
        assert_eq!(faction.score(), 100.0 + 1_000.0 + 1_000.0);
    }
}
