//! Values returned to the presentation layer.

use arena_core::{
    BossFightOutcome, CharacterState, DuelOutcome, EffectiveStats, Faction, Raid, RaidId,
    TeamOutcome, UserId,
};
use strum::{Display, EnumIter, EnumString};

use crate::arena::ArenaConfig;

/// Result of a duel, including the wager settlement.
#[derive(Clone, Debug, PartialEq)]
pub struct DuelReport {
    pub narrative: String,
    pub winner: Option<UserId>,
    pub loser: Option<UserId>,
    pub bet: u64,
    pub outcome: DuelOutcome,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CoinflipReport {
    pub narrative: String,
    pub winner: UserId,
    pub loser: UserId,
    pub bet: u64,
}

/// Result of a team battle. Both lists are `None` on a draw.
#[derive(Clone, Debug, PartialEq)]
pub struct TeamReport {
    pub narrative: String,
    pub winners: Option<Vec<UserId>>,
    pub losers: Option<Vec<UserId>>,
    pub outcome: TeamOutcome,
}

/// One boss fight and the raid state it left behind.
#[derive(Clone, Debug, PartialEq)]
pub struct RaidReport {
    pub narrative: String,
    pub raid: Raid,
    pub outcome: BossFightOutcome,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadyStatus {
    pub raid: RaidId,
    pub all_ready: bool,
}

/// Character sheet: stored state plus resolved stats.
#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
    pub character: CharacterState,
    /// `None` until a class is chosen.
    pub stats: Option<EffectiveStats>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HourlyClaim {
    pub roll: u32,
    pub multiplier: f64,
    pub amount: u64,
    pub balance: u64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HealReport {
    pub restored: f64,
    pub health: f64,
    pub max_health: u32,
}

/// Things a character can buy with gold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ShopItem {
    Power,
    #[strum(to_string = "max_health", serialize = "health")]
    MaxHealth,
    #[strum(to_string = "hourly", serialize = "multiplier")]
    Hourly,
}

impl ShopItem {
    /// Gold cost of one unit.
    pub fn price(self, config: &ArenaConfig) -> u64 {
        match self {
            Self::Power => config.power_price,
            Self::MaxHealth => config.max_health_price,
            Self::Hourly => config.hourly_multiplier_price,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Purchase {
    pub item: ShopItem,
    pub amount: u32,
    pub cost: u64,
    pub character: CharacterState,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FactionIncome {
    pub gained: u64,
    pub resources: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub name: String,
    pub score: f64,
    pub members: usize,
}

impl LeaderboardEntry {
    pub(crate) fn new(rank: usize, faction: &Faction) -> Self {
        Self {
            rank,
            name: faction.name.clone(),
            score: faction.score(),
            members: faction.members.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shop_items_parse_from_aliases() {
        assert_eq!("power".parse::<ShopItem>(), Ok(ShopItem::Power));
        assert_eq!("Health".parse::<ShopItem>(), Ok(ShopItem::MaxHealth));
        assert_eq!("max_health".parse::<ShopItem>(), Ok(ShopItem::MaxHealth));
        assert_eq!("multiplier".parse::<ShopItem>(), Ok(ShopItem::Hourly));
        assert!("sword".parse::<ShopItem>().is_err());
    }

    #[test]
    fn prices_come_from_config() {
        let config = ArenaConfig::default();
        assert_eq!(ShopItem::Power.price(&config), 100);
        assert_eq!(ShopItem::MaxHealth.price(&config), 200);
        assert_eq!(ShopItem::Hourly.price(&config), 500);
    }
}
