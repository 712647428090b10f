//! Character sheet, class selection and the personal economy.

use arena_core::{EffectiveStats, StatResolver, UserId, check_cooldown};

use super::{ensure_cooldown, ensure_funds};
use crate::api::{ArenaError, HealReport, HourlyClaim, Profile, Purchase, Result, ShopItem};
use crate::arena::Arena;
use crate::repository::Changeset;

impl Arena {
    pub fn profile(&self, user: &UserId) -> Result<Profile> {
        self.guarded("profile", || {
            let character = self.ensure_character(user)?.into_inner();
            let faction = self.faction_of(&character)?;
            let upgrades = faction.as_ref().map(|f| &f.record.upgrades);

            let stats = match character.class {
                Some(_) => Some(self.oracle().resolver().resolve(&character, upgrades)?),
                None => None,
            };
            Ok(Profile { character, stats })
        })
    }

    /// Resolved stats, or [`ArenaError::NoClassSelected`] before a class is picked.
    pub fn effective_stats(&self, user: &UserId) -> Result<EffectiveStats> {
        self.guarded("effective_stats", || {
            let character = self.ensure_character(user)?.into_inner();
            let faction = self.faction_of(&character)?;
            let upgrades = faction.as_ref().map(|f| &f.record.upgrades);
            Ok(self.oracle().resolver().resolve(&character, upgrades)?)
        })
    }

    /// Pick a class. Allowed once per character.
    pub fn select_class(&self, user: &UserId, class_name: &str) -> Result<Profile> {
        self.guarded("select_class", || {
            let class = self
                .oracle()
                .classes()
                .by_name(class_name)
                .map(|definition| definition.class)
                .ok_or_else(|| ArenaError::UnknownClass(class_name.trim().to_owned()))?;

            let mut stored = self.ensure_character(user)?;
            if stored.record.class.is_some() {
                return Err(ArenaError::ClassAlreadySelected { id: user.clone() });
            }
            stored.record.class = Some(class);

            let mut changeset = Changeset::new();
            changeset.update(&stored)?;
            self.store().commit(changeset)?;

            tracing::info!(%user, %class, "class selected");
            let character = stored.into_inner();
            let faction = self.faction_of(&character)?;
            let stats = self
                .oracle()
                .resolver()
                .resolve(&character, faction.as_ref().map(|f| &f.record.upgrades))?;
            Ok(Profile {
                character,
                stats: Some(stats),
            })
        })
    }

    /// Hourly gold: a base roll scaled by the final hourly multiplier.
    pub fn claim_hourly(&self, user: &UserId) -> Result<HourlyClaim> {
        let config = self.config();
        self.guarded("claim_hourly", || {
            let now = self.now();
            let mut stored = self.ensure_character(user)?;
            ensure_cooldown(
                check_cooldown(stored.record.last_hourly_claim, config.hourly_cooldown, now),
                || "hourly claim".to_owned(),
            )?;

            let faction = self.faction_of(&stored.record)?;
            let multiplier = StatResolver::final_hourly_multiplier(
                &stored.record,
                faction.as_ref().map(|f| &f.record.upgrades),
            );
            let (min, max) = config.hourly_roll;
            let roll = self.rolls().roll(min, max);
            let amount = (f64::from(roll) * multiplier).floor().max(0.0) as u64;

            stored.record.credit(amount);
            stored.record.last_hourly_claim = Some(now);

            let mut changeset = Changeset::new();
            changeset.update(&stored)?;
            self.store().commit(changeset)?;

            tracing::info!(%user, roll, amount, "hourly claimed");
            Ok(HourlyClaim {
                roll,
                multiplier,
                amount,
                balance: stored.record.gold,
            })
        })
    }

    /// Restore a share of max health.
    pub fn heal(&self, user: &UserId) -> Result<HealReport> {
        let config = self.config();
        self.guarded("heal", || {
            let now = self.now();
            let mut stored = self.ensure_character(user)?;
            ensure_cooldown(
                check_cooldown(stored.record.last_heal, config.heal_cooldown, now),
                || "heal".to_owned(),
            )?;

            let character = &mut stored.record;
            let restored = character.heal(character.max_health_f64() * config.heal_fraction);
            character.last_heal = Some(now);

            let mut changeset = Changeset::new();
            changeset.update(&stored)?;
            self.store().commit(changeset)?;

            tracing::debug!(%user, restored, "healed");
            Ok(HealReport {
                restored,
                health: stored.record.health,
                max_health: stored.record.max_health,
            })
        })
    }

    /// Buy `amount` units of a shop item.
    pub fn buy(&self, user: &UserId, item: &str, amount: u32) -> Result<Purchase> {
        let config = self.config();
        self.guarded("buy", || {
            let item: ShopItem = item
                .trim()
                .parse()
                .map_err(|_| ArenaError::UnknownItem(item.trim().to_owned()))?;
            if amount == 0 {
                return Err(ArenaError::InvalidAmount);
            }

            let mut stored = self.ensure_character(user)?;
            let cost = item.price(config).saturating_mul(u64::from(amount));
            ensure_funds(&stored.record, cost)?;

            let character = &mut stored.record;
            character.gold -= cost;
            match item {
                ShopItem::Power => character.power = character.power.saturating_add(amount),
                ShopItem::MaxHealth => {
                    character.raise_max_health(config.max_health_step.saturating_mul(amount))
                }
                ShopItem::Hourly => {
                    character.hourly_multiplier += config.hourly_multiplier_step * f64::from(amount)
                }
            }

            let mut changeset = Changeset::new();
            changeset.update(&stored)?;
            self.store().commit(changeset)?;

            tracing::info!(%user, %item, amount, cost, "purchase");
            Ok(Purchase {
                item,
                amount,
                cost,
                character: stored.into_inner(),
            })
        })
    }
}
