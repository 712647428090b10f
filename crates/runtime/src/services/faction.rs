//! Factions: membership, the shared resource pool and upgrades.
//!
//! Membership is stored on both sides (the faction's member set and each
//! character's faction name); every operation writes both in one commit.

use arena_core::{CharacterState, Faction, UpgradeKind, UserId, check_cooldown};

use super::{ensure_cooldown, ensure_funds};
use crate::api::{ArenaError, FactionIncome, LeaderboardEntry, Result};
use crate::arena::Arena;
use crate::repository::{Changeset, Expected, RecordStoreExt, Stored, faction_key};

type Membership = (Stored<CharacterState>, Stored<Faction>);

impl Arena {
    /// The caller and the faction they belong to.
    fn membership(&self, user: &UserId) -> Result<Membership> {
        let character = self.ensure_character(user)?;
        let faction = self
            .faction_of(&character.record)?
            .ok_or_else(|| ArenaError::NotInFaction { user: user.clone() })?;
        Ok((character, faction))
    }

    /// Like [`Self::membership`], restricted to the faction leader.
    fn leadership(&self, user: &UserId, action: &'static str) -> Result<Membership> {
        let (character, faction) = self.membership(user)?;
        if !faction.record.is_leader(user) {
            return Err(ArenaError::NotAuthorized {
                user: user.clone(),
                action,
            });
        }
        Ok((character, faction))
    }

    /// Found a faction. The founder leads it and is its first member.
    pub fn create_faction(&self, founder: &UserId, name: &str) -> Result<Faction> {
        self.guarded("create_faction", || {
            let name = name.trim();
            if name.is_empty() {
                return Err(ArenaError::InvalidFactionName);
            }

            let mut character = self.ensure_character(founder)?;
            if character.record.faction.is_some() {
                return Err(ArenaError::AlreadyInFaction {
                    user: founder.clone(),
                });
            }
            if self.find_faction(name)?.is_some() {
                return Err(ArenaError::FactionExists(name.to_owned()));
            }

            let faction = Faction::new(name, founder.clone());
            character.record.faction = Some(faction.name.clone());

            let mut changeset = Changeset::new();
            changeset
                .put(Expected::Absent, &faction)?
                .update(&character)?;
            self.store().commit(changeset)?;

            tracing::info!(faction = %faction.name, %founder, "faction created");
            Ok(faction)
        })
    }

    fn admission(
        &self,
        leader: &UserId,
        target: &UserId,
    ) -> Result<(Stored<Faction>, Stored<CharacterState>)> {
        let (_, faction) = self.leadership(leader, "invite faction members")?;
        let recruit = self.ensure_character(target)?;
        if recruit.record.faction.is_some() {
            return Err(ArenaError::AlreadyInFaction {
                user: target.clone(),
            });
        }
        Ok((faction, recruit))
    }

    /// Invite `target` in `channel`; they join once they accept.
    pub async fn invite_to_faction(
        &self,
        channel: &str,
        leader: &UserId,
        target: &UserId,
    ) -> Result<Faction> {
        self.guarded("invite_to_faction", || self.admission(leader, target).map(|_| ()))?;
        self.confirm(channel, target).await?;
        self.admit_member(leader, target)
    }

    /// Add an accepted recruit to the leader's faction.
    pub fn admit_member(&self, leader: &UserId, target: &UserId) -> Result<Faction> {
        self.guarded("admit_member", || {
            let (mut faction, mut recruit) = self.admission(leader, target)?;
            faction.record.add_member(target.clone());
            recruit.record.faction = Some(faction.record.name.clone());

            let mut changeset = Changeset::new();
            changeset.update(&faction)?.update(&recruit)?;
            self.store().commit(changeset)?;

            tracing::info!(faction = %faction.record.name, member = %target, "member joined");
            Ok(faction.into_inner())
        })
    }

    /// Leave the faction. The leader has to disband instead.
    pub fn leave_faction(&self, user: &UserId) -> Result<Faction> {
        self.guarded("leave_faction", || {
            let (mut character, mut faction) = self.membership(user)?;
            if faction.record.is_leader(user) {
                return Err(ArenaError::LeaderCannotLeave);
            }
            faction.record.remove_member(user);
            character.record.faction = None;

            let mut changeset = Changeset::new();
            changeset.update(&faction)?.update(&character)?;
            self.store().commit(changeset)?;

            tracing::info!(faction = %faction.record.name, member = %user, "member left");
            Ok(faction.into_inner())
        })
    }

    /// Delete the faction and clear every member's reference to it.
    pub fn disband_faction(&self, leader: &UserId) -> Result<Faction> {
        self.guarded("disband_faction", || {
            let (_, faction) = self.leadership(leader, "disband the faction")?;

            let mut changeset = Changeset::new();
            for member in &faction.record.members {
                let mut character = self.ensure_character(member)?;
                character.record.faction = None;
                changeset.update(&character)?;
            }
            changeset.delete::<Faction>(faction.expected(), faction_key(&faction.record.name));
            self.store().commit(changeset)?;

            tracing::info!(faction = %faction.record.name, %leader, "faction disbanded");
            Ok(faction.into_inner())
        })
    }

    /// Look a faction up by name (case-insensitive).
    pub fn faction_info(&self, name: &str) -> Result<Faction> {
        self.guarded("faction_info", || {
            self.find_faction(name)?
                .map(Stored::into_inner)
                .ok_or_else(|| ArenaError::UnknownFaction(name.trim().to_owned()))
        })
    }

    /// Move gold from the caller into their faction's resource pool.
    pub fn deposit(&self, user: &UserId, amount: u64) -> Result<Faction> {
        self.guarded("deposit", || {
            if amount == 0 {
                return Err(ArenaError::InvalidAmount);
            }
            let (mut character, mut faction) = self.membership(user)?;
            ensure_funds(&character.record, amount)?;
            character.record.gold -= amount;
            faction.record.deposit(amount);

            let mut changeset = Changeset::new();
            changeset.update(&character)?.update(&faction)?;
            self.store().commit(changeset)?;

            tracing::info!(faction = %faction.record.name, %user, amount, "deposit");
            Ok(faction.into_inner())
        })
    }

    /// Leader spends resources on one upgrade level.
    pub fn purchase_upgrade(&self, leader: &UserId, upgrade: &str) -> Result<Faction> {
        self.guarded("purchase_upgrade", || {
            let kind: UpgradeKind = upgrade
                .trim()
                .parse()
                .map_err(|_| ArenaError::UnknownUpgrade(upgrade.trim().to_owned()))?;
            let (_, mut faction) = self.leadership(leader, "buy faction upgrades")?;

            let available = faction.record.resources;
            if !faction.record.purchase(kind) {
                return Err(ArenaError::InsufficientResources {
                    faction: faction.record.name.clone(),
                    needed: kind.cost(),
                    available,
                });
            }

            let mut changeset = Changeset::new();
            changeset.update(&faction)?;
            self.store().commit(changeset)?;

            tracing::info!(faction = %faction.record.name, %kind, "upgrade purchased");
            Ok(faction.into_inner())
        })
    }

    /// Daily interest on the resource pool. Any member may collect it.
    pub fn collect_faction_income(&self, user: &UserId) -> Result<FactionIncome> {
        let interval = self.config().faction_income_interval;
        self.guarded("collect_faction_income", || {
            let now = self.now();
            let (_, mut faction) = self.membership(user)?;
            ensure_cooldown(
                check_cooldown(faction.record.last_income, interval, now),
                || format!("{} income", faction.record.name),
            )?;

            let before = faction.record.resources;
            let resources = faction.record.collect_income(now);

            let mut changeset = Changeset::new();
            changeset.update(&faction)?;
            self.store().commit(changeset)?;

            let gained = resources - before;
            tracing::info!(faction = %faction.record.name, gained, "faction income collected");
            Ok(FactionIncome { gained, resources })
        })
    }

    /// Factions ranked by score, best first.
    pub fn faction_leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        let size = self.config().leaderboard_size;
        self.guarded("faction_leaderboard", || {
            let mut factions: Vec<Faction> = self
                .store()
                .fetch_all::<Faction>()?
                .into_iter()
                .map(Stored::into_inner)
                .collect();
            factions.sort_by(|a, b| {
                b.score()
                    .total_cmp(&a.score())
                    .then_with(|| a.name.cmp(&b.name))
            });

            Ok(factions
                .iter()
                .take(size)
                .enumerate()
                .map(|(index, faction)| LeaderboardEntry::new(index + 1, faction))
                .collect())
        })
    }
}
