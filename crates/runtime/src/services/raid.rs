//! Raid coordination.
//!
//! The raid record is the whole session. Alongside it the store keeps one
//! `raid_memberships` row per participant (so a user's raid can be found by
//! user id) and one `raid_invitations` row per invitee. Every command reloads
//! these, applies one transition from [`Raid`] and commits the result.

use arena_core::{
    BossDefinition, CombatError, Raid, RaidFighter, RaidId, UserId, check_cooldown,
    resolve_boss_fight,
};

use super::ensure_cooldown;
use crate::api::{ArenaError, RaidReport, ReadyStatus, Result, narrative};
use crate::arena::Arena;
use crate::repository::{
    BossCooldown, Changeset, Expected, RaidInvitation, RaidMembership, RecordStoreExt, Sequence,
    Stored, cooldown_key, raid_key,
};

/// Drop every participant's membership row once a raid has ended.
fn release_roster(changeset: &mut Changeset, raid: &Raid) {
    for user in raid.participant_ids() {
        changeset.delete::<RaidMembership>(Expected::Any, user.to_string());
    }
}

impl Arena {
    /// The version to expect on `user`'s membership row, and the active raid
    /// it points at. Rows left behind by ended raids count as no raid.
    fn seat(&self, user: &UserId) -> Result<(Expected, Option<Stored<Raid>>)> {
        let Some(membership) = self.store().fetch::<RaidMembership>(user.as_str())? else {
            return Ok((Expected::Absent, None));
        };
        let raid = self
            .store()
            .fetch::<Raid>(&raid_key(membership.record.raid))?
            .filter(|raid| raid.record.is_active());
        Ok((membership.expected(), raid))
    }

    fn require_raid(&self, user: &UserId) -> Result<Stored<Raid>> {
        self.seat(user)?
            .1
            .ok_or_else(|| ArenaError::NoActiveRaid { user: user.clone() })
    }

    fn ensure_free(&self, user: &UserId) -> Result<Expected> {
        match self.seat(user)? {
            (_, Some(_)) => Err(ArenaError::AlreadyInRaid { user: user.clone() }),
            (expected, None) => Ok(expected),
        }
    }

    fn boss_named(&self, name: &str) -> Result<BossDefinition> {
        self.oracle()
            .boss(name)
            .cloned()
            .ok_or_else(|| ArenaError::UnknownBoss(name.trim().to_owned()))
    }

    fn boss_cooldown(
        &self,
        user: &UserId,
        boss: &BossDefinition,
    ) -> Result<Option<Stored<BossCooldown>>> {
        let key = cooldown_key(user, &boss.name);
        Ok(self.store().fetch::<BossCooldown>(&key)?)
    }

    /// Reject `user` while their last attempt against `boss` is too recent.
    fn ensure_boss_ready(
        &self,
        user: &UserId,
        boss: &BossDefinition,
        last: Option<&Stored<BossCooldown>>,
    ) -> Result<()> {
        let status = check_cooldown(
            last.map(|stored| stored.record.last_attempt),
            boss.cooldown(),
            self.now(),
        );
        ensure_cooldown(status, || format!("{user}'s {} attempt", boss.name))
    }

    /// Open a raid against `boss` with `leader` as its only participant.
    ///
    /// Only the leader's own cooldown is checked here; `begin_raid` checks
    /// everyone again.
    pub fn create_raid(&self, leader: &UserId, boss: &str) -> Result<Raid> {
        self.guarded("create_raid", || {
            let boss = self.boss_named(boss)?;
            let character = self.ensure_character(leader)?.into_inner();
            if character.class.is_none() {
                return Err(ArenaError::NoClassSelected { id: leader.clone() });
            }
            let faction = character
                .faction
                .ok_or_else(|| ArenaError::NotInFaction { user: leader.clone() })?;
            let seat = self.ensure_free(leader)?;

            let last = self.boss_cooldown(leader, &boss)?;
            self.ensure_boss_ready(leader, &boss, last.as_ref())?;

            let sequence = self.store().fetch::<Sequence>(Sequence::RAIDS)?;
            let sequence_expected = Expected::of(sequence.as_ref());
            let mut sequence = sequence
                .map(Stored::into_inner)
                .unwrap_or_else(|| Sequence::new(Sequence::RAIDS));
            let id = RaidId(sequence.advance());

            let raid = Raid::new(id, leader.clone(), faction, boss.name.clone(), self.now());
            let membership = RaidMembership {
                user: leader.clone(),
                raid: id,
            };

            let mut changeset = Changeset::new();
            changeset
                .put(sequence_expected, &sequence)?
                .put(Expected::Absent, &raid)?
                .put(seat, &membership)?;
            self.store().commit(changeset)?;

            tracing::info!(raid = %id, %leader, boss = %boss.name, "raid created");
            Ok(raid)
        })
    }

    /// Leader invites a faction mate. The invitation replaces any earlier one.
    pub fn invite_to_raid(&self, leader: &UserId, target: &UserId) -> Result<RaidInvitation> {
        self.guarded("invite_to_raid", || {
            let mut raid = self.require_raid(leader)?;
            let invitee = self.ensure_character(target)?;
            let target_faction = invitee.record.faction.as_deref();
            raid.record.invite(leader, target, target_faction)?;
            self.ensure_free(target)?;

            let previous = self.store().fetch::<RaidInvitation>(target.as_str())?;
            // the raid the earlier invitation pointed at forgets about the target
            let superseded = match &previous {
                Some(earlier) if earlier.record.raid != raid.record.id => self
                    .store()
                    .fetch::<Raid>(&raid_key(earlier.record.raid))?
                    .filter(|old| old.record.invited.contains(target)),
                _ => None,
            };
            let invitation = RaidInvitation {
                invitee: target.clone(),
                raid: raid.record.id,
                invited_by: leader.clone(),
            };

            let mut changeset = Changeset::new();
            changeset
                .update(&raid)?
                .put(Expected::of(previous.as_ref()), &invitation)?;
            if let Some(mut old) = superseded {
                old.record.withdraw_invitation(target);
                changeset.update(&old)?;
            }
            self.store().commit(changeset)?;

            tracing::debug!(raid = %raid.record.id, %leader, %target, "raid invitation sent");
            Ok(invitation)
        })
    }

    /// Accept the pending raid invitation.
    pub fn join_raid(&self, user: &UserId) -> Result<Raid> {
        self.guarded("join_raid", || {
            let invitation = self
                .store()
                .fetch::<RaidInvitation>(user.as_str())?
                .ok_or_else(|| ArenaError::NoInvitation { user: user.clone() })?;
            let seat = self.ensure_free(user)?;
            if self.ensure_character(user)?.record.class.is_none() {
                return Err(ArenaError::NoClassSelected { id: user.clone() });
            }

            let mut raid = self
                .store()
                .fetch::<Raid>(&raid_key(invitation.record.raid))?
                .ok_or_else(|| ArenaError::NoInvitation { user: user.clone() })?;
            raid.record.join(user)?;

            let membership = RaidMembership {
                user: user.clone(),
                raid: raid.record.id,
            };
            let mut changeset = Changeset::new();
            changeset
                .update(&raid)?
                .put(seat, &membership)?
                .delete::<RaidInvitation>(invitation.expected(), user.to_string());
            self.store().commit(changeset)?;

            tracing::info!(raid = %raid.record.id, %user, "joined raid");
            Ok(raid.into_inner())
        })
    }

    /// Mark the caller ready. Reports whether the whole party is ready now.
    pub fn ready(&self, user: &UserId) -> Result<ReadyStatus> {
        self.guarded("ready", || {
            let mut raid = self.require_raid(user)?;
            let all_ready = raid.record.mark_ready(user)?;

            let mut changeset = Changeset::new();
            changeset.update(&raid)?;
            self.store().commit(changeset)?;

            tracing::debug!(raid = %raid.record.id, %user, all_ready, "participant ready");
            Ok(ReadyStatus {
                raid: raid.record.id,
                all_ready,
            })
        })
    }

    /// Leader starts the boss fight.
    ///
    /// Everyone must be ready and clear of their own cooldown against the
    /// boss; the first participant failing either check is named in the
    /// error. The fight, the raid transition, health and gold changes and the
    /// refreshed cooldowns are committed together.
    pub fn begin_raid(&self, leader: &UserId) -> Result<RaidReport> {
        self.guarded("begin_raid", || {
            let mut raid = self.require_raid(leader)?;
            let boss = self.boss_named(&raid.record.boss)?;
            raid.record.begin(leader)?;

            let ids: Vec<UserId> = raid.record.participant_ids().cloned().collect();
            let mut members = Vec::with_capacity(ids.len());
            let mut cooldowns = Vec::with_capacity(ids.len());
            for id in &ids {
                let last = self.boss_cooldown(id, &boss)?;
                self.ensure_boss_ready(id, &boss, last.as_ref())?;
                cooldowns.push(Expected::of(last.as_ref()));
                members.push(self.ensure_character(id)?);
            }

            let mut fighters = members
                .iter()
                .map(|member| RaidFighter::new(member.record.clone()))
                .collect::<std::result::Result<Vec<_>, CombatError>>()?;
            let outcome =
                resolve_boss_fight(&mut fighters, &boss, self.oracle().classes(), self.rolls())?;
            raid.record
                .record_attempt(outcome.boss_defeated, outcome.damage_by());

            let now = self.now();
            let mut changeset = Changeset::new();
            changeset.update(&raid)?;
            for ((member, fighter), expected) in members.iter_mut().zip(fighters).zip(cooldowns) {
                member.record = fighter.into_character();
                changeset.update(member)?;
                let cooldown = BossCooldown {
                    user: member.record.id.clone(),
                    boss: boss.name.clone(),
                    last_attempt: now,
                };
                changeset.put(expected, &cooldown)?;
            }
            if !raid.record.is_active() {
                release_roster(&mut changeset, &raid.record);
            }
            self.store().commit(changeset)?;

            tracing::info!(
                raid = %raid.record.id,
                boss = %boss.name,
                damage = outcome.total_damage,
                defeated = outcome.boss_defeated,
                phase = raid.record.phase.as_str(),
                "boss fight resolved"
            );
            Ok(RaidReport {
                narrative: narrative::raid(&outcome, &raid.record),
                raid: raid.into_inner(),
                outcome,
            })
        })
    }

    /// Leader ends the raid.
    pub fn cancel_raid(&self, leader: &UserId) -> Result<Raid> {
        self.guarded("cancel_raid", || {
            let mut raid = self.require_raid(leader)?;
            raid.record.cancel(leader)?;
            self.close_raid(&raid)?;
            tracing::info!(raid = %raid.record.id, %leader, "raid cancelled");
            Ok(raid.into_inner())
        })
    }

    /// Any participant runs away, ending the raid for everyone.
    pub fn flee_raid(&self, user: &UserId) -> Result<Raid> {
        self.guarded("flee_raid", || {
            let mut raid = self.require_raid(user)?;
            raid.record.flee(user)?;
            self.close_raid(&raid)?;
            tracing::info!(raid = %raid.record.id, %user, "raid abandoned");
            Ok(raid.into_inner())
        })
    }

    fn close_raid(&self, raid: &Stored<Raid>) -> Result<()> {
        let mut changeset = Changeset::new();
        changeset.update(raid)?;
        release_roster(&mut changeset, &raid.record);
        self.store().commit(changeset)?;
        Ok(())
    }

    /// The caller's active raid: roster, ready flags and phase.
    pub fn raid_info(&self, user: &UserId) -> Result<Raid> {
        self.guarded("raid_info", || Ok(self.require_raid(user)?.into_inner()))
    }
}
