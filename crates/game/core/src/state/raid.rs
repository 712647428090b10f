//! Raid session state machine.
//!
//! A raid lives entirely in its stored record; every command reloads it,
//! applies one transition and writes it back.
//!
//! ```text
//! Forming ──ready──▶ ReadyCheck ──begin──▶ InProgress ──boss defeated──▶ Concluded
//!    ▲                                         │
//!    └──────────────── boss survives ──────────┘
//!
//! any active phase ──cancel──▶ Cancelled
//! any active phase ──flee────▶ Fled
//! ```

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};

use super::UserId;
use crate::error::{ErrorSeverity, GameError};

/// Storage identity of a raid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RaidId(pub u64);

impl fmt::Display for RaidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RaidPhase {
    /// Leader created the raid; invitations and joins are open.
    Forming,
    /// At least one participant marked ready.
    ReadyCheck,
    /// Leader triggered the boss fight.
    InProgress,
    /// Boss defeated.
    Concluded,
    /// Leader cancelled.
    Cancelled,
    /// A participant fled and the party scattered.
    Fled,
}

impl RaidPhase {
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Forming | Self::ReadyCheck | Self::InProgress)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forming => "forming",
            Self::ReadyCheck => "ready check",
            Self::InProgress => "in progress",
            Self::Concluded => "concluded",
            Self::Cancelled => "cancelled",
            Self::Fled => "fled",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Participant {
    pub user: UserId,
    pub ready: bool,
    /// Damage dealt in the most recent boss fight.
    pub damage_dealt: f64,
}

impl Participant {
    fn new(user: UserId) -> Self {
        Self {
            user,
            ready: false,
            damage_dealt: 0.0,
        }
    }
}

/// Rejected raid transitions.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RaidError {
    #[error("raid {0} is no longer active")]
    NotActive(RaidId),

    #[error("{user} is not the raid leader")]
    NotLeader { user: UserId },

    #[error("{user} is not part of the raid")]
    NotParticipant { user: UserId },

    #[error("{user} is already in the raid")]
    AlreadyJoined { user: UserId },

    #[error("{user} has no invitation to this raid")]
    NotInvited { user: UserId },

    #[error("{user} is not a member of the raid's faction")]
    FactionMismatch { user: UserId },

    #[error("{user} is not ready")]
    NotReady { user: UserId },

    #[error("the boss fight is already underway")]
    AlreadyInProgress,
}

impl GameError for RaidError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotReady { .. } | Self::AlreadyInProgress => ErrorSeverity::Recoverable,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotActive(_) => "RAID_NOT_ACTIVE",
            Self::NotLeader { .. } => "RAID_NOT_LEADER",
            Self::NotParticipant { .. } => "RAID_NOT_PARTICIPANT",
            Self::AlreadyJoined { .. } => "RAID_ALREADY_JOINED",
            Self::NotInvited { .. } => "RAID_NOT_INVITED",
            Self::FactionMismatch { .. } => "RAID_FACTION_MISMATCH",
            Self::NotReady { .. } => "RAID_NOT_READY",
            Self::AlreadyInProgress => "RAID_IN_PROGRESS",
        }
    }
}

/// Stored raid session.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Raid {
    pub id: RaidId,
    pub leader: UserId,
    pub faction: String,
    pub boss: String,
    pub phase: RaidPhase,
    /// Join order is preserved; the leader is always first.
    pub participants: Vec<Participant>,
    /// Users invited but not yet joined.
    pub invited: BTreeSet<UserId>,
    /// Completed boss fights.
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
}

impl Raid {
    /// New raid with the leader as its only, not-ready participant.
    pub fn new(
        id: RaidId,
        leader: UserId,
        faction: impl Into<String>,
        boss: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            participants: vec![Participant::new(leader.clone())],
            leader,
            faction: faction.into(),
            boss: boss.into(),
            phase: RaidPhase::Forming,
            invited: BTreeSet::new(),
            attempts: 0,
            created_at,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }

    pub fn ensure_active(&self) -> Result<(), RaidError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(RaidError::NotActive(self.id))
        }
    }

    pub fn ensure_leader(&self, user: &UserId) -> Result<(), RaidError> {
        if &self.leader == user {
            Ok(())
        } else {
            Err(RaidError::NotLeader { user: user.clone() })
        }
    }

    pub fn participant(&self, user: &UserId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.user == user)
    }

    pub fn is_participant(&self, user: &UserId) -> bool {
        self.participant(user).is_some()
    }

    pub fn participant_ids(&self) -> impl Iterator<Item = &UserId> {
        self.participants.iter().map(|p| &p.user)
    }

    /// Record a pending invitation. `target_faction` is the invitee's current faction.
    pub fn invite(
        &mut self,
        by: &UserId,
        target: &UserId,
        target_faction: Option<&str>,
    ) -> Result<(), RaidError> {
        self.ensure_active()?;
        self.ensure_leader(by)?;

        if self.is_participant(target) {
            return Err(RaidError::AlreadyJoined {
                user: target.clone(),
            });
        }
        if target_faction != Some(self.faction.as_str()) {
            return Err(RaidError::FactionMismatch {
                user: target.clone(),
            });
        }

        self.invited.insert(target.clone());
        Ok(())
    }

    /// Drop a pending invitation that was superseded elsewhere.
    /// Returns whether one was pending.
    pub fn withdraw_invitation(&mut self, user: &UserId) -> bool {
        self.invited.remove(user)
    }

    /// Consume the user's invitation and add them as a not-ready participant.
    pub fn join(&mut self, user: &UserId) -> Result<(), RaidError> {
        self.ensure_active()?;

        if self.is_participant(user) {
            return Err(RaidError::AlreadyJoined { user: user.clone() });
        }
        if !self.invited.remove(user) {
            return Err(RaidError::NotInvited { user: user.clone() });
        }

        self.participants.push(Participant::new(user.clone()));
        Ok(())
    }

    /// Mark a participant ready. Returns whether everyone is now ready.
    pub fn mark_ready(&mut self, user: &UserId) -> Result<bool, RaidError> {
        self.ensure_active()?;
        if self.phase == RaidPhase::InProgress {
            return Err(RaidError::AlreadyInProgress);
        }

        let participant = self
            .participants
            .iter_mut()
            .find(|p| &p.user == user)
            .ok_or_else(|| RaidError::NotParticipant { user: user.clone() })?;
        participant.ready = true;

        if self.phase == RaidPhase::Forming {
            self.phase = RaidPhase::ReadyCheck;
        }

        Ok(self.all_ready())
    }

    pub fn all_ready(&self) -> bool {
        self.participants.iter().all(|p| p.ready)
    }

    pub fn first_unready(&self) -> Option<&UserId> {
        self.participants.iter().find(|p| !p.ready).map(|p| &p.user)
    }

    /// Leader starts the boss fight. Everyone must be ready.
    pub fn begin(&mut self, by: &UserId) -> Result<(), RaidError> {
        self.ensure_active()?;
        self.ensure_leader(by)?;
        if self.phase == RaidPhase::InProgress {
            return Err(RaidError::AlreadyInProgress);
        }
        if let Some(user) = self.first_unready() {
            return Err(RaidError::NotReady { user: user.clone() });
        }

        self.phase = RaidPhase::InProgress;
        Ok(())
    }

    /// Store the result of a boss fight.
    ///
    /// A defeated boss concludes the raid. A surviving boss sends the party
    /// back to `Forming` with every ready flag cleared for the next attempt.
    pub fn record_attempt<'a>(
        &mut self,
        boss_defeated: bool,
        damage: impl IntoIterator<Item = (&'a UserId, f64)>,
    ) {
        for (user, dealt) in damage {
            if let Some(participant) = self.participants.iter_mut().find(|p| &p.user == user) {
                participant.damage_dealt = dealt;
            }
        }
        self.attempts += 1;

        if boss_defeated {
            self.phase = RaidPhase::Concluded;
            self.invited.clear();
        } else {
            self.phase = RaidPhase::Forming;
            for participant in &mut self.participants {
                participant.ready = false;
            }
        }
    }

    /// Leader ends the raid unconditionally.
    pub fn cancel(&mut self, by: &UserId) -> Result<(), RaidError> {
        self.ensure_active()?;
        self.ensure_leader(by)?;
        self.phase = RaidPhase::Cancelled;
        self.invited.clear();
        Ok(())
    }

    /// A participant flees; the raid ends for everyone.
    pub fn flee(&mut self, user: &UserId) -> Result<(), RaidError> {
        self.ensure_active()?;
        if !self.is_participant(user) {
            return Err(RaidError::NotParticipant { user: user.clone() });
        }
        self.phase = RaidPhase::Fled;
        self.invited.clear();
        Ok(())
    }
}
