//! Unified error type surfaced by the arena API.
//!
//! Wraps rule violations from `arena-core`, storage failures and handshake
//! outcomes so the presentation layer can render them with one call.

use arena_core::{
    CombatError, ErrorSeverity, GameError, InvalidReason, RaidError, TeamSide, UserId,
};
use thiserror::Error;

use crate::handshake::HandshakeError;
pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, ArenaError>;

#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("{id} cannot fight: {reason}")]
    InvalidCombatant { id: UserId, reason: InvalidReason },

    #[error("{id} has not chosen a class yet")]
    NoClassSelected { id: UserId },

    #[error("{id} has already chosen a class")]
    ClassAlreadySelected { id: UserId },

    #[error("unknown class `{0}`")]
    UnknownClass(String),

    #[error("unknown boss `{0}`")]
    UnknownBoss(String),

    #[error("unknown shop item `{0}`")]
    UnknownItem(String),

    #[error("unknown faction upgrade `{0}`")]
    UnknownUpgrade(String),

    #[error("{side} has {len} members, teams need between 1 and {max}")]
    TeamSize {
        side: TeamSide,
        len: usize,
        max: usize,
    },

    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("{id} needs {needed} gold but only has {available}")]
    InsufficientFunds {
        id: UserId,
        needed: u64,
        available: u64,
    },

    #[error("{faction} needs {needed} resources but only has {available}")]
    InsufficientResources {
        faction: String,
        needed: u64,
        available: u64,
    },

    #[error("{what} is on cooldown for another {remaining_secs}s")]
    CooldownActive { what: String, remaining_secs: u64 },

    #[error("{user} is not allowed to {action}")]
    NotAuthorized { user: UserId, action: &'static str },

    #[error("{0}")]
    Raid(RaidError),

    #[error("{user} is not in an active raid")]
    NoActiveRaid { user: UserId },

    #[error("{user} is already in an active raid")]
    AlreadyInRaid { user: UserId },

    #[error("{user} has no pending raid invitation")]
    NoInvitation { user: UserId },

    #[error("faction `{0}` does not exist")]
    UnknownFaction(String),

    #[error("faction `{0}` already exists")]
    FactionExists(String),

    #[error("faction names cannot be empty")]
    InvalidFactionName,

    #[error("{user} already belongs to a faction")]
    AlreadyInFaction { user: UserId },

    #[error("{user} does not belong to a faction")]
    NotInFaction { user: UserId },

    #[error("the faction leader cannot leave; disband the faction instead")]
    LeaderCannotLeave,

    #[error("{by} declined")]
    Declined { by: UserId },

    #[error("{counterparty} did not answer in time")]
    ConfirmationTimedOut { counterparty: UserId },

    #[error("{counterparty} already has a pending challenge here")]
    ChallengePending { counterparty: UserId },

    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] RepositoryError),
}

impl ArenaError {
    /// Text safe to show to the requesting user.
    ///
    /// Storage failures are logged in full at the boundary and rendered as a
    /// generic message here.
    pub fn user_message(&self) -> String {
        match self {
            Self::StorageUnavailable(_) => {
                "Something went wrong on our side. Please try again later.".to_owned()
            }
            other => other.to_string(),
        }
    }

    /// A concurrent request changed the same records first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(err) if err.is_conflict())
    }
}

impl GameError for ArenaError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::StorageUnavailable(_) => ErrorSeverity::Internal,
            Self::InsufficientFunds { .. }
            | Self::InsufficientResources { .. }
            | Self::CooldownActive { .. }
            | Self::Declined { .. }
            | Self::ConfirmationTimedOut { .. }
            | Self::ChallengePending { .. } => ErrorSeverity::Recoverable,
            Self::Raid(err) => err.severity(),
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCombatant { .. } => "INVALID_COMBATANT",
            Self::NoClassSelected { .. } => "NO_CLASS_SELECTED",
            Self::ClassAlreadySelected { .. } => "CLASS_ALREADY_SELECTED",
            Self::UnknownClass(_) => "UNKNOWN_CLASS",
            Self::UnknownBoss(_) => "UNKNOWN_BOSS",
            Self::UnknownItem(_) => "UNKNOWN_ITEM",
            Self::UnknownUpgrade(_) => "UNKNOWN_UPGRADE",
            Self::TeamSize { .. } => "TEAM_SIZE",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::InsufficientResources { .. } => "INSUFFICIENT_RESOURCES",
            Self::CooldownActive { .. } => "COOLDOWN_ACTIVE",
            Self::NotAuthorized { .. } => "NOT_AUTHORIZED",
            Self::Raid(err) => err.error_code(),
            Self::NoActiveRaid { .. } => "NO_ACTIVE_RAID",
            Self::AlreadyInRaid { .. } => "ALREADY_IN_RAID",
            Self::NoInvitation { .. } => "NO_INVITATION",
            Self::UnknownFaction(_) => "UNKNOWN_FACTION",
            Self::FactionExists(_) => "FACTION_EXISTS",
            Self::InvalidFactionName => "INVALID_FACTION_NAME",
            Self::AlreadyInFaction { .. } => "ALREADY_IN_FACTION",
            Self::NotInFaction { .. } => "NOT_IN_FACTION",
            Self::LeaderCannotLeave => "LEADER_CANNOT_LEAVE",
            Self::Declined { .. } => "DECLINED",
            Self::ConfirmationTimedOut { .. } => "CONFIRMATION_TIMED_OUT",
            Self::ChallengePending { .. } => "CHALLENGE_PENDING",
            Self::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
        }
    }
}

impl From<CombatError> for ArenaError {
    fn from(err: CombatError) -> Self {
        match err {
            CombatError::NoClassSelected { id } => Self::NoClassSelected { id },
            CombatError::InvalidCombatant { id, reason } => Self::InvalidCombatant { id, reason },
            CombatError::TeamSize { side, len } => Self::TeamSize {
                side,
                len,
                max: arena_core::MAX_TEAM_SIZE,
            },
            // a raid always has its leader on the roster
            CombatError::EmptyRoster => Self::Raid(RaidError::AlreadyInProgress),
        }
    }
}

impl From<RaidError> for ArenaError {
    fn from(err: RaidError) -> Self {
        match err {
            RaidError::NotLeader { user } => Self::NotAuthorized {
                user,
                action: "lead this raid",
            },
            other => Self::Raid(other),
        }
    }
}

impl From<HandshakeError> for ArenaError {
    fn from(err: HandshakeError) -> Self {
        match err {
            HandshakeError::AlreadyPending { counterparty, .. } => {
                Self::ChallengePending { counterparty }
            }
        }
    }
}
