//! Typed rows stored by the arena.
//!
//! | table | key | row |
//! |---|---|---|
//! | `characters` | user id | [`CharacterState`] |
//! | `factions` | lowercased name | [`Faction`] |
//! | `raids` | raid id | [`Raid`] |
//! | `raid_invitations` | invitee | [`RaidInvitation`] |
//! | `raid_memberships` | user id | [`RaidMembership`] |
//! | `boss_cooldowns` | `user:boss` | [`BossCooldown`] |
//! | `sequences` | sequence name | [`Sequence`] |

use arena_core::{CharacterState, Faction, Raid, RaidId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::traits::Record;

impl Record for CharacterState {
    const TABLE: &'static str = "characters";

    fn key(&self) -> String {
        self.id.to_string()
    }
}

/// Faction names are unique regardless of case.
pub fn faction_key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl Record for Faction {
    const TABLE: &'static str = "factions";

    fn key(&self) -> String {
        faction_key(&self.name)
    }
}

pub fn raid_key(id: RaidId) -> String {
    id.0.to_string()
}

impl Record for Raid {
    const TABLE: &'static str = "raids";

    fn key(&self) -> String {
        raid_key(self.id)
    }
}

/// The latest raid invitation a user received. A newer one replaces it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RaidInvitation {
    pub invitee: UserId,
    pub raid: RaidId,
    pub invited_by: UserId,
}

impl Record for RaidInvitation {
    const TABLE: &'static str = "raid_invitations";

    fn key(&self) -> String {
        self.invitee.to_string()
    }
}

/// Points a user at the one active raid they belong to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RaidMembership {
    pub user: UserId,
    pub raid: RaidId,
}

impl Record for RaidMembership {
    const TABLE: &'static str = "raid_memberships";

    fn key(&self) -> String {
        self.user.to_string()
    }
}

pub fn cooldown_key(user: &UserId, boss: &str) -> String {
    format!("{user}:{boss}")
}

/// Last completed boss attempt of one user against one boss.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BossCooldown {
    pub user: UserId,
    pub boss: String,
    pub last_attempt: DateTime<Utc>,
}

impl Record for BossCooldown {
    const TABLE: &'static str = "boss_cooldowns";

    fn key(&self) -> String {
        cooldown_key(&self.user, &self.boss)
    }
}

/// Monotonic id allocator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    pub name: String,
    pub last: u64,
}

impl Sequence {
    pub const RAIDS: &'static str = "raids";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            last: 0,
        }
    }

    pub fn advance(&mut self) -> u64 {
        self.last += 1;
        self.last
    }
}

impl Record for Sequence {
    const TABLE: &'static str = "sequences";

    fn key(&self) -> String {
        self.name.clone()
    }
}
