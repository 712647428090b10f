//! Persistent records the rules operate on.
//!
//! These are plain data types: the runtime loads them from storage, hands them
//! to the engines, and writes the mutated copies back. Nothing in here survives
//! in process memory between two requests.
pub mod character;
pub mod faction;
pub mod raid;

use std::fmt;

pub use character::{CharacterState, DEFAULT_MAX_HEALTH};
pub use faction::{Faction, FactionUpgrades, UpgradeKind};
pub use raid::{Participant, Raid, RaidError, RaidId, RaidPhase};

/// Opaque identity handed over by the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}
