//! Repository layer for the arena's mutable records.
//!
//! Characters, factions, raid sessions and cooldowns all live in a
//! [`RecordStore`]; nothing survives in process memory between requests.
//! Static content (classes, bosses) is served by the oracle, not stored here.

mod changeset;
mod error;
mod file_store;
mod in_memory;
mod records;
mod traits;

pub use changeset::{Changeset, Expected, Write, WriteOp};
pub use error::{RepositoryError, Result};
pub use file_store::FileRecordStore;
pub use in_memory::InMemoryRecordStore;
pub use records::{
    BossCooldown, RaidInvitation, RaidMembership, Sequence, cooldown_key, faction_key, raid_key,
};
pub use traits::{Record, RecordStore, RecordStoreExt, Stored, Versioned};
