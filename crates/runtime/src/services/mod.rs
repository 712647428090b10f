//! Game operations, one module per area.
//!
//! Each module adds an `impl Arena` block. Operations follow the same shape:
//! load records through the store, run the rules from `arena-core` on local
//! copies, then commit every write in one [`Changeset`](crate::repository::Changeset).

mod character;
mod duel;
mod faction;
mod raid;
mod team;

use arena_core::{CharacterState, CooldownStatus};

use crate::api::{ArenaError, Result};

fn ensure_cooldown(status: CooldownStatus, what: impl FnOnce() -> String) -> Result<()> {
    match status {
        CooldownStatus::Ready => Ok(()),
        waiting => Err(ArenaError::CooldownActive {
            what: what(),
            remaining_secs: waiting.remaining_secs(),
        }),
    }
}

fn ensure_funds(character: &CharacterState, needed: u64) -> Result<()> {
    if character.can_afford(needed) {
        Ok(())
    } else {
        Err(ArenaError::InsufficientFunds {
            id: character.id.clone(),
            needed,
            available: character.gold,
        })
    }
}
