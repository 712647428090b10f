//! Runtime orchestration for the arena.
//!
//! This crate wires the pure rules of `arena-core` to storage, time,
//! randomness and user confirmations. Consumers build an [`Arena`] and call
//! its operations; every operation loads the records it needs, resolves the
//! rules on local copies and commits the result as one optimistic changeset.
//!
//! Modules are organized by responsibility:
//! - [`arena`] hosts the orchestrator, its builder and configuration
//! - [`api`] exposes errors and the report types returned to callers
//! - [`handshake`] implements the yes/no confirmation in front of challenges
//! - [`oracle`] serves static class and boss content
//! - [`providers`] adapts the clock and the random source
//! - [`repository`] stores characters, factions, raids and cooldowns
pub mod api;
pub mod arena;
pub mod handshake;
pub mod oracle;
pub mod providers;
pub mod repository;

mod services;

pub use api::{
    ArenaError, CoinflipReport, DuelReport, FactionIncome, HealReport, HourlyClaim,
    LeaderboardEntry, Profile, Purchase, RaidReport, ReadyStatus, Result, ShopItem, TeamReport,
};
pub use arena::{Arena, ArenaBuilder, ArenaConfig};
pub use handshake::{Confirmation, ConfirmationBroker, HandshakeError, PendingConfirmation};
pub use oracle::ContentOracle;
pub use providers::{Clock, ManualClock, SystemClock, ThreadRollSource};
pub use repository::{
    Changeset, Expected, FileRecordStore, InMemoryRecordStore, RecordStore, RecordStoreExt,
    RepositoryError, Stored,
};
