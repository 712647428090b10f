//! Public runtime API surface.
//!
//! Errors and the report types handed to the presentation layer. The
//! operations themselves are methods on [`crate::Arena`].

pub mod errors;
pub mod narrative;
pub mod report;

pub use errors::{ArenaError, Result};
pub use report::{
    CoinflipReport, DuelReport, FactionIncome, HealReport, HourlyClaim, LeaderboardEntry,
    Profile, Purchase, RaidReport, ReadyStatus, ShopItem, TeamReport,
};
