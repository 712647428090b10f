//! Combat rules and record types for the arena.
//!
//! `arena-core` defines the canonical rules (stat resolution, duel, team
//! battle and boss-fight engines, the raid state machine and the cooldown
//! gate) together with the records those rules operate on. Everything here is
//! pure: randomness arrives through [`RollSource`], time arrives as explicit
//! timestamps, and persistence is left to the runtime crate.
pub mod boss;
pub mod class;
pub mod combat;
pub mod cooldown;
pub mod error;
pub mod rng;
pub mod state;
pub mod stats;

pub use boss::{BossDefinition, BossTable};
pub use class::{CharacterClass, ClassDefinition, ClassTable, TableError};
pub use combat::{
    BossFightOutcome, Combatant, CombatError, DuelOutcome, DuelSide, FighterReport, InvalidReason,
    MAX_TEAM_SIZE, RaidFighter, RaidFighterReport, TeamOutcome, TeamSide, TeamTally, Verdict,
    attack_modifier, resolve_boss_fight, resolve_duel, resolve_team_battle, synergy_bonus,
};
pub use cooldown::{CooldownStatus, check_cooldown};
pub use error::{ErrorSeverity, GameError};
pub use rng::{ATTACK_ROLL, BOSS_ROLL, CombatRolls, DEFENSE_ROLL, FixedRolls, RollSource};
pub use state::{
    CharacterState, DEFAULT_MAX_HEALTH, Faction, FactionUpgrades, Participant, Raid, RaidError,
    RaidId, RaidPhase, UpgradeKind, UserId,
};
pub use stats::{BASE_DEFENSE, EffectiveStats, StatResolver};
