//! Arena orchestrator.
//!
//! [`Arena`] bundles the record store, static content, roll source, clock and
//! confirmation broker behind one cloneable handle. Every public operation is
//! implemented in `services` as an `impl Arena` block and runs through
//! [`Arena::guarded`], which retries optimistic-concurrency conflicts and logs
//! failures in one place.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use arena_core::{CharacterState, Faction, GameError, RollSource, UserId};
use chrono::{DateTime, Duration, Utc};

use crate::api::{ArenaError, Result};
use crate::handshake::ConfirmationBroker;
use crate::oracle::ContentOracle;
use crate::providers::{Clock, SystemClock, ThreadRollSource};
use crate::repository::{
    Changeset, Expected, InMemoryRecordStore, RecordStore, RecordStoreExt, Stored, faction_key,
};

/// Tunables shared by every service.
#[derive(Debug, Clone)]
pub struct ArenaConfig {
    /// How long a challenged user has to answer.
    pub confirm_timeout: StdDuration,
    /// Extra attempts after a version conflict before giving up.
    pub conflict_retries: u32,

    pub hourly_cooldown: Duration,
    /// Inclusive range of the base hourly payout.
    pub hourly_roll: (u32, u32),
    pub heal_cooldown: Duration,
    /// Share of max health restored by one heal.
    pub heal_fraction: f64,

    pub power_price: u64,
    pub max_health_price: u64,
    pub max_health_step: u32,
    pub hourly_multiplier_price: u64,
    pub hourly_multiplier_step: f64,

    pub faction_income_interval: Duration,
    pub leaderboard_size: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            confirm_timeout: StdDuration::from_secs(30),
            conflict_retries: 3,
            hourly_cooldown: Duration::hours(1),
            hourly_roll: (50, 150),
            heal_cooldown: Duration::minutes(30),
            heal_fraction: 0.10,
            power_price: 100,
            max_health_price: 200,
            max_health_step: 10,
            hourly_multiplier_price: 500,
            hourly_multiplier_step: 0.1,
            faction_income_interval: Duration::hours(24),
            leaderboard_size: 10,
        }
    }
}

/// Cloneable handle to the game services.
#[derive(Clone)]
pub struct Arena {
    store: Arc<dyn RecordStore>,
    oracle: ContentOracle,
    rolls: Arc<dyn RollSource>,
    clock: Arc<dyn Clock>,
    broker: ConfirmationBroker,
    config: ArenaConfig,
}

impl Arena {
    pub fn builder() -> ArenaBuilder {
        ArenaBuilder::new()
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn oracle(&self) -> &ContentOracle {
        &self.oracle
    }

    pub fn broker(&self) -> &ConfirmationBroker {
        &self.broker
    }

    pub(crate) fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub(crate) fn rolls(&self) -> &dyn RollSource {
        self.rolls.as_ref()
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Run one public operation.
    ///
    /// `body` must read everything it needs and commit a single changeset. On a
    /// version conflict it is re-run from scratch up to
    /// [`ArenaConfig::conflict_retries`] more times.
    pub(crate) fn guarded<T>(
        &self,
        operation: &'static str,
        mut body: impl FnMut() -> Result<T>,
    ) -> Result<T> {
        let mut retries = 0;
        loop {
            match body() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && retries < self.config.conflict_retries => {
                    retries += 1;
                    tracing::debug!(operation, retries, "version conflict, retrying");
                }
                Err(err) => {
                    log_failure(operation, &err);
                    return Err(err);
                }
            }
        }
    }

    /// Load a character, creating the default record on first contact.
    pub(crate) fn ensure_character(&self, id: &UserId) -> Result<Stored<CharacterState>> {
        if let Some(stored) = self.store.fetch::<CharacterState>(id.as_str())? {
            return Ok(stored);
        }

        let character = CharacterState::new(id.clone());
        let mut changeset = Changeset::new();
        changeset.put(Expected::Absent, &character)?;

        match self.store.commit(changeset) {
            Ok(()) => {
                tracing::debug!(%id, "created character");
                Ok(Stored {
                    version: 1,
                    record: character,
                })
            }
            // created concurrently by another request
            Err(err) if err.is_conflict() => self
                .store
                .fetch::<CharacterState>(id.as_str())?
                .ok_or_else(|| ArenaError::from(err)),
            Err(err) => Err(err.into()),
        }
    }

    pub(crate) fn find_faction(&self, name: &str) -> Result<Option<Stored<Faction>>> {
        Ok(self.store.fetch::<Faction>(&faction_key(name))?)
    }

    /// The faction a character points at, if any.
    pub(crate) fn faction_of(&self, character: &CharacterState) -> Result<Option<Stored<Faction>>> {
        match &character.faction {
            Some(name) => self.find_faction(name),
            None => Ok(None),
        }
    }
}

fn log_failure(operation: &'static str, err: &ArenaError) {
    match err {
        ArenaError::StorageUnavailable(source) if source.is_conflict() => {
            tracing::warn!(operation, error = %source, "gave up after repeated conflicts");
        }
        ArenaError::StorageUnavailable(source) => {
            tracing::error!(operation, error = %source, "storage failure");
        }
        other if other.severity().is_recoverable() => {
            tracing::debug!(operation, code = other.error_code(), "deferred: {other}");
        }
        other => {
            let severity = other.severity().as_str();
            tracing::warn!(operation, code = other.error_code(), severity, "rejected: {other}");
        }
    }
}

/// Builder for [`Arena`]. Anything left unset gets its production default.
#[derive(Default)]
pub struct ArenaBuilder {
    store: Option<Arc<dyn RecordStore>>,
    oracle: Option<ContentOracle>,
    rolls: Option<Arc<dyn RollSource>>,
    clock: Option<Arc<dyn Clock>>,
    config: ArenaConfig,
}

impl ArenaBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Record store (default: empty in-memory store).
    pub fn store<S: RecordStore + 'static>(mut self, store: Arc<S>) -> Self {
        self.store = Some(store as Arc<dyn RecordStore>);
        self
    }

    /// Static tables (default: stock classes and bosses).
    pub fn oracle(mut self, oracle: ContentOracle) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Roll source (default: thread RNG).
    pub fn rolls<R: RollSource + 'static>(mut self, rolls: Arc<R>) -> Self {
        self.rolls = Some(rolls as Arc<dyn RollSource>);
        self
    }

    /// Clock (default: system time).
    pub fn clock<C: Clock + 'static>(mut self, clock: Arc<C>) -> Self {
        self.clock = Some(clock as Arc<dyn Clock>);
        self
    }

    pub fn config(mut self, config: ArenaConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Arena {
        let broker = ConfirmationBroker::new(self.config.confirm_timeout);
        Arena {
            store: self
                .store
                .unwrap_or_else(|| Arc::new(InMemoryRecordStore::new()) as Arc<dyn RecordStore>),
            oracle: self.oracle.unwrap_or_default(),
            rolls: self
                .rolls
                .unwrap_or_else(|| Arc::new(ThreadRollSource) as Arc<dyn RollSource>),
            clock: self
                .clock
                .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>),
            broker,
            config: self.config,
        }
    }
}
