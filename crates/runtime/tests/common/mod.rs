#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use arena_core::{CharacterClass, CharacterState, FixedRolls, UserId};
use arena_runtime::{
    Arena, ArenaConfig, Changeset, ContentOracle, Expected, InMemoryRecordStore, ManualClock,
    RecordStore, RecordStoreExt,
};
use chrono::{DateTime, Utc};

/// An arena over an in-memory store with scripted rolls and a manual clock.
pub struct Harness {
    pub arena: Arena,
    pub store: Arc<InMemoryRecordStore>,
    pub rolls: Arc<FixedRolls>,
    pub clock: Arc<ManualClock>,
}

pub fn start() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
}

pub fn user(id: &str) -> UserId {
    UserId::from(id)
}

impl Harness {
    pub fn new(rolls: Vec<u32>) -> Self {
        Self::with_oracle(rolls, ContentOracle::default())
    }

    pub fn with_oracle(rolls: Vec<u32>, oracle: ContentOracle) -> Self {
        let config = ArenaConfig {
            confirm_timeout: Duration::from_millis(200),
            ..ArenaConfig::default()
        };
        let store = Arc::new(InMemoryRecordStore::new());
        let rolls = Arc::new(FixedRolls::new(rolls));
        let clock = Arc::new(ManualClock::new(start()));
        let arena = Arena::builder()
            .store(store.clone())
            .rolls(rolls.clone())
            .clock(clock.clone())
            .oracle(oracle)
            .config(config)
            .build();

        Self {
            arena,
            store,
            rolls,
            clock,
        }
    }

    /// Overwrite a character record directly.
    pub fn seed(&self, character: CharacterState) {
        let mut changeset = Changeset::new();
        changeset
            .put(Expected::Any, &character)
            .expect("serializable");
        self.store.commit(changeset).expect("seed commit");
    }

    /// Seed a fresh character with a class and some gold.
    pub fn fighter(&self, id: &str, class: CharacterClass, gold: u64) -> UserId {
        let mut character = CharacterState::new(user(id)).with_class(class);
        character.gold = gold;
        self.seed(character);
        user(id)
    }

    pub fn character(&self, id: &UserId) -> CharacterState {
        self.store
            .fetch::<CharacterState>(id.as_str())
            .expect("store readable")
            .expect("character exists")
            .into_inner()
    }

    /// Answer the next challenge addressed to `responder` in `channel`.
    pub fn answer_when_asked(&self, channel: &str, responder: &UserId, accept: bool) {
        let arena = self.arena.clone();
        let channel = channel.to_owned();
        let responder = responder.clone();
        tokio::spawn(async move {
            for _ in 0..100 {
                if arena.respond(&channel, &responder, accept) {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });
    }
}
