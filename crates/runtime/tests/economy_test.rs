mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use arena_core::{CharacterClass, CharacterState, ErrorSeverity, FixedRolls, GameError};
use arena_runtime::repository::{Result as StoreResult, Versioned};
use arena_runtime::{
    Arena, ArenaError, Changeset, Expected, InMemoryRecordStore, RecordStore, RecordStoreExt,
    RepositoryError, ShopItem,
};
use chrono::Duration;

use common::{Harness, user};

#[test]
fn class_is_chosen_once() {
    let h = Harness::new(vec![5]);
    let ada = user("ada");

    let profile = h.arena.profile(&ada).expect("profile");
    assert_eq!(profile.character.class, None);
    assert!(profile.stats.is_none());
    assert!(matches!(
        h.arena.effective_stats(&ada),
        Err(ArenaError::NoClassSelected { .. })
    ));

    let err = h.arena.select_class(&ada, "Bard").unwrap_err();
    assert!(matches!(err, ArenaError::UnknownClass(name) if name == "Bard"));

    let profile = h.arena.select_class(&ada, "mage").expect("class picked");
    assert_eq!(profile.character.class, Some(CharacterClass::Mage));
    assert_eq!(profile.stats.map(|s| s.final_attack), Some(15));

    let err = h.arena.select_class(&ada, "Warrior").unwrap_err();
    assert!(matches!(err, ArenaError::ClassAlreadySelected { .. }));
    assert_eq!(h.character(&ada).class, Some(CharacterClass::Mage));
}

#[test]
fn hourly_claim_waits_an_hour() {
    let h = Harness::new(vec![100]);
    let ada = user("ada");

    let claim = h.arena.claim_hourly(&ada).expect("claimed");
    assert_eq!((claim.roll, claim.amount, claim.balance), (100, 100, 100));

    h.clock.advance(Duration::minutes(30));
    let err = h.arena.claim_hourly(&ada).unwrap_err();
    assert!(matches!(
        err,
        ArenaError::CooldownActive {
            remaining_secs: 1_800,
            ..
        }
    ));
    assert_eq!(err.severity(), ErrorSeverity::Recoverable);

    h.clock.advance(Duration::minutes(30));
    let claim = h.arena.claim_hourly(&ada).expect("claimed again");
    assert_eq!(claim.balance, 200);
}

#[test]
fn bought_multiplier_scales_the_hourly_claim() {
    let h = Harness::new(vec![100]);
    let ada = h.fighter("ada", CharacterClass::Ranger, 500);

    let purchase = h.arena.buy(&ada, "multiplier", 1).expect("bought");
    assert_eq!(purchase.item, ShopItem::Hourly);
    assert_eq!(purchase.cost, 500);

    let claim = h.arena.claim_hourly(&ada).expect("claimed");
    assert_eq!(claim.amount, 110);
}

#[test]
fn heal_restores_a_tenth_of_max_health() {
    let h = Harness::new(vec![5]);
    let hurt = CharacterState::new(user("ada"))
        .with_class(CharacterClass::Cleric)
        .with_health(50.0);
    h.seed(hurt);

    let report = h.arena.heal(&user("ada")).expect("healed");
    assert_eq!((report.restored, report.health), (10.0, 60.0));

    let err = h.arena.heal(&user("ada")).unwrap_err();
    assert!(matches!(
        err,
        ArenaError::CooldownActive {
            remaining_secs: 1_800,
            ..
        }
    ));

    // healing never goes past max health
    h.clock.advance(Duration::minutes(30));
    let mut nearly = h.character(&user("ada"));
    nearly.set_health(95.0);
    h.seed(nearly);
    let report = h.arena.heal(&user("ada")).expect("healed");
    assert_eq!((report.restored, report.health), (5.0, 100.0));
}

#[test]
fn shop_spends_gold() {
    let h = Harness::new(vec![5]);
    let ada = h.fighter("ada", CharacterClass::Warrior, 350);

    let purchase = h.arena.buy(&ada, "Power", 3).expect("bought");
    assert_eq!(purchase.cost, 300);
    assert_eq!(purchase.character.power, 3);
    assert_eq!(h.character(&ada).gold, 50);

    let err = h.arena.buy(&ada, "health", 1).unwrap_err();
    assert!(matches!(
        err,
        ArenaError::InsufficientFunds {
            needed: 200,
            available: 50,
            ..
        }
    ));
    assert!(matches!(
        h.arena.buy(&ada, "sword", 1),
        Err(ArenaError::UnknownItem(_))
    ));
    assert!(matches!(
        h.arena.buy(&ada, "power", 0),
        Err(ArenaError::InvalidAmount)
    ));

    let mut rich = h.character(&ada);
    rich.gold = 200;
    h.seed(rich);
    let purchase = h.arena.buy(&ada, "max_health", 1).expect("bought");
    assert_eq!(purchase.character.max_health, 110);
    assert_eq!(purchase.character.health, 100.0);
}

#[test]
fn faction_upgrades_show_in_the_profile() {
    let h = Harness::new(vec![5]);
    let ada = h.fighter("ada", CharacterClass::Rogue, 1_000);
    h.arena.create_faction(&ada, "Night Hands").expect("faction");
    h.arena.deposit(&ada, 1_000).expect("deposit");
    h.arena.purchase_upgrade(&ada, "power").expect("upgrade");

    let profile = h.arena.profile(&ada).expect("profile");
    let stats = profile.stats.expect("class chosen");
    assert_eq!(profile.character.power, 0);
    assert_eq!(stats.final_power, 1);
    assert_eq!(stats.final_attack, 15);
}

/// Rejects the first `failures` commits as if another writer got there first.
struct ContestedStore {
    inner: InMemoryRecordStore,
    failures: AtomicUsize,
}

impl ContestedStore {
    fn new(failures: usize) -> Self {
        Self {
            inner: InMemoryRecordStore::new(),
            failures: AtomicUsize::new(failures),
        }
    }
}

impl RecordStore for ContestedStore {
    fn get(&self, table: &str, key: &str) -> StoreResult<Option<Versioned>> {
        self.inner.get(table, key)
    }

    fn scan(&self, table: &str) -> StoreResult<Vec<(String, Versioned)>> {
        self.inner.scan(table)
    }

    fn commit(&self, changeset: Changeset) -> StoreResult<()> {
        let contested = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if contested {
            return Err(RepositoryError::VersionConflict {
                table: "characters".into(),
                key: "ada".into(),
                expected: Expected::Version(1),
                found: Some(2),
            });
        }
        self.inner.commit(changeset)
    }
}

fn contested_arena(failures: usize) -> (Arena, Arc<ContestedStore>) {
    let store = Arc::new(ContestedStore::new(failures));
    let mut changeset = Changeset::new();
    changeset
        .put(Expected::Absent, &CharacterState::new(user("ada")))
        .expect("serializable");
    store.inner.commit(changeset).expect("seed");

    let arena = Arena::builder()
        .store(store.clone())
        .rolls(Arc::new(FixedRolls::constant(100)))
        .build();
    (arena, store)
}

#[test]
fn version_conflicts_are_retried() {
    let (arena, store) = contested_arena(2);

    let claim = arena.claim_hourly(&user("ada")).expect("claimed after retries");

    assert_eq!(claim.balance, 100);
    let stored = store
        .fetch::<CharacterState>("ada")
        .expect("readable")
        .expect("exists");
    assert_eq!(stored.version, 2);
    assert_eq!(stored.record.gold, 100);
}

#[test]
fn persistent_conflicts_surface_as_storage_errors() {
    let (arena, store) = contested_arena(usize::MAX);

    let err = arena.claim_hourly(&user("ada")).unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(err.error_code(), "STORAGE_UNAVAILABLE");
    assert!(!err.user_message().contains("characters"));
    let stored = store
        .fetch::<CharacterState>("ada")
        .expect("readable")
        .expect("exists");
    assert_eq!(stored.record.gold, 0);
}
