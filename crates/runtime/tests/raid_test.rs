mod common;

use arena_core::{
    BossDefinition, BossTable, CharacterClass, ClassTable, RaidError, RaidId, RaidPhase, UserId,
};
use arena_runtime::{ArenaError, ContentOracle};
use chrono::Duration;

use common::Harness;

fn oracle() -> ContentOracle {
    let bosses = BossTable::new(vec![
        BossDefinition::new("Training Dummy", 40.0, 10, 0, 300, 3_600),
        BossDefinition::new("Stone Golem", 10_000.0, 20, 0, 1_000, 600),
    ])
    .expect("valid bosses");
    ContentOracle::new(ClassTable::standard(), bosses)
}

/// A warrior leading a faction with a cleric and a mage in it.
fn guild(h: &Harness) -> (UserId, UserId, UserId) {
    let lead = h.fighter("lead", CharacterClass::Warrior, 0);
    let cleric = h.fighter("cleric", CharacterClass::Cleric, 0);
    let mage = h.fighter("mage", CharacterClass::Mage, 0);
    h.arena.create_faction(&lead, "Wardens").expect("faction");
    h.arena.admit_member(&lead, &cleric).expect("cleric joins");
    h.arena.admit_member(&lead, &mage).expect("mage joins");
    (lead, cleric, mage)
}

fn assemble(h: &Harness, boss: &str, lead: &UserId, party: &[&UserId]) {
    h.arena.create_raid(lead, boss).expect("raid created");
    for member in party {
        h.arena.invite_to_raid(lead, member).expect("invited");
        h.arena.join_raid(member).expect("joined");
    }
}

fn all_ready(h: &Harness, members: &[&UserId]) {
    for member in members {
        h.arena.ready(member).expect("ready");
    }
}

#[test]
fn defeated_boss_pays_the_party_and_ends_the_raid() {
    let h = Harness::with_oracle(vec![10], oracle());
    let (lead, cleric, mage) = guild(&h);
    assemble(&h, "training dummy", &lead, &[&cleric, &mage]);

    let status = h.arena.ready(&lead).expect("ready");
    assert!(!status.all_ready);
    all_ready(&h, &[&cleric, &mage]);

    let report = h.arena.begin_raid(&lead).expect("fight resolves");

    assert!(report.outcome.boss_defeated);
    assert!(report.outcome.total_reward() <= 300);
    assert_eq!(report.raid.phase, RaidPhase::Concluded);
    assert_eq!(report.raid.attempts, 1);

    let mut paid = 0;
    for id in [&lead, &cleric, &mage] {
        let character = h.character(id);
        assert_eq!(character.raid_wins, 1);
        assert_eq!(character.health, 100.0);
        paid += character.gold;
    }
    assert_eq!(paid, report.outcome.total_reward());

    for id in [&lead, &cleric, &mage] {
        assert!(matches!(
            h.arena.raid_info(id),
            Err(ArenaError::NoActiveRaid { .. })
        ));
    }
}

#[test]
fn boss_cooldown_blocks_a_new_raid_until_it_expires() {
    let h = Harness::with_oracle(vec![10], oracle());
    let (lead, cleric, _) = guild(&h);
    assemble(&h, "Training Dummy", &lead, &[&cleric]);
    all_ready(&h, &[&lead, &cleric]);
    h.arena.begin_raid(&lead).expect("fight resolves");

    let err = h.arena.create_raid(&lead, "Training Dummy").unwrap_err();
    assert!(matches!(
        err,
        ArenaError::CooldownActive {
            remaining_secs: 3_600,
            ..
        }
    ));

    h.clock.advance(Duration::seconds(3_600));
    let raid = h.arena.create_raid(&lead, "Training Dummy").expect("cooldown over");
    assert_eq!(raid.participants.len(), 1);
    assert_eq!(raid.phase, RaidPhase::Forming);
}

#[test]
fn member_cooldown_only_blocks_the_fight() {
    let h = Harness::with_oracle(vec![10], oracle());
    let (lead, cleric, _) = guild(&h);

    // the cleric attempts the dummy alone and walks away
    h.arena.create_raid(&cleric, "Training Dummy").expect("solo raid");
    h.arena.ready(&cleric).expect("ready");
    let report = h.arena.begin_raid(&cleric).expect("fight resolves");
    assert!(!report.outcome.boss_defeated);
    h.arena.cancel_raid(&cleric).expect("cancelled");

    // the leader is clear, so forming the party goes through
    let raid = h.arena.create_raid(&lead, "Training Dummy").expect("leader is clear");
    h.arena.invite_to_raid(&lead, &cleric).expect("invited");
    h.arena.join_raid(&cleric).expect("joined");
    all_ready(&h, &[&lead, &cleric]);

    let err = h.arena.begin_raid(&lead).unwrap_err();
    match err {
        ArenaError::CooldownActive {
            what,
            remaining_secs,
        } => {
            assert!(what.contains("cleric"), "blocking member named: {what}");
            assert_eq!(remaining_secs, 3_600);
        }
        other => panic!("expected a cooldown, got {other:?}"),
    }
    assert_eq!(h.arena.raid_info(&lead).expect("still open").id, raid.id);

    h.clock.advance(Duration::seconds(3_600));
    h.arena.begin_raid(&lead).expect("cooldown over");
}

#[test]
fn surviving_boss_strikes_back_and_the_raid_regroups() {
    let h = Harness::with_oracle(vec![10], oracle());
    let (lead, cleric, _) = guild(&h);
    assemble(&h, "Stone Golem", &lead, &[&cleric]);
    all_ready(&h, &[&lead, &cleric]);

    let report = h.arena.begin_raid(&lead).expect("fight resolves");

    assert!(!report.outcome.boss_defeated);
    assert_eq!(report.raid.phase, RaidPhase::Forming);
    assert!(report.raid.participants.iter().all(|p| !p.ready));
    // boss hits for 20 + 5 less the class defense
    assert_eq!(h.character(&lead).health, 83.0);
    assert_eq!(h.character(&cleric).health, 82.0);
    assert_eq!(h.character(&lead).raid_wins, 0);

    all_ready(&h, &[&lead, &cleric]);
    let err = h.arena.begin_raid(&lead).unwrap_err();
    assert!(matches!(err, ArenaError::CooldownActive { .. }));
    assert_eq!(h.arena.raid_info(&lead).expect("active").attempts, 1);

    h.clock.advance(Duration::seconds(600));
    let report = h.arena.begin_raid(&lead).expect("second attempt");
    assert_eq!(report.raid.attempts, 2);
    assert_eq!(h.character(&lead).health, 66.0);
}

#[test]
fn only_a_ready_party_led_by_its_leader_can_begin() {
    let h = Harness::with_oracle(vec![10], oracle());
    let (lead, cleric, _) = guild(&h);
    assemble(&h, "Training Dummy", &lead, &[&cleric]);
    h.arena.ready(&lead).expect("ready");

    let err = h.arena.begin_raid(&lead).unwrap_err();
    assert!(matches!(
        err,
        ArenaError::Raid(RaidError::NotReady { user }) if user == cleric
    ));

    h.arena.ready(&cleric).expect("ready");
    let err = h.arena.begin_raid(&cleric).unwrap_err();
    assert!(matches!(err, ArenaError::NotAuthorized { .. }));
    assert_eq!(h.rolls.drawn(), 0);
}

#[test]
fn invitations_stay_inside_the_faction() {
    let h = Harness::with_oracle(vec![10], oracle());
    let (lead, _, _) = guild(&h);
    let stranger = h.fighter("stranger", CharacterClass::Rogue, 0);
    h.arena.create_raid(&lead, "Training Dummy").expect("raid");

    let err = h.arena.invite_to_raid(&lead, &stranger).unwrap_err();
    assert!(matches!(
        err,
        ArenaError::Raid(RaidError::FactionMismatch { .. })
    ));

    let err = h.arena.join_raid(&stranger).unwrap_err();
    assert!(matches!(err, ArenaError::NoInvitation { .. }));
}

#[test]
fn a_newer_invitation_replaces_the_older_one() {
    let h = Harness::with_oracle(vec![10], oracle());
    let (lead, cleric, mage) = guild(&h);
    h.arena.create_raid(&lead, "Training Dummy").expect("first raid");
    h.arena.create_raid(&mage, "Stone Golem").expect("second raid");

    h.arena.invite_to_raid(&lead, &cleric).expect("first invitation");
    let first = h.arena.raid_info(&lead).expect("first raid");
    assert!(first.invited.contains(&cleric));

    h.arena.invite_to_raid(&mage, &cleric).expect("second invitation");
    let first = h.arena.raid_info(&lead).expect("first raid");
    assert!(first.invited.is_empty());

    let joined = h.arena.join_raid(&cleric).expect("joins the newer raid");
    assert_eq!(joined.boss, "Stone Golem");
    assert!(joined.invited.is_empty());
    assert_eq!(h.arena.raid_info(&cleric).expect("in a raid").id, joined.id);
}

#[test]
fn one_raid_at_a_time() {
    let h = Harness::with_oracle(vec![10], oracle());
    let (lead, cleric, _) = guild(&h);
    assemble(&h, "Training Dummy", &lead, &[&cleric]);

    let err = h.arena.create_raid(&cleric, "Stone Golem").unwrap_err();
    assert!(matches!(err, ArenaError::AlreadyInRaid { .. }));
    let err = h.arena.create_raid(&lead, "Stone Golem").unwrap_err();
    assert!(matches!(err, ArenaError::AlreadyInRaid { .. }));
}

#[test]
fn raids_need_a_known_boss_and_a_faction() {
    let h = Harness::new(vec![10]);
    let loner = h.fighter("loner", CharacterClass::Ranger, 0);

    let err = h.arena.create_raid(&loner, "Goblin King").unwrap_err();
    assert!(matches!(err, ArenaError::NotInFaction { .. }));

    let err = h.arena.create_raid(&loner, "Lich").unwrap_err();
    assert!(matches!(err, ArenaError::UnknownBoss(name) if name == "Lich"));

    h.arena.create_faction(&loner, "Solo").expect("faction");
    let raid = h.arena.create_raid(&loner, "goblin KING").expect("case-insensitive");
    assert_eq!(raid.boss, "Goblin King");
}

#[test]
fn fleeing_ends_the_raid_for_everyone() {
    let h = Harness::with_oracle(vec![10], oracle());
    let (lead, cleric, mage) = guild(&h);
    assemble(&h, "Training Dummy", &lead, &[&cleric, &mage]);

    let raid = h.arena.flee_raid(&mage).expect("fled");
    assert_eq!(raid.phase, RaidPhase::Fled);
    for id in [&lead, &cleric, &mage] {
        assert!(matches!(
            h.arena.raid_info(id),
            Err(ArenaError::NoActiveRaid { .. })
        ));
    }

    // nobody fought, so no cooldown
    let raid = h.arena.create_raid(&lead, "Training Dummy").expect("new raid");
    assert_eq!(raid.id, RaidId(2));
    let raid = h.arena.cancel_raid(&lead).expect("cancelled");
    assert_eq!(raid.phase, RaidPhase::Cancelled);
}
