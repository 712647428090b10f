//! Boss fight resolution for raids.

use super::{CombatError, InvalidReason, damage_through, ensure_distinct, synergy_bonus};
use crate::boss::BossDefinition;
use crate::class::{CharacterClass, ClassTable};
use crate::rng::{ATTACK_ROLL, BOSS_ROLL, RollSource};
use crate::state::{CharacterState, UserId};

/// A raid participant entering the boss fight.
///
/// Boss fights use base power and class defense only; faction upgrades do
/// not apply.
#[derive(Clone, Debug, PartialEq)]
pub struct RaidFighter {
    pub character: CharacterState,
    pub class: CharacterClass,
}

impl RaidFighter {
    /// # Errors
    ///
    /// [`CombatError::InvalidCombatant`] when the character has no class.
    pub fn new(character: CharacterState) -> Result<Self, CombatError> {
        match character.class {
            Some(class) => Ok(Self { character, class }),
            None => Err(CombatError::InvalidCombatant {
                id: character.id,
                reason: InvalidReason::NoClass,
            }),
        }
    }

    pub fn id(&self) -> &UserId {
        &self.character.id
    }

    pub fn into_character(self) -> CharacterState {
        self.character
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RaidFighterReport {
    pub id: UserId,
    pub class: CharacterClass,
    pub attack_roll: u32,
    pub synergy: f64,
    pub effective_attack: f64,
    pub damage_dealt: f64,
    /// Gold share; zero unless the boss fell.
    pub reward: u64,
    /// Present only when the boss survived and struck back.
    pub boss_roll: Option<u32>,
    pub damage_taken: f64,
    pub defeated: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BossFightOutcome {
    pub boss: String,
    pub total_damage: f64,
    /// May go negative on overkill.
    pub boss_health_after: f64,
    pub boss_defeated: bool,
    pub fighters: Vec<RaidFighterReport>,
}

impl BossFightOutcome {
    pub fn total_reward(&self) -> u64 {
        self.fighters.iter().map(|f| f.reward).sum()
    }

    pub fn damage_by(&self) -> impl Iterator<Item = (&UserId, f64)> {
        self.fighters.iter().map(|f| (&f.id, f.damage_dealt))
    }
}

/// Resolve one attempt of a raid party against a boss.
///
/// Each fighter's attack is `(base_attack + power + roll) × synergy`, reduced
/// by the boss defense. When the combined damage takes the boss to zero, the
/// reward is split by damage share (rounded down, remainder unallocated) and
/// every fighter gains a raid win. Otherwise the boss strikes each fighter
/// once and anyone dropping to zero is reset.
///
/// # Roll order
///
/// One attack roll per fighter in roster order, then, only if the boss
/// survived, one boss roll per fighter in roster order.
///
/// # Errors
///
/// [`CombatError::EmptyRoster`] without fighters and
/// [`CombatError::InvalidCombatant`] when a character is listed twice.
pub fn resolve_boss_fight(
    fighters: &mut [RaidFighter],
    boss: &BossDefinition,
    classes: &ClassTable,
    rolls: &(impl RollSource + ?Sized),
) -> Result<BossFightOutcome, CombatError> {
    if fighters.is_empty() {
        return Err(CombatError::EmptyRoster);
    }
    ensure_distinct(fighters.iter().map(RaidFighter::id))?;

    let roster: Vec<CharacterClass> = fighters.iter().map(|f| f.class).collect();

    let mut reports: Vec<RaidFighterReport> = fighters
        .iter()
        .enumerate()
        .map(|(index, fighter)| {
            let attack_roll = rolls.roll(ATTACK_ROLL.0, ATTACK_ROLL.1);
            let allies = roster
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != index)
                .map(|(_, class)| *class);
            let synergy = synergy_bonus(fighter.class, allies, classes);
            let base = f64::from(classes.get(fighter.class).base_attack)
                + f64::from(fighter.character.power);
            let effective_attack = (base + f64::from(attack_roll)) * synergy;

            RaidFighterReport {
                id: fighter.id().clone(),
                class: fighter.class,
                attack_roll,
                synergy,
                effective_attack,
                damage_dealt: damage_through(effective_attack, f64::from(boss.defense)),
                reward: 0,
                boss_roll: None,
                damage_taken: 0.0,
                defeated: false,
            }
        })
        .collect();

    let total_damage: f64 = reports.iter().map(|r| r.damage_dealt).sum();
    let boss_health_after = boss.health - total_damage;
    let boss_defeated = boss_health_after <= 0.0;

    if boss_defeated {
        let mut pool = boss.reward_gold;
        for (fighter, report) in fighters.iter_mut().zip(&mut reports) {
            if total_damage > 0.0 {
                let share = report.damage_dealt / total_damage;
                let floored = (share * boss.reward_gold as f64).floor() as u64;
                report.reward = floored.min(pool);
                pool -= report.reward;
            }
            fighter.character.credit(report.reward);
            fighter.character.raid_wins = fighter.character.raid_wins.saturating_add(1);
        }
    } else {
        for (fighter, report) in fighters.iter_mut().zip(&mut reports) {
            let boss_roll = rolls.roll(BOSS_ROLL.0, BOSS_ROLL.1);
            let defense = classes.get(fighter.class).base_defense;
            let damage = f64::from(boss.attack.saturating_add(boss_roll).saturating_sub(defense));

            fighter.character.apply_damage(damage);
            report.boss_roll = Some(boss_roll);
            report.damage_taken = damage;
            report.defeated = fighter.character.settle_defeat();
        }
    }

    Ok(BossFightOutcome {
        boss: boss.name.clone(),
        total_damage,
        boss_health_after,
        boss_defeated,
        fighters: reports,
    })
}
