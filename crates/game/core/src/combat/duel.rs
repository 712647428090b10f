//! One-on-one duel resolution.

use super::result::{DuelSide, FighterReport, Verdict};
use super::{Combatant, CombatError, InvalidReason, attack_modifier, damage_through, ensure_distinct};
use crate::class::ClassTable;
use crate::rng::{CombatRolls, RollSource};
use crate::state::UserId;

/// Result of a single simultaneous duel exchange.
#[derive(Clone, Debug, PartialEq)]
pub struct DuelOutcome {
    pub challenger: FighterReport,
    pub opponent: FighterReport,
    /// Damage dealt by the challenger to the opponent.
    pub challenger_damage: f64,
    /// Damage dealt by the opponent to the challenger.
    pub opponent_damage: f64,
    pub verdict: Verdict<DuelSide>,
}

impl DuelOutcome {
    pub fn side(&self, side: DuelSide) -> &FighterReport {
        match side {
            DuelSide::Challenger => &self.challenger,
            DuelSide::Opponent => &self.opponent,
        }
    }

    pub fn winner_id(&self) -> Option<&UserId> {
        self.verdict.winner().map(|side| &self.side(side).id)
    }

    pub fn loser_id(&self) -> Option<&UserId> {
        self.verdict.loser().map(|side| &self.side(side).id)
    }
}

/// Resolve one exchange between two combatants.
///
/// Both damages are computed from pre-exchange state and applied at once, so
/// neither side sees the other's post-hit health. Anyone dropping to zero is
/// reset (full health, no gold) regardless of the verdict. Gold is otherwise
/// untouched; wagers are settled by the caller from the verdict.
///
/// # Roll order
///
/// Challenger attack, challenger defense, opponent attack, opponent defense.
///
/// # Errors
///
/// [`CombatError::InvalidCombatant`] when the two combatants are the same
/// character or either has no health left. Neither combatant is mutated.
pub fn resolve_duel(
    challenger: &mut Combatant,
    opponent: &mut Combatant,
    classes: &ClassTable,
    rolls: &(impl RollSource + ?Sized),
) -> Result<DuelOutcome, CombatError> {
    ensure_distinct([challenger.id(), opponent.id()])?;
    for combatant in [&*challenger, &*opponent] {
        if !combatant.character.is_alive() {
            return Err(CombatError::InvalidCombatant {
                id: combatant.id().clone(),
                reason: InvalidReason::Defeated,
            });
        }
    }

    let challenger_rolls = CombatRolls::draw(rolls);
    let opponent_rolls = CombatRolls::draw(rolls);

    let challenger_modifier = attack_modifier(challenger.class, [opponent.class], classes);
    let opponent_modifier = attack_modifier(opponent.class, [challenger.class], classes);

    let challenger_attack = challenger.effective_attack(challenger_rolls, challenger_modifier);
    let challenger_defense = challenger.effective_defense(challenger_rolls);
    let opponent_attack = opponent.effective_attack(opponent_rolls, opponent_modifier);
    let opponent_defense = opponent.effective_defense(opponent_rolls);

    let challenger_damage = damage_through(challenger_attack, opponent_defense);
    let opponent_damage = damage_through(opponent_attack, challenger_defense);

    let challenger_report = challenger.take_hit(
        challenger_rolls,
        challenger_modifier,
        challenger_attack,
        challenger_defense,
        opponent_damage,
    );
    let opponent_report = opponent.take_hit(
        opponent_rolls,
        opponent_modifier,
        opponent_attack,
        opponent_defense,
        challenger_damage,
    );

    let verdict = Verdict::decide(
        DuelSide::Challenger,
        DuelSide::Opponent,
        !challenger_report.defeated,
        !opponent_report.defeated,
        challenger_damage,
        opponent_damage,
    );

    Ok(DuelOutcome {
        challenger: challenger_report,
        opponent: opponent_report,
        challenger_damage,
        opponent_damage,
        verdict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::CharacterClass;
    use crate::rng::FixedRolls;
    use crate::state::CharacterState;
    use crate::stats::StatResolver;

    fn combatant(id: &str, class: CharacterClass, health: f64) -> Combatant {
        let classes = ClassTable::standard();
        let resolver = StatResolver::new(&classes);
        let character = CharacterState::new(UserId::from(id))
            .with_class(class)
            .with_health(health);
        Combatant::new(character, None, &resolver).unwrap()
    }

    #[test]
    fn warrior_mirror_is_decided_by_rolls_only() {
        let classes = ClassTable::standard();

        // equal rolls: equal damage, both standing
        let mut a = combatant("a", CharacterClass::Warrior, 100.0);
        let mut b = combatant("b", CharacterClass::Warrior, 100.0);
        let outcome = resolve_duel(&mut a, &mut b, &classes, &FixedRolls::new(vec![5, 3])).unwrap();
        assert!(outcome.verdict.is_draw());
        assert_eq!(outcome.challenger_damage, outcome.opponent_damage);

        // better rolls win
        let mut a = combatant("a", CharacterClass::Warrior, 100.0);
        let mut b = combatant("b", CharacterClass::Warrior, 100.0);
        let rolls = FixedRolls::new(vec![10, 5, 1, 1]);
        let outcome = resolve_duel(&mut a, &mut b, &classes, &rolls).unwrap();
        // a: 12 + 10 - (5 + 1) = 16, b: 12 + 1 - (5 + 5) = 3
        assert_eq!(outcome.challenger_damage, 16.0);
        assert_eq!(outcome.opponent_damage, 3.0);
        assert_eq!(outcome.winner_id(), Some(&UserId::from("a")));
        assert_eq!(a.character.health, 97.0);
        assert_eq!(b.character.health, 84.0);
    }

    #[test]
    fn maximal_power_does_not_overflow() {
        let classes = ClassTable::standard();
        let resolver = StatResolver::new(&classes);
        let mut hoarder = CharacterState::new(UserId::from("hoarder"))
            .with_class(CharacterClass::Warrior);
        hoarder.power = u32::MAX;
        let mut a = Combatant::new(hoarder, None, &resolver).unwrap();
        let mut b = combatant("b", CharacterClass::Warrior, 100.0);

        let rolls = FixedRolls::new(vec![10, 1, 1, 1]);
        let outcome = resolve_duel(&mut a, &mut b, &classes, &rolls).unwrap();

        assert_eq!(a.stats.final_attack, u32::MAX);
        assert_eq!(outcome.challenger_damage, f64::from(u32::MAX) + 10.0 - 6.0);
        assert_eq!(outcome.winner_id(), Some(&UserId::from("hoarder")));
        assert!(outcome.opponent.defeated);
        assert_eq!(b.character.health, 100.0);
    }

    #[test]
    fn swapping_roles_mirrors_the_result() {
        let classes = ClassTable::standard();

        let mut mage = combatant("mage", CharacterClass::Mage, 100.0);
        let mut rogue = combatant("rogue", CharacterClass::Rogue, 100.0);
        let forward = resolve_duel(
            &mut mage,
            &mut rogue,
            &classes,
            &FixedRolls::new(vec![7, 2, 4, 5]),
        )
        .unwrap();

        let mut mage = combatant("mage", CharacterClass::Mage, 100.0);
        let mut rogue = combatant("rogue", CharacterClass::Rogue, 100.0);
        let swapped = resolve_duel(
            &mut rogue,
            &mut mage,
            &classes,
            &FixedRolls::new(vec![4, 5, 7, 2]),
        )
        .unwrap();

        assert_eq!(forward.challenger_damage, swapped.opponent_damage);
        assert_eq!(forward.opponent_damage, swapped.challenger_damage);
        assert_eq!(forward.winner_id(), swapped.winner_id());
        assert_eq!(forward.challenger.modifier, swapped.opponent.modifier);
    }

    #[test]
    fn double_knockout_is_a_draw_and_resets_both() {
        let classes = ClassTable::standard();
        let mut a = combatant("a", CharacterClass::Rogue, 2.0);
        let mut b = combatant("b", CharacterClass::Ranger, 2.0);
        a.character.gold = 40;
        b.character.gold = 70;

        let outcome =
            resolve_duel(&mut a, &mut b, &classes, &FixedRolls::new(vec![10, 1])).unwrap();

        assert!(outcome.verdict.is_draw());
        assert!(outcome.challenger.defeated && outcome.opponent.defeated);
        assert_eq!(outcome.challenger.health_after, 0.0);
        assert_eq!((a.character.health, a.character.gold), (100.0, 0));
        assert_eq!((b.character.health, b.character.gold), (100.0, 0));
    }

    #[test]
    fn single_knockout_wins_despite_smaller_damage() {
        let classes = ClassTable::standard();
        // b deals far more damage but drops; a survives with plenty of health
        let mut a = combatant("a", CharacterClass::Cleric, 100.0);
        let mut b = combatant("b", CharacterClass::Mage, 1.0);
        let rolls = FixedRolls::new(vec![10, 1, 10, 1]);

        let outcome = resolve_duel(&mut a, &mut b, &classes, &rolls).unwrap();

        assert!(outcome.opponent_damage > outcome.challenger_damage);
        assert_eq!(outcome.winner_id(), Some(&UserId::from("a")));
        assert_eq!(outcome.loser_id(), Some(&UserId::from("b")));
        assert!(!outcome.challenger.defeated);
        assert!(outcome.opponent.defeated);
    }

    #[test]
    fn fallen_combatant_is_rejected_without_mutation() {
        let classes = ClassTable::standard();
        let mut a = combatant("a", CharacterClass::Warrior, 100.0);
        let mut b = combatant("b", CharacterClass::Warrior, 100.0);
        b.character.health = 0.0;
        b.character.gold = 30;
        let before = (a.clone(), b.clone());

        let rolls = FixedRolls::new(vec![5]);
        let err = resolve_duel(&mut a, &mut b, &classes, &rolls).unwrap_err();

        assert_eq!(
            err,
            CombatError::InvalidCombatant {
                id: UserId::from("b"),
                reason: InvalidReason::Defeated
            }
        );
        assert_eq!((a, b), before);
        assert_eq!(rolls.drawn(), 0);
    }

    #[test]
    fn self_duel_is_rejected() {
        let classes = ClassTable::standard();
        let mut a = combatant("a", CharacterClass::Warrior, 100.0);
        let mut again = a.clone();
        let err = resolve_duel(&mut a, &mut again, &classes, &FixedRolls::constant(5)).unwrap_err();
        assert!(matches!(
            err,
            CombatError::InvalidCombatant {
                reason: InvalidReason::Duplicate,
                ..
            }
        ));
    }
}
