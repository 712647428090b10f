//! Class matchup multipliers.

use crate::class::{CharacterClass, ClassTable};

/// Applied once per opponent whose class resists the attacker's class.
pub const RESISTANCE_MODIFIER: f64 = 0.5;

/// Applied once per opponent whose class is vulnerable to the attacker's class.
pub const VULNERABILITY_MODIFIER: f64 = 1.5;

/// Flat raid multiplier when an ally of a synergy class is present.
pub const SYNERGY_BONUS: f64 = 1.1;

/// Attack multiplier of `attacker` against every class in `opponents`.
///
/// Starts at 1.0. Each opponent contributes independently, so a duplicated
/// opposing class counts twice, and one opponent can both resist and be
/// vulnerable.
pub fn attack_modifier(
    attacker: CharacterClass,
    opponents: impl IntoIterator<Item = CharacterClass>,
    classes: &ClassTable,
) -> f64 {
    opponents.into_iter().fold(1.0, |modifier, opponent| {
        let defender = classes.get(opponent);
        let mut modifier = modifier;
        if defender.resists(attacker) {
            modifier *= RESISTANCE_MODIFIER;
        }
        if defender.is_vulnerable_to(attacker) {
            modifier *= VULNERABILITY_MODIFIER;
        }
        modifier
    })
}

/// [`SYNERGY_BONUS`] when any of `allies` is a synergy class of `class`, else 1.0.
///
/// `allies` must exclude the fighter itself.
pub fn synergy_bonus(
    class: CharacterClass,
    allies: impl IntoIterator<Item = CharacterClass>,
    classes: &ClassTable,
) -> f64 {
    let synergies = &classes.get(class).synergies;
    if allies.into_iter().any(|ally| synergies.contains(&ally)) {
        SYNERGY_BONUS
    } else {
        1.0
    }
}
