//! Shared result types for the duel and team engines.

use std::fmt;

use crate::class::CharacterClass;
use crate::rng::CombatRolls;
use crate::state::UserId;

/// Outcome of an exchange from the point of view of its two sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict<S> {
    Victory { winner: S, loser: S },
    Draw,
}

impl<S: Copy> Verdict<S> {
    /// Decide an exchange that resolved simultaneously.
    ///
    /// Precedence matters: a single elimination decides first, a double
    /// elimination is a draw, and only when both sides still stand does the
    /// damage margin count. Equal damage is a draw.
    pub fn decide(
        first: S,
        second: S,
        first_standing: bool,
        second_standing: bool,
        first_damage: f64,
        second_damage: f64,
    ) -> Self {
        match (first_standing, second_standing) {
            (true, false) => Self::victory(first, second),
            (false, true) => Self::victory(second, first),
            (false, false) => Self::Draw,
            (true, true) if first_damage > second_damage => Self::victory(first, second),
            (true, true) if second_damage > first_damage => Self::victory(second, first),
            (true, true) => Self::Draw,
        }
    }

    fn victory(winner: S, loser: S) -> Self {
        Self::Victory { winner, loser }
    }

    pub fn winner(&self) -> Option<S> {
        match self {
            Self::Victory { winner, .. } => Some(*winner),
            Self::Draw => None,
        }
    }

    pub fn loser(&self) -> Option<S> {
        match self {
            Self::Victory { loser, .. } => Some(*loser),
            Self::Draw => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        matches!(self, Self::Draw)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DuelSide {
    Challenger,
    Opponent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TeamSide {
    First,
    Second,
}

impl fmt::Display for TeamSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::First => "team 1",
            Self::Second => "team 2",
        })
    }
}

/// What one fighter rolled, dealt into the exchange and suffered.
#[derive(Clone, Debug, PartialEq)]
pub struct FighterReport {
    pub id: UserId,
    pub class: CharacterClass,
    pub rolls: CombatRolls,
    pub modifier: f64,
    pub effective_attack: f64,
    pub effective_defense: f64,
    pub damage_taken: f64,
    /// Health right after the hit, before any defeat reset.
    pub health_after: f64,
    /// Health hit zero and the character was reset.
    pub defeated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_elimination_beats_damage_margin() {
        let verdict = Verdict::decide('a', 'b', true, false, 1.0, 50.0);
        assert_eq!(verdict.winner(), Some('a'));
        assert_eq!(verdict.loser(), Some('b'));
    }

    #[test]
    fn double_elimination_is_a_draw() {
        assert!(Verdict::decide('a', 'b', false, false, 90.0, 10.0).is_draw());
    }

    #[test]
    fn margin_decides_when_both_stand() {
        assert_eq!(
            Verdict::decide('a', 'b', true, true, 4.0, 9.5).winner(),
            Some('b')
        );
        assert!(Verdict::decide('a', 'b', true, true, 3.0, 3.0).is_draw());
    }
}
