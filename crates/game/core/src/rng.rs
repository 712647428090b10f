//! Roll sources for combat randomness.
//!
//! The engines never reach for a global RNG. They draw every roll from a
//! [`RollSource`] in a documented order, so production code can plug in a real
//! generator while tests script exact outcomes with [`FixedRolls`].

use std::sync::atomic::{AtomicUsize, Ordering};

/// Range of the attack roll added to a combatant's final attack.
pub const ATTACK_ROLL: (u32, u32) = (1, 10);

/// Range of the defense roll added to a combatant's final defense.
pub const DEFENSE_ROLL: (u32, u32) = (1, 5);

/// Range of the roll added to a boss's attack when it retaliates.
pub const BOSS_ROLL: (u32, u32) = (1, 5);

/// Uniform integer source.
///
/// Implementations must return a value in `[min, max]` (inclusive on both
/// ends). There is no seeding contract.
pub trait RollSource: Send + Sync {
    /// Roll a value in range [min, max] inclusive.
    fn roll(&self, min: u32, max: u32) -> u32;

    /// Roll a die with N sides (1-N inclusive).
    fn roll_die(&self, sides: u32) -> u32 {
        self.roll(1, sides.max(1))
    }

    /// Fair coin.
    fn coin_flip(&self) -> bool {
        self.roll(0, 1) == 1
    }
}

/// The pair of rolls a combatant uses for one exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CombatRolls {
    pub attack: u32,
    pub defense: u32,
}

impl CombatRolls {
    pub const fn new(attack: u32, defense: u32) -> Self {
        Self { attack, defense }
    }

    /// Draw the attack roll, then the defense roll.
    pub fn draw(source: &(impl RollSource + ?Sized)) -> Self {
        let attack = source.roll(ATTACK_ROLL.0, ATTACK_ROLL.1);
        let defense = source.roll(DEFENSE_ROLL.0, DEFENSE_ROLL.1);
        Self { attack, defense }
    }
}

/// Scripted roll source for deterministic tests.
///
/// Returns values from the provided sequence, cycling when exhausted, and
/// clamps each value to the requested range.
#[derive(Debug)]
pub struct FixedRolls {
    values: Vec<u32>,
    index: AtomicUsize,
}

impl FixedRolls {
    /// Create a source that replays `values` in order.
    pub fn new(values: Vec<u32>) -> Self {
        Self {
            values,
            index: AtomicUsize::new(0),
        }
    }

    /// Create a source that always returns the same value.
    pub fn constant(value: u32) -> Self {
        Self::new(vec![value])
    }

    /// Number of rolls drawn so far.
    pub fn drawn(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }
}

impl Clone for FixedRolls {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
            index: AtomicUsize::new(self.index.load(Ordering::SeqCst)),
        }
    }
}

impl RollSource for FixedRolls {
    fn roll(&self, min: u32, max: u32) -> u32 {
        if self.values.is_empty() {
            return min;
        }
        let idx = self.index.fetch_add(1, Ordering::SeqCst);
        self.values[idx % self.values.len()].clamp(min, max.max(min))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_rolls_cycle_and_clamp() {
        let rolls = FixedRolls::new(vec![1, 7, 12]);
        assert_eq!(rolls.roll(1, 10), 1);
        assert_eq!(rolls.roll(1, 5), 5); // clamped to max
        assert_eq!(rolls.roll(1, 10), 10); // clamped to max
        assert_eq!(rolls.roll(1, 10), 1); // cycles back
        assert_eq!(rolls.drawn(), 4);
    }

    #[test]
    fn combat_rolls_draw_attack_first() {
        let rolls = FixedRolls::new(vec![9, 2]);
        assert_eq!(CombatRolls::draw(&rolls), CombatRolls::new(9, 2));
    }

    #[test]
    fn empty_source_returns_minimum() {
        let rolls = FixedRolls::new(Vec::new());
        assert_eq!(rolls.roll(3, 8), 3);
    }
}
