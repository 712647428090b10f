//! Team battle resolution.

use super::result::{FighterReport, TeamSide, Verdict};
use super::{Combatant, CombatError, InvalidReason, attack_modifier, damage_through, ensure_distinct};
use crate::class::ClassTable;
use crate::rng::{CombatRolls, RollSource};
use crate::state::UserId;

/// Largest team either side may field.
pub const MAX_TEAM_SIZE: usize = 4;

/// Aggregates for one side of a team battle.
#[derive(Clone, Debug, PartialEq)]
pub struct TeamTally {
    pub members: Vec<FighterReport>,
    pub total_attack: f64,
    pub total_defense: f64,
    /// Damage this team pushed through the opposing total defense.
    pub damage_dealt: f64,
    /// Share of the incoming damage each member took.
    pub damage_per_member: f64,
}

impl TeamTally {
    pub fn has_survivors(&self) -> bool {
        self.members.iter().any(|m| !m.defeated)
    }

    pub fn ids(&self) -> impl Iterator<Item = &UserId> {
        self.members.iter().map(|m| &m.id)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TeamOutcome {
    pub first: TeamTally,
    pub second: TeamTally,
    pub verdict: Verdict<TeamSide>,
}

impl TeamOutcome {
    pub fn tally(&self, side: TeamSide) -> &TeamTally {
        match side {
            TeamSide::First => &self.first,
            TeamSide::Second => &self.second,
        }
    }

    pub fn winners(&self) -> Option<&TeamTally> {
        self.verdict.winner().map(|side| self.tally(side))
    }

    pub fn losers(&self) -> Option<&TeamTally> {
        self.verdict.loser().map(|side| self.tally(side))
    }
}

/// Rolls and matchup multipliers for one member, before damage is known.
struct Strike {
    rolls: CombatRolls,
    modifier: f64,
    attack: f64,
    defense: f64,
}

fn validate(side: TeamSide, team: &[Combatant]) -> Result<(), CombatError> {
    if team.is_empty() || team.len() > MAX_TEAM_SIZE {
        return Err(CombatError::TeamSize {
            side,
            len: team.len(),
        });
    }
    if let Some(fallen) = team.iter().find(|c| !c.character.is_alive()) {
        return Err(CombatError::InvalidCombatant {
            id: fallen.id().clone(),
            reason: InvalidReason::Defeated,
        });
    }
    Ok(())
}

fn strikes(
    team: &[Combatant],
    opponents: &[Combatant],
    classes: &ClassTable,
    rolls: &(impl RollSource + ?Sized),
) -> Vec<Strike> {
    team.iter()
        .map(|member| {
            let drawn = CombatRolls::draw(rolls);
            let modifier =
                attack_modifier(member.class, opponents.iter().map(|o| o.class), classes);
            Strike {
                rolls: drawn,
                modifier,
                attack: member.effective_attack(drawn, modifier),
                defense: member.effective_defense(drawn),
            }
        })
        .collect()
}

fn settle(team: &mut [Combatant], strikes: Vec<Strike>, dealt: f64, incoming: f64) -> TeamTally {
    let total_attack: f64 = strikes.iter().map(|s| s.attack).sum();
    let total_defense: f64 = strikes.iter().map(|s| s.defense).sum();
    let share = incoming / team.len() as f64;

    let members = team
        .iter_mut()
        .zip(strikes)
        .map(|(member, strike)| {
            member.take_hit(strike.rolls, strike.modifier, strike.attack, strike.defense, share)
        })
        .collect();

    TeamTally {
        members,
        total_attack,
        total_defense,
        damage_dealt: dealt,
        damage_per_member: share,
    }
}

/// Resolve one exchange between two teams.
///
/// Every member's matchup multiplier is taken against each opposing member
/// in turn. Team totals are summed, the damage that gets through is split
/// evenly across the receiving team, and members dropping to zero are reset.
///
/// # Roll order
///
/// Attack then defense for each member of `first` in order, then the same
/// for `second`.
///
/// # Errors
///
/// - [`CombatError::TeamSize`] when a side is empty or larger than
///   [`MAX_TEAM_SIZE`]
/// - [`CombatError::InvalidCombatant`] when a character appears twice or a
///   member has no health left
///
/// No member is mutated on error.
pub fn resolve_team_battle(
    first: &mut [Combatant],
    second: &mut [Combatant],
    classes: &ClassTable,
    rolls: &(impl RollSource + ?Sized),
) -> Result<TeamOutcome, CombatError> {
    validate(TeamSide::First, first)?;
    validate(TeamSide::Second, second)?;
    ensure_distinct(first.iter().chain(second.iter()).map(Combatant::id))?;

    let first_strikes = strikes(first, second, classes, rolls);
    let second_strikes = strikes(second, first, classes, rolls);

    let first_attack: f64 = first_strikes.iter().map(|s| s.attack).sum();
    let first_defense: f64 = first_strikes.iter().map(|s| s.defense).sum();
    let second_attack: f64 = second_strikes.iter().map(|s| s.attack).sum();
    let second_defense: f64 = second_strikes.iter().map(|s| s.defense).sum();

    let first_dealt = damage_through(first_attack, second_defense);
    let second_dealt = damage_through(second_attack, first_defense);

    let first_tally = settle(first, first_strikes, first_dealt, second_dealt);
    let second_tally = settle(second, second_strikes, second_dealt, first_dealt);

    let verdict = Verdict::decide(
        TeamSide::First,
        TeamSide::Second,
        first_tally.has_survivors(),
        second_tally.has_survivors(),
        first_dealt,
        second_dealt,
    );

    Ok(TeamOutcome {
        first: first_tally,
        second: second_tally,
        verdict,
    })
}
