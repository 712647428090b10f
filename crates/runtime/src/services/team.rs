//! Team battles.

use arena_core::{CharacterState, Combatant, MAX_TEAM_SIZE, TeamSide, UserId, resolve_team_battle};

use crate::api::{ArenaError, Result, TeamReport, narrative};
use crate::arena::Arena;
use crate::repository::{Changeset, Stored};

fn check_size(side: TeamSide, team: &[UserId]) -> Result<()> {
    if team.is_empty() || team.len() > MAX_TEAM_SIZE {
        return Err(ArenaError::TeamSize {
            side,
            len: team.len(),
            max: MAX_TEAM_SIZE,
        });
    }
    Ok(())
}

impl Arena {
    fn roster(&self, team: &[UserId]) -> Result<(Vec<Stored<CharacterState>>, Vec<Combatant>)> {
        let mut stored = Vec::with_capacity(team.len());
        let mut combatants = Vec::with_capacity(team.len());
        for id in team {
            let character = self.ensure_character(id)?;
            let faction = self.faction_of(&character.record)?;
            combatants.push(Combatant::new(
                character.record.clone(),
                faction.as_ref().map(|f| &f.record.upgrades),
                &self.oracle().resolver(),
            )?);
            stored.push(character);
        }
        Ok((stored, combatants))
    }

    /// Resolve one exchange between two teams of one to four members.
    pub fn team_battle(&self, first: &[UserId], second: &[UserId]) -> Result<TeamReport> {
        self.guarded("team_battle", || {
            check_size(TeamSide::First, first)?;
            check_size(TeamSide::Second, second)?;

            let (mut first_stored, mut first_team) = self.roster(first)?;
            let (mut second_stored, mut second_team) = self.roster(second)?;

            let outcome = resolve_team_battle(
                &mut first_team,
                &mut second_team,
                self.oracle().classes(),
                self.rolls(),
            )?;

            let mut changeset = Changeset::new();
            let updated = first_stored
                .iter_mut()
                .zip(first_team)
                .chain(second_stored.iter_mut().zip(second_team));
            for (stored, combatant) in updated {
                stored.record = combatant.into_character();
                changeset.update(stored)?;
            }
            self.store().commit(changeset)?;

            let winners: Option<Vec<UserId>> =
                outcome.winners().map(|tally| tally.ids().cloned().collect());
            let losers: Option<Vec<UserId>> =
                outcome.losers().map(|tally| tally.ids().cloned().collect());
            tracing::info!(
                first = first.len(),
                second = second.len(),
                draw = outcome.verdict.is_draw(),
                "team battle resolved"
            );
            Ok(TeamReport {
                narrative: narrative::team(&outcome),
                winners,
                losers,
                outcome,
            })
        })
    }
}
