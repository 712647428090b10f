//! Duels, coinflips and the confirmation handshake in front of them.

use arena_core::{CharacterState, Combatant, DuelSide, InvalidReason, UserId, resolve_duel};

use super::ensure_funds;
use crate::api::{ArenaError, CoinflipReport, DuelReport, Result, narrative};
use crate::arena::Arena;
use crate::handshake::Confirmation;
use crate::repository::{Changeset, Stored};

fn ensure_distinct(first: &UserId, second: &UserId) -> Result<()> {
    if first == second {
        return Err(ArenaError::InvalidCombatant {
            id: first.clone(),
            reason: InvalidReason::Duplicate,
        });
    }
    Ok(())
}

impl Arena {
    /// Ask `counterparty` in `channel` and wait for a yes.
    pub(super) async fn confirm(&self, channel: &str, counterparty: &UserId) -> Result<()> {
        let pending = self.broker().request(channel, counterparty)?;
        match pending.wait().await {
            Confirmation::Accepted => Ok(()),
            Confirmation::Declined => {
                tracing::info!(channel, %counterparty, "challenge declined");
                Err(ArenaError::Declined {
                    by: counterparty.clone(),
                })
            }
            Confirmation::TimedOut => {
                tracing::info!(channel, %counterparty, "challenge timed out");
                Err(ArenaError::ConfirmationTimedOut {
                    counterparty: counterparty.clone(),
                })
            }
        }
    }

    /// Answer the challenge waiting on `responder` in `channel`.
    ///
    /// Returns false when nothing was waiting.
    pub fn respond(&self, channel: &str, responder: &UserId, accept: bool) -> bool {
        self.broker().respond(channel, responder, accept)
    }

    fn combatant(&self, character: CharacterState) -> Result<Combatant> {
        let faction = self.faction_of(&character)?;
        let upgrades = faction.as_ref().map(|f| &f.record.upgrades);
        Ok(Combatant::new(character, upgrades, &self.oracle().resolver())?)
    }

    /// Load both duelists and check they can fight and cover the bet.
    fn duelists(
        &self,
        challenger: &UserId,
        opponent: &UserId,
        bet: u64,
    ) -> Result<(Stored<CharacterState>, Stored<CharacterState>)> {
        ensure_distinct(challenger, opponent)?;
        let first = self.ensure_character(challenger)?;
        let second = self.ensure_character(opponent)?;

        self.combatant(first.record.clone())?;
        self.combatant(second.record.clone())?;
        ensure_funds(&first.record, bet)?;
        ensure_funds(&second.record, bet)?;
        Ok((first, second))
    }

    /// Resolve an accepted duel.
    ///
    /// Both stakes are escrowed before the exchange; the winner collects
    /// `2 × bet` and a draw refunds both. Escrow, health changes and payout
    /// are committed together.
    pub fn duel(&self, challenger: &UserId, opponent: &UserId, bet: u64) -> Result<DuelReport> {
        self.guarded("duel", || {
            let (mut first, mut second) = self.duelists(challenger, opponent, bet)?;
            first.record.gold -= bet;
            second.record.gold -= bet;

            let mut a = self.combatant(first.record.clone())?;
            let mut b = self.combatant(second.record.clone())?;
            let outcome = resolve_duel(&mut a, &mut b, self.oracle().classes(), self.rolls())?;
            first.record = a.into_character();
            second.record = b.into_character();

            let pot = bet.saturating_mul(2);
            match outcome.verdict.winner() {
                Some(DuelSide::Challenger) => first.record.credit(pot),
                Some(DuelSide::Opponent) => second.record.credit(pot),
                None => {
                    first.record.credit(bet);
                    second.record.credit(bet);
                }
            }

            let mut changeset = Changeset::new();
            changeset.update(&first)?.update(&second)?;
            self.store().commit(changeset)?;

            let winner = outcome.winner_id().cloned();
            let loser = outcome.loser_id().cloned();
            tracing::info!(
                %challenger,
                %opponent,
                bet,
                winner = winner.as_ref().map_or("draw", UserId::as_str),
                "duel resolved"
            );
            Ok(DuelReport {
                narrative: narrative::duel(&outcome, bet),
                winner,
                loser,
                bet,
                outcome,
            })
        })
    }

    /// Challenge `opponent` in `channel`; the duel runs once they accept.
    pub async fn challenge_duel(
        &self,
        channel: &str,
        challenger: &UserId,
        opponent: &UserId,
        bet: u64,
    ) -> Result<DuelReport> {
        self.guarded("challenge_duel", || self.duelists(challenger, opponent, bet).map(|_| ()))?;
        self.confirm(channel, opponent).await?;
        self.duel(challenger, opponent, bet)
    }

    fn flippers(
        &self,
        challenger: &UserId,
        opponent: &UserId,
        bet: u64,
    ) -> Result<(Stored<CharacterState>, Stored<CharacterState>)> {
        if bet == 0 {
            return Err(ArenaError::InvalidAmount);
        }
        ensure_distinct(challenger, opponent)?;
        let first = self.ensure_character(challenger)?;
        let second = self.ensure_character(opponent)?;
        ensure_funds(&first.record, bet)?;
        ensure_funds(&second.record, bet)?;
        Ok((first, second))
    }

    /// Settle an accepted coinflip. The winner takes both stakes.
    pub fn coinflip(
        &self,
        challenger: &UserId,
        opponent: &UserId,
        bet: u64,
    ) -> Result<CoinflipReport> {
        self.guarded("coinflip", || {
            let (mut first, mut second) = self.flippers(challenger, opponent, bet)?;

            let (winner, loser) = if self.rolls().coin_flip() {
                (&mut first, &mut second)
            } else {
                (&mut second, &mut first)
            };
            loser.record.gold -= bet;
            winner.record.credit(bet);
            let (winner, loser) = (winner.record.id.clone(), loser.record.id.clone());

            let mut changeset = Changeset::new();
            changeset.update(&first)?.update(&second)?;
            self.store().commit(changeset)?;

            tracing::info!(%winner, %loser, bet, "coinflip settled");
            Ok(CoinflipReport {
                narrative: narrative::coinflip(&winner, &loser, bet),
                winner,
                loser,
                bet,
            })
        })
    }

    pub async fn challenge_coinflip(
        &self,
        channel: &str,
        challenger: &UserId,
        opponent: &UserId,
        bet: u64,
    ) -> Result<CoinflipReport> {
        self.guarded("challenge_coinflip", || {
            self.flippers(challenger, opponent, bet).map(|_| ())
        })?;
        self.confirm(channel, opponent).await?;
        self.coinflip(challenger, opponent, bet)
    }
}
