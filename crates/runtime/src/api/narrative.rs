//! Plain-text battle reports.

use std::fmt::Write as _;

use arena_core::{
    BossFightOutcome, DuelOutcome, FighterReport, Raid, RaidPhase, TeamOutcome, TeamSide,
    TeamTally, UserId, Verdict,
};

fn fighter_line(out: &mut String, fighter: &FighterReport) {
    let _ = write!(
        out,
        "{} ({}) attacks for {:.1} (roll {}, x{:.2}) and defends with {:.1}",
        fighter.id,
        fighter.class,
        fighter.effective_attack,
        fighter.rolls.attack,
        fighter.modifier,
        fighter.effective_defense,
    );
}

fn health_line(out: &mut String, fighter: &FighterReport) {
    if fighter.defeated {
        let _ = writeln!(
            out,
            "{} takes {:.1} damage and falls. Health restored, gold lost.",
            fighter.id, fighter.damage_taken
        );
    } else {
        let _ = writeln!(
            out,
            "{} takes {:.1} damage ({:.1} health left).",
            fighter.id, fighter.damage_taken, fighter.health_after
        );
    }
}

pub fn duel(outcome: &DuelOutcome, bet: u64) -> String {
    let mut out = String::new();
    for fighter in [&outcome.challenger, &outcome.opponent] {
        fighter_line(&mut out, fighter);
        out.push('\n');
    }
    for fighter in [&outcome.challenger, &outcome.opponent] {
        health_line(&mut out, fighter);
    }

    match (outcome.winner_id(), bet) {
        (Some(winner), 0) => {
            let _ = write!(out, "{winner} wins the duel!");
        }
        (Some(winner), bet) => {
            let _ = write!(out, "{winner} wins the duel and takes {} gold!", bet * 2);
        }
        (None, 0) => out.push_str("The duel ends in a draw."),
        (None, _) => out.push_str("The duel ends in a draw. Both bets are returned."),
    }
    out
}

pub fn coinflip(winner: &UserId, loser: &UserId, bet: u64) -> String {
    format!(
        "The coin spins... {winner} wins {} gold from {loser}!",
        bet.saturating_mul(2)
    )
}

fn tally_line(out: &mut String, side: TeamSide, tally: &TeamTally) {
    let names: Vec<&str> = tally.ids().map(UserId::as_str).collect();
    let _ = writeln!(
        out,
        "{side} [{}]: attack {:.1}, defense {:.1}, deals {:.1} damage",
        names.join(", "),
        tally.total_attack,
        tally.total_defense,
        tally.damage_dealt,
    );
}

pub fn team(outcome: &TeamOutcome) -> String {
    let mut out = String::new();
    tally_line(&mut out, TeamSide::First, &outcome.first);
    tally_line(&mut out, TeamSide::Second, &outcome.second);
    for member in outcome.first.members.iter().chain(&outcome.second.members) {
        health_line(&mut out, member);
    }

    match outcome.verdict {
        Verdict::Victory { winner, .. } => {
            let _ = write!(out, "{winner} wins the battle!");
        }
        Verdict::Draw => out.push_str("The battle ends in a draw."),
    }
    out
}

pub fn raid(outcome: &BossFightOutcome, raid: &Raid) -> String {
    let mut out = String::new();
    for fighter in &outcome.fighters {
        let _ = writeln!(
            out,
            "{} ({}) strikes {} for {:.1} damage{}",
            fighter.id,
            fighter.class,
            outcome.boss,
            fighter.damage_dealt,
            if fighter.synergy > 1.0 { " with synergy" } else { "" },
        );
    }

    if outcome.boss_defeated {
        let _ = writeln!(out, "{} is defeated!", outcome.boss);
        for fighter in &outcome.fighters {
            let _ = writeln!(out, "{} receives {} gold.", fighter.id, fighter.reward);
        }
    } else {
        let _ = writeln!(
            out,
            "{} survives with {:.1} health and strikes back.",
            outcome.boss, outcome.boss_health_after
        );
        for fighter in &outcome.fighters {
            if fighter.defeated {
                let _ = writeln!(
                    out,
                    "{} takes {:.1} damage and falls. Health restored, gold lost.",
                    fighter.id, fighter.damage_taken
                );
            } else {
                let _ = writeln!(out, "{} takes {:.1} damage.", fighter.id, fighter.damage_taken);
            }
        }
    }

    if raid.phase == RaidPhase::Forming {
        out.push_str("The raid regroups. Everyone must ready up again.");
    } else {
        let _ = write!(out, "Raid {} {}.", raid.id, raid.phase.as_str());
    }
    out
}
