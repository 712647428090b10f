//! Plain-text rendering of operation results.
use std::fmt::Write as _;

use arena_core::{Faction, Raid};
use arena_runtime::{FactionIncome, HealReport, HourlyClaim, LeaderboardEntry, Profile, Purchase};

pub fn profile(profile: &Profile) -> String {
    let c = &profile.character;
    let mut out = String::new();
    let class = c.class.map_or_else(|| "no class".to_owned(), |class| class.to_string());
    let _ = writeln!(out, "{} the {}", c.id, class);
    let _ = writeln!(out, "  health  {:.1}/{}", c.health, c.max_health);
    let _ = writeln!(out, "  gold    {}", c.gold);
    let _ = writeln!(out, "  power   {}", c.power);
    let _ = writeln!(out, "  raids   {} won", c.raid_wins);
    let _ = write!(out, "  faction {}", c.faction.as_deref().unwrap_or("-"));
    if let Some(stats) = &profile.stats {
        let _ = write!(
            out,
            "\n  attack {} / defense {} / hourly x{:.2}",
            stats.final_attack, stats.final_defense, stats.final_hourly_multiplier
        );
    }
    out
}

pub fn hourly(claim: &HourlyClaim) -> String {
    format!(
        "Rolled {} x{:.2}: +{} gold ({} total).",
        claim.roll, claim.multiplier, claim.amount, claim.balance
    )
}

pub fn heal(report: &HealReport) -> String {
    format!(
        "Restored {:.1} health ({:.1}/{}).",
        report.restored, report.health, report.max_health
    )
}

pub fn purchase(purchase: &Purchase) -> String {
    format!(
        "Bought {} x{} for {} gold ({} left).",
        purchase.item, purchase.amount, purchase.cost, purchase.character.gold
    )
}

pub fn faction(faction: &Faction) -> String {
    let members: Vec<&str> = faction.members.iter().map(|m| m.as_str()).collect();
    let u = &faction.upgrades;
    let mut out = format!("{} (led by {})", faction.name, faction.leader);
    let _ = write!(out, "\n  members   {}", members.join(", "));
    let _ = write!(out, "\n  resources {}", faction.resources);
    let _ = write!(
        out,
        "\n  upgrades  power +{}, hourly +{:.0}%, attack +{}, defense +{}",
        u.power_bonus,
        u.hourly_bonus * 100.0,
        u.attack_bonus,
        u.defense_bonus,
    );
    out
}

pub fn income(name: &str, income: &FactionIncome) -> String {
    format!(
        "{name} earned {} resources ({} in the pool).",
        income.gained, income.resources
    )
}

pub fn raid(raid: &Raid) -> String {
    let mut out = format!(
        "Raid {} on {} ({}), attempts {}",
        raid.id,
        raid.boss,
        raid.phase.as_str(),
        raid.attempts
    );
    for p in &raid.participants {
        let mark = if p.ready { "ready" } else { "waiting" };
        let _ = write!(out, "\n  {} [{}]", p.user, mark);
    }
    if !raid.invited.is_empty() {
        let invited: Vec<&str> = raid.invited.iter().map(|u| u.as_str()).collect();
        let _ = write!(out, "\n  invited: {}", invited.join(", "));
    }
    out
}

pub fn leaderboard(entries: &[LeaderboardEntry]) -> String {
    if entries.is_empty() {
        return "No factions yet.".to_owned();
    }
    entries
        .iter()
        .map(|e| {
            format!(
                "{:>2}. {} - {:.0} ({} members)",
                e.rank, e.name, e.score, e.members
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
