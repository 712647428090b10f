//! Glue between stdin, the arena and stdout.
use std::sync::Arc;

use anyhow::{Context, Result};
use arena_core::UserId;
use arena_runtime::{Arena, ContentOracle, FileRecordStore};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::command::{self, Command, FactionCommand, Line, RaidCommand};
use crate::config::CliConfig;
use crate::presentation;

pub struct CliApp {
    config: CliConfig,
    arena: Arena,
}

pub struct CliAppBuilder {
    config: CliConfig,
}

impl CliAppBuilder {
    pub fn new(config: CliConfig) -> Self {
        Self { config }
    }

    pub fn build(self) -> Result<CliApp> {
        let config = self.config;
        let oracle = match &config.content_dir {
            Some(dir) if config.classes_path.is_none() && config.bosses_path.is_none() => {
                ContentOracle::from_dir(dir)
            }
            _ => ContentOracle::load(
                config.classes_path.as_deref(),
                config.bosses_path.as_deref(),
            ),
        }
        .context("failed to load game content")?;

        let mut builder = Arena::builder().oracle(oracle).config(config.arena.clone());
        match &config.data_dir {
            Some(dir) => {
                let store = FileRecordStore::new(dir)
                    .with_context(|| format!("cannot open data directory {}", dir.display()))?;
                tracing::info!(dir = %dir.display(), "using file store");
                builder = builder.store(Arc::new(store));
            }
            None => tracing::info!("using in-memory store; nothing is kept after exit"),
        }

        Ok(CliApp {
            arena: builder.build(),
            config,
        })
    }
}

/// Print a result, or the user-facing text of its error.
fn show<T>(result: arena_runtime::Result<T>, render: impl FnOnce(T) -> String) {
    match result {
        Ok(value) => println!("{}", render(value)),
        Err(err) => println!("! {}", err.user_message()),
    }
}

impl CliApp {
    pub fn builder(config: CliConfig) -> CliAppBuilder {
        CliAppBuilder::new(config)
    }

    /// Read commands until `quit` or end of input.
    pub async fn run(self) -> Result<()> {
        tracing::info!(channel = %self.config.channel, "arena ready");
        println!("Arena ready. Type `help` for commands.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            match command::parse(&line) {
                Ok(Line::Help) => println!("{}", command::HELP),
                Ok(Line::Quit) => break,
                Ok(Line::Leaderboard) => {
                    show(self.arena.faction_leaderboard(), |entries| {
                        presentation::leaderboard(&entries)
                    });
                }
                Ok(Line::Issue { user, command }) => self.dispatch(user, command),
                Err(err) => println!("! {err}"),
            }
        }

        tracing::info!("arena closed");
        Ok(())
    }

    fn dispatch(&self, user: UserId, command: Command) {
        let arena = &self.arena;
        match command {
            Command::Profile => show(arena.profile(&user), |p| presentation::profile(&p)),
            Command::Class(name) => show(arena.select_class(&user, &name), |p| {
                presentation::profile(&p)
            }),
            Command::Hourly => show(arena.claim_hourly(&user), |c| presentation::hourly(&c)),
            Command::Heal => show(arena.heal(&user), |r| presentation::heal(&r)),
            Command::Buy { item, amount } => show(arena.buy(&user, &item, amount), |p| {
                presentation::purchase(&p)
            }),

            Command::Duel { opponent, bet } => {
                println!("{opponent}: {user} calls you out for {bet} gold (accept/decline)");
                let (arena, channel) = (arena.clone(), self.config.channel.clone());
                tokio::spawn(async move {
                    let result = arena.challenge_duel(&channel, &user, &opponent, bet).await;
                    show(result, |report| report.narrative);
                });
            }
            Command::Coinflip { opponent, bet } => {
                println!("{opponent}: {user} wants to flip a coin for {bet} gold (accept/decline)");
                let (arena, channel) = (arena.clone(), self.config.channel.clone());
                tokio::spawn(async move {
                    let result = arena
                        .challenge_coinflip(&channel, &user, &opponent, bet)
                        .await;
                    show(result, |report| report.narrative);
                });
            }
            Command::Accept => self.answer(&user, true),
            Command::Decline => self.answer(&user, false),
            Command::Team { allies, rivals } => show(arena.team_battle(&allies, &rivals), |r| {
                r.narrative
            }),

            Command::Raid(raid) => self.raid(user, raid),
            Command::Faction(faction) => self.faction(user, faction),
        }
    }

    fn answer(&self, user: &UserId, accept: bool) {
        if !self.arena.respond(&self.config.channel, user, accept) {
            println!("! Nothing is waiting on {user}.");
        }
    }

    fn raid(&self, user: UserId, command: RaidCommand) {
        let arena = &self.arena;
        match command {
            RaidCommand::Create(boss) => show(arena.create_raid(&user, &boss), |raid| {
                presentation::raid(&raid)
            }),
            RaidCommand::Invite(target) => show(arena.invite_to_raid(&user, &target), |inv| {
                format!(
                    "{}: {} invites you to raid {} (`raid join`).",
                    inv.invitee, inv.invited_by, inv.raid
                )
            }),
            RaidCommand::Join => show(arena.join_raid(&user), |raid| presentation::raid(&raid)),
            RaidCommand::Ready => show(arena.ready(&user), |status| {
                if status.all_ready {
                    format!("Everyone in raid {} is ready.", status.raid)
                } else {
                    format!("{user} is ready.")
                }
            }),
            RaidCommand::Begin => show(arena.begin_raid(&user), |report| report.narrative),
            RaidCommand::Cancel => show(arena.cancel_raid(&user), |raid| {
                format!("Raid {} cancelled.", raid.id)
            }),
            RaidCommand::Flee => show(arena.flee_raid(&user), |raid| {
                format!("{user} fled. Raid {} is over.", raid.id)
            }),
            RaidCommand::Info => show(arena.raid_info(&user), |raid| presentation::raid(&raid)),
        }
    }

    fn faction(&self, user: UserId, command: FactionCommand) {
        let arena = &self.arena;
        match command {
            FactionCommand::Create(name) => show(arena.create_faction(&user, &name), |f| {
                presentation::faction(&f)
            }),
            FactionCommand::Invite(target) => {
                println!("{target}: {user} invites you to their faction (accept/decline).");
                let (arena, channel) = (arena.clone(), self.config.channel.clone());
                tokio::spawn(async move {
                    let result = arena.invite_to_faction(&channel, &user, &target).await;
                    show(result, |f| format!("{target} joined {}.", f.name));
                });
            }
            FactionCommand::Leave => show(arena.leave_faction(&user), |f| {
                format!("{user} left {}.", f.name)
            }),
            FactionCommand::Disband => show(arena.disband_faction(&user), |f| {
                format!("{} has been disbanded.", f.name)
            }),
            FactionCommand::Info(Some(name)) => {
                show(arena.faction_info(&name), |f| presentation::faction(&f))
            }
            FactionCommand::Info(None) => {
                let own = arena.profile(&user).and_then(|p| match p.character.faction {
                    Some(name) => arena.faction_info(&name),
                    None => Err(arena_runtime::ArenaError::NotInFaction { user: user.clone() }),
                });
                show(own, |f| presentation::faction(&f));
            }
            FactionCommand::Deposit(amount) => show(arena.deposit(&user, amount), |f| {
                format!("Deposited {amount}. {} now holds {}.", f.name, f.resources)
            }),
            FactionCommand::Upgrade(kind) => show(arena.purchase_upgrade(&user, &kind), |f| {
                presentation::faction(&f)
            }),
            FactionCommand::Income => {
                let name = arena
                    .profile(&user)
                    .ok()
                    .and_then(|p| p.character.faction)
                    .unwrap_or_default();
                show(arena.collect_faction_income(&user), |income| {
                    presentation::income(&name, &income)
                });
            }
        }
    }
}
