//! Line parsing.
//!
//! Every input line is `<user> <command> [args...]`. Only `help`,
//! `leaderboard` and `quit` stand alone.

use arena_core::UserId;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Line {
    Help,
    Quit,
    Leaderboard,
    Issue { user: UserId, command: Command },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Profile,
    Class(String),
    Hourly,
    Heal,
    Buy { item: String, amount: u32 },

    Duel { opponent: UserId, bet: u64 },
    Coinflip { opponent: UserId, bet: u64 },
    Accept,
    Decline,
    Team { allies: Vec<UserId>, rivals: Vec<UserId> },

    Raid(RaidCommand),
    Faction(FactionCommand),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RaidCommand {
    Create(String),
    Invite(UserId),
    Join,
    Ready,
    Begin,
    Cancel,
    Flee,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FactionCommand {
    Create(String),
    Invite(UserId),
    Leave,
    Disband,
    Info(Option<String>),
    Deposit(u64),
    Upgrade(String),
    Income,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected `<user> <command>`")]
    MissingCommand,

    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    #[error("`{command}` needs {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },

    #[error("`{0}` is not a valid number")]
    InvalidNumber(String),
}

type Result<T> = std::result::Result<T, ParseError>;

fn required<'a>(
    args: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
    what: &'static str,
) -> Result<&'a str> {
    args.next()
        .ok_or(ParseError::MissingArgument { command, what })
}

fn number<T: std::str::FromStr>(raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| ParseError::InvalidNumber(raw.to_owned()))
}

fn roster(raw: &str) -> Vec<UserId> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(UserId::from)
        .collect()
}

/// Everything left on the line, for names with spaces.
fn rest<'a>(args: impl Iterator<Item = &'a str>) -> Option<String> {
    let joined = args.collect::<Vec<_>>().join(" ");
    (!joined.is_empty()).then_some(joined)
}

pub fn parse(line: &str) -> Result<Line> {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return Err(ParseError::MissingCommand);
    };

    match first.to_ascii_lowercase().as_str() {
        "help" => return Ok(Line::Help),
        "quit" | "exit" => return Ok(Line::Quit),
        "leaderboard" => return Ok(Line::Leaderboard),
        _ => {}
    }

    let user = UserId::from(first);
    let verb = words.next().ok_or(ParseError::MissingCommand)?;
    let args = &mut words;

    let command = match verb.to_ascii_lowercase().as_str() {
        "profile" | "stats" => Command::Profile,
        "class" => Command::Class(required(args, "class", "a class name")?.to_owned()),
        "hourly" => Command::Hourly,
        "heal" => Command::Heal,
        "buy" => {
            let item = required(args, "buy", "an item")?.to_owned();
            let amount = args.next().map(number).transpose()?.unwrap_or(1);
            Command::Buy { item, amount }
        }
        "duel" => {
            let opponent = UserId::from(required(args, "duel", "an opponent")?);
            let bet = args.next().map(number).transpose()?.unwrap_or(0);
            Command::Duel { opponent, bet }
        }
        "coinflip" => {
            let opponent = UserId::from(required(args, "coinflip", "an opponent")?);
            let bet = number(required(args, "coinflip", "a bet")?)?;
            Command::Coinflip { opponent, bet }
        }
        "accept" | "yes" => Command::Accept,
        "decline" | "no" => Command::Decline,
        "team" => {
            // the issuing user leads the first team
            let mut allies = vec![user.clone()];
            allies.extend(roster(required(args, "team", "allies or `vs`")?));
            if allies.last().is_some_and(|id| id.as_str().eq_ignore_ascii_case("vs")) {
                allies.pop();
            } else {
                let vs = required(args, "team", "`vs`")?;
                if !vs.eq_ignore_ascii_case("vs") {
                    return Err(ParseError::MissingArgument {
                        command: "team",
                        what: "`vs`",
                    });
                }
            }
            let rivals = roster(required(args, "team", "rivals")?);
            Command::Team { allies, rivals }
        }
        "raid" => Command::Raid(parse_raid(args)?),
        "faction" => Command::Faction(parse_faction(args)?),
        other => return Err(ParseError::UnknownCommand(other.to_owned())),
    };

    Ok(Line::Issue { user, command })
}

fn parse_raid<'a>(args: &mut impl Iterator<Item = &'a str>) -> Result<RaidCommand> {
    let verb = required(args, "raid", "a subcommand")?;
    Ok(match verb.to_ascii_lowercase().as_str() {
        "create" => RaidCommand::Create(rest(args).ok_or(ParseError::MissingArgument {
            command: "raid create",
            what: "a boss",
        })?),
        "invite" => RaidCommand::Invite(required(args, "raid invite", "a user")?.into()),
        "join" => RaidCommand::Join,
        "ready" => RaidCommand::Ready,
        "begin" | "start" => RaidCommand::Begin,
        "cancel" => RaidCommand::Cancel,
        "flee" => RaidCommand::Flee,
        "info" => RaidCommand::Info,
        other => return Err(ParseError::UnknownCommand(format!("raid {other}"))),
    })
}

fn parse_faction<'a>(args: &mut impl Iterator<Item = &'a str>) -> Result<FactionCommand> {
    let verb = required(args, "faction", "a subcommand")?;
    Ok(match verb.to_ascii_lowercase().as_str() {
        "create" => FactionCommand::Create(rest(args).ok_or(ParseError::MissingArgument {
            command: "faction create",
            what: "a name",
        })?),
        "invite" => FactionCommand::Invite(required(args, "faction invite", "a user")?.into()),
        "leave" => FactionCommand::Leave,
        "disband" => FactionCommand::Disband,
        "info" => FactionCommand::Info(rest(args)),
        "deposit" => FactionCommand::Deposit(number(required(
            args,
            "faction deposit",
            "an amount",
        )?)?),
        "upgrade" => {
            FactionCommand::Upgrade(required(args, "faction upgrade", "an upgrade")?.to_owned())
        }
        "income" => FactionCommand::Income,
        other => return Err(ParseError::UnknownCommand(format!("faction {other}"))),
    })
}

pub const HELP: &str = "\
Lines are `<user> <command> [args]`.

  profile                      character sheet and stats
  class <name>                 pick a class (once)
  hourly | heal                timed rewards
  buy <item> [amount]          power, health, multiplier
  duel <user> [bet]            challenge; the opponent answers with accept/decline
  coinflip <user> <bet>        challenge to a coinflip
  accept | decline             answer a challenge
  team [a,b] vs <c,d>          team battle, you lead the first team
  raid create <boss> | invite <user> | join | ready | begin | cancel | flee | info
  faction create <name> | invite <user> | leave | disband | info [name]
  faction deposit <gold> | upgrade <power|hourly|attack|defense> | income

  leaderboard                  faction rankings
  help | quit";
