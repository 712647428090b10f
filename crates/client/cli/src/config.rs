//! Terminal driver configuration.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use arena_runtime::ArenaConfig;

/// Everything needed to assemble an [`Arena`](arena_runtime::Arena) for the terminal.
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    /// Directory for the file-backed store. In-memory when unset.
    pub data_dir: Option<PathBuf>,
    /// Directory holding both content files. Individual paths win over it.
    pub content_dir: Option<PathBuf>,
    pub classes_path: Option<PathBuf>,
    pub bosses_path: Option<PathBuf>,
    /// Channel name every command is issued in.
    pub channel: String,
    pub arena: ArenaConfig,
}

impl CliConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `ARENA_DATA_DIR` - Directory for persisted records (default: in-memory)
    /// - `ARENA_CONTENT_DIR` - Directory with `classes.ron` and `bosses.toml`
    /// - `ARENA_CLASSES` - RON file overriding the class table
    /// - `ARENA_BOSSES` - TOML file overriding the boss table
    /// - `ARENA_CHANNEL` - Channel name for challenges (default: `terminal`)
    /// - `ARENA_CONFIRM_TIMEOUT_SECS` - Seconds to wait for an answer (default: 30)
    /// - `ARENA_CONFLICT_RETRIES` - Retries after a version conflict (default: 3)
    /// - `ARENA_LEADERBOARD_SIZE` - Factions shown on the leaderboard (default: 10)
    pub fn from_env() -> Self {
        let mut config = Self {
            channel: "terminal".to_owned(),
            ..Self::default()
        };

        config.data_dir = env::var_os("ARENA_DATA_DIR").map(PathBuf::from);
        config.content_dir = env::var_os("ARENA_CONTENT_DIR").map(PathBuf::from);
        config.classes_path = env::var_os("ARENA_CLASSES").map(PathBuf::from);
        config.bosses_path = env::var_os("ARENA_BOSSES").map(PathBuf::from);

        if let Ok(channel) = env::var("ARENA_CHANNEL")
            && !channel.trim().is_empty()
        {
            config.channel = channel.trim().to_owned();
        }

        if let Some(secs) = read_env::<u64>("ARENA_CONFIRM_TIMEOUT_SECS") {
            config.arena.confirm_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(retries) = read_env::<u32>("ARENA_CONFLICT_RETRIES") {
            config.arena.conflict_retries = retries;
        }
        if let Some(size) = read_env::<usize>("ARENA_LEADERBOARD_SIZE") {
            config.arena.leaderboard_size = size.max(1);
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
