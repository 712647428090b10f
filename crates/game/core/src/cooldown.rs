//! Timestamp cooldown gate.

use chrono::{DateTime, Duration, Utc};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CooldownStatus {
    Ready,
    Waiting { remaining: Duration },
}

impl CooldownStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Remaining wait in whole seconds, rounded up. Zero when ready.
    pub fn remaining_secs(&self) -> u64 {
        match self {
            Self::Ready => 0,
            Self::Waiting { remaining } => {
                let millis = remaining.num_milliseconds().max(0) as u64;
                millis.div_ceil(1_000)
            }
        }
    }
}

/// Grant access when nothing was recorded or at least `cooldown` has elapsed
/// since `last`.
///
/// A `last` timestamp in the future (clock skew between writers) never makes
/// the wait longer than one full cooldown.
pub fn check_cooldown(
    last: Option<DateTime<Utc>>,
    cooldown: Duration,
    now: DateTime<Utc>,
) -> CooldownStatus {
    let Some(last) = last else {
        return CooldownStatus::Ready;
    };

    let elapsed = (now - last).max(Duration::zero());
    if elapsed >= cooldown {
        CooldownStatus::Ready
    } else {
        CooldownStatus::Waiting {
            remaining: cooldown - elapsed,
        }
    }
}
