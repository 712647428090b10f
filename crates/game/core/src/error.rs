//! Error classification shared by the rule modules.
//!
//! `CombatError`, `RaidError` and `TableError` sit next to the rules they
//! guard. Each one reports an [`ErrorSeverity`] and a stable code so the
//! runtime can choose a log level and a reply without matching every variant.

/// How a rejected request should be treated by whoever issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Asking again later can work: a cooldown is running or a raid member
    /// has not readied up.
    Recoverable,

    /// The request is wrong as issued, e.g. a bet the player cannot cover.
    Validation,

    /// Stored records disagree with each other.
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Implemented by every error a rule or the orchestrator can return.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Stable identifier for the variant, suitable for logs and clients.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
