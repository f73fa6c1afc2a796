//! Error taxonomy for timer commands

use thiserror::Error;

use crate::state::Phase;

/// Errors returned by [`TimerEngine`](crate::state::TimerEngine) commands.
///
/// Every variant is local and non-fatal: the engine rejects the command and
/// leaves its state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// A setter argument outside its valid domain
    #[error("invalid {field} {value}: {reason}")]
    InvalidConfiguration {
        field: &'static str,
        value: u32,
        reason: String,
    },

    /// A command that is not allowed in the current phase
    #[error("cannot {command} while {phase}")]
    InvalidTransition {
        command: &'static str,
        phase: Phase,
    },

    #[error("workout catalog is empty")]
    EmptyCatalog,

    #[error("workout '{name}' has an unsupported number of exercises")]
    InvalidWorkout { name: String },
}

impl TimerError {
    pub(crate) fn out_of_range(field: &'static str, value: u32, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field,
            value,
            reason: reason.into(),
        }
    }

    pub(crate) fn transition(command: &'static str, phase: Phase) -> Self {
        Self::InvalidTransition { command, phase }
    }

    /// Whether this error came from a rejected configuration value
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration { .. } | Self::EmptyCatalog | Self::InvalidWorkout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = TimerError::out_of_range("set count", 7, "must be between 1 and 5");
        assert_eq!(err.to_string(), "invalid set count 7: must be between 1 and 5");
        assert!(err.is_configuration());

        let err = TimerError::transition("pause", Phase::Idle);
        assert_eq!(err.to_string(), "cannot pause while idle");
        assert!(!err.is_configuration());
    }
}
