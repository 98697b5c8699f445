//! Gate actuator state machine.
//!
//! The gate moves along a fixed cycle: `Closed -> Opening -> Open ->
//! Closing -> Closed`. Commands are accepted only in the terminal states;
//! a command issued while a transition is in flight is ignored rather than
//! queued. The transition itself completes on a timer owned by the service
//! layer.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// How long an accepted command takes to settle.
pub const TRANSIT_DURATION: Duration = Duration::from_secs(3);

/// Operator command for the main gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GateCommand {
    Open,
    Close,
}

impl GateCommand {
    /// Feed entry appended the moment the command is accepted.
    pub fn dispatch_message(&self) -> &'static str {
        match self {
            Self::Open => "command sent: open main gate",
            Self::Close => "command sent: close main gate",
        }
    }
}

/// Actuator state of the main gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, Default)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GateState {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

impl GateState {
    /// Whether a transition is currently in flight.
    pub fn is_transitional(&self) -> bool {
        matches!(self, Self::Opening | Self::Closing)
    }

    /// The transitional state entered when `command` is accepted in the
    /// current state, or `None` when the command is ignored.
    pub fn begin(self, command: GateCommand) -> Option<GateState> {
        match (self, command) {
            (Self::Closed, GateCommand::Open) => Some(Self::Opening),
            (Self::Open, GateCommand::Close) => Some(Self::Closing),
            _ => None,
        }
    }

    /// The terminal state reached when an in-flight transition completes.
    ///
    /// Terminal states settle to themselves.
    pub fn settle(self) -> GateState {
        match self {
            Self::Opening => Self::Open,
            Self::Closing => Self::Closed,
            other => other,
        }
    }

    /// Feed entry appended when an in-flight transition settles.
    pub fn settle_message(&self) -> Option<&'static str> {
        match self {
            Self::Opening => Some("main gate opened successfully"),
            Self::Closing => Some("main gate closed and locked"),
            _ => None,
        }
    }

    /// Short status label for the console.
    pub fn status_label(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Opening => "opening...",
            Self::Open => "open",
            Self::Closing => "closing...",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_accepted_only_when_closed() {
        assert_eq!(GateState::Closed.begin(GateCommand::Open), Some(GateState::Opening));
        assert_eq!(GateState::Opening.begin(GateCommand::Open), None);
        assert_eq!(GateState::Open.begin(GateCommand::Open), None);
        assert_eq!(GateState::Closing.begin(GateCommand::Open), None);
    }

    #[test]
    fn test_close_accepted_only_when_open() {
        assert_eq!(GateState::Open.begin(GateCommand::Close), Some(GateState::Closing));
        assert_eq!(GateState::Closed.begin(GateCommand::Close), None);
        assert_eq!(GateState::Opening.begin(GateCommand::Close), None);
        assert_eq!(GateState::Closing.begin(GateCommand::Close), None);
    }

    #[test]
    fn test_settle_reaches_terminal_states() {
        assert_eq!(GateState::Opening.settle(), GateState::Open);
        assert_eq!(GateState::Closing.settle(), GateState::Closed);
        assert_eq!(GateState::Open.settle(), GateState::Open);
        assert_eq!(GateState::Closed.settle(), GateState::Closed);
    }

    #[test]
    fn test_full_cycle_visits_only_defined_states() {
        let mut state = GateState::Closed;

        state = state.begin(GateCommand::Open).expect("open accepted");
        assert_eq!(state, GateState::Opening);
        state = state.settle();
        assert_eq!(state, GateState::Open);

        state = state.begin(GateCommand::Close).expect("close accepted");
        assert_eq!(state, GateState::Closing);
        state = state.settle();
        assert_eq!(state, GateState::Closed);
    }

    #[test]
    fn test_settle_message_only_for_transitions() {
        assert!(GateState::Opening.settle_message().is_some());
        assert!(GateState::Closing.settle_message().is_some());
        assert!(GateState::Open.settle_message().is_none());
        assert!(GateState::Closed.settle_message().is_none());
    }
}
