//! Connection state machine.

use std::fmt;

/// Lifecycle state of a session's channel.
///
/// `Idle` is initial. `Closed` and `Failed` are terminal for an instance
/// until it is reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Nothing started yet.
    #[default]
    Idle,
    /// Opening (or re-opening) the channel.
    Connecting,
    /// Channel open, research running.
    Open,
    /// Channel open, backend paused on a human-feedback question.
    AwaitingFeedback,
    /// Caller-initiated teardown in progress.
    Closing,
    /// Ended normally: caller close, backend close, or duration ceiling.
    Closed,
    /// Reconnect budget exhausted or no endpoint could be resolved.
    Failed,
}

impl ConnectionState {
    /// Whether moving to `next` is a legal transition.
    ///
    /// Staying in the same state is not a transition and returns `false`.
    pub fn can_transition_to(self, next: Self) -> bool {
        use ConnectionState::{AwaitingFeedback, Closed, Closing, Connecting, Failed, Idle, Open};
        matches!(
            (self, next),
            (Idle, Connecting | Closed | Failed)
                | (Connecting, Open | Closing | Closed | Failed)
                | (Open, AwaitingFeedback | Connecting | Closing | Closed | Failed)
                | (AwaitingFeedback, Open | Connecting | Closing | Closed | Failed)
                | (Closing, Closed)
        )
    }

    /// `Closed` or `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Failed)
    }

    /// Whether a frame can be written right now.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open | Self::AwaitingFeedback)
    }

    /// Lower-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::AwaitingFeedback => "awaiting_feedback",
            Self::Closing => "closing",
            Self::Closed => "closed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::ConnectionState::*;
    use super::*;

    const ALL: [ConnectionState; 7] = [
        Idle,
        Connecting,
        Open,
        AwaitingFeedback,
        Closing,
        Closed,
        Failed,
    ];

    #[test]
    fn happy_path_is_legal() {
        assert!(Idle.can_transition_to(Connecting));
        assert!(Connecting.can_transition_to(Open));
        assert!(Open.can_transition_to(AwaitingFeedback));
        assert!(AwaitingFeedback.can_transition_to(Open));
        assert!(Open.can_transition_to(Closing));
        assert!(Closing.can_transition_to(Closed));
    }

    #[test]
    fn failure_path_is_legal() {
        assert!(Open.can_transition_to(Connecting));
        assert!(Connecting.can_transition_to(Failed));
        assert!(Idle.can_transition_to(Failed));
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for from in [Closed, Failed] {
            assert!(from.is_terminal());
            for to in ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to} must be rejected");
            }
        }
    }

    #[test]
    fn self_transitions_are_not_transitions() {
        for s in ALL {
            assert!(!s.can_transition_to(s));
        }
    }

    #[test]
    fn idle_cannot_skip_to_open() {
        assert!(!Idle.can_transition_to(Open));
        assert!(!Idle.can_transition_to(AwaitingFeedback));
        assert!(!Closing.can_transition_to(Connecting));
    }

    #[test]
    fn open_states() {
        assert!(Open.is_open());
        assert!(AwaitingFeedback.is_open());
        assert!(!Connecting.is_open());
        assert_eq!(AwaitingFeedback.to_string(), "awaiting_feedback");
    }
}
