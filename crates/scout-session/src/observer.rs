//! Callback surface for the UI layer.

use scout_core::LoggedEvent;

use crate::state::ConnectionState;

/// Receives session updates as they happen.
///
/// Callbacks run on the driver task, in arrival order, after the session
/// store has been updated and its lock released. Keep them short; hand work
/// off to a channel if it may block.
pub trait SessionObserver: Send + Sync {
    /// The connection moved to `state`.
    fn on_state_change(&self, _state: ConnectionState) {}

    /// An event was appended to the ordered log.
    fn on_event(&self, _event: &LoggedEvent) {}

    /// A `report` fragment arrived; `answer` is the buffer after appending.
    fn on_answer(&self, _fragment: &str, _answer: &str) {}

    /// A `path` or `chat` event ended the loading phase.
    fn on_loading_complete(&self) {}

    /// The backend paused for a human answer.
    fn on_feedback_requested(&self, _question: Option<&str>) {}
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl SessionObserver for NullObserver {}
