//! Session error types.

use scout_core::ProtocolError;
use thiserror::Error;

use crate::state::ConnectionState;

/// Errors returned by the session control surface.
///
/// Transport failures are not errors here: they feed the reconnect policy
/// and end up visible only as a state transition.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No backend address could be derived from the client origin.
    #[error("could not resolve a backend endpoint: {reason}")]
    EndpointUnresolved {
        /// Why resolution failed.
        reason: String,
    },

    /// The session already ended; `reset()` or build a new manager.
    #[error("session is {state}; start a new session")]
    Terminated {
        /// State the manager was in.
        state: ConnectionState,
    },

    /// The request could not be encoded for the wire.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// `start` was called outside a Tokio runtime.
    #[error("no Tokio runtime available to drive the session")]
    NoRuntime,
}

impl SessionError {
    pub(crate) fn unresolved(reason: impl Into<String>) -> Self {
        Self::EndpointUnresolved {
            reason: reason.into(),
        }
    }
}
