//! Timing and retry policy for one session.

use std::time::Duration;

use scout_core::constants::{
    HEARTBEAT_INTERVAL, MAX_RECONNECT_ATTEMPTS, MAX_SESSION_DURATION, RECONNECT_DELAY,
};
use scout_settings::SessionSettings;

/// How long a single connect handshake may take before it counts as failed.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Liveness, ceiling, and reconnect parameters for a [`SessionManager`].
///
/// [`SessionManager`]: crate::SessionManager
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Interval between `"ping"` probes.
    pub heartbeat_interval: Duration,
    /// A channel open this long is closed regardless of traffic.
    pub max_session_duration: Duration,
    /// Reconnects allowed after an abnormal close.
    pub max_reconnect_attempts: u32,
    /// Linear backoff unit.
    pub reconnect_delay: Duration,
    /// Handshake timeout per connect attempt.
    pub connect_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: HEARTBEAT_INTERVAL,
            max_session_duration: MAX_SESSION_DURATION,
            max_reconnect_attempts: MAX_RECONNECT_ATTEMPTS,
            reconnect_delay: RECONNECT_DELAY,
            connect_timeout: CONNECT_TIMEOUT,
        }
    }
}

impl From<&SessionSettings> for SessionConfig {
    fn from(settings: &SessionSettings) -> Self {
        Self {
            heartbeat_interval: settings.heartbeat_interval(),
            max_session_duration: settings.max_session_duration(),
            max_reconnect_attempts: settings.max_reconnect_attempts,
            reconnect_delay: settings.reconnect_delay(),
            connect_timeout: CONNECT_TIMEOUT,
        }
    }
}

impl SessionConfig {
    /// Delay before reconnect number `attempt` (1-based): `attempt × delay`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.reconnect_delay.saturating_mul(attempt)
    }
}
