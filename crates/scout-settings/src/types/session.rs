//! Channel timing and reconnect settings.

use std::time::Duration;

use scout_core::constants::{
    HEARTBEAT_INTERVAL, MAX_RECONNECT_ATTEMPTS, MAX_SESSION_DURATION, RECONNECT_DELAY,
};
use serde::{Deserialize, Serialize};

/// Liveness, duration ceiling, and reconnect policy for one session.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSettings {
    /// Keep-alive probe interval in milliseconds.
    pub heartbeat_interval_ms: u64,
    /// Longest a channel may stay open, in milliseconds.
    pub max_session_duration_ms: u64,
    /// Reconnect attempts after an abnormal close.
    pub max_reconnect_attempts: u32,
    /// Linear backoff unit in milliseconds.
    pub reconnect_delay_ms: u64,
}

#[allow(clippy::cast_possible_truncation)]
impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            heartbeat_interval_ms: HEARTBEAT_INTERVAL.as_millis() as u64,
            max_session_duration_ms: MAX_SESSION_DURATION.as_millis() as u64,
            max_reconnect_attempts: MAX_RECONNECT_ATTEMPTS,
            reconnect_delay_ms: RECONNECT_DELAY.as_millis() as u64,
        }
    }
}

impl SessionSettings {
    /// Keep-alive interval.
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    /// Session duration ceiling.
    pub fn max_session_duration(&self) -> Duration {
        Duration::from_millis(self.max_session_duration_ms)
    }

    /// Backoff unit.
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}
