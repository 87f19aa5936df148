//! Protocol constants shared by the session manager and its collaborators.

use std::time::Duration;

/// Current version of the Scout client (sourced from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name.
pub const NAME: &str = "scout";

/// Prefix of the outbound start / follow-up envelope.
pub const START_COMMAND: &str = "start";

/// Keep-alive probe payload.
pub const PING: &str = "ping";

/// `content` marker distinguishing a feedback question from an answered one.
pub const FEEDBACK_REQUEST_MARKER: &str = "request";

/// Interval between keep-alive probes.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Absolute ceiling on how long one channel may stay open.
pub const MAX_SESSION_DURATION: Duration = Duration::from_secs(300);

/// Reconnect attempts allowed after an abnormal close.
pub const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Unit of the linear reconnect backoff (`attempt × delay`).
pub const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Timeout for the `HEAD /health` reachability probe.
pub const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(2);
