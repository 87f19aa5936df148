//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]`, so a user
//! file only needs the keys it overrides. Each type implements [`Default`]
//! with the production values the web client shipped with.

mod endpoints;
mod session;

pub use endpoints::*;
pub use session::*;

use serde::{Deserialize, Serialize};

/// Root settings type for the Scout client.
///
/// ```json
/// {
///   "endpoints": { "origin": "http://localhost:3000" },
///   "session": { "maxReconnectAttempts": 5 }
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoutSettings {
    /// Settings schema version.
    pub version: String,
    /// Backend addresses and origin-based routing.
    pub endpoints: EndpointSettings,
    /// Channel timing and reconnect policy.
    pub session: SessionSettings,
    /// HTTP collaborator settings.
    pub http: HttpSettings,
    /// Log output settings.
    pub logging: LoggingSettings,
    /// Credential file override (defaults to `~/.scout/api_variables.json`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials_file: Option<String>,
}

impl Default for ScoutSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            endpoints: EndpointSettings::default(),
            session: SessionSettings::default(),
            http: HttpSettings::default(),
            logging: LoggingSettings::default(),
            credentials_file: None,
        }
    }
}

/// Log output settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}
