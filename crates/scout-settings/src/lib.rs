//! # scout-settings
//!
//! Configuration management with layered sources for the Scout client.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`ScoutSettings::default()`]
//! 2. **User file**: `~/.scout/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `SCOUT_*` overrides (highest priority)
//!
//! Provider credentials live separately in `~/.scout/api_variables.json`
//! (see [`credentials`]).

#![deny(unsafe_code)]

pub mod credentials;
pub mod errors;
pub mod loader;
pub mod types;

pub use credentials::{ApiVariables, credentials_path, load_credential_headers};
pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

use std::sync::OnceLock;

static SETTINGS: OnceLock<ScoutSettings> = OnceLock::new();

/// Process-wide settings.
///
/// The binary installs its flag-adjusted copy with [`init_settings`] before
/// anything reads this; otherwise the first call loads from disk and the
/// environment, falling back to defaults when the file is unusable.
pub fn get_settings() -> &'static ScoutSettings {
    SETTINGS.get_or_init(|| {
        load_settings().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default settings");
            ScoutSettings::default()
        })
    })
}

/// Install `settings` as the process-wide copy. Hands them back if
/// [`get_settings`] or an earlier call already filled the slot.
#[allow(clippy::result_large_err)]
pub fn init_settings(settings: ScoutSettings) -> std::result::Result<(), ScoutSettings> {
    SETTINGS.set(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_installed_copy_wins() {
        let mut mine = ScoutSettings::default();
        mine.endpoints.origin = Some("http://localhost:3000".into());
        mine.session.max_reconnect_attempts = 7;

        // Other tests in this binary never touch the global.
        assert!(init_settings(mine).is_ok());
        assert_eq!(get_settings().session.max_reconnect_attempts, 7);

        let rejected = init_settings(ScoutSettings::default()).unwrap_err();
        assert_eq!(rejected.session.max_reconnect_attempts, 3);
        assert_eq!(
            get_settings().endpoints.origin.as_deref(),
            Some("http://localhost:3000")
        );
    }
}
