//! Layered settings: compiled defaults, then `~/.scout/settings.json`
//! merged key by key, then `SCOUT_*` environment variables.
//!
//! Merging recurses into objects only. Arrays such as `apiUrls` replace the
//! default wholesale, and a `null` in the file keeps the default.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::{Result, SettingsError};
use crate::types::ScoutSettings;

/// Directory holding settings and credentials (`~/.scout`).
pub fn scout_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".scout")
}

/// Resolve the path to the settings file (`~/.scout/settings.json`).
pub fn settings_path() -> PathBuf {
    scout_dir().join("settings.json")
}

/// Settings from `~/.scout/settings.json` plus the environment.
pub fn load_settings() -> Result<ScoutSettings> {
    load_settings_from_path(&settings_path())
}

/// Settings from `path` plus the environment. A missing file means
/// defaults; an unreadable or malformed one is an error.
pub fn load_settings_from_path(path: &Path) -> Result<ScoutSettings> {
    let mut settings = load_file_layer(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Defaults merged with the user file, without env overrides.
pub fn load_file_layer(path: &Path) -> Result<ScoutSettings> {
    let defaults = serde_json::to_value(ScoutSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let user: Value = serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Merge `source` over `target`.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply process environment overrides to loaded settings.
pub fn apply_env_overrides(settings: &mut ScoutSettings) {
    apply_overrides_from(settings, |name| std::env::var(name).ok());
}

/// Apply overrides read through `lookup`.
///
/// Each variable has strict parsing rules; invalid values are ignored with
/// a warning and the file/default value stays in place.
pub fn apply_overrides_from(settings: &mut ScoutSettings, lookup: impl Fn(&str) -> Option<String>) {
    let string = |name: &str| lookup(name).filter(|v| !v.is_empty());
    let ranged = |name: &str, min: u64, max: u64| {
        let val = string(name)?;
        let parsed = parse_u64_range(&val, min, max);
        if parsed.is_none() {
            tracing::warn!(key = name, value = %val, "invalid numeric env var, ignoring");
        }
        parsed
    };

    // ── Endpoints ───────────────────────────────────────────────────
    if let Some(v) = string("SCOUT_ORIGIN") {
        settings.endpoints.origin = Some(v);
    }
    if let Some(v) = string("SCOUT_API_URL") {
        let urls = parse_url_list(&v);
        if urls.is_empty() {
            tracing::warn!(key = "SCOUT_API_URL", value = %v, "empty URL list, ignoring");
        } else {
            settings.endpoints.api_urls = urls;
        }
    }
    if let Some(v) = string("SCOUT_LANGGRAPH_HOST_URL") {
        settings.endpoints.langgraph_host_url = v;
    }

    // ── Session ─────────────────────────────────────────────────────
    if let Some(v) = ranged("SCOUT_HEARTBEAT_INTERVAL_MS", 100, 600_000) {
        settings.session.heartbeat_interval_ms = v;
    }
    if let Some(v) = ranged("SCOUT_MAX_SESSION_MS", 1_000, 86_400_000) {
        settings.session.max_session_duration_ms = v;
    }
    if let Some(v) = ranged("SCOUT_MAX_RECONNECTS", 0, 100) {
        #[allow(clippy::cast_possible_truncation)]
        let attempts = v as u32;
        settings.session.max_reconnect_attempts = attempts;
    }
    if let Some(v) = ranged("SCOUT_RECONNECT_DELAY_MS", 0, 60_000) {
        settings.session.reconnect_delay_ms = v;
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = string("SCOUT_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = string("SCOUT_LOG_JSON") {
        match parse_bool(&v) {
            Some(b) => settings.logging.json = b,
            None => tracing::warn!(key = "SCOUT_LOG_JSON", value = %v, "invalid boolean env var, ignoring"),
        }
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Split a comma-separated URL list, dropping blanks.
pub fn parse_url_list(val: &str) -> Vec<String> {
    val.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn deep_merge_nested_objects() {
        let target = json!({"a": {"b": 1, "c": 2}, "d": 3});
        let source = json!({"a": {"b": 10}, "e": 4});
        let merged = deep_merge(target, source);
        assert_eq!(merged, json!({"a": {"b": 10, "c": 2}, "d": 3, "e": 4}));
    }

    #[test]
    fn deep_merge_skips_null_and_replaces_arrays() {
        let target = json!({"urls": ["a", "b"], "keep": "x"});
        let source = json!({"urls": ["c"], "keep": null});
        let merged = deep_merge(target, source);
        assert_eq!(merged, json!({"urls": ["c"], "keep": "x"}));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_file_layer(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings.session.max_reconnect_attempts, 3);
        assert_eq!(settings.endpoints.ws_path, "/ws");
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"endpoints":{"origin":"http://localhost:3000"},"session":{"reconnectDelayMs":250}}"#,
        )
        .unwrap();

        let settings = load_file_layer(&path).unwrap();
        assert_eq!(settings.endpoints.origin.as_deref(), Some("http://localhost:3000"));
        assert_eq!(settings.session.reconnect_delay_ms, 250);
        assert_eq!(settings.session.heartbeat_interval_ms, 30_000);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_matches!(load_file_layer(&path), Err(SettingsError::Parse { .. }));
    }

    #[test]
    fn env_overrides_apply() {
        let mut settings = ScoutSettings::default();
        apply_overrides_from(
            &mut settings,
            env(&[
                ("SCOUT_ORIGIN", "https://wow.ilanel.co.il"),
                ("SCOUT_API_URL", "https://api.example.com, http://localhost:9000"),
                ("SCOUT_MAX_RECONNECTS", "5"),
                ("SCOUT_HEARTBEAT_INTERVAL_MS", "1000"),
                ("SCOUT_LOG_JSON", "yes"),
            ]),
        );
        assert_eq!(settings.endpoints.origin.as_deref(), Some("https://wow.ilanel.co.il"));
        assert_eq!(
            settings.endpoints.api_urls,
            vec!["https://api.example.com", "http://localhost:9000"]
        );
        assert_eq!(settings.session.max_reconnect_attempts, 5);
        assert_eq!(settings.session.heartbeat_interval_ms, 1000);
        assert!(settings.logging.json);
    }

    #[test]
    fn invalid_env_values_are_ignored() {
        let mut settings = ScoutSettings::default();
        apply_overrides_from(
            &mut settings,
            env(&[
                ("SCOUT_MAX_RECONNECTS", "lots"),
                ("SCOUT_HEARTBEAT_INTERVAL_MS", "5"),
                ("SCOUT_API_URL", " , "),
                ("SCOUT_LOG_JSON", "maybe"),
                ("SCOUT_ORIGIN", ""),
            ]),
        );
        let defaults = ScoutSettings::default();
        assert_eq!(settings.session.max_reconnect_attempts, 3);
        assert_eq!(settings.session.heartbeat_interval_ms, 30_000);
        assert_eq!(settings.endpoints.api_urls, defaults.endpoints.api_urls);
        assert!(!settings.logging.json);
        assert!(settings.endpoints.origin.is_none());
    }

    #[test]
    fn parse_helpers() {
        assert_eq!(parse_bool("ON"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("nah"), None);
        assert_eq!(parse_u64_range("42", 1, 100), Some(42));
        assert_eq!(parse_u64_range("0", 1, 100), None);
        assert_eq!(parse_u64_range("-1", 0, 100), None);
        assert_eq!(parse_url_list("a,,b ,"), vec!["a", "b"]);
    }
}
