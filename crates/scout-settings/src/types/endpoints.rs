//! Backend address settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where the backend lives, and how the client origin maps onto it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EndpointSettings {
    /// Origin the client runs under (the page URL, in browser terms).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Hostname treated as local development.
    pub local_hostname: String,
    /// `host:port` of the local development backend.
    pub local_endpoint: String,
    /// Hostname of the production front end.
    pub production_hostname: String,
    /// Host of the production backend (always reached over `wss`).
    pub production_endpoint: String,
    /// Candidate API base URLs, preferred first; the last is the local one.
    pub api_urls: Vec<String>,
    /// Base URL of the `LangGraph` GUI backend.
    pub langgraph_host_url: String,
    /// Path of the WebSocket route on the backend.
    pub ws_path: String,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            origin: None,
            local_hostname: "localhost".to_string(),
            local_endpoint: "localhost:8000".to_string(),
            production_hostname: "wow.ilanel.co.il".to_string(),
            production_endpoint: "gpt.ilanel.co.il".to_string(),
            api_urls: vec![
                "https://gpt.ilanel.co.il".to_string(),
                "http://localhost:8000".to_string(),
            ],
            langgraph_host_url: "https://langgraph.ilanel.co.il".to_string(),
            ws_path: "/ws".to_string(),
        }
    }
}

impl EndpointSettings {
    /// The preferred API base URL.
    pub fn primary_api_url(&self) -> Option<&str> {
        self.api_urls.first().map(String::as_str)
    }
}

/// HTTP collaborator settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpSettings {
    /// Timeout of the `HEAD /health` probe in milliseconds.
    pub probe_timeout_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 2_000,
        }
    }
}

impl HttpSettings {
    /// Probe timeout as a `Duration`.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployed_hosts() {
        let endpoints = EndpointSettings::default();
        assert_eq!(endpoints.local_endpoint, "localhost:8000");
        assert_eq!(endpoints.production_hostname, "wow.ilanel.co.il");
        assert_eq!(endpoints.primary_api_url(), Some("https://gpt.ilanel.co.il"));
        assert!(endpoints.origin.is_none());
    }

    #[test]
    fn empty_api_urls_have_no_primary() {
        let endpoints = EndpointSettings {
            api_urls: Vec::new(),
            ..EndpointSettings::default()
        };
        assert!(endpoints.primary_api_url().is_none());
    }
}
