//! Backend reachability and API URL selection.

use std::time::Duration;

use scout_core::constants::HEALTH_PROBE_TIMEOUT;
use scout_settings::HttpSettings;
use tracing::{debug, warn};

/// Probes `HEAD {url}/health`.
#[derive(Clone, Debug)]
pub struct HealthProber {
    client: reqwest::Client,
    timeout: Duration,
}

impl Default for HealthProber {
    fn default() -> Self {
        Self::new(HEALTH_PROBE_TIMEOUT)
    }
}

impl HealthProber {
    /// Prober with a per-probe timeout.
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    /// Prober configured from settings.
    pub fn from_settings(settings: &HttpSettings) -> Self {
        Self::new(settings.probe_timeout())
    }

    /// Whether `base_url` answers its health check with a 2xx.
    pub async fn probe(&self, base_url: &str) -> bool {
        let url = format!("{}/health", base_url.trim_end_matches('/'));
        match self.client.head(&url).timeout(self.timeout).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(%url, "reachable");
                true
            }
            Ok(response) => {
                debug!(%url, status = response.status().as_u16(), "health check not ok");
                false
            }
            Err(e) => {
                warn!(%url, error = %e, "failed to reach");
                false
            }
        }
    }

    /// First candidate whose probe succeeds, in order.
    pub async fn first_reachable<'a>(&self, urls: &'a [String]) -> Option<&'a str> {
        for url in urls {
            if self.probe(url).await {
                return Some(url);
            }
        }
        None
    }

    /// Pick the API base URL for a client whose origin host is `origin_host`.
    ///
    /// Local origins use the second (local) candidate. Otherwise the first
    /// reachable candidate wins, falling back to the first one.
    pub async fn resolve_api_url(&self, origin_host: &str, candidates: &[String]) -> Option<String> {
        if origin_host.contains("localhost") {
            return candidates.get(1).or_else(|| candidates.first()).cloned();
        }
        if let Some(url) = self.first_reachable(candidates).await {
            return Some(url.to_owned());
        }
        candidates.first().cloned()
    }
}
