//! Channel address resolution.
//!
//! The backend address is derived from the client origin (the page URL in
//! browser terms): the local development host maps to the local backend,
//! the production front end maps to the production backend over `wss`, and
//! anything else falls back to the configured API URL. The channel scheme
//! follows the origin: `https` origins get `wss`, everything else `ws`.

use scout_settings::EndpointSettings;
use url::Url;

use crate::errors::SessionError;

/// Host used for the `LangGraph` GUI when its configured URL is local.
const LANGGRAPH_LOCAL_HOST: &str = "127.0.0.1:8123";

/// Which backend the channel is for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EndpointPurpose {
    /// The research backend.
    #[default]
    Research,
    /// The `LangGraph` GUI backend.
    LanggraphGui,
}

/// Maps a client origin onto a channel URL.
#[derive(Clone, Debug)]
pub struct EndpointResolver {
    settings: EndpointSettings,
    fixed: Option<String>,
    purpose: EndpointPurpose,
}

impl EndpointResolver {
    /// Resolver driven by origin-based routing.
    pub fn new(settings: EndpointSettings) -> Self {
        Self {
            settings,
            fixed: None,
            purpose: EndpointPurpose::Research,
        }
    }

    /// Resolver that always yields `url` (still validated on resolve).
    pub fn fixed(url: impl Into<String>) -> Self {
        Self {
            settings: EndpointSettings::default(),
            fixed: Some(url.into()),
            purpose: EndpointPurpose::Research,
        }
    }

    /// Resolve for a different backend.
    #[must_use]
    pub fn with_purpose(mut self, purpose: EndpointPurpose) -> Self {
        self.purpose = purpose;
        self
    }

    /// Resolve using the configured origin.
    pub fn resolve(&self) -> Result<String, SessionError> {
        if let Some(url) = &self.fixed {
            return validate(url.clone());
        }
        self.resolve_for(self.settings.origin.as_deref())
    }

    /// Resolve for an explicit origin.
    pub fn resolve_for(&self, origin: Option<&str>) -> Result<String, SessionError> {
        let origin = origin.ok_or_else(|| SessionError::unresolved("no client origin"))?;
        let origin = Url::parse(origin)
            .map_err(|e| SessionError::unresolved(format!("invalid origin {origin:?}: {e}")))?;
        let hostname = origin
            .host_str()
            .ok_or_else(|| SessionError::unresolved("origin has no host"))?;
        let scheme = ws_scheme(origin.scheme());
        let path = &self.settings.ws_path;

        if hostname == self.settings.local_hostname {
            return validate(format!("{scheme}://{}{path}", self.settings.local_endpoint));
        }
        if hostname == self.settings.production_hostname {
            return validate(format!("wss://{}{path}", self.settings.production_endpoint));
        }

        let host = match self.purpose {
            EndpointPurpose::LanggraphGui => {
                let configured = &self.settings.langgraph_host_url;
                if configured.contains("localhost") {
                    LANGGRAPH_LOCAL_HOST.to_string()
                } else {
                    strip_scheme(configured).to_string()
                }
            }
            EndpointPurpose::Research => {
                let api = self
                    .settings
                    .primary_api_url()
                    .ok_or_else(|| SessionError::unresolved("no API URL configured"))?;
                strip_scheme(api).to_string()
            }
        };
        if host.is_empty() {
            return Err(SessionError::unresolved("configured backend host is empty"));
        }
        validate(format!("{scheme}://{host}{path}"))
    }
}

/// Channel scheme for an origin scheme: `https → wss`, otherwise `ws`.
pub fn ws_scheme(origin_scheme: &str) -> &'static str {
    if origin_scheme.eq_ignore_ascii_case("https") {
        "wss"
    } else {
        "ws"
    }
}

fn strip_scheme(url: &str) -> &str {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url)
        .trim_end_matches('/')
}

fn validate(candidate: String) -> Result<String, SessionError> {
    let parsed = Url::parse(&candidate)
        .map_err(|e| SessionError::unresolved(format!("invalid channel URL {candidate:?}: {e}")))?;
    match parsed.scheme() {
        "ws" | "wss" => Ok(candidate),
        other => Err(SessionError::unresolved(format!(
            "channel URL must use ws or wss, got {other}"
        ))),
    }
}
