//! Credential file I/O.
//!
//! Provider keys live in `~/.scout/api_variables.json` under the same
//! upper-case names the web client kept in local storage:
//!
//! ```json
//! { "RETRIEVER": "tavily", "OPENAI_API_KEY": "sk-...", "TAVILY_API_KEY": "tvly-..." }
//! ```
//!
//! They are read once per session start and only ever leave the process as
//! start-envelope headers.

use std::fmt;
use std::path::{Path, PathBuf};

use scout_core::CredentialHeaders;
use serde::{Deserialize, Serialize};

use crate::loader::scout_dir;
use crate::types::ScoutSettings;

/// Default credential file name.
const CREDENTIALS_FILE_NAME: &str = "api_variables.json";

/// Persisted provider credentials, keyed by their upper-case names.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ApiVariables {
    /// Retriever selection.
    pub retriever: Option<String>,
    /// `LangChain` API key.
    pub langchain_api_key: Option<String>,
    /// `OpenAI` API key.
    pub openai_api_key: Option<String>,
    /// Tavily API key.
    pub tavily_api_key: Option<String>,
    /// Google API key.
    pub google_api_key: Option<String>,
    /// Google custom search engine id.
    pub google_cx_key: Option<String>,
    /// Bing API key.
    pub bing_api_key: Option<String>,
    /// `SearchApi` key.
    pub searchapi_api_key: Option<String>,
    /// `SerpApi` key.
    pub serpapi_api_key: Option<String>,
    /// Serper key.
    pub serper_api_key: Option<String>,
    /// `SearxNG` instance URL.
    pub searx_url: Option<String>,
}

impl fmt::Debug for ApiVariables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Same redaction as the wire form.
        fmt::Debug::fmt(&CredentialHeaders::from(self.clone()), f)
    }
}

impl From<ApiVariables> for CredentialHeaders {
    fn from(vars: ApiVariables) -> Self {
        fn nonempty(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.is_empty())
        }
        Self {
            retriever: nonempty(vars.retriever),
            langchain_api_key: nonempty(vars.langchain_api_key),
            openai_api_key: nonempty(vars.openai_api_key),
            tavily_api_key: nonempty(vars.tavily_api_key),
            google_api_key: nonempty(vars.google_api_key),
            google_cx_key: nonempty(vars.google_cx_key),
            bing_api_key: nonempty(vars.bing_api_key),
            searchapi_api_key: nonempty(vars.searchapi_api_key),
            serpapi_api_key: nonempty(vars.serpapi_api_key),
            serper_api_key: nonempty(vars.serper_api_key),
            searx_url: nonempty(vars.searx_url),
        }
    }
}

/// Path of the credential file for the given settings.
pub fn credentials_path(settings: &ScoutSettings) -> PathBuf {
    settings
        .credentials_file
        .as_ref()
        .map_or_else(|| scout_dir().join(CREDENTIALS_FILE_NAME), PathBuf::from)
}

/// Load credentials from file.
///
/// A missing, unreadable, or malformed file yields empty credentials; the
/// session still starts and the backend falls back to its own keys.
pub fn load_api_variables(path: &Path) -> ApiVariables {
    let data = match std::fs::read_to_string(path) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return ApiVariables::default(),
        Err(e) => {
            tracing::warn!("failed to read credentials file: {e}");
            return ApiVariables::default();
        }
    };

    match serde_json::from_str::<ApiVariables>(&data) {
        Ok(vars) => vars,
        Err(e) => {
            tracing::warn!("failed to parse credentials file: {e}");
            ApiVariables::default()
        }
    }
}

/// Load credentials and convert them to start-envelope headers.
pub fn load_credential_headers(path: &Path) -> CredentialHeaders {
    load_api_variables(path).into()
}
