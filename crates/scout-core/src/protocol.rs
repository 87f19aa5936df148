//! Wire protocol spoken over the research channel.
//!
//! Outbound traffic is text frames: the start envelope
//! (`"start " + JSON`) and the bare `"ping"` keep-alive. Inbound traffic is
//! one JSON object per frame, tagged by `type`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{FEEDBACK_REQUEST_MARKER, START_COMMAND};
use crate::errors::ProtocolError;

// ─────────────────────────────────────────────────────────────────────────────
// Outbound
// ─────────────────────────────────────────────────────────────────────────────

/// Report options chosen by the user for one session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Report flavour, e.g. `research_report`.
    pub report_type: String,
    /// Where sources come from, e.g. `web`, `local`, `hybrid`.
    pub report_source: String,
    /// Writing tone, e.g. `Objective`.
    pub tone: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            report_type: "research_report".into(),
            report_source: "web".into(),
            tone: "Objective".into(),
        }
    }
}

/// Provider credentials attached to the start envelope as `headers`.
///
/// Absent keys are omitted from the JSON. `Debug` never prints values.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialHeaders {
    /// Retriever selection (`tavily`, `google`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retriever: Option<String>,
    /// `LangChain` API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub langchain_api_key: Option<String>,
    /// `OpenAI` API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    /// Tavily API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tavily_api_key: Option<String>,
    /// Google API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_api_key: Option<String>,
    /// Google custom search engine id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_cx_key: Option<String>,
    /// Bing API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bing_api_key: Option<String>,
    /// `SearchApi` key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub searchapi_api_key: Option<String>,
    /// `SerpApi` key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serpapi_api_key: Option<String>,
    /// Serper key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serper_api_key: Option<String>,
    /// `SearxNG` instance URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub searx_url: Option<String>,
}

impl CredentialHeaders {
    fn entries(&self) -> [(&'static str, &Option<String>); 11] {
        [
            ("retriever", &self.retriever),
            ("langchain_api_key", &self.langchain_api_key),
            ("openai_api_key", &self.openai_api_key),
            ("tavily_api_key", &self.tavily_api_key),
            ("google_api_key", &self.google_api_key),
            ("google_cx_key", &self.google_cx_key),
            ("bing_api_key", &self.bing_api_key),
            ("searchapi_api_key", &self.searchapi_api_key),
            ("serpapi_api_key", &self.serpapi_api_key),
            ("serper_api_key", &self.serper_api_key),
            ("searx_url", &self.searx_url),
        ]
    }

    /// Names of the headers that carry a value.
    pub fn present_keys(&self) -> Vec<&'static str> {
        self.entries()
            .into_iter()
            .filter(|(_, v)| v.is_some())
            .map(|(k, _)| k)
            .collect()
    }

    /// Whether no credential is set.
    pub fn is_empty(&self) -> bool {
        self.entries().iter().all(|(_, v)| v.is_none())
    }
}

impl fmt::Debug for CredentialHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in self.entries() {
            if value.is_some() {
                let _ = map.entry(&key, &"<redacted>");
            }
        }
        map.finish()
    }
}

/// A task-start request: what gets sent on open and on every follow-up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartRequest {
    /// The research prompt.
    pub task: String,
    /// Report options.
    pub settings: ReportSettings,
    /// Credentials read when the session started.
    pub headers: CredentialHeaders,
}

#[derive(Serialize)]
struct StartPayload<'a> {
    task: &'a str,
    #[serde(flatten)]
    settings: &'a ReportSettings,
    headers: &'a CredentialHeaders,
}

impl StartRequest {
    /// Create a request.
    pub fn new(task: impl Into<String>, settings: ReportSettings, headers: CredentialHeaders) -> Self {
        Self {
            task: task.into(),
            settings,
            headers,
        }
    }

    /// Encode as the `"start {json}"` text frame.
    pub fn to_wire(&self) -> Result<String, ProtocolError> {
        let payload = StartPayload {
            task: &self.task,
            settings: &self.settings,
            headers: &self.headers,
        };
        let json = serde_json::to_string(&payload).map_err(ProtocolError::Encode)?;
        Ok(format!("{START_COMMAND} {json}"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inbound
// ─────────────────────────────────────────────────────────────────────────────

/// The `type` tag of an inbound event.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    /// Progress or tool-trace entry.
    Logs,
    /// Incremental chunk of the final answer.
    Report,
    /// Final artifact locations; also ends loading.
    Path,
    /// Chat-style reply; also ends loading.
    Chat,
    /// Human-in-the-loop gate.
    HumanFeedback,
    /// Any tag this client does not interpret.
    Other(String),
}

impl EventKind {
    /// Wire representation of the tag.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Logs => "logs",
            Self::Report => "report",
            Self::Path => "path",
            Self::Chat => "chat",
            Self::HumanFeedback => "human_feedback",
            Self::Other(tag) => tag.as_str(),
        }
    }
}

impl From<String> for EventKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "logs" => Self::Logs,
            "report" => Self::Report,
            "path" => Self::Path,
            "chat" => Self::Chat,
            "human_feedback" => Self::HumanFeedback,
            _ => Self::Other(tag),
        }
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Other(tag) => tag,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message received from the backend.
///
/// Keys other than `type`, `content` and `output` are kept in `extra`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Event tag.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Short content descriptor (`"request"` marks a feedback question).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Payload: text for `logs`/`report`, an object of paths for `path`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// Everything else the backend attached.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InboundEvent {
    /// Parse one text frame.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(raw).map_err(ProtocolError::Decode)
    }

    /// Whether this is a `human_feedback` question awaiting an answer.
    pub fn is_feedback_request(&self) -> bool {
        self.kind == EventKind::HumanFeedback
            && self.content.as_deref() == Some(FEEDBACK_REQUEST_MARKER)
    }

    /// `output` as text: strings verbatim, other JSON values serialized.
    pub fn output_text(&self) -> Option<String> {
        match self.output.as_ref()? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Composite `"{content}-{type}"` key consumers group entries by.
    pub fn composite_key(&self) -> String {
        format!("{}-{}", self.content.as_deref().unwrap_or_default(), self.kind)
    }
}

/// An event as stored in the ordered log.
#[derive(Clone, Debug, PartialEq)]
pub struct LoggedEvent {
    /// The event as received.
    pub event: InboundEvent,
    /// See [`InboundEvent::composite_key`].
    pub content_and_type: String,
}

impl From<InboundEvent> for LoggedEvent {
    fn from(event: InboundEvent) -> Self {
        let content_and_type = event.composite_key();
        Self {
            event,
            content_and_type,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
