//! Caller-facing session control surface.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use parking_lot::Mutex;
use scout_core::{CredentialHeaders, LoggedEvent, ReportSettings, StartRequest};
use scout_settings::{ScoutSettings, credentials_path, load_credential_headers};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::config::SessionConfig;
use crate::driver::{Driver, Shared};
use crate::endpoint::EndpointResolver;
use crate::errors::SessionError;
use crate::observer::SessionObserver;
use crate::state::ConnectionState;

/// Handle on the running driver task.
struct Channel {
    commands: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Supervises exactly one streaming channel for one research session.
///
/// `start` and `send_followup` never block: they enqueue onto the driver.
/// `close` and `reset` are async so callers can await teardown. Dropping
/// the manager cancels the driver.
pub struct SessionManager {
    shared: Arc<Shared>,
    resolver: EndpointResolver,
    credentials_file: Option<PathBuf>,
    channel: Mutex<Option<Channel>>,
}

impl SessionManager {
    /// Create an idle manager.
    pub fn new(
        config: SessionConfig,
        resolver: EndpointResolver,
        observer: Arc<dyn SessionObserver>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared::new(config, observer)),
            resolver,
            credentials_file: None,
            channel: Mutex::new(None),
        }
    }

    /// Create a manager from loaded settings, reading credentials from the
    /// configured credential file.
    pub fn from_settings(settings: &ScoutSettings, observer: Arc<dyn SessionObserver>) -> Self {
        Self::new(
            SessionConfig::from(&settings.session),
            EndpointResolver::new(settings.endpoints.clone()),
            observer,
        )
        .with_credentials_file(credentials_path(settings))
    }

    /// Read credentials from `path` each time a session starts.
    #[must_use]
    pub fn with_credentials_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }

    // ─── Control ─────────────────────────────────────────────────────────

    /// Start a research task.
    ///
    /// From `Idle` this resolves the endpoint and spawns the driver. On an
    /// open channel it sends a fresh start request over the same channel;
    /// while connecting it replaces the request that goes out on open.
    pub fn start(
        &self,
        task: impl Into<String>,
        settings: ReportSettings,
    ) -> Result<(), SessionError> {
        let state = self.shared.state();
        if state.is_terminal() || state == ConnectionState::Closing {
            return Err(SessionError::Terminated { state });
        }

        let request = StartRequest::new(task, settings, self.credentials()).to_wire()?;

        let mut channel = self.channel.lock();
        if let Some(existing) = channel.as_ref() {
            self.shared.store.lock().begin_request();
            return existing.commands.send(request).map_err(|_| SessionError::Terminated {
                state: self.shared.state(),
            });
        }

        let runtime = Handle::try_current().map_err(|_| SessionError::NoRuntime)?;
        let url = match self.resolver.resolve() {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "endpoint resolution failed");
                let _ = self.shared.transition(ConnectionState::Failed);
                return Err(e);
            }
        };

        self.shared.store.lock().begin_request();
        let _ = self.shared.transition(ConnectionState::Connecting);
        info!(%url, "starting session");

        let (commands, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let driver = Driver::new(self.shared.clone(), url.clone(), request, rx, cancel.clone());
        let handle = runtime.spawn(driver.run().instrument(info_span!("session", %url)));

        *channel = Some(Channel {
            commands,
            cancel,
            handle,
        });
        Ok(())
    }

    /// Send a follow-up on the existing channel.
    ///
    /// While awaiting feedback this is the human answer: the pending
    /// question is cleared and the session resumes. From `Idle` it behaves
    /// as [`start`](Self::start).
    pub fn send_followup(
        &self,
        task: impl Into<String>,
        settings: ReportSettings,
    ) -> Result<(), SessionError> {
        debug!(state = %self.shared.state(), "follow-up");
        self.start(task, settings)
    }

    /// Intentional teardown. Idempotent.
    pub async fn close(&self) {
        let channel = self.channel.lock().take();
        let Some(channel) = channel else {
            // Close before start.
            let _ = self.shared.transition(ConnectionState::Closed);
            return;
        };

        let _ = self.shared.transition(ConnectionState::Closing);
        channel.cancel.cancel();
        drop(channel.commands);
        if let Err(e) = channel.handle.await {
            warn!(error = %e, "session driver ended abnormally");
        }
        let _ = self.shared.transition(ConnectionState::Closed);
    }

    /// Close any channel and clear all session state, back to `Idle`.
    pub async fn reset(&self) {
        self.close().await;
        self.shared.store.lock().clear();
        self.shared.reconnect_attempts.store(0, Ordering::Relaxed);
        self.shared.rewind();
        info!("session reset");
    }

    // ─── Observation ─────────────────────────────────────────────────────

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// Watch state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state.subscribe()
    }

    /// Snapshot of the ordered event log.
    pub fn events(&self) -> Vec<LoggedEvent> {
        self.shared.store.lock().events.clone()
    }

    /// The answer buffer so far.
    pub fn answer(&self) -> String {
        self.shared.store.lock().answer.clone()
    }

    /// The question the backend is waiting on, if any.
    pub fn pending_question(&self) -> Option<String> {
        self.shared.store.lock().pending_question.clone()
    }

    /// Whether the current request is still producing output.
    pub fn is_loading(&self) -> bool {
        self.shared.store.lock().loading
    }

    /// Reconnects made since the channel was last open.
    pub fn reconnect_attempts(&self) -> u32 {
        self.shared.reconnect_attempts.load(Ordering::Relaxed)
    }

    fn credentials(&self) -> CredentialHeaders {
        self.credentials_file
            .as_deref()
            .map(load_credential_headers)
            .unwrap_or_default()
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        if let Some(channel) = self.channel.get_mut().take() {
            channel.cancel.cancel();
        }
    }
}
