//! The per-session connection task.
//!
//! One [`Driver`] owns the WebSocket, the keep-alive interval and the
//! duration deadline. It `select!`s over cancellation, the deadline,
//! queued requests, heartbeat ticks and inbound frames, so inbound
//! messages are handled strictly in arrival order. Reconnects happen inside
//! the same task; at most one is ever in flight.
//!
//! The reconnect budget counts consecutive channels that died before
//! delivering a single valid event. A completed handshake alone does not
//! refill it, so a backend that accepts and then immediately errors out
//! still ends in `Failed`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use scout_core::constants::PING;
use scout_core::InboundEvent;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep_until, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::observer::SessionObserver;
use crate::state::ConnectionState;
use crate::store::{Notice, SessionStore};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

// ─────────────────────────────────────────────────────────────────────────────
// Shared state
// ─────────────────────────────────────────────────────────────────────────────

/// State shared by the manager handle and its driver task.
pub(crate) struct Shared {
    pub(crate) config: SessionConfig,
    pub(crate) state: watch::Sender<ConnectionState>,
    pub(crate) store: Mutex<SessionStore>,
    pub(crate) observer: Arc<dyn SessionObserver>,
    pub(crate) reconnect_attempts: AtomicU32,
}

impl Shared {
    pub(crate) fn new(config: SessionConfig, observer: Arc<dyn SessionObserver>) -> Self {
        let (state, _) = watch::channel(ConnectionState::Idle);
        Self {
            config,
            state,
            store: Mutex::new(SessionStore::default()),
            observer,
            reconnect_attempts: AtomicU32::new(0),
        }
    }

    pub(crate) fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Move to `next` if the state machine allows it.
    ///
    /// Returns whether the state changed. Observers hear about it after the
    /// watch value is updated.
    pub(crate) fn transition(&self, next: ConnectionState) -> bool {
        let mut from = None;
        let changed = self.state.send_if_modified(|current| {
            if current.can_transition_to(next) {
                from = Some(*current);
                *current = next;
                true
            } else {
                false
            }
        });
        if let Some(from) = from {
            debug!(%from, to = %next, "state transition");
            self.observer.on_state_change(next);
        } else {
            debug!(current = %self.state(), rejected = %next, "transition ignored");
        }
        changed
    }

    /// Force the state back to `Idle` for a fresh session.
    pub(crate) fn rewind(&self) {
        let previous = self.state.send_replace(ConnectionState::Idle);
        if previous != ConnectionState::Idle {
            debug!(from = %previous, "state reset");
            self.observer.on_state_change(ConnectionState::Idle);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Driver
// ─────────────────────────────────────────────────────────────────────────────

/// Why one open channel stopped.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    /// Caller closed the session (or dropped the manager).
    Cancelled,
    /// The duration ceiling elapsed.
    Expired,
    /// The backend completed a normal close handshake.
    ClosedByServer,
    /// Transport error, EOF without handshake, or a non-normal close code.
    Abnormal(String),
}

/// Owns the channel for one session.
pub(crate) struct Driver {
    shared: Arc<Shared>,
    url: String,
    /// Encoded `"start {json}"` frame, resent on every (re)open.
    request: String,
    commands: mpsc::UnboundedReceiver<String>,
    cancel: CancellationToken,
    /// Whether the current channel has delivered a valid event.
    healthy: bool,
}

impl Driver {
    pub(crate) fn new(
        shared: Arc<Shared>,
        url: String,
        request: String,
        commands: mpsc::UnboundedReceiver<String>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            shared,
            url,
            request,
            commands,
            cancel,
            healthy: false,
        }
    }

    /// Connect, drive, and reconnect until the session ends.
    pub(crate) async fn run(mut self) {
        let max = self.shared.config.max_reconnect_attempts;
        let mut failures: u32 = 0;

        loop {
            if failures > 0 {
                if failures > max {
                    warn!(attempts = max, "reconnect budget exhausted");
                    let _ = self.shared.transition(ConnectionState::Failed);
                    return;
                }
                self.shared.reconnect_attempts.store(failures, Ordering::Relaxed);
                let delay = self.shared.config.backoff(failures);
                info!(attempt = failures, ?delay, "reconnecting");
                tokio::select! {
                    () = self.cancel.cancelled() => {
                        self.finish_cancelled();
                        return;
                    }
                    () = tokio::time::sleep(delay) => {}
                }
            }

            let connected = tokio::select! {
                () = self.cancel.cancelled() => {
                    self.finish_cancelled();
                    return;
                }
                result = timeout(self.shared.config.connect_timeout, connect_async(self.url.as_str())) => result,
            };
            let ws = match connected {
                Ok(Ok((ws, _response))) => ws,
                Ok(Err(e)) => {
                    warn!(error = %e, "connect failed");
                    failures += 1;
                    continue;
                }
                Err(_) => {
                    warn!(timeout = ?self.shared.config.connect_timeout, "connect timed out");
                    failures += 1;
                    continue;
                }
            };

            match self.drive(ws).await {
                Outcome::Cancelled => {
                    info!("session closed by caller");
                    self.finish_cancelled();
                    return;
                }
                Outcome::Expired => {
                    info!(
                        max = ?self.shared.config.max_session_duration,
                        "session duration ceiling reached"
                    );
                    let _ = self.shared.transition(ConnectionState::Closed);
                    return;
                }
                Outcome::ClosedByServer => {
                    info!("backend closed the session");
                    let _ = self.shared.transition(ConnectionState::Closed);
                    return;
                }
                Outcome::Abnormal(reason) => {
                    warn!(%reason, healthy = self.healthy, "channel lost");
                    let _ = self.shared.transition(ConnectionState::Connecting);
                    failures = if self.healthy { 1 } else { failures + 1 };
                }
            }
        }
    }

    fn finish_cancelled(&self) {
        let _ = self.shared.transition(ConnectionState::Closing);
        let _ = self.shared.transition(ConnectionState::Closed);
    }

    /// Run one open channel until it stops.
    async fn drive(&mut self, ws: WsStream) -> Outcome {
        let (mut sink, mut stream) = ws.split();
        self.healthy = false;

        if self.cancel.is_cancelled() {
            close_sink(&mut sink, &self.shared.config).await;
            return Outcome::Cancelled;
        }

        // Requests queued while connecting supersede the stored one.
        while let Ok(request) = self.commands.try_recv() {
            self.request = request;
        }
        let _ = self.shared.transition(ConnectionState::Open);
        info!("channel open");
        if let Err(reason) = self.send_request(&mut sink).await {
            return Outcome::Abnormal(reason);
        }

        let opened = Instant::now();
        let period = self.shared.config.heartbeat_interval;
        let mut heartbeat = interval_at(opened + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut deadline = Box::pin(sleep_until(opened + self.shared.config.max_session_duration));

        let outcome = loop {
            tokio::select! {
                biased;

                () = self.cancel.cancelled() => break Outcome::Cancelled,

                () = &mut deadline => break Outcome::Expired,

                request = self.commands.recv() => {
                    let Some(request) = request else { break Outcome::Cancelled };
                    self.request = request;
                    if let Err(reason) = self.send_request(&mut sink).await {
                        break Outcome::Abnormal(reason);
                    }
                    if self.shared.state() == ConnectionState::AwaitingFeedback {
                        let _ = self.shared.transition(ConnectionState::Open);
                    }
                }

                _ = heartbeat.tick() => {
                    debug!("keep-alive ping");
                    if let Err(e) = sink.send(Message::Text(PING.to_owned().into())).await {
                        break Outcome::Abnormal(format!("keep-alive failed: {e}"));
                    }
                }

                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => self.handle_frame(text.as_str()),
                    Some(Ok(Message::Close(frame))) => break close_outcome(frame.as_ref()),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Outcome::Abnormal(e.to_string()),
                    None => break Outcome::Abnormal("stream ended without a close frame".into()),
                },
            }
        };

        // Timers never outlive the channel.
        drop(heartbeat);
        drop(deadline);

        if matches!(outcome, Outcome::Cancelled | Outcome::Expired) {
            if outcome == Outcome::Cancelled {
                let _ = self.shared.transition(ConnectionState::Closing);
            }
            close_sink(&mut sink, &self.shared.config).await;
        }
        outcome
    }

    /// Write the current request. `Err` carries a transport failure.
    async fn send_request(&self, sink: &mut WsSink) -> Result<(), String> {
        debug!(len = self.request.len(), "sending start request");
        sink.send(Message::Text(self.request.clone().into()))
            .await
            .map_err(|e| format!("send failed: {e}"))
    }

    fn handle_frame(&mut self, raw: &str) {
        let event = match InboundEvent::parse(raw) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, len = raw.len(), "dropping malformed frame");
                return;
            }
        };
        debug!(kind = %event.kind, "event received");
        if !self.healthy {
            self.healthy = true;
            self.shared.reconnect_attempts.store(0, Ordering::Relaxed);
        }

        let notice = self.shared.store.lock().apply(event);
        let observer = &self.shared.observer;
        match notice {
            Notice::FeedbackRequested(question) => {
                let _ = self.shared.transition(ConnectionState::AwaitingFeedback);
                observer.on_feedback_requested(question.as_deref());
            }
            Notice::Appended {
                event,
                answer,
                loading_complete,
            } => {
                observer.on_event(&event);
                if let Some((fragment, answer)) = answer {
                    observer.on_answer(&fragment, &answer);
                }
                if loading_complete {
                    observer.on_loading_complete();
                }
            }
        }
    }
}

fn close_outcome(frame: Option<&CloseFrame>) -> Outcome {
    match frame {
        None => Outcome::ClosedByServer,
        Some(frame) if frame.code == CloseCode::Normal => Outcome::ClosedByServer,
        Some(frame) => Outcome::Abnormal(format!(
            "closed with code {}: {}",
            u16::from(frame.code),
            frame.reason.as_str()
        )),
    }
}

async fn close_sink(sink: &mut WsSink, config: &SessionConfig) {
    match timeout(config.connect_timeout, sink.close()).await {
        Ok(Ok(())) => debug!("close frame sent"),
        Ok(Err(e)) => debug!(error = %e, "close frame not delivered"),
        Err(_) => debug!("close frame timed out"),
    }
}
