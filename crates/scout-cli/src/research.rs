//! `scout research`: one streaming session in the terminal.

use std::io::Write as _;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use scout_api::HealthProber;
use scout_core::{LoggedEvent, ReportSettings};
use scout_session::{ConnectionState, SessionManager, SessionObserver};
use scout_settings::ScoutSettings;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::mpsc;
use tracing::{info, warn};
use url::Url;

/// Session updates forwarded from the driver task to the terminal loop.
#[derive(Debug, PartialEq)]
enum UiEvent {
    State(ConnectionState),
    Log(String),
    Answer(String),
    Question(Option<String>),
    LoadingComplete,
}

/// Forwards observer callbacks onto a channel so the terminal loop can
/// block on stdin without stalling the driver.
struct TerminalObserver {
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl TerminalObserver {
    fn send(&self, event: UiEvent) {
        let _ = self.tx.send(event);
    }
}

impl SessionObserver for TerminalObserver {
    fn on_state_change(&self, state: ConnectionState) {
        self.send(UiEvent::State(state));
    }

    fn on_event(&self, event: &LoggedEvent) {
        // Reports are printed through on_answer.
        if event.event.kind != scout_core::EventKind::Report {
            self.send(UiEvent::Log(log_line(event)));
        }
    }

    fn on_answer(&self, fragment: &str, _answer: &str) {
        self.send(UiEvent::Answer(fragment.to_owned()));
    }

    fn on_loading_complete(&self) {
        self.send(UiEvent::LoadingComplete);
    }

    fn on_feedback_requested(&self, question: Option<&str>) {
        self.send(UiEvent::Question(question.map(str::to_owned)));
    }
}

fn log_line(event: &LoggedEvent) -> String {
    match event.event.output_text() {
        Some(text) => format!("[{}] {text}", event.content_and_type),
        None => format!("[{}]", event.content_and_type),
    }
}

/// Without an explicit origin, pick a reachable API URL and treat it as the
/// origin so the endpoint rules map it onto its own channel.
async fn ensure_origin(settings: &mut ScoutSettings) {
    if settings.endpoints.origin.is_some() {
        return;
    }
    let prober = HealthProber::from_settings(&settings.http);
    let chosen = prober
        .resolve_api_url("", &settings.endpoints.api_urls)
        .await;
    if let Some(api_url) = chosen {
        info!(%api_url, "using API URL as origin");
        settings.endpoints.origin = Some(api_url.clone());
        settings.endpoints.api_urls = vec![api_url];
    }
}

/// Render session updates until the report is complete, the session ends,
/// or `interrupted` resolves.
///
/// A pending feedback question only arms the `input` arm; session events and
/// the interrupt are still watched while the user types.
async fn pump<R>(
    rx: &mut mpsc::UnboundedReceiver<UiEvent>,
    input: &mut Lines<R>,
    interrupted: impl Future<Output = ()>,
    mut answer: impl FnMut(String) -> Result<()>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    tokio::pin!(interrupted);
    let mut stdout = std::io::stdout();
    let mut awaiting_answer = false;

    loop {
        tokio::select! {
            () = &mut interrupted => return Ok(()),

            event = rx.recv() => {
                let Some(event) = event else { return Ok(()) };
                match event {
                    UiEvent::Answer(fragment) => {
                        print!("{fragment}");
                        stdout.flush().context("Failed to write report")?;
                    }
                    UiEvent::Log(line) => eprintln!("{line}"),
                    UiEvent::Question(question) => {
                        eprintln!();
                        eprintln!("? {}", question.as_deref().unwrap_or("The researcher needs your input"));
                        eprint!("> ");
                        awaiting_answer = true;
                    }
                    UiEvent::LoadingComplete => return Ok(()),
                    UiEvent::State(state) if state.is_terminal() => return Ok(()),
                    UiEvent::State(state) => tracing::debug!(%state, "session state"),
                }
            }

            line = input.next_line(), if awaiting_answer => {
                awaiting_answer = false;
                let line = line.context("Failed to read answer")?;
                answer(line.unwrap_or_default())?;
            }
        }
    }
}

/// Run one research task to completion.
pub async fn run(mut settings: ScoutSettings, task: &str, report: ReportSettings) -> Result<()> {
    ensure_origin(&mut settings).await;
    if let Some(origin) = &settings.endpoints.origin {
        let _ = Url::parse(origin).with_context(|| format!("Invalid origin: {origin}"))?;
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let observer = Arc::new(TerminalObserver { tx });
    let manager = SessionManager::from_settings(&settings, observer);
    manager
        .start(task, report.clone())
        .context("Failed to start research session")?;

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let interrupted = async {
        let _ = tokio::signal::ctrl_c().await;
        warn!("interrupted");
    };
    pump(&mut rx, &mut stdin, interrupted, |answer| {
        manager
            .send_followup(answer, report.clone())
            .context("Failed to send answer")
    })
    .await?;
    println!();

    let state = manager.state();
    manager.close().await;
    if state == ConnectionState::Failed {
        bail!("research session failed after {} reconnect attempts", manager.reconnect_attempts());
    }
    Ok(())
}
