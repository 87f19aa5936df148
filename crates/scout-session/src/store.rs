//! UI-facing session state and inbound event classification.

use scout_core::{EventKind, InboundEvent, LoggedEvent};

/// What a single inbound event does to the session.
#[derive(Clone, Debug, PartialEq)]
pub enum Dispatch {
    /// A `human_feedback` question: pause for an answer, log nothing.
    FeedbackRequest {
        /// The question text, if the backend sent one.
        question: Option<String>,
    },
    /// Append to the ordered log.
    Append {
        /// Text to append to the answer buffer (`report` only).
        answer_fragment: Option<String>,
        /// Whether this event ends the loading phase (`path`, `chat`).
        completes_loading: bool,
    },
}

/// Classify one parsed event.
pub fn classify(event: &InboundEvent) -> Dispatch {
    if event.is_feedback_request() {
        return Dispatch::FeedbackRequest {
            question: event.output_text(),
        };
    }
    match &event.kind {
        EventKind::Report => Dispatch::Append {
            answer_fragment: event.output_text(),
            completes_loading: false,
        },
        EventKind::Path | EventKind::Chat => Dispatch::Append {
            answer_fragment: None,
            completes_loading: true,
        },
        EventKind::Logs | EventKind::HumanFeedback | EventKind::Other(_) => Dispatch::Append {
            answer_fragment: None,
            completes_loading: false,
        },
    }
}

/// Observer notifications produced by [`SessionStore::apply`], fired once
/// the store lock is released.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Notice {
    FeedbackRequested(Option<String>),
    Appended {
        event: LoggedEvent,
        /// `(fragment, answer so far)`.
        answer: Option<(String, String)>,
        loading_complete: bool,
    },
}

/// Ordered log, answer buffer, loading flag, pending question.
#[derive(Clone, Debug, Default)]
pub(crate) struct SessionStore {
    pub(crate) events: Vec<LoggedEvent>,
    pub(crate) answer: String,
    pub(crate) loading: bool,
    pub(crate) pending_question: Option<String>,
}

impl SessionStore {
    /// A request went out: the session is loading again.
    pub(crate) fn begin_request(&mut self) {
        self.loading = true;
        self.pending_question = None;
    }

    pub(crate) fn apply(&mut self, event: InboundEvent) -> Notice {
        match classify(&event) {
            Dispatch::FeedbackRequest { question } => {
                self.pending_question.clone_from(&question);
                Notice::FeedbackRequested(question)
            }
            Dispatch::Append {
                answer_fragment,
                completes_loading,
            } => {
                let logged = LoggedEvent::from(event);
                self.events.push(logged.clone());
                let answer = answer_fragment.map(|fragment| {
                    self.answer.push_str(&fragment);
                    (fragment, self.answer.clone())
                });
                if completes_loading {
                    self.loading = false;
                }
                Notice::Appended {
                    event: logged,
                    answer,
                    loading_complete: completes_loading,
                }
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn event(raw: &str) -> InboundEvent {
        InboundEvent::parse(raw).unwrap()
    }

    #[test]
    fn classify_report() {
        let d = classify(&event(r#"{"type":"report","output":"Hello "}"#));
        assert_eq!(
            d,
            Dispatch::Append {
                answer_fragment: Some("Hello ".into()),
                completes_loading: false,
            }
        );
    }

    #[test]
    fn classify_path_and_chat_complete_loading() {
        for raw in [
            r#"{"type":"path","output":{"pdf":"out.pdf"}}"#,
            r#"{"type":"chat","content":"reply","output":"ok"}"#,
        ] {
            assert_matches!(
                classify(&event(raw)),
                Dispatch::Append {
                    answer_fragment: None,
                    completes_loading: true
                }
            );
        }
    }

    #[test]
    fn classify_feedback_request() {
        let d = classify(&event(
            r#"{"type":"human_feedback","content":"request","output":"Approve plan?"}"#,
        ));
        assert_eq!(
            d,
            Dispatch::FeedbackRequest {
                question: Some("Approve plan?".into())
            }
        );
    }

    #[test]
    fn human_feedback_without_request_marker_is_logged() {
        assert_matches!(
            classify(&event(r#"{"type":"human_feedback","content":"ack"}"#)),
            Dispatch::Append {
                answer_fragment: None,
                completes_loading: false
            }
        );
    }

    #[test]
    fn unknown_type_is_logged() {
        assert_matches!(
            classify(&event(r#"{"type":"telemetry","output":1}"#)),
            Dispatch::Append {
                answer_fragment: None,
                completes_loading: false
            }
        );
    }

    #[test]
    fn answer_is_ordered_concatenation_of_reports() {
        let mut store = SessionStore::default();
        assert_eq!(store.answer, "");
        let _ = store.apply(event(r#"{"type":"logs","content":"x","output":"searching"}"#));
        assert_eq!(store.answer, "");
        let _ = store.apply(event(r#"{"type":"report","output":"Hello "}"#));
        let _ = store.apply(event(r#"{"type":"logs","output":"between"}"#));
        let notice = store.apply(event(r#"{"type":"report","output":"world"}"#));
        assert_eq!(store.answer, "Hello world");
        assert_matches!(notice, Notice::Appended { answer: Some((f, a)), .. } => {
            assert_eq!(f, "world");
            assert_eq!(a, "Hello world");
        });
    }

    #[test]
    fn log_grows_by_one_except_feedback_requests() {
        let mut store = SessionStore::default();
        let inputs = [
            r#"{"type":"logs","output":"a"}"#,
            r#"{"type":"human_feedback","content":"request","output":"?"}"#,
            r#"{"type":"report","output":"b"}"#,
            r#"{"type":"other","output":"c"}"#,
            r#"{"type":"human_feedback","content":"request","output":"again?"}"#,
        ];
        for raw in inputs {
            let before = store.events.len();
            let notice = store.apply(event(raw));
            let expected = usize::from(!matches!(notice, Notice::FeedbackRequested(_)));
            assert_eq!(store.events.len(), before + expected);
        }
        assert_eq!(store.events.len(), 3);
        assert_eq!(store.pending_question.as_deref(), Some("again?"));
    }

    #[test]
    fn normal_flow_produces_five_entries() {
        let mut store = SessionStore::default();
        store.begin_request();
        for raw in [
            r#"{"type":"logs","content":"starting","output":"go"}"#,
            r#"{"type":"logs","content":"sources","output":"3 found"}"#,
            r#"{"type":"report","output":"Hello "}"#,
            r#"{"type":"report","output":"world"}"#,
            r#"{"type":"path","output":{"pdf":"r.pdf"}}"#,
        ] {
            let _ = store.apply(event(raw));
        }
        assert_eq!(store.events.len(), 5);
        assert_eq!(store.answer, "Hello world");
        assert!(!store.loading);
        let keys: Vec<_> = store.events.iter().map(|e| e.content_and_type.as_str()).collect();
        assert_eq!(
            keys,
            ["starting-logs", "sources-logs", "-report", "-report", "-path"]
        );
    }

    #[test]
    fn begin_request_clears_question_and_sets_loading() {
        let mut store = SessionStore::default();
        let _ = store.apply(event(
            r#"{"type":"human_feedback","content":"request","output":"ok?"}"#,
        ));
        assert!(store.pending_question.is_some());
        store.begin_request();
        assert!(store.loading);
        assert!(store.pending_question.is_none());
    }

    #[test]
    fn clear_resets_everything() {
        let mut store = SessionStore::default();
        store.begin_request();
        let _ = store.apply(event(r#"{"type":"report","output":"text"}"#));
        store.clear();
        assert!(store.events.is_empty());
        assert!(store.answer.is_empty());
        assert!(!store.loading);
        assert!(store.pending_question.is_none());
    }
}
