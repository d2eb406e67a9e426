use crate::{Action, AppState, Effect, LookupOutcome, MessageKind, Msg, RejectReason, SessionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::StartClicked => {
            if state.session() == SessionState::Idle {
                state.start_session();
                let mut effects = Vec::with_capacity(2);
                effects.extend(state.clear_message());
                effects.push(Effect::StartCapture);
                effects
            } else {
                Vec::new()
            }
        }
        Msg::StopClicked => {
            if state.session() == SessionState::Running {
                state.stop_session();
                let mut effects = vec![Effect::StopCapture];
                effects.extend(state.clear_message());
                effects
            } else {
                Vec::new()
            }
        }
        Msg::CaptureFailed { reason } => {
            let mut effects = Vec::with_capacity(2);
            if state.session() == SessionState::Running {
                state.stop_session();
                effects.push(Effect::StopCapture);
            }
            effects.push(state.show_message(
                format!("Camera unavailable: {reason}"),
                MessageKind::Error,
            ));
            effects
        }
        Msg::ClearCatalogClicked => {
            state.clear_catalog();
            Vec::new()
        }
        Msg::CodeDetected(raw) => {
            let code = raw.trim();
            if code.is_empty() || state.session() != SessionState::Running {
                return (state, Vec::new());
            }
            on_code(&mut state, code)
        }
        Msg::LookupFinished { isbn, outcome } => {
            state.finish_lookup(&isbn);
            on_lookup_finished(&mut state, &isbn, outcome)
        }
        Msg::MessageExpired { generation } => {
            state.expire_message(generation);
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn on_code(state: &mut AppState, code: &str) -> Vec<Effect> {
    match state.observe_code(code) {
        Action::Ignore => Vec::new(),
        Action::Reject(reason) => {
            let text = match &reason {
                RejectReason::InvalidFormat { code } => format!(
                    "Invalid ISBN {code}: expected {}",
                    state.settings().rule.describe()
                ),
                RejectReason::AlreadyRegistered { isbn } => {
                    format!("ISBN {isbn} is already registered")
                }
            };
            vec![state.show_message(text, MessageKind::Error)]
        }
        Action::Accept(isbn) => {
            // A confirmation while the same lookup is still in flight is a repeat read.
            if !state.begin_lookup(&isbn) {
                return Vec::new();
            }
            let mut effects = vec![Effect::Lookup { isbn }];
            if state.settings().stop_after_accept {
                state.stop_session();
                effects.push(Effect::StopCapture);
            }
            effects
        }
    }
}

fn on_lookup_finished(state: &mut AppState, isbn: &str, outcome: LookupOutcome) -> Vec<Effect> {
    match outcome {
        LookupOutcome::Found(record) => {
            let text = match record.title.as_deref() {
                Some(title) => format!("Added \"{title}\""),
                None => format!("Added ISBN {isbn}"),
            };
            // Results are keyed by isbn, so a late duplicate is simply dropped.
            if state.add_record(record) {
                vec![state.show_message(text, MessageKind::Success)]
            } else {
                Vec::new()
            }
        }
        LookupOutcome::NotFound => vec![state.show_message(
            format!("No book found for ISBN {isbn}"),
            MessageKind::Error,
        )],
        LookupOutcome::Failed { reason } => vec![state.show_message(
            format!("Lookup for ISBN {isbn} failed: {reason}"),
            MessageKind::Error,
        )],
    }
}
