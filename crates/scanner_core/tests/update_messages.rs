use std::time::Duration;

use scanner_core::{
    update, AppState, Effect, MessageTtl, Msg, ScannerSettings, DEFAULT_THRESHOLD,
};

fn reject(state: AppState, code: &str) -> (AppState, Vec<Effect>) {
    let mut state = state;
    let mut effects = Vec::new();
    for _ in 0..DEFAULT_THRESHOLD {
        let (next, produced) = update(state, Msg::CodeDetected(code.to_string()));
        effects.extend(produced);
        state = next;
    }
    (state, effects)
}

fn settings() -> ScannerSettings {
    ScannerSettings {
        message_ttl: MessageTtl {
            success: Duration::from_millis(100),
            error: Duration::from_millis(300),
        },
        ..ScannerSettings::default()
    }
}

#[test]
fn error_message_schedules_error_ttl() {
    let (state, _) = update(AppState::with_settings(settings()), Msg::StartClicked);
    let (_, effects) = reject(state, "123");
    assert_eq!(
        effects,
        vec![Effect::ScheduleMessageExpiry {
            generation: 1,
            after: Duration::from_millis(300),
        }]
    );
}

#[test]
fn second_message_replaces_first_and_stale_expiry_is_ignored() {
    let (state, _) = update(AppState::with_settings(settings()), Msg::StartClicked);
    let (state, _) = reject(state, "123");
    let (state, effects) = reject(state, "456");
    assert_eq!(
        effects,
        vec![Effect::ScheduleMessageExpiry {
            generation: 2,
            after: Duration::from_millis(300),
        }]
    );

    let (state, _) = update(state, Msg::MessageExpired { generation: 1 });
    let text = state.view().message.map(|m| m.text).unwrap_or_default();
    assert!(text.contains("456"), "{text}");

    let (mut state, _) = update(state, Msg::MessageExpired { generation: 2 });
    assert!(state.view().message.is_none());
    assert!(state.consume_dirty());
}

#[test]
fn restart_clears_stale_message() {
    let (state, _) = update(AppState::new(), Msg::StartClicked);
    let (state, _) = reject(state, "123");
    let (state, _) = update(state, Msg::StopClicked);
    let (state, _) = reject(state, "123");
    assert!(state.view().message.is_none());

    let (state, _) = update(state, Msg::StartClicked);
    let (state, _) = reject(state, "123");
    assert!(state.view().message.is_some());
    let (state, effects) = update(state, Msg::StopClicked);
    assert!(effects.contains(&Effect::CancelMessageExpiry));
    let (_, effects) = update(state, Msg::StartClicked);
    assert_eq!(effects, vec![Effect::StartCapture]);
}
