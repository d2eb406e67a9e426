use std::sync::Once;

use scanner_core::{update, AppState, Effect, Msg, SessionState};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(scanner_logging::initialize_for_tests);
}

#[test]
fn start_moves_idle_to_running_and_starts_capture() {
    init_logging();
    let (mut state, effects) = update(AppState::new(), Msg::StartClicked);

    assert_eq!(state.session(), SessionState::Running);
    assert!(state.view().running);
    assert_eq!(effects, vec![Effect::StartCapture]);
    assert!(state.consume_dirty());
}

#[test]
fn start_while_running_is_ignored() {
    init_logging();
    let (mut state, _) = update(AppState::new(), Msg::StartClicked);
    assert!(state.consume_dirty());

    let (mut state, effects) = update(state, Msg::StartClicked);
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
}

#[test]
fn stop_moves_running_to_idle_and_stops_capture() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::StartClicked);
    let (state, effects) = update(state, Msg::StopClicked);

    assert_eq!(state.session(), SessionState::Idle);
    assert_eq!(effects, vec![Effect::StopCapture]);
}

#[test]
fn stop_while_idle_is_ignored() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::StopClicked);
    assert_eq!(state.session(), SessionState::Idle);
    assert!(effects.is_empty());
}

#[test]
fn codes_are_ignored_while_idle() {
    init_logging();
    let mut state = AppState::new();
    for _ in 0..10 {
        let (next, effects) = update(state, Msg::CodeDetected("9784000000000".to_string()));
        assert!(effects.is_empty());
        state = next;
    }
    assert_eq!(state.debouncer().repeat_count(), 0);
    assert_eq!(state.debouncer().last_seen(), None);
}

#[test]
fn stop_resets_partial_confirmation() {
    init_logging();
    let (mut state, _) = update(AppState::new(), Msg::StartClicked);
    for _ in 0..4 {
        state = update(state, Msg::CodeDetected("9784000000000".to_string())).0;
    }
    assert_eq!(state.debouncer().repeat_count(), 4);

    let (state, _) = update(state, Msg::StopClicked);
    assert_eq!(state.debouncer().repeat_count(), 0);

    // After restarting, one more read is not enough to confirm.
    let (state, _) = update(state, Msg::StartClicked);
    let (_, effects) = update(state, Msg::CodeDetected("9784000000000".to_string()));
    assert!(effects.is_empty());
}

#[test]
fn stop_clears_message_and_cancels_its_timer() {
    init_logging();
    let (mut state, _) = update(AppState::new(), Msg::StartClicked);
    for _ in 0..5 {
        state = update(state, Msg::CodeDetected("123".to_string())).0;
    }
    assert!(state.view().message.is_some());

    let (state, effects) = update(state, Msg::StopClicked);
    assert!(state.view().message.is_none());
    assert_eq!(effects, vec![Effect::StopCapture, Effect::CancelMessageExpiry]);
}

#[test]
fn capture_failure_stops_session_with_error() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::StartClicked);
    let (state, effects) = update(
        state,
        Msg::CaptureFailed {
            reason: "no such device".to_string(),
        },
    );

    assert_eq!(state.session(), SessionState::Idle);
    assert!(matches!(
        effects.as_slice(),
        [Effect::StopCapture, Effect::ScheduleMessageExpiry { .. }]
    ));
    let message = state.view().message.expect("failure message");
    assert!(message.text.contains("no such device"));
}
