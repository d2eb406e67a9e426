use scanner_core::{
    update, AppState, BookRecord, Effect, LookupOutcome, MessageKind, Msg, DEFAULT_THRESHOLD,
};

const CODE: &str = "9784000000000";

fn accepted(code: &str) -> AppState {
    let (mut state, _) = update(AppState::new(), Msg::StartClicked);
    for _ in 0..DEFAULT_THRESHOLD {
        state = update(state, Msg::CodeDetected(code.to_string())).0;
    }
    assert!(state.is_lookup_pending(code));
    state
}

fn record(isbn: &str) -> BookRecord {
    BookRecord {
        isbn: isbn.to_string(),
        title: Some("Rust in Action".to_string()),
        authors: vec!["T. McNamara".to_string()],
        published_date: Some("2021".to_string()),
        page_count: Some(456),
        thumbnail: Some("http://books.example/thumb.jpg".to_string()),
        info_link: Some("http://books.example/info".to_string()),
    }
}

#[test]
fn not_found_shows_error_and_leaves_catalog_unchanged() {
    let state = accepted(CODE);
    let (state, effects) = update(
        state,
        Msg::LookupFinished {
            isbn: CODE.to_string(),
            outcome: LookupOutcome::NotFound,
        },
    );

    let view = state.view();
    assert!(!view.loading);
    assert_eq!(view.catalog_len, 0);
    let message = view.message.expect("not found message");
    assert_eq!(message.kind, MessageKind::Error);
    assert!(message.text.contains(CODE));
    assert!(matches!(
        effects.as_slice(),
        [Effect::ScheduleMessageExpiry { .. }]
    ));
}

#[test]
fn found_record_is_appended_verbatim() {
    let state = accepted(CODE);
    let (state, effects) = update(
        state,
        Msg::LookupFinished {
            isbn: CODE.to_string(),
            outcome: LookupOutcome::Found(record(CODE)),
        },
    );

    let view = state.view();
    assert_eq!(view.catalog, vec![record(CODE)]);
    assert_eq!(view.catalog_len, 1);
    assert!(!view.loading);
    let message = view.message.expect("success message");
    assert_eq!(message.kind, MessageKind::Success);
    assert!(message.text.contains("Rust in Action"));
    assert_eq!(effects.len(), 1);
}

#[test]
fn failure_shows_error_with_reason() {
    let state = accepted(CODE);
    let (state, _) = update(
        state,
        Msg::LookupFinished {
            isbn: CODE.to_string(),
            outcome: LookupOutcome::Failed {
                reason: "timeout".to_string(),
            },
        },
    );

    let view = state.view();
    assert_eq!(view.catalog_len, 0);
    assert!(!view.loading);
    let message = view.message.expect("failure message");
    assert_eq!(message.kind, MessageKind::Error);
    assert!(message.text.contains("timeout"));
}

#[test]
fn late_duplicate_result_is_dropped() {
    let state = accepted(CODE);
    let done = Msg::LookupFinished {
        isbn: CODE.to_string(),
        outcome: LookupOutcome::Found(record(CODE)),
    };
    let (mut state, _) = update(state, done.clone());
    assert!(state.consume_dirty());

    let (mut state, effects) = update(state, done);
    assert!(effects.is_empty());
    assert_eq!(state.view().catalog_len, 1);
    assert!(!state.consume_dirty());
}

#[test]
fn result_after_stop_is_still_applied() {
    let state = accepted(CODE);
    let (state, _) = update(state, Msg::StopClicked);
    assert!(state.view().loading);

    let (state, _) = update(
        state,
        Msg::LookupFinished {
            isbn: CODE.to_string(),
            outcome: LookupOutcome::Found(record(CODE)),
        },
    );
    let view = state.view();
    assert!(!view.running);
    assert!(!view.loading);
    assert_eq!(view.catalog_len, 1);
}

#[test]
fn catalog_keeps_scan_order_and_can_be_cleared() {
    let first = "9784000000000";
    let second = "9780000000002";

    let mut state = accepted(first);
    for _ in 0..DEFAULT_THRESHOLD {
        state = update(state, Msg::CodeDetected(second.to_string())).0;
    }
    // Second lookup finishes first; display order follows completion.
    for isbn in [second, first] {
        state = update(
            state,
            Msg::LookupFinished {
                isbn: isbn.to_string(),
                outcome: LookupOutcome::Found(record(isbn)),
            },
        )
        .0;
    }
    let order: Vec<_> = state.view().catalog.into_iter().map(|r| r.isbn).collect();
    assert_eq!(order, vec![second.to_string(), first.to_string()]);

    let (state, _) = update(state, Msg::ClearCatalogClicked);
    assert_eq!(state.view().catalog_len, 0);
}
