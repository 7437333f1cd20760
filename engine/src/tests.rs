//! Unit tests for the engine crate.

use std::time::Duration;

use tokio::sync::mpsc::error::TryRecvError;

use super::*;
use tasklab_types::{EMITTER_RESET_VALUE, EMITTER_VALUE_BOUND, StateEvent, TaskError};

fn test_app() -> App {
    App::with_seed(&TasklabConfig::default(), 42)
}

async fn next_event(app: &mut App) -> StateEvent {
    app.events_rx.recv().await.expect("state event")
}

/// Receive until the channel stays quiet. Only meaningful once every
/// background task has been cancelled or run to completion; the paused
/// clock auto-advances through the timeout when nothing is pending.
async fn drain_until_quiet(app: &mut App) -> Vec<StateEvent> {
    let mut events = Vec::new();
    while let Ok(Some(event)) =
        tokio::time::timeout(Duration::from_secs(60), app.events_rx.recv()).await
    {
        events.push(event);
    }
    events
}

// ----------------------------------------------------------------------
// Fallible delayed action
// ----------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn fallible_failure_sets_error_fields() {
    let mut app = test_app();
    app.perform_fallible_action_with(false);

    let event = next_event(&mut app).await;
    assert_eq!(
        event,
        StateEvent::FallibleFinished(Err(TaskError::SimulatedFailure))
    );

    app.apply_event(event);
    assert!(app.has_error());
    assert_eq!(app.error_text(), Some("Bonk"));
}

#[tokio::test(start_paused = true)]
async fn fallible_success_clears_error_fields() {
    let mut app = test_app();

    // Start from the error state so the clear is observable.
    app.apply_event(StateEvent::FallibleFinished(Err(
        TaskError::SimulatedFailure,
    )));
    assert!(app.has_error());

    app.perform_fallible_action_with(true);
    let event = next_event(&mut app).await;
    app.apply_event(event);

    assert!(!app.has_error());
    assert_eq!(app.error_text(), None);
}

#[tokio::test(start_paused = true)]
async fn fallible_action_lands_in_exactly_one_state() {
    let mut app = test_app();
    app.perform_fallible_action();

    let event = next_event(&mut app).await;
    app.apply_event(event);

    match (app.has_error(), app.error_text()) {
        (false, None) | (true, Some("Bonk")) => {}
        (has_error, text) => panic!("inconsistent error state: {has_error} / {text:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn overlapping_fallible_presses_run_independently() {
    let mut app = test_app();
    app.perform_fallible_action_with(true);
    app.perform_fallible_action_with(false);

    let mut results = vec![next_event(&mut app).await, next_event(&mut app).await];
    results.sort_by_key(|e| matches!(e, StateEvent::FallibleFinished(Err(_))));

    assert_eq!(
        results,
        vec![
            StateEvent::FallibleFinished(Ok(())),
            StateEvent::FallibleFinished(Err(TaskError::SimulatedFailure)),
        ]
    );
}

// ----------------------------------------------------------------------
// Periodic emitter
// ----------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn emitter_publishes_values_in_range() {
    let mut app = test_app();
    app.start_emitter();
    assert!(app.emitter_active());

    for _ in 0..5 {
        match next_event(&mut app).await {
            StateEvent::EmitterValue(value) => assert!(value < EMITTER_VALUE_BOUND),
            other => panic!("unexpected event while emitting: {other:?}"),
        }
    }

    app.cancel_emitter();
}

#[tokio::test(start_paused = true)]
async fn cancel_publishes_reset_and_nothing_after() {
    let mut app = test_app();
    app.start_emitter();

    // Liveness: at least one value arrives before cancellation.
    let StateEvent::EmitterValue(first) = next_event(&mut app).await else {
        panic!("expected an emitter value");
    };
    assert!(first < EMITTER_VALUE_BOUND);

    app.cancel_emitter();
    assert!(!app.emitter_active());

    let events = drain_until_quiet(&mut app).await;
    assert_eq!(
        events.last(),
        Some(&StateEvent::EmitterValue(EMITTER_RESET_VALUE)),
        "the final published value must be the reset"
    );
    for event in &events[..events.len() - 1] {
        match event {
            StateEvent::EmitterValue(value) => assert!(*value < EMITTER_VALUE_BOUND),
            other => panic!("unexpected event after cancel: {other:?}"),
        }
    }

    // Quiet for good: nothing shows up after the reset.
    assert!(matches!(app.events_rx.try_recv(), Err(TryRecvError::Empty)));

    for event in events {
        app.apply_event(event);
    }
    assert_eq!(app.current_int(), EMITTER_RESET_VALUE);
}

#[tokio::test(start_paused = true)]
async fn restart_replaces_the_running_emitter() {
    let mut app = test_app();
    app.start_emitter();
    let _ = next_event(&mut app).await;

    // Cancel-then-start: the old task is aborted before the new one spawns.
    app.start_emitter();
    assert!(app.emitter_active());

    app.cancel_emitter();
    let events = drain_until_quiet(&mut app).await;
    assert_eq!(
        events.last(),
        Some(&StateEvent::EmitterValue(EMITTER_RESET_VALUE))
    );
    assert!(!app.emitter_active());
    assert!(matches!(app.events_rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test(start_paused = true)]
async fn cancel_without_emitter_is_a_noop() {
    let mut app = test_app();
    app.cancel_emitter();
    app.process_events();

    assert!(!app.emitter_active());
    assert_eq!(app.current_int(), 0);
    assert!(matches!(app.events_rx.try_recv(), Err(TryRecvError::Empty)));
}

// ----------------------------------------------------------------------
// Callback bridge
// ----------------------------------------------------------------------

#[tokio::test]
async fn callback_wrapper_resumes_with_the_value() {
    let outcome = callback_wrapper(true).await;
    assert_eq!(outcome.as_deref(), Ok("Success"));
}

#[tokio::test]
async fn callback_wrapper_propagates_the_error() {
    let outcome = callback_wrapper(false).await;
    assert_eq!(outcome, Err(TaskError::CallbackFailure));
}

#[tokio::test]
async fn tagged_result_api_carries_both_arms() {
    assert_eq!(sample_result_api(true).await.as_deref(), Ok("Success"));
    assert_eq!(
        sample_result_api(false).await,
        Err(TaskError::CallbackFailure)
    );
}

#[tokio::test]
async fn both_wrapper_variants_agree_on_both_arms() {
    for succeed in [true, false] {
        let mut via_wrapper = test_app();
        via_wrapper.call_wrapper_with(succeed);
        let a = next_event(&mut via_wrapper).await;

        let mut via_result = test_app();
        via_result.alternate_wrapper_call_with(succeed);
        let b = next_event(&mut via_result).await;

        assert_eq!(a, b);
        let expected = if succeed { "Success" } else { "Failed" };
        assert_eq!(a, StateEvent::CallbackFinished(expected.to_string()));
    }
}

#[tokio::test]
async fn callback_result_updates_the_observable_field() {
    let mut app = test_app();
    app.call_wrapper_with(false);

    let event = next_event(&mut app).await;
    app.apply_event(event);
    assert_eq!(app.callback_value(), Some("Failed"));
}

// ----------------------------------------------------------------------
// Button dispatch and teardown
// ----------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn press_dispatches_to_the_matching_operation() {
    let mut app = test_app();

    app.press(Button::StartEmitter);
    assert!(app.emitter_active());

    app.press(Button::CancelEmitter);
    assert!(!app.emitter_active());
}

#[tokio::test(start_paused = true)]
async fn focused_press_follows_focus() {
    let mut app = test_app();
    assert_eq!(app.focused_button(), Button::StartEmitter);

    app.press_focused();
    assert!(app.emitter_active());

    app.focus_next();
    assert_eq!(app.focused_button(), Button::CancelEmitter);
    app.press_focused();
    assert!(!app.emitter_active());
}

#[tokio::test(start_paused = true)]
async fn quit_cancels_the_emitter() {
    let mut app = test_app();
    app.start_emitter();

    app.quit();
    assert!(app.should_quit());
    assert!(!app.emitter_active());

    let events = drain_until_quiet(&mut app).await;
    assert_eq!(
        events.last(),
        Some(&StateEvent::EmitterValue(EMITTER_RESET_VALUE))
    );
}
