//! Application state machine for tasklab.
//!
//! [`App`] owns the observable UI fields and spawns the background work:
//! the fallible delayed action, the cancellable periodic emitter, and the
//! two callback-bridge variants. Background tasks never touch the fields
//! directly; they publish [`StateEvent`]s over a bounded mpsc channel and
//! the UI loop applies them each frame via [`App::process_events`], keeping
//! the fields single-writer.

mod callback;
mod config;
mod emitter;

pub use callback::{
    CALLBACK_SUCCESS_VALUE, Callback, callback_wrapper, fake_callback_api, sample_result_api,
};
pub use config::{ConfigError, TasklabConfig};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::sync::mpsc;

use emitter::EmitterTask;
use tasklab_types::{StateEvent, TaskError, ui::Button};

/// Bounded capacity of the state event channel. Generous relative to the
/// emitter's cadence; if the UI loop stalls this long, backpressure on the
/// background tasks is the right behavior.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Application state: observable fields plus the handles and channels behind
/// the background operations.
#[derive(Debug)]
pub struct App {
    name: String,

    // Observable fields, mutated only by `process_events` on the UI loop.
    has_error: bool,
    error_text: Option<String>,
    callback_value: Option<String>,
    current_int: u8,

    focused: Button,
    should_quit: bool,
    tick: u64,

    rng: StdRng,
    fallible_delay: Duration,
    emitter_max_delay: Duration,

    events_tx: mpsc::Sender<StateEvent>,
    events_rx: mpsc::Receiver<StateEvent>,
    emitter: Option<EmitterTask>,
}

impl App {
    #[must_use]
    pub fn new(config: &TasklabConfig) -> Self {
        let rng = match config.seed() {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::build(config, rng)
    }

    /// Construct with a fixed seed regardless of config or environment.
    #[must_use]
    pub fn with_seed(config: &TasklabConfig, seed: u64) -> Self {
        Self::build(config, StdRng::seed_from_u64(seed))
    }

    fn build(config: &TasklabConfig, rng: StdRng) -> Self {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            name: config.name().to_string(),
            has_error: false,
            error_text: None,
            callback_value: None,
            current_int: 0,
            focused: Button::default(),
            should_quit: false,
            tick: 0,
            rng,
            fallible_delay: config.fallible_delay(),
            emitter_max_delay: config.emitter_max_delay(),
            events_tx,
            events_rx,
            emitter: None,
        }
    }

    // ------------------------------------------------------------------
    // Observable state (read side)
    // ------------------------------------------------------------------

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn has_error(&self) -> bool {
        self.has_error
    }

    #[must_use]
    pub fn error_text(&self) -> Option<&str> {
        self.error_text.as_deref()
    }

    #[must_use]
    pub fn callback_value(&self) -> Option<&str> {
        self.callback_value.as_deref()
    }

    #[must_use]
    pub fn current_int(&self) -> u8 {
        self.current_int
    }

    #[must_use]
    pub fn emitter_active(&self) -> bool {
        self.emitter.is_some()
    }

    #[must_use]
    pub fn focused_button(&self) -> Button {
        self.focused
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    // ------------------------------------------------------------------
    // UI-driven actions
    // ------------------------------------------------------------------

    pub fn focus_next(&mut self) {
        self.focused = self.focused.next();
    }

    pub fn focus_prev(&mut self) {
        self.focused = self.focused.prev();
    }

    /// Press the currently focused button.
    pub fn press_focused(&mut self) {
        self.press(self.focused);
    }

    pub fn press(&mut self, button: Button) {
        match button {
            Button::StartEmitter => self.start_emitter(),
            Button::CancelEmitter => self.cancel_emitter(),
            Button::FallibleAction => self.perform_fallible_action(),
            Button::CallWrapper => self.call_wrapper(),
            Button::Alternate => self.alternate_wrapper_call(),
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
        self.cancel_emitter();
    }

    /// Advance the frame counter. Called once per render frame.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    // ------------------------------------------------------------------
    // Background operations
    // ------------------------------------------------------------------

    /// Run the fallible delayed action: sleep a fixed duration, then with
    /// uniform chance either clear or set the error fields.
    ///
    /// Each press spawns an independent task; overlapping presses are not
    /// de-duplicated and the task is not cancellable.
    pub fn perform_fallible_action(&mut self) {
        let succeed = self.coin();
        self.perform_fallible_action_with(succeed);
    }

    pub(crate) fn perform_fallible_action_with(&mut self, succeed: bool) {
        let delay = self.fallible_delay;
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = might_error(succeed, delay).await;
            if tx.send(StateEvent::FallibleFinished(result)).await.is_err() {
                tracing::debug!("event channel closed before fallible action finished");
            }
        });
    }

    /// Start the periodic emitter.
    ///
    /// Policy for double-start: cancel-then-start. An already active emitter
    /// is aborted (publishing its reset value) before the replacement is
    /// spawned, so at most one emitter is ever active.
    pub fn start_emitter(&mut self) {
        if let Some(previous) = self.emitter.take() {
            tracing::debug!("emitter already active, replacing");
            previous.abort();
        }
        let seed = self.rng.random();
        self.emitter = Some(EmitterTask::spawn(
            self.events_tx.clone(),
            self.emitter_max_delay,
            seed,
        ));
    }

    /// Cancel the active emitter. A no-op when none is running.
    pub fn cancel_emitter(&mut self) {
        if let Some(task) = self.emitter.take() {
            task.abort();
        }
    }

    /// Variant A: bridge the callback API through a suspension point and
    /// handle the propagated error at the task's outer edge.
    pub fn call_wrapper(&mut self) {
        let succeed = self.coin();
        self.call_wrapper_with(succeed);
    }

    pub(crate) fn call_wrapper_with(&mut self, succeed: bool) {
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let text = match callback::callback_wrapper(succeed).await {
                Ok(value) => value,
                Err(error) => error.to_string(),
            };
            let _ = tx.send(StateEvent::CallbackFinished(text)).await;
        });
    }

    /// Variant B: consume the bridge's outcome as a tagged value, branching
    /// on both arms explicitly instead of propagating.
    pub fn alternate_wrapper_call(&mut self) {
        let succeed = self.coin();
        self.alternate_wrapper_call_with(succeed);
    }

    pub(crate) fn alternate_wrapper_call_with(&mut self, succeed: bool) {
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = callback::sample_result_api(succeed).await;
            let text = outcome.map_or_else(|error| error.to_string(), |value| value);
            let _ = tx.send(StateEvent::CallbackFinished(text)).await;
        });
    }

    // ------------------------------------------------------------------
    // Event processing
    // ------------------------------------------------------------------

    /// Drain pending state events and apply them to the observable fields.
    /// Called once per frame by the UI loop; this is the only writer.
    pub fn process_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_event(event);
        }

        // Reap an emitter that stopped on its own (event channel closed).
        if self
            .emitter
            .as_ref()
            .is_some_and(EmitterTask::is_finished)
        {
            self.emitter = None;
        }
    }

    fn apply_event(&mut self, event: StateEvent) {
        match event {
            StateEvent::FallibleFinished(Ok(())) => {
                self.has_error = false;
                self.error_text = None;
            }
            StateEvent::FallibleFinished(Err(error)) => {
                self.has_error = true;
                self.error_text = Some(error.to_string());
            }
            StateEvent::EmitterValue(value) => {
                self.current_int = value;
            }
            StateEvent::CallbackFinished(text) => {
                self.callback_value = Some(text);
            }
        }
    }

    fn coin(&mut self) -> bool {
        self.rng.random_bool(0.5)
    }
}

impl Drop for App {
    fn drop(&mut self) {
        // Screen teardown cancels outstanding background work.
        if let Some(task) = &self.emitter {
            task.abort();
        }
    }
}

/// Sleep `delay`, then report the pre-flipped coin as success or
/// [`TaskError::SimulatedFailure`].
async fn might_error(succeed: bool, delay: Duration) -> Result<(), TaskError> {
    tokio::time::sleep(delay).await;
    if succeed { Ok(()) } else { Err(TaskError::SimulatedFailure) }
}

#[cfg(test)]
mod tests;
