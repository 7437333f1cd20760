//! Core domain types for tasklab.
//!
//! This crate contains pure domain types with no IO, no async, and minimal
//! dependencies. Everything here can be used from any layer of the application.

pub mod ui;

use thiserror::Error;

/// Errors produced by the simulated background operations.
///
/// Both are surfaced by updating observable UI fields, never by terminating
/// the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The fallible delayed action flipped its coin and lost.
    #[error("Bonk")]
    SimulatedFailure,
    /// The simulated callback API invoked its error callback.
    #[error("Failed")]
    CallbackFailure,
}

/// Outcome of the simulated callback API: the literal success payload or the
/// callback failure. Transient; never persisted.
pub type CallbackOutcome = Result<String, TaskError>;

/// State-change notifications published by background tasks and drained by
/// the UI loop.
///
/// This is the explicit publish/subscribe holder replacing framework
/// reactivity: tasks publish, `App::process_events` applies each event to the
/// observable fields on the UI loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEvent {
    /// The fallible delayed action finished.
    FallibleFinished(Result<(), TaskError>),
    /// The periodic emitter published a value in [0, 100), or the reset
    /// value 0 as its final update on cancellation.
    EmitterValue(u8),
    /// A callback-bridge variant finished; payload is the display string
    /// ("Success" or the error message).
    CallbackFinished(String),
}

/// Final value the emitter publishes when cancelled.
pub const EMITTER_RESET_VALUE: u8 = 0;

/// Exclusive upper bound of values the emitter publishes while running.
pub const EMITTER_VALUE_BOUND: u8 = 100;
