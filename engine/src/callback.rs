//! The simulated callback-style API and its bridge into linear async code.
//!
//! `fake_callback_api` stands in for an external library that reports
//! completion through callbacks instead of returning a future.
//! [`callback_wrapper`] adapts it: the caller suspends on a oneshot channel
//! until whichever callback fires, then resumes with the value or the error.

use tokio::sync::oneshot;

use tasklab_types::{CallbackOutcome, TaskError};

/// Payload the simulated API hands to its success callback.
pub const CALLBACK_SUCCESS_VALUE: &str = "Success";

/// Completion callbacks for the simulated external API.
///
/// The methods take `self` by value: whichever callback fires consumes the
/// receiver, so each completion is reported exactly once.
pub trait Callback: Send + 'static {
    fn on_value(self, value: String);
    fn on_error(self, error: TaskError);
}

/// Simulated external callback API.
///
/// Schedules a task that invokes the success callback with
/// [`CALLBACK_SUCCESS_VALUE`] when `succeed` is true, otherwise the error
/// callback with [`TaskError::CallbackFailure`].
pub fn fake_callback_api<C: Callback>(succeed: bool, callback: C) {
    tokio::spawn(async move {
        if succeed {
            callback.on_value(CALLBACK_SUCCESS_VALUE.to_string());
        } else {
            callback.on_error(TaskError::CallbackFailure);
        }
    });
}

/// Resolves the bridge's oneshot channel from whichever callback fires.
struct OneshotCallback(oneshot::Sender<CallbackOutcome>);

impl Callback for OneshotCallback {
    fn on_value(self, value: String) {
        let _ = self.0.send(Ok(value));
    }

    fn on_error(self, error: TaskError) {
        let _ = self.0.send(Err(error));
    }
}

/// Variant A: bridge the callback API into a single linear suspension point.
///
/// Suspends until the API completes, then resumes the caller with the value;
/// the error side propagates to the caller via `?`.
pub async fn callback_wrapper(succeed: bool) -> Result<String, TaskError> {
    let (tx, rx) = oneshot::channel();
    fake_callback_api(succeed, OneshotCallback(tx));

    // The sender is consumed by exactly one callback, so the channel cannot
    // be dropped unresolved; map the impossible case to the failure arm
    // rather than panicking.
    rx.await.map_err(|_| TaskError::CallbackFailure)?
}

/// Variant B: the same bridge surfaced as a tagged value.
///
/// Instead of propagating the error, returns the outcome as a
/// [`CallbackOutcome`], forcing the caller to branch on both arms explicitly.
pub async fn sample_result_api(succeed: bool) -> CallbackOutcome {
    match callback_wrapper(succeed).await {
        Ok(value) => Ok(value),
        Err(error) => Err(error),
    }
}
