//! The periodic emitter task: publishes random integers until aborted.

use std::time::Duration;

use futures_util::future::{AbortHandle, Abortable};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use tasklab_types::{EMITTER_RESET_VALUE, EMITTER_VALUE_BOUND, StateEvent};

/// A spawned emitter: the repeating background task plus the handle used to
/// cancel it. At most one is active per [`crate::App`].
#[derive(Debug)]
pub(crate) struct EmitterTask {
    join_handle: JoinHandle<()>,
    abort_handle: AbortHandle,
}

impl EmitterTask {
    /// Spawn the emit loop: publish a value in [0, `EMITTER_VALUE_BOUND`),
    /// sleep a random duration in [0, `max_delay`), repeat until aborted.
    ///
    /// On abort the wrapper publishes [`EMITTER_RESET_VALUE`] as the final
    /// observable update; the aborted loop is never polled again, so nothing
    /// is published after the reset.
    pub(crate) fn spawn(tx: mpsc::Sender<StateEvent>, max_delay: Duration, seed: u64) -> Self {
        let (abort_handle, abort_registration) = AbortHandle::new_pair();

        let loop_tx = tx.clone();
        let emit_loop = async move {
            let mut rng = StdRng::seed_from_u64(seed);
            loop {
                let value = rng.random_range(0..EMITTER_VALUE_BOUND);
                if loop_tx.send(StateEvent::EmitterValue(value)).await.is_err() {
                    // UI side is gone; stop quietly.
                    break;
                }
                let millis = rng.random_range(0..max_delay.as_millis() as u64);
                tokio::time::sleep(Duration::from_millis(millis)).await;
            }
        };
        let abortable = Abortable::new(emit_loop, abort_registration);

        let join_handle = tokio::spawn(async move {
            if abortable.await.is_err() {
                let _ = tx.send(StateEvent::EmitterValue(EMITTER_RESET_VALUE)).await;
            }
        });

        Self {
            join_handle,
            abort_handle,
        }
    }

    pub(crate) fn abort(&self) {
        self.abort_handle.abort();
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.join_handle.is_finished()
    }
}
