//! Cancellable delayed work.
//!
//! Every call to [`Debouncer::schedule`] aborts the pending task, if any, and
//! spawns a new one that waits out the quiet period before running. Results
//! come back over a channel tagged with the generation that produced them,
//! so a result that raced past an abort can still be recognized as stale.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::trace;

/// A result tagged with the schedule call that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Debounced<T> {
    pub generation: u64,
    pub value: T,
}

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    generation: u64,
    pending: Option<JoinHandle<()>>,
    tx: UnboundedSender<Debounced<T>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration, tx: UnboundedSender<Debounced<T>>) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
            tx,
        }
    }

    /// Replace any pending work with `work`, run after the delay.
    ///
    /// Returns the new generation.
    pub fn schedule(&mut self, work: impl FnOnce() -> T + Send + 'static) -> u64 {
        self.cancel();
        let generation = self.generation;
        let delay = self.delay;
        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let value = work();
            // Receiver gone means the app shut down
            let _ = tx.send(Debounced { generation, value });
        }));
        trace!(generation, "scheduled debounced task");
        generation
    }

    /// Abort pending work. Any result it already sent becomes stale.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.generation += 1;
    }

    /// Generation of the most recent schedule or cancel.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
