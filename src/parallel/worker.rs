//! The hogging worker thread.
//!
//! Runs the two-phase lock lifecycle on its own OS thread: acquire,
//! signal, hold until instructed to release, release, report. All
//! communication with the orchestrating thread goes through mpsc
//! channels; a panic inside the user's hogger is caught and marshalled
//! through the channel payloads, never unwound across the join.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::hogger::LockHogger;
use crate::error::BoxError;
use crate::wait::Wait;

/// Handle to one hogging worker thread: the thread itself plus the live
/// ends of the three rendezvous signals.
pub(crate) struct HoggerThread {
    handle: Option<JoinHandle<()>>,
    release_tx: Sender<()>,
    acquired_rx: Receiver<Result<(), BoxError>>,
    done_rx: Receiver<Result<(), BoxError>>,
}

impl HoggerThread {
    /// Spawn the worker. It acquires the lock, reports the outcome, and
    /// if acquisition succeeded holds the lock until told to release.
    ///
    /// A disconnected release channel counts as the release instruction,
    /// so an orchestrator that goes away early cannot leave the worker
    /// holding the lock forever.
    pub(crate) fn spawn<H>(mut hogger: H) -> Self
    where
        H: LockHogger + 'static,
    {
        let (acquired_tx, acquired_rx) = channel();
        let (release_tx, release_rx) = channel();
        let (done_tx, done_rx) = channel();

        let handle = thread::spawn(move || {
            if let Err(cause) = guarded(|| hogger.acquire_lock()) {
                // No lock is held; exit without a release attempt.
                let _ = acquired_tx.send(Err(cause));
                return;
            }
            let _ = acquired_tx.send(Ok(()));

            let _ = release_rx.recv();

            let _ = done_tx.send(guarded(|| hogger.release_lock()));
        });

        HoggerThread {
            handle: Some(handle),
            release_tx,
            acquired_rx,
            done_rx,
        }
    }

    /// Block until the worker reports the acquisition outcome.
    pub(crate) fn wait_acquired(&self) -> Result<(), BoxError> {
        match self.acquired_rx.recv() {
            Ok(outcome) => outcome,
            Err(_) => Err(before_signalling()),
        }
    }

    /// Bounded variant of [`wait_acquired`](Self::wait_acquired).
    pub(crate) fn wait_acquired_timeout(&self, timeout: Duration) -> Wait<Result<(), BoxError>> {
        match self.acquired_rx.recv_timeout(timeout) {
            Ok(outcome) => Wait::Ready(outcome),
            Err(RecvTimeoutError::Timeout) => Wait::TimedOut,
            Err(RecvTimeoutError::Disconnected) => Wait::Ready(Err(before_signalling())),
        }
    }

    /// Tell the worker to release the lock.
    pub(crate) fn request_release(&self) {
        let _ = self.release_tx.send(());
    }

    /// Wait up to `timeout` for the release outcome, then join the
    /// worker. On timeout the thread is left running detached.
    pub(crate) fn join(mut self, timeout: Duration) -> Wait<Result<(), BoxError>> {
        match self.done_rx.recv_timeout(timeout) {
            Ok(outcome) => {
                self.join_now();
                Wait::Ready(outcome)
            }
            Err(RecvTimeoutError::Timeout) => Wait::TimedOut,
            Err(RecvTimeoutError::Disconnected) => {
                self.join_now();
                Wait::Ready(Err(
                    "the hogging thread exited without reporting a release outcome".into(),
                ))
            }
        }
    }

    /// Join a worker that has already finished (or is about to).
    pub(crate) fn join_now(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn before_signalling() -> BoxError {
    "the hogging thread exited before signalling acquisition".into()
}

/// Run one hogger step, converting a panic into an ordinary error value
/// so it can cross the thread boundary as a channel payload.
fn guarded(step: impl FnOnce() -> Result<(), BoxError>) -> Result<(), BoxError> {
    match catch_unwind(AssertUnwindSafe(step)) {
        Ok(outcome) => outcome,
        Err(payload) => Err(panic_description(payload.as_ref()).into()),
    }
}

fn panic_description(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("lock hogger panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("lock hogger panicked: {}", message)
    } else {
        "lock hogger panicked".to_string()
    }
}
