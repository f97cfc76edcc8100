//! The hogging worker task.
//!
//! Same two-phase lifecycle as the thread worker, with oneshot channels
//! for the rendezvous and the task's `JoinHandle` as the completion
//! signal. A hogger that panics takes its task down; the resulting
//! `JoinError` becomes the reported cause.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::hogger::AsyncLockHogger;
use crate::error::BoxError;
use crate::wait::Wait;

/// Handle to one hogging worker task.
pub(crate) struct HoggerTask {
    handle: JoinHandle<Result<(), BoxError>>,
    release_tx: Option<oneshot::Sender<()>>,
}

/// Spawn the worker task. Returns the handle and the receiving end of
/// the acquisition signal.
///
/// A dropped release channel counts as the release instruction: if the
/// enclosing scope is cancelled, the worker still releases the lock and
/// finishes on the runtime rather than being orphaned holding it.
pub(crate) fn spawn<H>(mut hogger: H) -> (HoggerTask, oneshot::Receiver<Result<(), BoxError>>)
where
    H: AsyncLockHogger + 'static,
{
    let (acquired_tx, acquired_rx) = oneshot::channel();
    let (release_tx, release_rx) = oneshot::channel();

    let handle = tokio::spawn(async move {
        if let Err(cause) = hogger.acquire_lock().await {
            // No lock is held; exit without a release attempt.
            let _ = acquired_tx.send(Err(cause));
            return Ok(());
        }
        let _ = acquired_tx.send(Ok(()));

        let _ = release_rx.await;

        hogger.release_lock().await
    });

    (
        HoggerTask {
            handle,
            release_tx: Some(release_tx),
        },
        acquired_rx,
    )
}

impl HoggerTask {
    /// Tell the worker to release the lock.
    pub(crate) fn request_release(&mut self) {
        if let Some(release_tx) = self.release_tx.take() {
            let _ = release_tx.send(());
        }
    }

    /// Await the release outcome, bounded by `timeout`. On expiry the
    /// task is left running detached.
    pub(crate) async fn join(self, timeout: Duration) -> Wait<Result<(), BoxError>> {
        match tokio::time::timeout(timeout, self.handle).await {
            Ok(Ok(outcome)) => Wait::Ready(outcome),
            Ok(Err(join_error)) => Wait::Ready(Err(Box::new(join_error))),
            Err(_elapsed) => Wait::TimedOut,
        }
    }

    /// Await termination of a task that failed acquisition, discarding
    /// its outcome.
    pub(crate) async fn reap(self) {
        let _ = self.handle.await;
    }

    /// Await termination of a task that broke the rendezvous without
    /// signalling, and explain why.
    pub(crate) async fn reap_cause(self) -> BoxError {
        match self.handle.await {
            Err(join_error) => Box::new(join_error),
            Ok(Err(cause)) => cause,
            Ok(Ok(())) => "the hogging task exited before signalling acquisition".into(),
        }
    }
}
