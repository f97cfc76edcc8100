//! Scoped lock hogging from a concurrently scheduled task.

use std::future::Future;
use std::time::Duration;

use super::hogger::AsyncLockHogger;
use super::worker::{self, HoggerTask};
use crate::error::{seconds_description, HogError};
use crate::parallel::DEFAULT_JOIN_TIMEOUT;
use crate::wait::Wait;

/// Scoped acquisition of a lock on a background hogging task.
///
/// The task-based mirror of [`crate::HogLock`]: `enter` spawns the
/// worker task and suspends until the lock is definitely held; `exit`
/// instructs it to release and suspends until the release has been
/// attempted and the task observed finished.
///
/// Dropping an `AsyncHogLock` with an active session detaches the
/// worker; the worker still releases the lock on the runtime (a closed
/// release channel is the instruction), but completion is no longer
/// observed by anyone. Prefer `exit` where ordering matters.
pub struct AsyncHogLock {
    acquire_timeout: Option<Duration>,
    join_timeout: Duration,
    session: Option<HoggerTask>,
}

impl AsyncHogLock {
    pub fn new() -> Self {
        AsyncHogLock {
            acquire_timeout: None,
            join_timeout: DEFAULT_JOIN_TIMEOUT,
            session: None,
        }
    }

    /// Replace the join timeout applied by `exit`.
    pub fn with_join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = timeout;
        self
    }

    /// Bound the wait for acquisition in `enter`. Without this, `enter`
    /// waits for as long as the hogger's `acquire_lock` takes.
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = Some(timeout);
        self
    }

    /// Whether a hogging session is currently active.
    pub fn is_hogging(&self) -> bool {
        self.session.is_some()
    }

    /// Start hogging: spawn the worker task and suspend until it has
    /// acquired the lock. Same failure modes as [`crate::HogLock::enter`].
    pub async fn enter<H>(&mut self, hogger: H) -> Result<(), HogError>
    where
        H: AsyncLockHogger + 'static,
    {
        if self.session.is_some() {
            return Err(HogError::AlreadyHogging);
        }

        let (task, acquired_rx) = worker::spawn(hogger);

        let acquired = match self.acquire_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, acquired_rx).await {
                Ok(received) => received,
                Err(_elapsed) => {
                    // Detach: the dropped release channel doubles as the
                    // release instruction once acquire_lock returns.
                    drop(task);
                    return Err(HogError::HoggerStillAlive(format!(
                        "The task spawned to hog the lock had still not acquired it after \
                         {}. If this doesn't indicate a bug, consider passing a longer \
                         timeout value to `with_acquire_timeout`.",
                        seconds_description(timeout),
                    )));
                }
            },
            None => acquired_rx.await,
        };

        match acquired {
            Ok(Ok(())) => {
                self.session = Some(task);
                Ok(())
            }
            Ok(Err(cause)) => {
                task.reap().await;
                Err(HogError::AcquireFailed(cause))
            }
            Err(_recv_error) => {
                // The task dropped its sender without signalling; its
                // join outcome carries the explanation (e.g. a panic).
                let cause = task.reap_cause().await;
                Err(HogError::AcquireFailed(cause))
            }
        }
    }

    /// Stop hogging: instruct the worker to release and suspend until
    /// the outcome arrives. Same failure modes as
    /// [`crate::HogLock::exit`], with the task-flavoured still-alive
    /// message.
    pub async fn exit(&mut self) -> Result<(), HogError> {
        let Some(mut task) = self.session.take() else {
            return Ok(());
        };

        task.request_release();

        match task.join(self.join_timeout).await {
            Wait::Ready(Ok(())) => Ok(()),
            Wait::Ready(Err(cause)) => Err(HogError::ReleaseFailed(cause)),
            Wait::TimedOut => Err(HogError::HoggerStillAlive(format!(
                "The task that hogged the lock was still executing after {}. If this \
                 doesn't indicate a bug, consider passing a longer timeout value to \
                 `async_hog_lock`.",
                seconds_description(self.join_timeout),
            ))),
        }
    }
}

impl Default for AsyncHogLock {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `body` while the lock is hogged from a concurrently scheduled
/// task.
///
/// Equivalent to `enter` / `exit` around the future. If the returned
/// future is cancelled mid-body, the worker task is detached but still
/// releases the lock on the runtime.
pub async fn async_hog_lock<H, Fut, T>(hogger: H, body: Fut) -> Result<T, HogError>
where
    H: AsyncLockHogger + 'static,
    Fut: Future<Output = T>,
{
    async_hog_lock_with_timeout(hogger, DEFAULT_JOIN_TIMEOUT, body).await
}

/// [`async_hog_lock`] with an explicit join timeout.
pub async fn async_hog_lock_with_timeout<H, Fut, T>(
    hogger: H,
    timeout: Duration,
    body: Fut,
) -> Result<T, HogError>
where
    H: AsyncLockHogger + 'static,
    Fut: Future<Output = T>,
{
    let mut hog = AsyncHogLock::new().with_join_timeout(timeout);
    hog.enter(hogger).await?;
    let value = body.await;
    hog.exit().await?;
    Ok(value)
}
