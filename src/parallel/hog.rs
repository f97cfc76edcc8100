//! Scoped lock hogging from a background thread.
//!
//! Most lock primitives can't be tested for contention from a single
//! thread: acquiring twice either succeeds trivially or deadlocks.
//! [`HogLock`] holds the lock from a second thread instead, so the test
//! thread can observe "already held by somebody else" and exercise its
//! contention handling.
//!
//! ## Example
//!
//! ```ignore
//! let hogger = MyLockHogger::new(&lock); // implements LockHogger
//!
//! lock_hog::hog_lock(hogger, || {
//!     // the lock is held by the hogging thread here
//!     assert!(!lock.try_lock());
//! })?;
//! // released again
//! ```

use std::time::Duration;

use super::hogger::LockHogger;
use super::worker::HoggerThread;
use crate::error::{seconds_description, HogError};
use crate::wait::Wait;

/// How long `exit` waits for the hogging thread to finish before
/// declaring it still alive.
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Scoped acquisition of a lock on a background hogging thread.
///
/// `enter` spawns the worker and returns once the lock is definitely
/// held; `exit` instructs the worker to release and returns once the
/// release has definitely been attempted and the worker observed
/// finished. One session may be active per instance at a time.
///
/// Dropping a `HogLock` with an active session (a panicking protected
/// body, a forgotten `exit`) still runs the full exit protocol; a
/// release failure on that path is reported on stderr, since whatever
/// is unwinding is what the caller observes.
pub struct HogLock {
    acquire_timeout: Option<Duration>,
    join_timeout: Duration,
    session: Option<HoggerThread>,
}

impl HogLock {
    pub fn new() -> Self {
        HogLock {
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

    /// Start hogging: spawn the worker and block until it has acquired
    /// the lock.
    ///
    /// Fails with [`HogError::AlreadyHogging`] if a session is active,
    /// with [`HogError::AcquireFailed`] if the hogger's acquire step
    /// failed (the worker is joined first; no lock is held), or with
    /// [`HogError::HoggerStillAlive`] if an acquire timeout was
    /// configured and expired (the worker is left detached and will
    /// release on its own if it ever acquires).
    pub fn enter<H>(&mut self, hogger: H) -> Result<(), HogError>
    where
        H: LockHogger + 'static,
    {
        if self.session.is_some() {
            return Err(HogError::AlreadyHogging);
        }

        let mut worker = HoggerThread::spawn(hogger);

        let acquired = match self.acquire_timeout {
            Some(timeout) => match worker.wait_acquired_timeout(timeout) {
                Wait::Ready(outcome) => outcome,
                Wait::TimedOut => {
                    // Detach: the dropped release channel doubles as the
                    // release instruction once acquire_lock returns.
                    drop(worker);
                    return Err(HogError::HoggerStillAlive(format!(
                        "The thread spawned to hog the lock had still not acquired it after \
                         {}. If this doesn't indicate a bug, consider passing a longer \
                         timeout value to `with_acquire_timeout`.",
                        seconds_description(timeout),
                    )));
                }
            },
            None => worker.wait_acquired(),
        };

        match acquired {
            Ok(()) => {
                self.session = Some(worker);
                Ok(())
            }
            Err(cause) => {
                worker.join_now();
                Err(HogError::AcquireFailed(cause))
            }
        }
    }

    /// Stop hogging: instruct the worker to release, wait for the
    /// outcome, and join the worker.
    ///
    /// A no-op when no session is active. Fails with
    /// [`HogError::ReleaseFailed`] if the hogger's release step failed,
    /// or with [`HogError::HoggerStillAlive`] if the worker did not
    /// finish within the join timeout (it is left detached).
    pub fn exit(&mut self) -> Result<(), HogError> {
        let Some(worker) = self.session.take() else {
            return Ok(());
        };

        worker.request_release();

        match worker.join(self.join_timeout) {
            Wait::Ready(Ok(())) => Ok(()),
            Wait::Ready(Err(cause)) => Err(HogError::ReleaseFailed(cause)),
            Wait::TimedOut => Err(HogError::HoggerStillAlive(format!(
                "The thread that hogged the lock was still alive after {}. If this doesn't \
                 indicate a bug, consider passing a longer timeout value to `hog_lock`.",
                seconds_description(self.join_timeout),
            ))),
        }
    }
}

impl Default for HogLock {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for HogLock {
    fn drop(&mut self) {
        if self.session.is_some() {
            if let Err(release_error) = self.exit() {
                // The caller only ever observes the failure that got us
                // here; the release error must not vanish silently.
                eprintln!(
                    "lock_hog: release failed while unwinding: {}",
                    release_error
                );
            }
        }
    }
}

/// Run `body` while the lock is hogged from a background thread.
///
/// Equivalent to `enter` / `exit` around the closure. The release is
/// attempted on every path out of `body`, including a panic; the panic
/// then takes precedence over any release failure.
pub fn hog_lock<H, T>(hogger: H, body: impl FnOnce() -> T) -> Result<T, HogError>
where
    H: LockHogger + 'static,
{
    hog_lock_with_timeout(hogger, DEFAULT_JOIN_TIMEOUT, body)
}

/// [`hog_lock`] with an explicit join timeout.
pub fn hog_lock_with_timeout<H, T>(
    hogger: H,
    timeout: Duration,
    body: impl FnOnce() -> T,
) -> Result<T, HogError>
where
    H: LockHogger + 'static,
{
    let mut hog = HogLock::new().with_join_timeout(timeout);
    hog.enter(hogger)?;
    let value = body();
    hog.exit()?;
    Ok(value)
}
