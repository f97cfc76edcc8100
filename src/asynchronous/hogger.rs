use async_trait::async_trait;

use crate::error::BoxError;

/// Contract for hogging one specific lock from a task.
///
/// The async mirror of [`crate::LockHogger`]: both operations run on the
/// hogging task, never on the caller's task, with the same once-per-session
/// call pattern and the same no-cleanup disclaimer for a partially failed
/// acquire step.
#[async_trait]
pub trait AsyncLockHogger: Send {
    /// Take the lock.
    async fn acquire_lock(&mut self) -> Result<(), BoxError>;

    /// Release the lock taken by `acquire_lock`.
    async fn release_lock(&mut self) -> Result<(), BoxError>;
}
