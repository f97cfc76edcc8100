use crate::error::BoxError;

/// Contract for hogging one specific lock.
///
/// Implementations supply the acquire/release pair for the lock under
/// test: an in-memory mutex, a database advisory lock, a file lock, a
/// distributed lock. The hogging machinery never inspects the lock
/// itself; whatever `acquire_lock` leaves acquired, `release_lock` must
/// release.
///
/// Both operations run on the hogging thread, never on the caller's.
/// Each session calls `acquire_lock` exactly once and `release_lock` at
/// most once (not at all if acquisition failed). No retries: a failure
/// is surfaced once and never re-attempted.
///
/// Note: if `acquire_lock` itself fails partway through, any resources
/// it already took are its own problem; `release_lock` will not be
/// called to clean them up.
pub trait LockHogger: Send {
    /// Take the lock.
    fn acquire_lock(&mut self) -> Result<(), BoxError>;

    /// Release the lock taken by `acquire_lock`.
    fn release_lock(&mut self) -> Result<(), BoxError>;
}

/// Adapter building a [`LockHogger`] from an acquire/release closure
/// pair, for callers that don't want to name a type.
///
/// ## Example
///
/// ```ignore
/// let lock = Arc::new(MyLock::new());
/// let (a, r) = (lock.clone(), lock.clone());
/// let hogger = FnHogger::from_fns(
///     move || a.acquire().map_err(Into::into),
///     move || r.release().map_err(Into::into),
/// );
/// ```
pub struct FnHogger<A, R> {
    acquire: A,
    release: R,
}

impl<A, R> FnHogger<A, R>
where
    A: FnMut() -> Result<(), BoxError> + Send,
    R: FnMut() -> Result<(), BoxError> + Send,
{
    pub fn from_fns(acquire: A, release: R) -> Self {
        FnHogger { acquire, release }
    }
}

impl<A, R> LockHogger for FnHogger<A, R>
where
    A: FnMut() -> Result<(), BoxError> + Send,
    R: FnMut() -> Result<(), BoxError> + Send,
{
    fn acquire_lock(&mut self) -> Result<(), BoxError> {
        (self.acquire)()
    }

    fn release_lock(&mut self) -> Result<(), BoxError> {
        (self.release)()
    }
}
