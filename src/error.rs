use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Boxed cause carried by failed lock hogger operations.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Error type for lock hogging operations.
#[derive(Debug)]
pub enum HogError {
    /// `enter` was called while a hogging session is already active on
    /// this instance. A misuse guard, not a concurrency failure.
    AlreadyHogging,
    /// The hogger's acquire step failed (or panicked). No lock is held
    /// and the worker has already exited without a release attempt.
    AcquireFailed(BoxError),
    /// The hogger's release step failed (or panicked).
    ReleaseFailed(BoxError),
    /// The hogging worker did not finish within the bounded wait. It is
    /// left running detached; it cannot be safely force-killed.
    HoggerStillAlive(String),
}

impl fmt::Display for HogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HogError::AlreadyHogging => write!(
                f,
                "a lock is already being hogged by this instance; call exit() first"
            ),
            HogError::AcquireFailed(cause) => write!(f, "lock hogger failed to acquire: {}", cause),
            HogError::ReleaseFailed(cause) => write!(f, "lock hogger failed to release: {}", cause),
            HogError::HoggerStillAlive(message) => write!(f, "{}", message),
        }
    }
}

impl Error for HogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            HogError::AcquireFailed(cause) | HogError::ReleaseFailed(cause) => {
                Some(cause.as_ref())
            }
            _ => None,
        }
    }
}

/// Human description of a timeout, singular-cased for exactly one second.
pub(crate) fn seconds_description(timeout: Duration) -> String {
    let secs = timeout.as_secs_f64();
    if secs == 1.0 {
        "1 second".to_string()
    } else {
        format!("{} seconds", secs)
    }
}
