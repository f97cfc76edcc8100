mod error;
mod wait;

pub mod parallel;

#[cfg(feature = "asynchronous")]
pub mod asynchronous;

pub use error::{BoxError, HogError};
pub use parallel::{
    hog_lock, hog_lock_with_timeout, FnHogger, HogLock, LockHogger, DEFAULT_JOIN_TIMEOUT,
};

#[cfg(feature = "asynchronous")]
pub use asynchronous::{
    async_hog_lock, async_hog_lock_with_timeout, AsyncHogLock, AsyncLockHogger,
};
