//! Task-based lock hogging.
//!
//! Mirrors [`crate::parallel`] with the hogging worker as a task spawned
//! on the tokio runtime and every blocking point a suspension point.
//! Requires the `asynchronous` feature (on by default) and a running
//! runtime.

mod hog;
mod hogger;
mod worker;

pub use hog::{async_hog_lock, async_hog_lock_with_timeout, AsyncHogLock};
pub use hogger::AsyncLockHogger;
