mod hog;
mod hogger;
mod worker;

pub use hog::{hog_lock, hog_lock_with_timeout, HogLock, DEFAULT_JOIN_TIMEOUT};
pub use hogger::{FnHogger, LockHogger};
