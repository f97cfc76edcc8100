//! Shared fixtures: a condvar-backed flag lock and hoggers over it.

use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

use lock_hog::{BoxError, LockHogger};

/// Exclusive flag lock: `Mutex<bool>` + `Condvar`. Unlike a
/// `MutexGuard`, it can be acquired and released from different threads,
/// which is exactly what a hogger needs.
pub struct FlagLock {
    state: Mutex<bool>,
    wake: Condvar,
}

impl FlagLock {
    pub fn new() -> Self {
        FlagLock {
            state: Mutex::new(false),
            wake: Condvar::new(),
        }
    }

    pub fn lock(&self) {
        let mut locked = self.state.lock().unwrap();
        while *locked {
            locked = self.wake.wait(locked).unwrap();
        }
        *locked = true;
    }

    pub fn try_lock(&self) -> bool {
        let mut locked = self.state.lock().unwrap();
        if *locked {
            false
        } else {
            *locked = true;
            true
        }
    }

    pub fn unlock(&self) {
        let mut locked = self.state.lock().unwrap();
        if *locked {
            *locked = false;
            self.wake.notify_one();
        }
    }

    pub fn is_locked(&self) -> bool {
        *self.state.lock().unwrap()
    }
}

/// Hogs a [`FlagLock`] non-blockingly; acquisition refuses if the lock
/// is already held.
pub struct FlagLockHogger {
    lock: Arc<FlagLock>,
}

impl FlagLockHogger {
    pub fn new(lock: Arc<FlagLock>) -> Self {
        FlagLockHogger { lock }
    }
}

impl LockHogger for FlagLockHogger {
    fn acquire_lock(&mut self) -> Result<(), BoxError> {
        if self.lock.try_lock() {
            Ok(())
        } else {
            Err("could not acquire lock".into())
        }
    }

    fn release_lock(&mut self) -> Result<(), BoxError> {
        self.lock.unlock();
        Ok(())
    }
}

/// Same as [`FlagLockHogger`], but sleeps before releasing so timeout
/// handling can be exercised.
pub struct SlowReleaseHogger {
    pub lock: Arc<FlagLock>,
    pub delay: Duration,
}

impl LockHogger for SlowReleaseHogger {
    fn acquire_lock(&mut self) -> Result<(), BoxError> {
        if self.lock.try_lock() {
            Ok(())
        } else {
            Err("could not acquire lock".into())
        }
    }

    fn release_lock(&mut self) -> Result<(), BoxError> {
        thread::sleep(self.delay);
        self.lock.unlock();
        Ok(())
    }
}

/// Sleeps before acquiring, for exercising the acquire timeout.
pub struct SlowAcquireHogger {
    pub lock: Arc<FlagLock>,
    pub delay: Duration,
}

impl LockHogger for SlowAcquireHogger {
    fn acquire_lock(&mut self) -> Result<(), BoxError> {
        thread::sleep(self.delay);
        self.lock.lock();
        Ok(())
    }

    fn release_lock(&mut self) -> Result<(), BoxError> {
        self.lock.unlock();
        Ok(())
    }
}

/// Records every acquire/release into a shared event log.
pub struct LoggingHogger {
    pub lock: Arc<FlagLock>,
    pub events: Arc<Mutex<Vec<&'static str>>>,
}

impl LockHogger for LoggingHogger {
    fn acquire_lock(&mut self) -> Result<(), BoxError> {
        if !self.lock.try_lock() {
            return Err("could not acquire lock".into());
        }
        self.events.lock().unwrap().push("acquired");
        Ok(())
    }

    fn release_lock(&mut self) -> Result<(), BoxError> {
        self.lock.unlock();
        self.events.lock().unwrap().push("released");
        Ok(())
    }
}

/// The error a refusing hogger fails with, so tests can check the cause
/// survives the trip across the thread boundary.
#[derive(Debug)]
pub struct ConnectionRefused;

impl fmt::Display for ConnectionRefused {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "connection refused")
    }
}

impl Error for ConnectionRefused {}

/// Counts acquire/release calls through shared atomics, observable from
/// the test after the hogger has moved into the worker. No real lock.
pub struct CountingHogger {
    acquires: Arc<AtomicUsize>,
    releases: Arc<AtomicUsize>,
    fail_acquire: bool,
    fail_release: bool,
}

impl CountingHogger {
    pub fn well_behaved() -> (Self, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        Self::build(false, false)
    }

    pub fn refusing_acquire() -> (Self, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        Self::build(true, false)
    }

    pub fn refusing_release() -> (Self, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        Self::build(false, true)
    }

    fn build(
        fail_acquire: bool,
        fail_release: bool,
    ) -> (Self, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let acquires = Arc::new(AtomicUsize::new(0));
        let releases = Arc::new(AtomicUsize::new(0));
        let hogger = CountingHogger {
            acquires: acquires.clone(),
            releases: releases.clone(),
            fail_acquire,
            fail_release,
        };
        (hogger, acquires, releases)
    }
}

impl LockHogger for CountingHogger {
    fn acquire_lock(&mut self) -> Result<(), BoxError> {
        self.acquires.fetch_add(1, Ordering::SeqCst);
        if self.fail_acquire {
            Err(Box::new(ConnectionRefused))
        } else {
            Ok(())
        }
    }

    fn release_lock(&mut self) -> Result<(), BoxError> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        if self.fail_release {
            Err("release refused".into())
        } else {
            Ok(())
        }
    }
}

/// Panics in the acquire step.
pub struct PanickingHogger;

impl LockHogger for PanickingHogger {
    fn acquire_lock(&mut self) -> Result<(), BoxError> {
        panic!("acquire step exploded");
    }

    fn release_lock(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
}
