//! Optimistic locking strategy with pessimistic fallback.

use parking_lot::{RwLock, RwLockUpgradableReadGuard};

use super::locker::AccessLocker;

const OPTIMISTIC_READ_RETRIES: usize = 10;

/// [`AccessLocker`] with optimistic reads and an upgradable write path.
///
/// `read` first attempts a bounded number of contention-free `try_read`
/// acquisitions before falling back to a blocking read lock, so a reader
/// never waits unless the lock stays contended through every retry.
///
/// `read_then_write` evaluates the state function under an upgradable read
/// lock and attempts to upgrade it in place. If the upgrade loses to
/// contention the lock is released, a fresh write lock is acquired and the
/// state is re-read under it: the earlier result may be stale by the time
/// the fallback lock is granted.
pub struct StampedLocker<S> {
    state: RwLock<S>,
}

impl<S> StampedLocker<S> {
    pub fn new(state: S) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }
}

impl<S: Send + Sync> AccessLocker<S> for StampedLocker<S> {
    fn read<F, R>(&self, op: F) -> R
    where
        F: FnOnce(&S) -> R,
    {
        let mut retries = OPTIMISTIC_READ_RETRIES;
        let guard = loop {
            match self.state.try_read() {
                Some(guard) => break guard,
                None if retries > 0 => {
                    retries -= 1;
                    std::hint::spin_loop();
                }
                None => break self.state.read(),
            }
        };
        op(&guard)
    }

    fn write<F, R>(&self, op: F) -> R
    where
        F: FnOnce(&mut S) -> R,
    {
        let mut guard = self.state.write();
        op(&mut guard)
    }

    fn read_then_write<F, G, T, R>(&self, state: F, write: G) -> R
    where
        F: Fn(&S) -> T,
        G: FnOnce(&mut S, T) -> R,
    {
        let upgradable = self.state.upgradable_read();
        let staged = state(&upgradable);

        match RwLockUpgradableReadGuard::try_upgrade(upgradable) {
            Ok(mut guard) => write(&mut guard, staged),
            Err(upgradable) => {
                // Upgrade lost to contention: release and take a fresh write
                // lock, discarding the staged result in favor of a re-read.
                drop(upgradable);
                let mut guard = self.state.write();
                let staged = state(&guard);
                write(&mut guard, staged)
            }
        }
    }
}
