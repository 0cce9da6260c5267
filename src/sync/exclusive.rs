//! Fully exclusive locking strategy.

use parking_lot::Mutex;

use super::locker::AccessLocker;

/// [`AccessLocker`] that takes one exclusive critical section for every
/// operation, reads included. Simplest strategy; serializes all access.
pub struct ExclusiveLocker<S> {
    state: Mutex<S>,
}

impl<S> ExclusiveLocker<S> {
    pub fn new(state: S) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }
}

impl<S: Send + Sync> AccessLocker<S> for ExclusiveLocker<S> {
    fn read<F, R>(&self, op: F) -> R
    where
        F: FnOnce(&S) -> R,
    {
        let guard = self.state.lock();
        op(&guard)
    }

    fn write<F, R>(&self, op: F) -> R
    where
        F: FnOnce(&mut S) -> R,
    {
        let mut guard = self.state.lock();
        op(&mut guard)
    }

    fn read_then_write<F, G, T, R>(&self, state: F, write: G) -> R
    where
        F: Fn(&S) -> T,
        G: FnOnce(&mut S, T) -> R,
    {
        let mut guard = self.state.lock();
        let staged = state(&guard);
        write(&mut guard, staged)
    }
}
