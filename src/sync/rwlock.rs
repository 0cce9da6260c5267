//! Read/write locking strategy.

use parking_lot::RwLock;

use super::locker::AccessLocker;

/// [`AccessLocker`] backed by a read/write lock: concurrent readers, one
/// writer excluding everything else.
pub struct ReadWriteLocker<S> {
    state: RwLock<S>,
}

impl<S> ReadWriteLocker<S> {
    pub fn new(state: S) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }
}

impl<S: Send + Sync> AccessLocker<S> for ReadWriteLocker<S> {
    fn read<F, R>(&self, op: F) -> R
    where
        F: FnOnce(&S) -> R,
    {
        let guard = self.state.read();
        op(&guard)
    }

    fn write<F, R>(&self, op: F) -> R
    where
        F: FnOnce(&mut S) -> R,
    {
        let mut guard = self.state.write();
        op(&mut guard)
    }

    // Holds the write lock for the whole sequence. Taking only a read lock
    // for the state phase would let another writer invalidate the read state
    // before the write executes.
    fn read_then_write<F, G, T, R>(&self, state: F, write: G) -> R
    where
        F: Fn(&S) -> T,
        G: FnOnce(&mut S, T) -> R,
    {
        let mut guard = self.state.write();
        let staged = state(&guard);
        write(&mut guard, staged)
    }
}
