//! Locker contract and strategy selection.

use serde::{Deserialize, Serialize};

use super::exclusive::ExclusiveLocker;
use super::rwlock::ReadWriteLocker;
use super::stamped::StampedLocker;

/// Contract for managing concurrent access to shared state of type `S`.
///
/// Implementations differ in how much concurrency they allow, but all of
/// them guarantee that no operation observes a torn or partial view of the
/// state and that `read_then_write` executes as one observably atomic unit.
pub trait AccessLocker<S>: Send + Sync {
    /// Read from the shared state. Depending on the implementation this can
    /// be an optimistic read with retries, a read-lock-protected read or a
    /// fully exclusive section.
    fn read<F, R>(&self, op: F) -> R
    where
        F: FnOnce(&S) -> R;

    /// Write to the shared state with exclusive access.
    fn write<F, R>(&self, op: F) -> R
    where
        F: FnOnce(&mut S) -> R;

    /// Read state and, based on what was read, perform a write. The read and
    /// the write together form a single atomic unit: no other writer can
    /// invalidate the read state before the write executes.
    ///
    /// The state function may be evaluated more than once (the stamped
    /// strategy re-reads under a fresh write lock when an upgrade fails), so
    /// it must be side-effect free with respect to the shared state.
    fn read_then_write<F, G, T, R>(&self, state: F, write: G) -> R
    where
        F: Fn(&S) -> T,
        G: FnOnce(&mut S, T) -> R;
}

/// Locking strategy selected at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockerKind {
    /// One exclusive critical section for every operation
    Exclusive,
    /// Concurrent readers, single writer
    ReadWrite,
    /// Contention-free reads with bounded retries, upgradable write path
    Stamped,
}

impl Default for LockerKind {
    fn default() -> Self {
        LockerKind::ReadWrite
    }
}

/// An [`AccessLocker`] whose strategy is chosen at runtime.
pub enum Locker<S> {
    Exclusive(ExclusiveLocker<S>),
    ReadWrite(ReadWriteLocker<S>),
    Stamped(StampedLocker<S>),
}

impl<S: Send + Sync> Locker<S> {
    /// Wrap `state` in the locking strategy named by `kind`.
    pub fn new(kind: LockerKind, state: S) -> Self {
        match kind {
            LockerKind::Exclusive => Locker::Exclusive(ExclusiveLocker::new(state)),
            LockerKind::ReadWrite => Locker::ReadWrite(ReadWriteLocker::new(state)),
            LockerKind::Stamped => Locker::Stamped(StampedLocker::new(state)),
        }
    }

    /// The strategy this locker was built with.
    pub fn kind(&self) -> LockerKind {
        match self {
            Locker::Exclusive(_) => LockerKind::Exclusive,
            Locker::ReadWrite(_) => LockerKind::ReadWrite,
            Locker::Stamped(_) => LockerKind::Stamped,
        }
    }
}

impl<S: Send + Sync> AccessLocker<S> for Locker<S> {
    fn read<F, R>(&self, op: F) -> R
    where
        F: FnOnce(&S) -> R,
    {
        match self {
            Locker::Exclusive(locker) => locker.read(op),
            Locker::ReadWrite(locker) => locker.read(op),
            Locker::Stamped(locker) => locker.read(op),
        }
    }

    fn write<F, R>(&self, op: F) -> R
    where
        F: FnOnce(&mut S) -> R,
    {
        match self {
            Locker::Exclusive(locker) => locker.write(op),
            Locker::ReadWrite(locker) => locker.write(op),
            Locker::Stamped(locker) => locker.write(op),
        }
    }

    fn read_then_write<F, G, T, R>(&self, state: F, write: G) -> R
    where
        F: Fn(&S) -> T,
        G: FnOnce(&mut S, T) -> R,
    {
        match self {
            Locker::Exclusive(locker) => locker.read_then_write(state, write),
            Locker::ReadWrite(locker) => locker.read_then_write(state, write),
            Locker::Stamped(locker) => locker.read_then_write(state, write),
        }
    }
}
