//! Synchronization strategies for shared state.

mod exclusive;
mod locker;
mod rwlock;
mod stamped;

pub use exclusive::ExclusiveLocker;
pub use locker::{AccessLocker, Locker, LockerKind};
pub use rwlock::ReadWriteLocker;
pub use stamped::StampedLocker;
