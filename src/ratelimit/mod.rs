//! Fixed-window rate limiting for store operations.

mod clock;
mod limiter;
mod rule;
mod stats;
mod target;

pub use clock::{Clock, SystemClock};
pub use limiter::RateLimiter;
pub use rule::{RateLimitRule, RuleUpdate, SharedRule, UNLIMITED};
pub use stats::{Quota, RateLimitStats};
pub use target::RateLimitTarget;
