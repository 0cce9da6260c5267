//! Rate limit stats returned with limited responses.

use serde::{Serialize, Serializer};

/// A limit or remaining-request count that may be unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quota {
    Limited(u64),
    Unlimited,
}

impl std::fmt::Display for Quota {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quota::Limited(n) => write!(f, "{n}"),
            Quota::Unlimited => f.write_str("unlimited"),
        }
    }
}

// Rendered as a string either way, so "unlimited" and counts share one
// response field type.
impl Serialize for Quota {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Stats attached to rate-limited responses: the effective limit, how many
/// requests remain in the current window and when the window resets (epoch
/// milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitStats {
    pub rate_limit: Quota,
    pub available_requests: Quota,
    pub next_reset: u64,
}

impl RateLimitStats {
    /// Stats for a target whose effective limit is finite.
    pub fn of(rate_limit: u64, available_requests: u64, next_reset: u64) -> Self {
        Self {
            rate_limit: Quota::Limited(rate_limit),
            available_requests: Quota::Limited(available_requests),
            next_reset,
        }
    }

    /// Stats for an unlimited target.
    pub fn unlimited(next_reset: u64) -> Self {
        Self {
            rate_limit: Quota::Unlimited,
            available_requests: Quota::Unlimited,
            next_reset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_display() {
        assert_eq!(Quota::Limited(42).to_string(), "42");
        assert_eq!(Quota::Unlimited.to_string(), "unlimited");
    }

    #[test]
    fn test_stats_serialization() {
        let value = serde_json::to_value(RateLimitStats::of(10, 3, 60_000)).unwrap();
        assert_eq!(value["rateLimit"], "10");
        assert_eq!(value["availableRequests"], "3");
        assert_eq!(value["nextReset"], 60_000);

        let value = serde_json::to_value(RateLimitStats::unlimited(120_000)).unwrap();
        assert_eq!(value["rateLimit"], "unlimited");
        assert_eq!(value["availableRequests"], "unlimited");
    }
}
