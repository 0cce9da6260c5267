//! Rate limit rule configuration.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::Deserialize;
use tracing::info;

use crate::error::{BoardkitError, Result};

use super::target::RateLimitTarget;

/// Limit value meaning "no limit". Any non-positive value is treated the
/// same way.
pub const UNLIMITED: i64 = -1;

/// Parameters of the fixed-window algorithm: the window size and one limit
/// per target. Validated at construction, not per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitRule {
    window_size_ms: u64,
    limits: HashMap<RateLimitTarget, i64>,
}

impl RateLimitRule {
    /// Build a rule, rejecting a zero window size. Targets missing from
    /// `limits` are unlimited.
    pub fn new(window_size_ms: u64, limits: HashMap<RateLimitTarget, i64>) -> Result<Self> {
        validate_window(window_size_ms)?;
        Ok(Self {
            window_size_ms,
            limits,
        })
    }

    pub fn window_size_ms(&self) -> u64 {
        self.window_size_ms
    }

    /// The configured limit for a target; non-positive means unlimited.
    pub fn limit(&self, target: RateLimitTarget) -> i64 {
        self.limits.get(&target).copied().unwrap_or(UNLIMITED)
    }

    /// Merge an update into this rule, last write wins. Fails without
    /// mutating when the update carries an invalid window size.
    pub fn apply(&mut self, update: &RuleUpdate) -> Result<()> {
        if let Some(window_size_ms) = update.window_size_ms {
            validate_window(window_size_ms)?;
            self.window_size_ms = window_size_ms;
        }
        for (target, limit) in &update.limits {
            self.limits.insert(*target, *limit);
        }
        Ok(())
    }
}

fn validate_window(window_size_ms: u64) -> Result<()> {
    if window_size_ms == 0 {
        return Err(BoardkitError::Config(
            "rate limit window size must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Partial rule update: only the fields present are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleUpdate {
    #[serde(default)]
    pub window_size_ms: Option<u64>,
    #[serde(default)]
    pub limits: HashMap<RateLimitTarget, i64>,
}

/// A rule shared by all concurrent rate-limit evaluations.
///
/// Reconfiguration is rare and admin-only; updates are last-write-wins with
/// no stronger contract. Readers always observe a consistent rule because
/// every access goes through the lock, never a field at a time.
pub struct SharedRule {
    inner: RwLock<RateLimitRule>,
}

impl SharedRule {
    pub fn new(rule: RateLimitRule) -> Self {
        Self {
            inner: RwLock::new(rule),
        }
    }

    pub fn window_size_ms(&self) -> u64 {
        self.inner.read().window_size_ms()
    }

    pub fn limit(&self, target: RateLimitTarget) -> i64 {
        self.inner.read().limit(target)
    }

    /// A point-in-time copy of the whole rule.
    pub fn snapshot(&self) -> RateLimitRule {
        self.inner.read().clone()
    }

    /// Apply an admin update to the live rule.
    pub fn update(&self, update: &RuleUpdate) -> Result<()> {
        let mut rule = self.inner.write();
        rule.apply(update)?;
        info!(window_size_ms = rule.window_size_ms(), "rate limit rule updated");
        Ok(())
    }
}
