//! Rate limit target operations.

use serde::{Deserialize, Serialize};

/// The closed set of operations a rate limit can apply to.
///
/// An operation must appear here to be rate limited at all; requests the
/// external layer cannot classify are expected to skip the limiter. A target
/// with no explicit limit configured falls back to [`Global`].
///
/// [`Global`]: RateLimitTarget::Global
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitTarget {
    /// Synthetic catch-all target used when a specific target is unlimited
    Global,
    WidgetsList,
    WidgetRead,
    WidgetCreate,
    WidgetUpdate,
    WidgetDelete,
}

impl RateLimitTarget {
    /// Every target, including the synthetic global one.
    pub const ALL: [RateLimitTarget; 6] = [
        RateLimitTarget::Global,
        RateLimitTarget::WidgetsList,
        RateLimitTarget::WidgetRead,
        RateLimitTarget::WidgetCreate,
        RateLimitTarget::WidgetUpdate,
        RateLimitTarget::WidgetDelete,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RateLimitTarget::Global => "global",
            RateLimitTarget::WidgetsList => "widgets_list",
            RateLimitTarget::WidgetRead => "widget_read",
            RateLimitTarget::WidgetCreate => "widget_create",
            RateLimitTarget::WidgetUpdate => "widget_update",
            RateLimitTarget::WidgetDelete => "widget_delete",
        }
    }
}

impl std::fmt::Display for RateLimitTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
