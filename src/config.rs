//! Configuration for assembling a board.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{BoardkitError, Result};
use crate::ratelimit::{RateLimitRule, RateLimitTarget};
use crate::sync::LockerKind;

/// Top-level configuration: which locking strategy the store uses and the
/// initial rate limit rule parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Store locking strategy
    #[serde(default)]
    pub locker: LockerKind,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            locker: LockerKind::default(),
            rate_limit: RateLimitSettings::default(),
        }
    }
}

/// Initial rate limit rule parameters. A non-positive limit means the
/// target is unlimited; every limit defaults to unlimited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Fixed window size in milliseconds
    #[serde(default = "default_window_size_ms")]
    pub window_size_ms: u64,

    #[serde(default = "default_limit")]
    pub limit_global: i64,

    #[serde(default = "default_limit")]
    pub limit_list_widgets: i64,

    #[serde(default = "default_limit")]
    pub limit_read_widget: i64,

    #[serde(default = "default_limit")]
    pub limit_create_widget: i64,

    #[serde(default = "default_limit")]
    pub limit_update_widget: i64,

    #[serde(default = "default_limit")]
    pub limit_delete_widget: i64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            window_size_ms: default_window_size_ms(),
            limit_global: default_limit(),
            limit_list_widgets: default_limit(),
            limit_read_widget: default_limit(),
            limit_create_widget: default_limit(),
            limit_update_widget: default_limit(),
            limit_delete_widget: default_limit(),
        }
    }
}

fn default_window_size_ms() -> u64 {
    60_000
}

fn default_limit() -> i64 {
    -1
}

impl RateLimitSettings {
    /// Build the initial rule from these settings, validating the window.
    pub fn to_rule(&self) -> Result<RateLimitRule> {
        let limits = HashMap::from([
            (RateLimitTarget::Global, self.limit_global),
            (RateLimitTarget::WidgetsList, self.limit_list_widgets),
            (RateLimitTarget::WidgetRead, self.limit_read_widget),
            (RateLimitTarget::WidgetCreate, self.limit_create_widget),
            (RateLimitTarget::WidgetUpdate, self.limit_update_widget),
            (RateLimitTarget::WidgetDelete, self.limit_delete_widget),
        ]);
        RateLimitRule::new(self.window_size_ms, limits)
    }
}

impl BoardConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &str) -> Result<Self> {
        info!(path, "loading board configuration");
        let contents = std::fs::read_to_string(path)
            .map_err(|e| BoardkitError::Config(format!("failed to read {path}: {e}")))?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| BoardkitError::Config(format!("failed to parse config: {e}")))
    }
}
