//! Widget data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An immutable widget snapshot as held by the store and returned to
/// callers. Every mutation produces a new value with a refreshed
/// `last_modified_at`; the store replaces, never mutates in place.
///
/// The z-index is unique across all live widgets at any observable instant.
/// A widget at `i32::MAX` cannot be shifted further up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub width: f64,
    pub height: f64,
    pub last_modified_at: DateTime<Utc>,
}

impl Widget {
    /// New snapshot one z-index up with a refreshed timestamp. The caller
    /// must already have checked there is room above.
    pub(crate) fn shifted_up(&self) -> Widget {
        Widget {
            z: self.z + 1,
            last_modified_at: Utc::now(),
            ..self.clone()
        }
    }

    /// New snapshot with only the fields present in `update` replaced and a
    /// refreshed timestamp.
    pub(crate) fn merged(&self, update: &WidgetUpdate) -> Widget {
        Widget {
            id: self.id.clone(),
            x: update.x.unwrap_or(self.x),
            y: update.y.unwrap_or(self.y),
            z: update.z.unwrap_or(self.z),
            width: update.width.unwrap_or(self.width),
            height: update.height.unwrap_or(self.height),
            last_modified_at: Utc::now(),
        }
    }
}

/// Payload for creating a widget. The z-index is optional: when omitted the
/// store places the widget in the foreground.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WidgetCreate {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub z: Option<i32>,
    pub width: f64,
    pub height: f64,
}

impl WidgetCreate {
    /// Materialize a new widget at the given z-index with a fresh identity.
    pub(crate) fn to_widget(&self, z: i32) -> Widget {
        Widget {
            id: Uuid::new_v4().to_string(),
            x: self.x,
            y: self.y,
            z,
            width: self.width,
            height: self.height,
            last_modified_at: Utc::now(),
        }
    }
}

/// Partial update payload. Only the fields present are merged into the
/// stored widget.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WidgetUpdate {
    #[serde(default)]
    pub x: Option<i32>,
    #[serde(default)]
    pub y: Option<i32>,
    #[serde(default)]
    pub z: Option<i32>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl WidgetUpdate {
    /// True when no field is present. An empty update is a caller error and
    /// is expected to be rejected at the API boundary before reaching the
    /// store.
    pub fn is_empty(&self) -> bool {
        self.x.is_none()
            && self.y.is_none()
            && self.z.is_none()
            && self.width.is_none()
            && self.height.is_none()
    }
}
