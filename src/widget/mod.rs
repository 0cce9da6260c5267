//! Widget models and the ordered widget store.

mod model;
mod store;

pub use model::{Widget, WidgetCreate, WidgetUpdate};
pub use store::WidgetStore;
