//! Client-side state stores

mod inbox;
mod search_filters;

pub use inbox::InboxState;
pub use search_filters::{SearchFilterStore, ViewMode};
