//! Small display helpers shared by models and the cache layer.

pub mod format;

pub use format::{relative_age_from_minutes, truncate_string};
