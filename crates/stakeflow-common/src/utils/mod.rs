//! Utility functions and helpers

mod time;

pub use time::{cooldown_remaining, current_timestamp, format_timestamp, has_taken_effect};
