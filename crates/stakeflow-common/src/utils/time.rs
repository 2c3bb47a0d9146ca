use {
    chrono::{DateTime, Utc},
    std::time::Duration,
};

use crate::types::PendingChange;

pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Whether a pending change's cooldown has run out at `now`.
pub fn has_taken_effect(change: &PendingChange, now: DateTime<Utc>) -> bool {
    change.effective_time() <= now
}

/// Time left until a pending change takes effect; zero once it has.
pub fn cooldown_remaining(change: &PendingChange, now: DateTime<Utc>) -> Duration {
    (change.effective_time() - now).to_std().unwrap_or_default()
}
