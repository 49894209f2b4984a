//! Edit window for tipster recommendations.
//!
//! A recommendation may be edited or deleted only while its game is at least
//! [`EDIT_CUTOFF_MINUTES`] minutes away.

use chrono::{DateTime, Duration, Utc};

/// Minutes before kick-off after which a recommendation is frozen.
pub const EDIT_CUTOFF_MINUTES: i64 = 30;

/// Returns true iff `game_start - now` is at least the cutoff (inclusive).
#[must_use]
pub fn can_modify(game_start: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    game_start - now >= Duration::minutes(EDIT_CUTOFF_MINUTES)
}

/// Same as [`can_modify`] for a possibly unknown start; unknown never allows.
#[must_use]
pub fn can_modify_opt(game_start: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    game_start.is_some_and(|start| can_modify(start, now))
}

/// Time left until the edit window closes, or `None` if already closed.
#[must_use]
pub fn time_until_lock(game_start: DateTime<Utc>, now: DateTime<Utc>) -> Option<Duration> {
    let remaining = game_start - now - Duration::minutes(EDIT_CUTOFF_MINUTES);
    (remaining >= Duration::zero()).then_some(remaining)
}
