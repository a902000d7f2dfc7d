use chrono::{DateTime, Duration, Utc};

/// The first instant of a trailing window of `period_days` days ending at `as_of`.
///
/// A window reaching past the earliest representable date starts there, so it
/// covers all history.
pub fn window_start(as_of: DateTime<Utc>, period_days: u32) -> DateTime<Utc> {
    as_of
        .checked_sub_signed(Duration::days(i64::from(period_days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Whether `timestamp` lies inside `[as_of - period_days, as_of]`. Both ends are inclusive.
pub fn in_trailing_window(timestamp: DateTime<Utc>, period_days: u32, as_of: DateTime<Utc>) -> bool {
    timestamp >= window_start(as_of, period_days) && timestamp <= as_of
}
