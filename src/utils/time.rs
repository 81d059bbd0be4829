use std::time::{SystemTime, UNIX_EPOCH};

/// Wall clock in unix milliseconds, the unit of every `expire_ts` column.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// Wall clock in fractional unix seconds with microsecond precision, as printed by `MONITOR`.
pub fn now_secs_f64() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

/// Absolute expiration `millis` from now, `None` on overflow.
pub fn millis_from_now(millis: i64) -> Option<i64> {
    now_millis().checked_add(millis)
}
