//! Poll slot alignment
//!
//! Exchange history is published in 5-minute buckets aligned to the wall
//! clock, and a bucket is only complete shortly after it closes. Cycles
//! start one minute past a 5-minute boundary.

use chrono::{DateTime, Duration, SubsecRound, Timelike, Utc};

/// Start of the next poll slot strictly after `now`
pub fn next_time_slot(now: DateTime<Utc>) -> DateTime<Utc> {
    let now = now.trunc_subsecs(0);
    let into_bucket = i64::from(now.minute() % 5);
    let until_boundary = (5 - into_bucket) % 5;

    now - Duration::seconds(i64::from(now.second())) + Duration::minutes(until_boundary + 1)
}

/// Time to wait before the first cycle
pub fn delay_until_next_slot(now: DateTime<Utc>) -> std::time::Duration {
    (next_time_slot(now) - now).to_std().unwrap_or_default()
}
