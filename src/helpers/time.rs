use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Wall-clock moment `ttl` from now, for log lines.
pub fn wall_clock_after(ttl: Duration) -> DateTime<Utc> {
    let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero());
    Utc::now() + ttl
}

pub fn get_instant() -> Instant {
    Instant::now()
}
