use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock milliseconds since the Unix epoch.
///
/// Used for stamping boundary messages and observability events. Deadline
/// scheduling must NOT use this: runtime timers are driven by tokio's
/// monotonic clock, so system-clock adjustments cannot fire or starve them.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
