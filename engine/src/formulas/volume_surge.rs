//! Volume surge ratio
//!
//! Current average volume against the *median* baseline volume. The median
//! keeps one earlier spike from inflating the baseline and masking a real
//! surge.
//!
//! ```text
//! volume_surge_ratio = volume_avg(now-t2, now-t1) / volume_median(now-t4, now-t3)
//! ```
//!
//! A degenerate baseline (median 0) makes the reading NotReady — a ratio
//! against nothing is not a signal.

use market::buffer::SymbolSeries;

use crate::spec::VolumeSurgeParams;
use crate::value::IndicatorValue;

pub fn compute(series: &SymbolSeries, now_ms: u64, p: &VolumeSurgeParams) -> IndicatorValue {
    let (cur_start, cur_end) = p.current(now_ms);
    let (base_start, base_end) = p.baseline(now_ms);

    let current = series.volume_avg(cur_start, cur_end);
    let baseline = series.volume_median(base_start, base_end);

    match (current, baseline) {
        (Some(c), Some(m)) if m > 0.0 => IndicatorValue::Ready(c / m),
        _ => IndicatorValue::NotReady,
    }
}
