//! Pump magnitude
//!
//! Measures **how far the price has run above its recent baseline**.
//!
//! ## What it answers
//! > "Is this symbol being pumped right now, and by how much?"
//!
//! ## Definition
//!
//! ```text
//! pump_magnitude_pct = (TWPA(now-t1, now) - TWPA(now-t3-d, now-t3))
//!                      / TWPA(now-t3-d, now-t3) * 100
//! ```
//!
//! The current window is the last `t1` seconds; the baseline is a `d`-second
//! stretch displaced `t3` seconds into the past. `t1 < t3` so the two never
//! overlap into a self-comparison.
//!
//! ## Readiness
//! Either window with fewer than 2 ticks, or a non-positive baseline price,
//! makes the reading NotReady.

use market::buffer::SymbolSeries;

use crate::spec::PumpWindows;
use crate::value::IndicatorValue;

pub fn compute(series: &SymbolSeries, now_ms: u64, w: &PumpWindows) -> IndicatorValue {
    let (cur_start, cur_end) = w.current(now_ms);
    let (base_start, base_end) = w.baseline(now_ms);

    let current = series.twpa(cur_start, cur_end);
    let baseline = series.twpa(base_start, base_end);

    match (current, baseline) {
        (Some(c), Some(b)) if b > 0.0 => IndicatorValue::Ready((c - b) / b * 100.0),
        _ => IndicatorValue::NotReady,
    }
}
