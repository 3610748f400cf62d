//! Momentum reversal index
//!
//! How far the current velocity has fallen (or risen) relative to the
//! velocity frozen at entry:
//!
//! ```text
//! momentum_reversal_index = (v_current - v_peak) / |v_peak| * 100
//! ```
//!
//! `v_peak` comes from the entry snapshot and is never recomputed while the
//! instance is live. Deeply negative readings mean the pump has rolled
//! over (the short is working); a high positive reading means the pump is
//! still accelerating against the position — the emergency case.
//!
//! Only meaningful once a position exists: without a snapshot, or with a
//! zero peak, the reading is NotReady.

use market::buffer::SymbolSeries;

use crate::context::EntrySnapshot;
use crate::formulas::velocity;
use crate::spec::ReversalParams;
use crate::value::IndicatorValue;

pub fn compute(
    series: &SymbolSeries,
    now_ms: u64,
    p: &ReversalParams,
    entry: Option<&EntrySnapshot>,
) -> IndicatorValue {
    let Some(entry) = entry else {
        return IndicatorValue::NotReady;
    };
    if entry.peak_velocity == 0.0 {
        return IndicatorValue::NotReady;
    }

    velocity::compute(series, now_ms, &p.velocity)
        .map(|v| (v - entry.peak_velocity) / entry.peak_velocity.abs() * 100.0)
}
