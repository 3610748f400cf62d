//! Dump exhaustion score
//!
//! A 0–100 composite asking: **"is the dump finished?"** Four boolean
//! sub-factors each contribute fixed points when their threshold holds:
//!
//! | factor               | condition                                   | default pts |
//! |----------------------|---------------------------------------------|-------------|
//! | velocity stalled     | |velocity| ≤ `velocity_calm_max`            | 30 |
//! | volume normalized    | current avg < baseline median × ratio       | 25 |
//! | retracement depth    | drop from entry peak ≥ `retracement_min_pct`| 25 |
//! | bid support returned | imbalance > `imbalance_min`                 | 20 |
//!
//! Weights are per-strategy config (validated to sum to 100). Any
//! sub-factor whose inputs are NotReady makes the whole score NotReady —
//! a partial score would understate exhaustion exactly when data is thin.
//!
//! Requires the entry snapshot: retracement is measured from the frozen
//! entry peak price.

use market::buffer::SymbolSeries;

use crate::context::EntrySnapshot;
use crate::formulas::velocity;
use crate::spec::ExhaustionParams;
use crate::value::IndicatorValue;

pub fn compute(
    series: &SymbolSeries,
    now_ms: u64,
    p: &ExhaustionParams,
    entry: Option<&EntrySnapshot>,
) -> IndicatorValue {
    let Some(entry) = entry else {
        return IndicatorValue::NotReady;
    };
    IndicatorValue::from(score(series, now_ms, p, entry))
}

fn score(
    series: &SymbolSeries,
    now_ms: u64,
    p: &ExhaustionParams,
    entry: &EntrySnapshot,
) -> Option<f64> {
    if entry.entry_price <= 0.0 {
        return None;
    }

    let v = velocity::compute(series, now_ms, &p.velocity).value()?;

    let (cur_start, cur_end) = p.volume.current(now_ms);
    let (base_start, base_end) = p.volume.baseline(now_ms);
    let current_volume = series.volume_avg(cur_start, cur_end)?;
    let baseline_volume = series.volume_median(base_start, base_end)?;

    let price = series.latest().map(|t| t.price)?;
    let retracement_pct = (entry.entry_price - price) / entry.entry_price * 100.0;

    let imb_start = now_ms.saturating_sub(p.imbalance_window_s * 1000);
    let imbalance = series.imbalance(imb_start, now_ms)?;

    let w = &p.weights;
    let mut points = 0u32;
    if v.abs() <= p.velocity_calm_max {
        points += w.velocity;
    }
    if current_volume < baseline_volume * p.volume_normal_ratio {
        points += w.volume;
    }
    if retracement_pct >= p.retracement_min_pct {
        points += w.retracement;
    }
    if imbalance > p.imbalance_min {
        points += w.imbalance;
    }

    Some(points as f64)
}
