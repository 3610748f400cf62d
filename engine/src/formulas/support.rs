//! Support level proximity
//!
//! How close the price has fallen toward its pre-pump support:
//!
//! ```text
//! support_level_proximity = (price - support) / support * 100
//! ```
//!
//! `support` is the minimum bucketed TWPA over a long historical window
//! ending at the entry timestamp — the floor the market kept bouncing off
//! *before* the pump started. Using bucketed TWPAs rather than a raw tick
//! minimum keeps a single stray print from defining the level.
//!
//! A reading near zero means the dump has retraced the whole pump; that is
//! a cover signal for the short.

use market::buffer::SymbolSeries;

use crate::context::EntrySnapshot;
use crate::spec::SupportParams;
use crate::value::IndicatorValue;

pub fn compute(
    series: &SymbolSeries,
    _now_ms: u64,
    p: &SupportParams,
    entry: Option<&EntrySnapshot>,
) -> IndicatorValue {
    let Some(entry) = entry else {
        return IndicatorValue::NotReady;
    };

    let end = entry.entry_ts_ms;
    let start = end.saturating_sub(p.lookback_s * 1000);
    let bucket_ms = p.bucket_s * 1000;

    let mut support: Option<f64> = None;
    let mut bucket_start = start;
    while bucket_start < end {
        let bucket_end = (bucket_start + bucket_ms).min(end);
        if let Some(twpa) = series.twpa(bucket_start, bucket_end) {
            support = Some(support.map_or(twpa, |s| s.min(twpa)));
        }
        bucket_start = bucket_end;
    }

    let support = match support {
        Some(s) if s > 0.0 => s,
        _ => return IndicatorValue::NotReady,
    };
    let Some(price) = series.latest().map(|t| t.price) else {
        return IndicatorValue::NotReady;
    };

    IndicatorValue::Ready((price - support) / support * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use market::types::{QuoteLevel, Symbol, Tick};

    fn ms(n: u64) -> u64 {
        n * 1000
    }

    fn tick(ts_s: u64, price: f64) -> Tick {
        Tick {
            symbol: Symbol::from("PUMP"),
            ts_ms: ms(ts_s),
            price,
            volume: 1.0,
            bid: QuoteLevel::new(price, 10.0),
            ask: QuoteLevel::new(price, 10.0),
        }
    }

    fn params() -> SupportParams {
        SupportParams {
            lookback_s: 600,
            bucket_s: 60,
        }
    }

    fn entry() -> EntrySnapshot {
        EntrySnapshot {
            entry_ts_ms: ms(600),
            entry_price: 1.50,
            peak_velocity: 2.0,
        }
    }

    /// Pre-entry history over [0s, 600s] oscillating between 1.00 and
    /// 1.10, so the support floor sits at 1.00.
    fn with_history(last_price: f64, last_ts_s: u64) -> SymbolSeries {
        let mut s = SymbolSeries::new(Symbol::from("PUMP"));
        for t in (0..600).step_by(15) {
            let price = if (t / 60) % 2 == 0 { 1.00 } else { 1.10 };
            s.append(tick(t, price)).unwrap();
        }
        s.append(tick(last_ts_s, last_price)).unwrap();
        s
    }

    #[test]
    fn proximity_is_percent_above_the_floor() {
        let s = with_history(1.02, 650);

        let v = compute(&s, ms(650), &params(), Some(&entry())).value().unwrap();
        assert!((v - 2.0).abs() < 1e-6, "got {v}");
    }

    #[test]
    fn price_at_the_floor_reads_zero() {
        let s = with_history(1.00, 650);

        let v = compute(&s, ms(650), &params(), Some(&entry())).value().unwrap();
        assert!(v.abs() < 1e-6, "got {v}");
    }

    #[test]
    fn a_single_stray_print_does_not_define_support() {
        let mut s = SymbolSeries::new(Symbol::from("PUMP"));
        for t in (0..600).step_by(15) {
            s.append(tick(t, 1.00)).unwrap();
        }
        // One flash print far below, inside an otherwise 1.00 bucket.
        s.append(tick(599, 0.10)).unwrap();
        s.append(tick(650, 1.00)).unwrap();

        let v = compute(&s, ms(650), &params(), Some(&entry())).value().unwrap();
        // Bucketed TWPA keeps the 0.10 print from dragging support to 0.10:
        // proximity stays near the 1.00 floor, nowhere near +900%.
        assert!(v < 10.0, "stray print defined support: {v}");
        assert!(v >= 0.0);
    }

    #[test]
    fn not_ready_without_a_position_or_history() {
        let s = with_history(1.02, 650);
        assert_eq!(compute(&s, ms(650), &params(), None), IndicatorValue::NotReady);

        let empty = SymbolSeries::new(Symbol::from("PUMP"));
        assert_eq!(
            compute(&empty, ms(650), &params(), Some(&entry())),
            IndicatorValue::NotReady
        );
    }
}
