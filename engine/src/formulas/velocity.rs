//! Price velocity
//!
//! The pump magnitude normalized by the length of its current window:
//! percent gained per second. A pump at +15% over a 10-second window is a
//! very different animal from +15% over five minutes.
//!
//! ```text
//! price_velocity = pump_magnitude_pct(t1, t3, d) / t1   (%/s)
//! ```

use market::buffer::SymbolSeries;

use crate::formulas::pump;
use crate::spec::PumpWindows;
use crate::value::IndicatorValue;

pub fn compute(series: &SymbolSeries, now_ms: u64, w: &PumpWindows) -> IndicatorValue {
    pump::compute(series, now_ms, w).map(|magnitude| magnitude / w.t1_s as f64)
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

    #[test]
    fn divides_magnitude_by_window_seconds() {
        let mut s = SymbolSeries::new(Symbol::from("PUMP"));
        for t in (0..=60).step_by(10) {
            s.append(tick(t, 1.00)).unwrap();
        }
        for t in (110..=120).step_by(2) {
            s.append(tick(t, 1.20)).unwrap();
        }

        let w = PumpWindows {
            t1_s: 10,
            t3_s: 60,
            d_s: 60,
        };

        // +20% over a 10s window -> 2 %/s.
        let v = compute(&s, ms(120), &w).value().unwrap();
        assert!((v - 2.0).abs() < 1e-6, "got {v}");
    }

    #[test]
    fn not_ready_propagates_from_magnitude() {
        let s = SymbolSeries::new(Symbol::from("PUMP"));
        let w = PumpWindows {
            t1_s: 10,
            t3_s: 60,
            d_s: 60,
        };

        assert_eq!(compute(&s, ms(120), &w), IndicatorValue::NotReady);
    }
}
