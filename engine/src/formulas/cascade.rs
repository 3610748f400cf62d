//! Velocity cascade
//!
//! A composite acceleration index across several timeframes.
//!
//! ## What it answers
//! > "Is the pump speeding up as the window shrinks — i.e. is the move
//! > accelerating into the present?"
//!
//! Velocity is computed for each configured `{t1, t3, d}` triple; the
//! shortest and the longest timeframes are compared:
//!
//! ```text
//! velocity_cascade = (v_shortest - v_longest) / max(|v_shortest|, |v_longest|)
//! ```
//!
//! Positive means the short-window velocity exceeds the long-window one:
//! acceleration. Both velocities at exactly zero reads as 0 (flat, not
//! unknown). Any NotReady triple makes the whole cascade NotReady.

use market::buffer::SymbolSeries;

use crate::formulas::velocity;
use crate::spec::CascadeParams;
use crate::value::IndicatorValue;

pub fn compute(series: &SymbolSeries, now_ms: u64, p: &CascadeParams) -> IndicatorValue {
    if p.triples.len() < 2 {
        return IndicatorValue::NotReady;
    }

    let mut ordered: Vec<_> = p.triples.iter().collect();
    ordered.sort_by_key(|w| w.t1_s);

    let shortest = velocity::compute(series, now_ms, ordered[0]);
    let longest = velocity::compute(series, now_ms, ordered[ordered.len() - 1]);

    match (shortest, longest) {
        (IndicatorValue::Ready(s), IndicatorValue::Ready(l)) => {
            let denom = s.abs().max(l.abs());
            if denom == 0.0 {
                IndicatorValue::Ready(0.0)
            } else {
                IndicatorValue::Ready((s - l) / denom)
            }
        }
        _ => IndicatorValue::NotReady,
    }
}
