//! Per-symbol rolling tick storage and windowed analytics.
//!
//! `SymbolSeries` holds one symbol's tick history in time-ascending order
//! and answers the windowed queries the indicator layer is built on:
//! time-weighted average price, volume statistics, order-book imbalance,
//! and historical extrema.
//!
//! ## Window convention
//!
//! All queries take absolute `[start_ms, end_ms]` bounds (inclusive). The
//! caller derives them from "now minus offset"; the buffer itself has no
//! notion of the current time beyond its newest tick.
//!
//! ## Readiness guard
//!
//! A window containing fewer than [`MIN_WINDOW_TICKS`] ticks answers `None`.
//! Callers must treat that as "no value yet", never as zero: a half-warm
//! window reporting 0.0 would satisfy (or violate) thresholds it has no
//! business touching.
//!
//! ## Eviction
//!
//! Runs on every append, dropping ticks older than the retention horizon.
//! Config validation sizes retention to cover the longest configured
//! lookback, so eviction can never eat data a live query still needs.

use std::collections::VecDeque;

use thiserror::Error;

use crate::types::{Extremum, Symbol, Tick};

/// Default retention horizon (one hour), matching the longest lookback the
/// support-level queries reach back over.
pub const DEFAULT_MAX_AGE_MS: u64 = 3_600_000;

/// Minimum in-window tick count for a windowed query to produce a value.
pub const MIN_WINDOW_TICKS: usize = 2;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("out-of-order tick for {symbol}: ts {ts_ms} precedes last {last_ts_ms}")]
    NonMonotonicTimestamp {
        symbol: Symbol,
        ts_ms: u64,
        last_ts_ms: u64,
    },
}

/// Ordered tick history for one symbol. Single writer, many readers.
pub struct SymbolSeries {
    symbol: Symbol,
    /// Time-ascending. Front is oldest.
    ticks: VecDeque<Tick>,
    max_age_ms: u64,
}

impl SymbolSeries {
    pub fn new(symbol: Symbol) -> Self {
        Self::with_retention(symbol, DEFAULT_MAX_AGE_MS)
    }

    /// `max_age_ms` must cover every configured lookback window; the config
    /// loader validates that before a series is ever built with it.
    pub fn with_retention(symbol: Symbol, max_age_ms: u64) -> Self {
        Self {
            symbol,
            ticks: VecDeque::new(),
            max_age_ms,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn latest(&self) -> Option<&Tick> {
        self.ticks.back()
    }

    /// Append one tick. Timestamps must be non-decreasing per symbol;
    /// a tick older than the newest stored one is rejected.
    pub fn append(&mut self, tick: Tick) -> Result<(), IngestError> {
        if let Some(last) = self.ticks.back() {
            if tick.ts_ms < last.ts_ms {
                return Err(IngestError::NonMonotonicTimestamp {
                    symbol: self.symbol.clone(),
                    ts_ms: tick.ts_ms,
                    last_ts_ms: last.ts_ms,
                });
            }
        }

        let now_ms = tick.ts_ms;
        self.ticks.push_back(tick);
        self.evict_old(now_ms);
        Ok(())
    }

    /// Drop ticks older than the retention horizon.
    fn evict_old(&mut self, now_ms: u64) {
        while let Some(front) = self.ticks.front() {
            if now_ms.saturating_sub(front.ts_ms) > self.max_age_ms {
                self.ticks.pop_front();
            } else {
                break;
            }
        }
    }

    fn in_window<'a>(
        &'a self,
        start_ms: u64,
        end_ms: u64,
    ) -> impl Iterator<Item = &'a Tick> + 'a {
        self.ticks
            .iter()
            .filter(move |t| t.ts_ms >= start_ms && t.ts_ms <= end_ms)
    }

    /// Whether `[start_ms, end_ms]` holds enough ticks to answer queries.
    pub fn ready(&self, start_ms: u64, end_ms: u64) -> bool {
        self.in_window(start_ms, end_ms).take(MIN_WINDOW_TICKS).count() >= MIN_WINDOW_TICKS
    }

    /// Time-weighted average price over `[start_ms, end_ms]`.
    ///
    /// Each price is weighted by how long it held until the next tick,
    /// clamped to the window edges. The price in force at window start (the
    /// last tick at or before `start_ms`) participates for the stretch
    /// before the first in-window tick; the final price holds to `end_ms`.
    pub fn twpa(&self, start_ms: u64, end_ms: u64) -> Option<f64> {
        if end_ms <= start_ms || !self.ready(start_ms, end_ms) {
            return None;
        }

        let mut weighted = 0.0;
        let mut total = 0.0;
        let mut prev: Option<(u64, f64)> = None;

        for t in &self.ticks {
            if t.ts_ms > end_ms {
                break;
            }
            if let Some((from, price)) = prev {
                let seg_start = from.max(start_ms);
                let seg_end = t.ts_ms.min(end_ms);
                if seg_end > seg_start {
                    let w = (seg_end - seg_start) as f64;
                    weighted += price * w;
                    total += w;
                }
            }
            prev = Some((t.ts_ms, t.price));
        }

        // Last observed price holds until the window closes.
        if let Some((from, price)) = prev {
            let seg_start = from.max(start_ms);
            if end_ms > seg_start {
                let w = (end_ms - seg_start) as f64;
                weighted += price * w;
                total += w;
            }
        }

        if total > 0.0 { Some(weighted / total) } else { None }
    }

    pub fn volume_sum(&self, start_ms: u64, end_ms: u64) -> Option<f64> {
        if !self.ready(start_ms, end_ms) {
            return None;
        }
        Some(self.in_window(start_ms, end_ms).map(|t| t.volume).sum())
    }

    pub fn volume_avg(&self, start_ms: u64, end_ms: u64) -> Option<f64> {
        if !self.ready(start_ms, end_ms) {
            return None;
        }
        let (mut sum, mut count) = (0.0, 0u32);
        for t in self.in_window(start_ms, end_ms) {
            sum += t.volume;
            count += 1;
        }
        Some(sum / count as f64)
    }

    pub fn volume_median(&self, start_ms: u64, end_ms: u64) -> Option<f64> {
        if !self.ready(start_ms, end_ms) {
            return None;
        }
        let mut volumes: Vec<f64> = self.in_window(start_ms, end_ms).map(|t| t.volume).collect();
        volumes.sort_by(|a, b| a.total_cmp(b));
        let mid = volumes.len() / 2;
        if volumes.len() % 2 == 1 {
            Some(volumes[mid])
        } else {
            Some((volumes[mid - 1] + volumes[mid]) / 2.0)
        }
    }

    /// Mean order-book imbalance over the window. Ticks with an empty book
    /// on both sides contribute nothing.
    pub fn imbalance(&self, start_ms: u64, end_ms: u64) -> Option<f64> {
        if !self.ready(start_ms, end_ms) {
            return None;
        }
        let (mut sum, mut count) = (0.0, 0u32);
        for imb in self.in_window(start_ms, end_ms).filter_map(Tick::imbalance) {
            sum += imb;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        Some(sum / count as f64)
    }

    /// Min/max trade price over the window. Used for support/resistance
    /// lookups over long historical stretches.
    pub fn extremum(&self, start_ms: u64, end_ms: u64, kind: Extremum) -> Option<f64> {
        if !self.ready(start_ms, end_ms) {
            return None;
        }
        let prices = self.in_window(start_ms, end_ms).map(|t| t.price);
        match kind {
            Extremum::Min => prices.fold(None, |acc: Option<f64>, p| {
                Some(acc.map_or(p, |a| a.min(p)))
            }),
            Extremum::Max => prices.fold(None, |acc: Option<f64>, p| {
                Some(acc.map_or(p, |a| a.max(p)))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QuoteLevel;

    fn ms(n: u64) -> u64 {
        n * 1000
    }

    fn tick(ts_s: u64, price: f64, volume: f64) -> Tick {
        Tick {
            symbol: Symbol::from("PUMP"),
            ts_ms: ms(ts_s),
            price,
            volume,
            bid: QuoteLevel::new(price - 0.01, 10.0),
            ask: QuoteLevel::new(price + 0.01, 10.0),
        }
    }

    fn tick_with_book(ts_s: u64, price: f64, bid_size: f64, ask_size: f64) -> Tick {
        Tick {
            symbol: Symbol::from("PUMP"),
            ts_ms: ms(ts_s),
            price,
            volume: 1.0,
            bid: QuoteLevel::new(price - 0.01, bid_size),
            ask: QuoteLevel::new(price + 0.01, ask_size),
        }
    }

    fn series(ticks: Vec<Tick>) -> SymbolSeries {
        let mut s = SymbolSeries::new(Symbol::from("PUMP"));
        for t in ticks {
            s.append(t).unwrap();
        }
        s
    }

    #[test]
    fn fewer_than_two_ticks_is_not_ready() {
        let s = series(vec![tick(0, 100.0, 1.0)]);

        assert!(s.twpa(0, ms(10)).is_none());
        assert!(s.volume_sum(0, ms(10)).is_none());
        assert!(s.volume_median(0, ms(10)).is_none());
        assert!(s.imbalance(0, ms(10)).is_none());
        assert!(s.extremum(0, ms(10), Extremum::Min).is_none());
    }

    #[test]
    fn twpa_weights_prices_by_holding_time() {
        // 100 holds for 10s, then 200 holds for 10s -> 150.
        let s = series(vec![tick(0, 100.0, 1.0), tick(10, 200.0, 1.0)]);

        let v = s.twpa(0, ms(20)).unwrap();
        assert!((v - 150.0).abs() < 1e-9);
    }

    #[test]
    fn twpa_is_not_a_plain_average() {
        // 100 holds 18s, 200 holds 2s -> weighted toward 100.
        let s = series(vec![tick(0, 100.0, 1.0), tick(18, 200.0, 1.0)]);

        let v = s.twpa(0, ms(20)).unwrap();
        assert!((v - 110.0).abs() < 1e-9);
    }

    #[test]
    fn twpa_carries_price_in_force_at_window_start() {
        // Tick before the window sets the price in force; two ticks inside.
        let s = series(vec![
            tick(0, 100.0, 1.0),
            tick(12, 300.0, 1.0),
            tick(16, 300.0, 1.0),
        ]);

        // Window [10s, 20s]: 100 holds 10..12, 300 holds 12..20.
        let v = s.twpa(ms(10), ms(20)).unwrap();
        assert!((v - 260.0).abs() < 1e-9);
    }

    #[test]
    fn out_of_order_tick_is_rejected() {
        let mut s = series(vec![tick(0, 100.0, 1.0), tick(10, 101.0, 1.0)]);

        let err = s.append(tick(5, 99.0, 1.0)).unwrap_err();
        assert!(matches!(err, IngestError::NonMonotonicTimestamp { .. }));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn equal_timestamps_are_accepted() {
        let mut s = series(vec![tick(0, 100.0, 1.0)]);
        assert!(s.append(tick(0, 100.5, 1.0)).is_ok());
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn eviction_drops_ticks_past_retention() {
        let mut s = SymbolSeries::with_retention(Symbol::from("PUMP"), ms(30));
        s.append(tick(0, 100.0, 1.0)).unwrap();
        s.append(tick(10, 101.0, 1.0)).unwrap();
        s.append(tick(50, 102.0, 1.0)).unwrap();

        // t=0 and t=10 are both older than 30s at t=50.
        assert_eq!(s.len(), 1);
        assert_eq!(s.latest().unwrap().ts_ms, ms(50));
    }

    #[test]
    fn volume_median_odd_and_even() {
        let s = series(vec![
            tick(0, 100.0, 5.0),
            tick(1, 100.0, 1.0),
            tick(2, 100.0, 3.0),
        ]);
        assert_eq!(s.volume_median(0, ms(10)).unwrap(), 3.0);

        let s = series(vec![
            tick(0, 100.0, 5.0),
            tick(1, 100.0, 1.0),
            tick(2, 100.0, 3.0),
            tick(3, 100.0, 7.0),
        ]);
        assert_eq!(s.volume_median(0, ms(10)).unwrap(), 4.0);
    }

    #[test]
    fn imbalance_averages_per_tick_readings() {
        // Fully bid-heavy then fully ask-heavy -> net zero.
        let s = series(vec![
            tick_with_book(0, 100.0, 10.0, 0.0),
            tick_with_book(1, 100.0, 0.0, 10.0),
        ]);
        let v = s.imbalance(0, ms(10)).unwrap();
        assert!(v.abs() < 1e-9);
    }

    #[test]
    fn extremum_finds_window_bounds() {
        let s = series(vec![
            tick(0, 100.0, 1.0),
            tick(5, 80.0, 1.0),
            tick(10, 120.0, 1.0),
        ]);

        assert_eq!(s.extremum(0, ms(10), Extremum::Min).unwrap(), 80.0);
        assert_eq!(s.extremum(0, ms(10), Extremum::Max).unwrap(), 120.0);
        // Window excludes the spike.
        assert_eq!(s.extremum(0, ms(6), Extremum::Max).unwrap(), 100.0);
    }

    #[test]
    fn queries_ignore_ticks_outside_window() {
        let s = series(vec![
            tick(0, 100.0, 10.0),
            tick(5, 100.0, 10.0),
            tick(20, 100.0, 1.0),
            tick(25, 100.0, 1.0),
        ]);

        assert_eq!(s.volume_sum(ms(20), ms(30)).unwrap(), 2.0);
        assert_eq!(s.volume_sum(0, ms(10)).unwrap(), 20.0);
    }
}
