//! Velocity stabilization index
//!
//! Dispersion of the last N velocity readings, normalized by their mean
//! magnitude:
//!
//! ```text
//! velocity_stabilization_index = stddev(samples) / mean(|samples|)
//! ```
//!
//! Lower means more stable. A dump that has truly finished stops producing
//! wild velocity swings — this is the "is it over?" confirmation the close
//! gate leans on.
//!
//! ## State
//! Unlike the other formulas this one carries state: a ring of the last N
//! velocity samples, one per refresh. NotReady velocities are not recorded
//! (a gap is not a zero), and the index stays NotReady until the ring is
//! full or while the mean magnitude is zero.

use std::collections::VecDeque;

use market::buffer::SymbolSeries;

use crate::formulas::velocity;
use crate::spec::StabilizationParams;
use crate::value::IndicatorValue;

#[derive(Default)]
pub struct StabilizationState {
    samples: VecDeque<f64>,
}

impl StabilizationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(
        &mut self,
        series: &SymbolSeries,
        now_ms: u64,
        p: &StabilizationParams,
    ) -> IndicatorValue {
        if let IndicatorValue::Ready(v) = velocity::compute(series, now_ms, &p.velocity) {
            self.samples.push_back(v);
            while self.samples.len() > p.samples {
                self.samples.pop_front();
            }
        }

        if self.samples.len() < p.samples {
            return IndicatorValue::NotReady;
        }

        let n = self.samples.len() as f64;
        let mean = self.samples.iter().sum::<f64>() / n;
        let variance = self
            .samples
            .iter()
            .map(|x| (x - mean) * (x - mean))
            .sum::<f64>()
            / n;
        let mean_abs = self.samples.iter().map(|x| x.abs()).sum::<f64>() / n;

        if mean_abs == 0.0 {
            return IndicatorValue::NotReady;
        }
        IndicatorValue::Ready(variance.sqrt() / mean_abs)
    }
}
