//! The eight indicator formulas.
//!
//! Each formula is a pure function of a `SymbolSeries` view, its own window
//! parameters, and (for the position-scoped indicators) the frozen entry
//! snapshot. Anything a formula needs that the buffer cannot answer yet
//! makes the whole reading NotReady — no formula ever substitutes a default.
//!
//! `IndicatorComputer` is the dispatch point: one tagged variant per kind,
//! matched rather than trait-objected, so the set stays closed and the
//! compiler checks exhaustiveness when a kind is added.

pub mod cascade;
pub mod exhaustion;
pub mod pump;
pub mod reversal;
pub mod stabilization;
pub mod support;
pub mod velocity;
pub mod volume_surge;

use market::buffer::SymbolSeries;

use crate::context::EntrySnapshot;
use crate::spec::{
    CascadeParams, ExhaustionParams, IndicatorKind, PumpWindows, ReversalParams,
    StabilizationParams, SupportParams, VolumeSurgeParams,
};
use crate::value::IndicatorValue;

use self::stabilization::StabilizationState;

/// Per-(indicator, symbol) evaluation state. Most kinds are stateless;
/// the stabilization index carries its velocity sample ring.
pub enum IndicatorComputer {
    PumpMagnitude(PumpWindows),
    VolumeSurge(VolumeSurgeParams),
    PriceVelocity(PumpWindows),
    VelocityCascade(CascadeParams),
    MomentumReversal(ReversalParams),
    DumpExhaustion(ExhaustionParams),
    SupportProximity(SupportParams),
    VelocityStabilization {
        params: StabilizationParams,
        state: StabilizationState,
    },
}

impl IndicatorComputer {
    pub fn for_kind(kind: &IndicatorKind) -> Self {
        match kind {
            IndicatorKind::PumpMagnitudePct(w) => IndicatorComputer::PumpMagnitude(*w),
            IndicatorKind::VolumeSurgeRatio(p) => IndicatorComputer::VolumeSurge(*p),
            IndicatorKind::PriceVelocity(w) => IndicatorComputer::PriceVelocity(*w),
            IndicatorKind::VelocityCascade(p) => IndicatorComputer::VelocityCascade(p.clone()),
            IndicatorKind::MomentumReversalIndex(p) => IndicatorComputer::MomentumReversal(*p),
            IndicatorKind::DumpExhaustionScore(p) => IndicatorComputer::DumpExhaustion(*p),
            IndicatorKind::SupportLevelProximity(p) => IndicatorComputer::SupportProximity(*p),
            IndicatorKind::VelocityStabilizationIndex(p) => {
                IndicatorComputer::VelocityStabilization {
                    params: *p,
                    state: StabilizationState::new(),
                }
            }
        }
    }

    pub fn evaluate(
        &mut self,
        series: &SymbolSeries,
        now_ms: u64,
        entry: Option<&EntrySnapshot>,
    ) -> IndicatorValue {
        match self {
            IndicatorComputer::PumpMagnitude(w) => pump::compute(series, now_ms, w),
            IndicatorComputer::VolumeSurge(p) => volume_surge::compute(series, now_ms, p),
            IndicatorComputer::PriceVelocity(w) => velocity::compute(series, now_ms, w),
            IndicatorComputer::VelocityCascade(p) => cascade::compute(series, now_ms, p),
            IndicatorComputer::MomentumReversal(p) => {
                reversal::compute(series, now_ms, p, entry)
            }
            IndicatorComputer::DumpExhaustion(p) => {
                exhaustion::compute(series, now_ms, p, entry)
            }
            IndicatorComputer::SupportProximity(p) => {
                support::compute(series, now_ms, p, entry)
            }
            IndicatorComputer::VelocityStabilization { params, state } => {
                state.observe(series, now_ms, params)
            }
        }
    }
}
