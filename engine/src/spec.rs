//! Static indicator definitions.
//!
//! Each `IndicatorSpec` names one derived metric: a formula kind, the
//! window parameters that feed it, and its own refresh cadence. Specs are
//! loaded from config, validated whole, and immutable for the run.
//!
//! The formula set is closed (eight kinds, one tagged variant each);
//! dispatch is a match, not open-ended dynamic dispatch.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorId(String);

impl IndicatorId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IndicatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IndicatorId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("indicator {id}: current window t1={t1_s}s must be shorter than baseline offset t3={t3_s}s")]
    WindowOrder { id: IndicatorId, t1_s: u64, t3_s: u64 },

    #[error("indicator {id}: window spans must be non-zero")]
    ZeroWindow { id: IndicatorId },

    #[error("indicator {id}: velocity cascade needs at least 2 timeframe triples, got {got}")]
    CascadeTooFew { id: IndicatorId, got: usize },

    #[error("indicator {id}: stabilization needs at least 2 velocity samples, got {got}")]
    TooFewSamples { id: IndicatorId, got: usize },

    #[error("indicator {id}: refresh interval must be non-zero")]
    ZeroRefresh { id: IndicatorId },

    #[error("indicator {id}: {field} must be non-negative")]
    NegativeParam {
        id: IndicatorId,
        field: &'static str,
    },

    #[error("indicator {id}: exhaustion weights must sum to 100, got {got}")]
    BadWeights { id: IndicatorId, got: u32 },
}

/// The `{t1, t3, d}` timeframe triple driving pump/velocity formulas.
///
/// Current window: `[now - t1, now]`. Baseline: `[now - t3 - d, now - t3]`.
/// `t1 < t3` is a hard config invariant — the current window must be
/// strictly shorter than the baseline lookback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PumpWindows {
    pub t1_s: u64,
    pub t3_s: u64,
    pub d_s: u64,
}

impl PumpWindows {
    pub fn current(&self, now_ms: u64) -> (u64, u64) {
        (now_ms.saturating_sub(self.t1_s * 1000), now_ms)
    }

    pub fn baseline(&self, now_ms: u64) -> (u64, u64) {
        (
            now_ms.saturating_sub((self.t3_s + self.d_s) * 1000),
            now_ms.saturating_sub(self.t3_s * 1000),
        )
    }

    pub fn max_lookback_s(&self) -> u64 {
        self.t3_s + self.d_s
    }

    fn validate(&self, id: &IndicatorId) -> Result<(), SpecError> {
        if self.t1_s == 0 || self.d_s == 0 {
            return Err(SpecError::ZeroWindow { id: id.clone() });
        }
        if self.t1_s >= self.t3_s {
            return Err(SpecError::WindowOrder {
                id: id.clone(),
                t1_s: self.t1_s,
                t3_s: self.t3_s,
            });
        }
        Ok(())
    }
}

/// Volume comparison windows: current average over `[now - t2, now - t1]`
/// against the median over the baseline `[now - t4, now - t3]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeSurgeParams {
    pub t1_s: u64,
    pub t2_s: u64,
    pub t3_s: u64,
    pub t4_s: u64,
}

impl VolumeSurgeParams {
    pub fn current(&self, now_ms: u64) -> (u64, u64) {
        (
            now_ms.saturating_sub(self.t2_s * 1000),
            now_ms.saturating_sub(self.t1_s * 1000),
        )
    }

    pub fn baseline(&self, now_ms: u64) -> (u64, u64) {
        (
            now_ms.saturating_sub(self.t4_s * 1000),
            now_ms.saturating_sub(self.t3_s * 1000),
        )
    }

    pub fn max_lookback_s(&self) -> u64 {
        self.t4_s
    }

    fn validate(&self, id: &IndicatorId) -> Result<(), SpecError> {
        if self.t1_s >= self.t2_s || self.t3_s >= self.t4_s {
            return Err(SpecError::ZeroWindow { id: id.clone() });
        }
        if self.t1_s >= self.t3_s {
            return Err(SpecError::WindowOrder {
                id: id.clone(),
                t1_s: self.t1_s,
                t3_s: self.t3_s,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeParams {
    /// Timeframe triples, shortest first once validated.
    pub triples: Vec<PumpWindows>,
}

impl CascadeParams {
    fn validate(&self, id: &IndicatorId) -> Result<(), SpecError> {
        if self.triples.len() < 2 {
            return Err(SpecError::CascadeTooFew {
                id: id.clone(),
                got: self.triples.len(),
            });
        }
        for t in &self.triples {
            t.validate(id)?;
        }
        Ok(())
    }

    fn max_lookback_s(&self) -> u64 {
        self.triples.iter().map(PumpWindows::max_lookback_s).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReversalParams {
    pub velocity: PumpWindows,
}

/// Point weights for the four dump-exhaustion sub-factors. Tunable per
/// strategy; the 30/25/25/20 split is the shipped default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExhaustionWeights {
    pub velocity: u32,
    pub volume: u32,
    pub retracement: u32,
    pub imbalance: u32,
}

impl Default for ExhaustionWeights {
    fn default() -> Self {
        Self {
            velocity: 30,
            volume: 25,
            retracement: 25,
            imbalance: 20,
        }
    }
}

impl ExhaustionWeights {
    pub fn total(&self) -> u32 {
        self.velocity + self.volume + self.retracement + self.imbalance
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExhaustionParams {
    pub velocity: PumpWindows,
    /// |velocity| at or under this means the pump has stalled.
    pub velocity_calm_max: f64,
    pub volume: VolumeSurgeParams,
    /// Current volume below baseline × ratio counts as normalized.
    pub volume_normal_ratio: f64,
    /// Minimum drop from the entry peak, in percent of the peak.
    pub retracement_min_pct: f64,
    pub imbalance_window_s: u64,
    /// Imbalance above this reads as returning bid support.
    pub imbalance_min: f64,
    #[serde(default)]
    pub weights: ExhaustionWeights,
}

impl ExhaustionParams {
    fn validate(&self, id: &IndicatorId) -> Result<(), SpecError> {
        self.velocity.validate(id)?;
        self.volume.validate(id)?;
        if self.imbalance_window_s == 0 {
            return Err(SpecError::ZeroWindow { id: id.clone() });
        }
        if self.velocity_calm_max < 0.0 {
            return Err(SpecError::NegativeParam {
                id: id.clone(),
                field: "velocity_calm_max",
            });
        }
        if self.volume_normal_ratio < 0.0 {
            return Err(SpecError::NegativeParam {
                id: id.clone(),
                field: "volume_normal_ratio",
            });
        }
        if self.retracement_min_pct < 0.0 {
            return Err(SpecError::NegativeParam {
                id: id.clone(),
                field: "retracement_min_pct",
            });
        }
        let total = self.weights.total();
        if total != 100 {
            return Err(SpecError::BadWeights {
                id: id.clone(),
                got: total,
            });
        }
        Ok(())
    }

    fn max_lookback_s(&self) -> u64 {
        self.velocity
            .max_lookback_s()
            .max(self.volume.max_lookback_s())
            .max(self.imbalance_window_s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportParams {
    /// How far back from the entry timestamp the support search reaches.
    pub lookback_s: u64,
    /// Span of each TWPA bucket inside the lookback window.
    #[serde(default = "default_bucket_s")]
    pub bucket_s: u64,
}

fn default_bucket_s() -> u64 {
    60
}

impl SupportParams {
    fn validate(&self, id: &IndicatorId) -> Result<(), SpecError> {
        if self.lookback_s == 0 || self.bucket_s == 0 {
            return Err(SpecError::ZeroWindow { id: id.clone() });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StabilizationParams {
    pub velocity: PumpWindows,
    /// Sample ring size N; the index is NotReady until N velocities exist.
    pub samples: usize,
}

impl StabilizationParams {
    fn validate(&self, id: &IndicatorId) -> Result<(), SpecError> {
        self.velocity.validate(id)?;
        if self.samples < 2 {
            return Err(SpecError::TooFewSamples {
                id: id.clone(),
                got: self.samples,
            });
        }
        Ok(())
    }
}

/// The closed set of formula kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "formula", rename_all = "snake_case")]
pub enum IndicatorKind {
    PumpMagnitudePct(PumpWindows),
    VolumeSurgeRatio(VolumeSurgeParams),
    PriceVelocity(PumpWindows),
    VelocityCascade(CascadeParams),
    MomentumReversalIndex(ReversalParams),
    DumpExhaustionScore(ExhaustionParams),
    SupportLevelProximity(SupportParams),
    VelocityStabilizationIndex(StabilizationParams),
}

impl IndicatorKind {
    pub fn name(&self) -> &'static str {
        match self {
            IndicatorKind::PumpMagnitudePct(_) => "pump_magnitude_pct",
            IndicatorKind::VolumeSurgeRatio(_) => "volume_surge_ratio",
            IndicatorKind::PriceVelocity(_) => "price_velocity",
            IndicatorKind::VelocityCascade(_) => "velocity_cascade",
            IndicatorKind::MomentumReversalIndex(_) => "momentum_reversal_index",
            IndicatorKind::DumpExhaustionScore(_) => "dump_exhaustion_score",
            IndicatorKind::SupportLevelProximity(_) => "support_level_proximity",
            IndicatorKind::VelocityStabilizationIndex(_) => "velocity_stabilization_index",
        }
    }

    pub fn validate(&self, id: &IndicatorId) -> Result<(), SpecError> {
        match self {
            IndicatorKind::PumpMagnitudePct(w) | IndicatorKind::PriceVelocity(w) => {
                w.validate(id)
            }
            IndicatorKind::VolumeSurgeRatio(p) => p.validate(id),
            IndicatorKind::VelocityCascade(p) => p.validate(id),
            IndicatorKind::MomentumReversalIndex(p) => p.velocity.validate(id),
            IndicatorKind::DumpExhaustionScore(p) => p.validate(id),
            IndicatorKind::SupportLevelProximity(p) => p.validate(id),
            IndicatorKind::VelocityStabilizationIndex(p) => p.validate(id),
        }
    }

    /// Longest history this formula reaches back over, for retention sizing.
    pub fn max_lookback_s(&self) -> u64 {
        match self {
            IndicatorKind::PumpMagnitudePct(w) | IndicatorKind::PriceVelocity(w) => {
                w.max_lookback_s()
            }
            IndicatorKind::VolumeSurgeRatio(p) => p.max_lookback_s(),
            IndicatorKind::VelocityCascade(p) => p.max_lookback_s(),
            IndicatorKind::MomentumReversalIndex(p) => p.velocity.max_lookback_s(),
            IndicatorKind::DumpExhaustionScore(p) => p.max_lookback_s(),
            IndicatorKind::SupportLevelProximity(p) => p.lookback_s,
            IndicatorKind::VelocityStabilizationIndex(p) => p.velocity.max_lookback_s(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSpec {
    pub id: IndicatorId,
    pub refresh_ms: u64,
    #[serde(flatten)]
    pub kind: IndicatorKind,
}

impl IndicatorSpec {
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.refresh_ms == 0 {
            return Err(SpecError::ZeroRefresh {
                id: self.id.clone(),
            });
        }
        self.kind.validate(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn windows(t1: u64, t3: u64, d: u64) -> PumpWindows {
        PumpWindows {
            t1_s: t1,
            t3_s: t3,
            d_s: d,
        }
    }

    #[test]
    fn current_window_must_be_shorter_than_baseline_offset() {
        let spec = IndicatorSpec {
            id: IndicatorId::from("pump"),
            refresh_ms: 1000,
            kind: IndicatorKind::PumpMagnitudePct(windows(60, 60, 30)),
        };

        assert!(matches!(
            spec.validate(),
            Err(SpecError::WindowOrder { .. })
        ));
    }

    #[test]
    fn cascade_requires_two_triples() {
        let spec = IndicatorSpec {
            id: IndicatorId::from("cascade"),
            refresh_ms: 1000,
            kind: IndicatorKind::VelocityCascade(CascadeParams {
                triples: vec![windows(10, 60, 30)],
            }),
        };

        assert!(matches!(
            spec.validate(),
            Err(SpecError::CascadeTooFew { got: 1, .. })
        ));
    }

    #[test]
    fn exhaustion_weights_must_sum_to_hundred() {
        let mut params = ExhaustionParams {
            velocity: windows(10, 60, 30),
            velocity_calm_max: 0.5,
            volume: VolumeSurgeParams {
                t1_s: 0,
                t2_s: 60,
                t3_s: 120,
                t4_s: 600,
            },
            volume_normal_ratio: 1.5,
            retracement_min_pct: 30.0,
            imbalance_window_s: 30,
            imbalance_min: 0.2,
            weights: ExhaustionWeights::default(),
        };
        let id = IndicatorId::from("exhaustion");
        assert!(params.validate(&id).is_ok());

        params.weights.velocity = 50;
        assert!(matches!(
            params.validate(&id),
            Err(SpecError::BadWeights { got: 120, .. })
        ));
    }

    #[test]
    fn max_lookback_covers_baseline_and_displacement() {
        let kind = IndicatorKind::PumpMagnitudePct(windows(10, 120, 60));
        assert_eq!(kind.max_lookback_s(), 180);
    }

    #[test]
    fn spec_json_roundtrip_carries_formula_tag() {
        let spec = IndicatorSpec {
            id: IndicatorId::from("pump_1m"),
            refresh_ms: 2000,
            kind: IndicatorKind::PumpMagnitudePct(windows(60, 300, 120)),
        };

        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains("\"formula\":\"pump_magnitude_pct\""));

        let back: IndicatorSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }
}
