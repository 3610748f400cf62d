//! Strategy configuration.
//!
//! A `StrategyConfig` is one structured document: the indicator specs, the
//! five phase gates, position sizing, timeouts, cooldowns, and the retry
//! schedule. It is validated as a whole before anything is built from it —
//! an invalid document is rejected at load and never partially applied —
//! and is immutable for the run, shared across all symbol instances
//! without synchronization.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use engine::spec::{IndicatorId, IndicatorSpec, SpecError};

use crate::conditions::{ConditionSet, Logic};
use crate::model::StrategyId;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not parse strategy document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error("duplicate indicator id {0}")]
    DuplicateIndicator(IndicatorId),

    #[error("{phase} condition set must not be empty")]
    EmptyConditions { phase: &'static str },

    #[error("{phase} gate must use {expected} logic")]
    WrongLogic {
        phase: &'static str,
        expected: &'static str,
    },

    #[error("{phase} references unknown indicator {id}")]
    UnknownIndicator {
        phase: &'static str,
        id: IndicatorId,
    },

    #[error("sizing fraction must be within (0, 1], got {got}")]
    BadFraction { got: f64 },

    #[error("risk scaling needs low_pct < high_pct, got {low}..{high}")]
    BadRiskRange { low: f64, high: f64 },

    #[error("backoff schedule must not be empty")]
    EmptyBackoff,

    #[error("{field} must be non-zero")]
    ZeroDuration { field: &'static str },

    #[error("retention {got_s}s is shorter than the longest lookback {needed_s}s")]
    RetentionTooShort { needed_s: u64, got_s: u64 },
}

/// S1 — the entry gate. All-logic over the entry indicators, plus the
/// velocity indicator whose reading is frozen into the entry snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryConfig {
    pub conditions: ConditionSet,
    pub velocity_indicator: IndicatorId,
}

/// Z1 — the entry order. A stale entry is not chased: no fill inside the
/// timeout fails the instance outright.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryOrderConfig {
    #[serde(default = "default_entry_timeout_s")]
    pub timeout_s: u64,
}

fn default_entry_timeout_s() -> u64 {
    60
}

/// O1 — cancel while exposure is still pending and the pump keeps
/// accelerating against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelConfig {
    pub conditions: ConditionSet,
    #[serde(default = "default_cancel_window_s")]
    pub window_s: u64,
    #[serde(default = "default_cancel_cooldown_s")]
    pub cooldown_s: u64,
}

fn default_cancel_window_s() -> u64 {
    300
}

fn default_cancel_cooldown_s() -> u64 {
    300
}

/// ZE1 — the close gate. Or-logic: any one exhaustion signal is enough to
/// take the profit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseConfig {
    pub conditions: ConditionSet,
    /// No fill on the flatten order inside this window escalates to the
    /// emergency path.
    #[serde(default = "default_close_timeout_s")]
    pub timeout_s: u64,
    #[serde(default = "default_close_cooldown_s")]
    pub cooldown_s: u64,
}

fn default_close_timeout_s() -> u64 {
    60
}

fn default_close_cooldown_s() -> u64 {
    300
}

/// Emergency — momentum reversal spiking high positive while a position is
/// open preempts every other gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyConfig {
    pub conditions: ConditionSet,
    #[serde(default = "default_emergency_cooldown_s")]
    pub cooldown_s: u64,
}

fn default_emergency_cooldown_s() -> u64 {
    3600
}

/// How the entry order is sized, as a fraction of allocatable capital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PositionSizing {
    Flat {
        fraction: f64,
    },
    /// Linear scale between `min_fraction` and `max_fraction` as the pump
    /// magnitude moves from `low_pct` to `high_pct`, clamped at both ends.
    RiskScaled {
        indicator: IndicatorId,
        min_fraction: f64,
        max_fraction: f64,
        low_pct: f64,
        high_pct: f64,
    },
}

impl PositionSizing {
    pub fn magnitude_indicator(&self) -> Option<&IndicatorId> {
        match self {
            PositionSizing::Flat { .. } => None,
            PositionSizing::RiskScaled { indicator, .. } => Some(indicator),
        }
    }

    /// Size for the given magnitude reading. A missing magnitude falls to
    /// the conservative end, never to zero.
    pub fn size_for(&self, magnitude: Option<f64>) -> f64 {
        match self {
            PositionSizing::Flat { fraction } => *fraction,
            PositionSizing::RiskScaled {
                min_fraction,
                max_fraction,
                low_pct,
                high_pct,
                ..
            } => match magnitude {
                None => *min_fraction,
                Some(m) => {
                    let t = ((m - low_pct) / (high_pct - low_pct)).clamp(0.0, 1.0);
                    min_fraction + t * (max_fraction - min_fraction)
                }
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub id: StrategyId,
    pub indicators: Vec<IndicatorSpec>,
    pub entry: EntryConfig,
    #[serde(default = "default_entry_order")]
    pub entry_order: EntryOrderConfig,
    pub cancel: CancelConfig,
    pub close: CloseConfig,
    pub emergency: EmergencyConfig,
    pub sizing: PositionSizing,
    #[serde(default = "default_backoff_s")]
    pub backoff_s: Vec<u64>,
    /// Tick retention override, seconds. Defaults to the longest configured
    /// lookback with a one-hour floor.
    #[serde(default)]
    pub retention_s: Option<u64>,
}

fn default_entry_order() -> EntryOrderConfig {
    EntryOrderConfig {
        timeout_s: default_entry_timeout_s(),
    }
}

fn default_backoff_s() -> Vec<u64> {
    vec![1, 2, 4]
}

impl StrategyConfig {
    /// Parse and validate one strategy document. Rejection is whole-document:
    /// nothing from a failed load is ever applied.
    pub fn from_json(doc: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(doc)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for spec in &self.indicators {
            spec.validate()?;
        }
        for (i, spec) in self.indicators.iter().enumerate() {
            if self.indicators[..i].iter().any(|s| s.id == spec.id) {
                return Err(ConfigError::DuplicateIndicator(spec.id.clone()));
            }
        }

        self.check_gate("entry", &self.entry.conditions, Some(Logic::And))?;
        self.check_gate("cancel", &self.cancel.conditions, None)?;
        self.check_gate("close", &self.close.conditions, Some(Logic::Or))?;
        self.check_gate("emergency", &self.emergency.conditions, None)?;

        self.check_known("entry", &self.entry.velocity_indicator)?;
        if let Some(id) = self.sizing.magnitude_indicator() {
            self.check_known("sizing", id)?;
        }

        match &self.sizing {
            PositionSizing::Flat { fraction } => check_fraction(*fraction)?,
            PositionSizing::RiskScaled {
                min_fraction,
                max_fraction,
                low_pct,
                high_pct,
                ..
            } => {
                check_fraction(*min_fraction)?;
                check_fraction(*max_fraction)?;
                if low_pct >= high_pct {
                    return Err(ConfigError::BadRiskRange {
                        low: *low_pct,
                        high: *high_pct,
                    });
                }
            }
        }

        if self.backoff_s.is_empty() {
            return Err(ConfigError::EmptyBackoff);
        }
        if self.entry_order.timeout_s == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "entry_order.timeout_s",
            });
        }
        if self.cancel.window_s == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "cancel.window_s",
            });
        }
        if self.close.timeout_s == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "close.timeout_s",
            });
        }

        if let Some(retention_s) = self.retention_s {
            let needed_s = self.max_lookback_s();
            if retention_s < needed_s {
                return Err(ConfigError::RetentionTooShort {
                    needed_s,
                    got_s: retention_s,
                });
            }
        }

        Ok(())
    }

    fn check_gate(
        &self,
        phase: &'static str,
        set: &ConditionSet,
        expected: Option<Logic>,
    ) -> Result<(), ConfigError> {
        if set.conditions.is_empty() {
            return Err(ConfigError::EmptyConditions { phase });
        }
        if let Some(expected_logic) = expected {
            if set.logic != expected_logic {
                let expected = match expected_logic {
                    Logic::And => "and",
                    Logic::Or => "or",
                };
                return Err(ConfigError::WrongLogic { phase, expected });
            }
        }
        for c in &set.conditions {
            self.check_known(phase, &c.indicator)?;
        }
        Ok(())
    }

    fn check_known(&self, phase: &'static str, id: &IndicatorId) -> Result<(), ConfigError> {
        if self.indicators.iter().any(|s| &s.id == id) {
            Ok(())
        } else {
            Err(ConfigError::UnknownIndicator {
                phase,
                id: id.clone(),
            })
        }
    }

    /// Longest history any configured indicator reaches back over.
    pub fn max_lookback_s(&self) -> u64 {
        self.indicators
            .iter()
            .map(|s| s.kind.max_lookback_s())
            .max()
            .unwrap_or(0)
    }

    /// Buffer retention in milliseconds: the configured override, or the
    /// longest lookback with a one-hour floor.
    pub fn retention_ms(&self) -> u64 {
        self.retention_s.unwrap_or_else(|| self.max_lookback_s().max(3600)) * 1000
    }
}

fn check_fraction(fraction: f64) -> Result<(), ConfigError> {
    if fraction > 0.0 && fraction <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::BadFraction { got: fraction })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::{CmpOp, Condition};
    use engine::spec::{IndicatorKind, PumpWindows, VolumeSurgeParams};

    fn spec(id: &str, t1: u64, t3: u64) -> IndicatorSpec {
        IndicatorSpec {
            id: IndicatorId::from(id),
            refresh_ms: 1000,
            kind: IndicatorKind::PumpMagnitudePct(PumpWindows {
                t1_s: t1,
                t3_s: t3,
                d_s: 60,
            }),
        }
    }

    fn gate(logic: Logic, id: &str, op: CmpOp, threshold: f64) -> ConditionSet {
        ConditionSet {
            logic,
            conditions: vec![Condition {
                indicator: IndicatorId::from(id),
                op,
                threshold,
            }],
        }
    }

    fn valid_config() -> StrategyConfig {
        StrategyConfig {
            id: StrategyId::from("hunter-1"),
            indicators: vec![spec("pump", 10, 60), spec("velocity", 10, 120)],
            entry: EntryConfig {
                conditions: gate(Logic::And, "pump", CmpOp::Ge, 10.0),
                velocity_indicator: IndicatorId::from("velocity"),
            },
            entry_order: EntryOrderConfig { timeout_s: 60 },
            cancel: CancelConfig {
                conditions: gate(Logic::And, "velocity", CmpOp::Le, -20.0),
                window_s: 300,
                cooldown_s: 300,
            },
            close: CloseConfig {
                conditions: gate(Logic::Or, "pump", CmpOp::Le, 2.0),
                timeout_s: 60,
                cooldown_s: 300,
            },
            emergency: EmergencyConfig {
                conditions: gate(Logic::Or, "velocity", CmpOp::Ge, 50.0),
                cooldown_s: 3600,
            },
            sizing: PositionSizing::Flat { fraction: 0.05 },
            backoff_s: vec![1, 2, 4],
            retention_s: None,
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn window_order_violation_is_rejected_at_load() {
        let mut cfg = valid_config();
        cfg.indicators[0] = spec("pump", 60, 60);

        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Spec(SpecError::WindowOrder { .. }))
        ));
    }

    #[test]
    fn empty_gate_is_rejected() {
        let mut cfg = valid_config();
        cfg.close.conditions.conditions.clear();

        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::EmptyConditions { phase: "close" })
        ));
    }

    #[test]
    fn entry_and_close_logic_asymmetry_is_pinned() {
        let mut cfg = valid_config();
        cfg.entry.conditions.logic = Logic::Or;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::WrongLogic { phase: "entry", .. })
        ));

        let mut cfg = valid_config();
        cfg.close.conditions.logic = Logic::And;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::WrongLogic { phase: "close", .. })
        ));
    }

    #[test]
    fn unknown_indicator_reference_is_rejected() {
        let mut cfg = valid_config();
        cfg.cancel.conditions.conditions[0].indicator = IndicatorId::from("ghost");

        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::UnknownIndicator { phase: "cancel", .. })
        ));
    }

    #[test]
    fn retention_must_cover_the_longest_lookback() {
        let mut cfg = valid_config();
        cfg.indicators.push(IndicatorSpec {
            id: IndicatorId::from("surge"),
            refresh_ms: 5000,
            kind: IndicatorKind::VolumeSurgeRatio(VolumeSurgeParams {
                t1_s: 0,
                t2_s: 60,
                t3_s: 120,
                t4_s: 900,
            }),
        });
        cfg.cancel.conditions.conditions[0].indicator = IndicatorId::from("surge");
        cfg.retention_s = Some(600);

        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::RetentionTooShort {
                needed_s: 900,
                got_s: 600
            })
        ));
    }

    #[test]
    fn risk_scaled_sizing_interpolates_and_clamps() {
        let sizing = PositionSizing::RiskScaled {
            indicator: IndicatorId::from("pump"),
            min_fraction: 0.02,
            max_fraction: 0.10,
            low_pct: 10.0,
            high_pct: 30.0,
        };

        assert!((sizing.size_for(Some(10.0)) - 0.02).abs() < 1e-12);
        assert!((sizing.size_for(Some(20.0)) - 0.06).abs() < 1e-12);
        assert!((sizing.size_for(Some(30.0)) - 0.10).abs() < 1e-12);
        // Clamped outside the band; missing magnitude sizes conservatively.
        assert!((sizing.size_for(Some(90.0)) - 0.10).abs() < 1e-12);
        assert!((sizing.size_for(None) - 0.02).abs() < 1e-12);
    }

    #[test]
    fn document_loads_from_json_with_defaults() {
        let doc = r#"{
            "id": "hunter-1",
            "indicators": [
                {"id": "pump", "refresh_ms": 2000, "formula": "pump_magnitude_pct",
                 "t1_s": 10, "t3_s": 60, "d_s": 60},
                {"id": "velocity", "refresh_ms": 2000, "formula": "price_velocity",
                 "t1_s": 10, "t3_s": 60, "d_s": 60}
            ],
            "entry": {
                "conditions": {"logic": "and", "conditions": [
                    {"indicator": "pump", "op": ">=", "threshold": 10.0}
                ]},
                "velocity_indicator": "velocity"
            },
            "cancel": {
                "conditions": {"logic": "and", "conditions": [
                    {"indicator": "velocity", "op": "<=", "threshold": -20.0}
                ]}
            },
            "close": {
                "conditions": {"logic": "or", "conditions": [
                    {"indicator": "pump", "op": "<=", "threshold": 2.0}
                ]}
            },
            "emergency": {
                "conditions": {"logic": "or", "conditions": [
                    {"indicator": "velocity", "op": ">=", "threshold": 50.0}
                ]}
            },
            "sizing": {"mode": "flat", "fraction": 0.05}
        }"#;

        let cfg = StrategyConfig::from_json(doc).unwrap();
        assert_eq!(cfg.entry_order.timeout_s, 60);
        assert_eq!(cfg.cancel.window_s, 300);
        assert_eq!(cfg.emergency.cooldown_s, 3600);
        assert_eq!(cfg.backoff_s, vec![1, 2, 4]);
    }

    #[test]
    fn invalid_document_is_rejected_whole() {
        // Same document but with an inverted window order.
        let doc = r#"{
            "id": "hunter-1",
            "indicators": [
                {"id": "pump", "refresh_ms": 2000, "formula": "pump_magnitude_pct",
                 "t1_s": 60, "t3_s": 10, "d_s": 60}
            ],
            "entry": {
                "conditions": {"logic": "and", "conditions": [
                    {"indicator": "pump", "op": ">=", "threshold": 10.0}
                ]},
                "velocity_indicator": "pump"
            },
            "cancel": {"conditions": {"logic": "and", "conditions": [
                {"indicator": "pump", "op": "<=", "threshold": -20.0}]}},
            "close": {"conditions": {"logic": "or", "conditions": [
                {"indicator": "pump", "op": "<=", "threshold": 2.0}]}},
            "emergency": {"conditions": {"logic": "or", "conditions": [
                {"indicator": "pump", "op": ">=", "threshold": 50.0}]}},
            "sizing": {"mode": "flat", "fraction": 0.05}
        }"#;

        assert!(StrategyConfig::from_json(doc).is_err());
    }
}
