//! Condition sets and their evaluator.
//
//  This module is deliberately pure: no async, no IO, no clock. The same
//  readings produce the same boolean whether the ticks were live or
//  replayed — that determinism is what makes backtest verification honest.

use serde::{Deserialize, Serialize};
use std::fmt;

use engine::registry::ReadingsView;
use engine::spec::IndicatorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "==")]
    Eq,
}

impl CmpOp {
    pub fn holds(&self, value: f64, threshold: f64) -> bool {
        match self {
            CmpOp::Ge => value >= threshold,
            CmpOp::Le => value <= threshold,
            CmpOp::Lt => value < threshold,
            CmpOp::Gt => value > threshold,
            CmpOp::Eq => value == threshold,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CmpOp::Ge => ">=",
            CmpOp::Le => "<=",
            CmpOp::Lt => "<",
            CmpOp::Gt => ">",
            CmpOp::Eq => "==",
        };
        f.write_str(s)
    }
}

/// One comparison of an indicator reading against a threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub indicator: IndicatorId,
    pub op: CmpOp,
    pub threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Logic {
    And,
    Or,
}

/// A phase's gate: conditions combined under And/Or logic.
///
/// The entry gate uses And (conservative entry) while the close gate uses
/// Or (eager exit). That asymmetry is intentional; config validation pins
/// it rather than letting a uniform operator creep in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSet {
    pub logic: Logic,
    pub conditions: Vec<Condition>,
}

/// Evaluate a gate against a symbol's latest readings.
///
/// A NotReady (or missing) reading makes its condition false — under And
/// logic that fails the whole gate, which is exactly the fail-safe the
/// warm-up period needs. An empty set never passes (validation forbids
/// empty sets; this is the backstop).
pub fn evaluate(set: &ConditionSet, readings: &ReadingsView) -> bool {
    if set.conditions.is_empty() {
        return false;
    }
    let satisfied = |c: &Condition| {
        readings
            .value(&c.indicator)
            .value()
            .map(|v| c.op.holds(v, c.threshold))
            .unwrap_or(false)
    };
    match set.logic {
        Logic::And => set.conditions.iter().all(satisfied),
        Logic::Or => set.conditions.iter().any(satisfied),
    }
}

/// Per-condition outcome, for transition logging.
#[derive(Debug, Clone)]
pub struct ConditionOutcome {
    pub indicator: IndicatorId,
    pub op: CmpOp,
    pub threshold: f64,
    pub observed: Option<f64>,
    pub satisfied: bool,
}

pub fn explain(set: &ConditionSet, readings: &ReadingsView) -> Vec<ConditionOutcome> {
    set.conditions
        .iter()
        .map(|c| {
            let observed = readings.value(&c.indicator).value();
            ConditionOutcome {
                indicator: c.indicator.clone(),
                op: c.op,
                threshold: c.threshold,
                observed,
                satisfied: observed.map(|v| c.op.holds(v, c.threshold)).unwrap_or(false),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::registry::IndicatorReading;
    use engine::value::IndicatorValue;
    use market::types::Symbol;

    fn view(values: &[(&str, IndicatorValue)]) -> ReadingsView {
        let mut v = ReadingsView::new();
        for (id, value) in values {
            v.insert(IndicatorReading {
                indicator: IndicatorId::from(*id),
                symbol: Symbol::from("PUMP"),
                ts_ms: 1_000,
                value: *value,
            });
        }
        v
    }

    fn cond(id: &str, op: CmpOp, threshold: f64) -> Condition {
        Condition {
            indicator: IndicatorId::from(id),
            op,
            threshold,
        }
    }

    #[test]
    fn and_requires_every_condition() {
        let set = ConditionSet {
            logic: Logic::And,
            conditions: vec![cond("a", CmpOp::Ge, 10.0), cond("b", CmpOp::Gt, 2.0)],
        };

        let all_true = view(&[
            ("a", IndicatorValue::Ready(12.0)),
            ("b", IndicatorValue::Ready(3.0)),
        ]);
        assert!(evaluate(&set, &all_true));

        let one_false = view(&[
            ("a", IndicatorValue::Ready(12.0)),
            ("b", IndicatorValue::Ready(1.0)),
        ]);
        assert!(!evaluate(&set, &one_false));
    }

    #[test]
    fn any_not_ready_member_fails_an_and_gate() {
        let set = ConditionSet {
            logic: Logic::And,
            conditions: vec![cond("a", CmpOp::Ge, 10.0), cond("b", CmpOp::Gt, 2.0)],
        };

        let with_gap = view(&[
            ("a", IndicatorValue::Ready(12.0)),
            ("b", IndicatorValue::NotReady),
        ]);
        assert!(!evaluate(&set, &with_gap));
    }

    #[test]
    fn or_needs_only_one_condition() {
        let set = ConditionSet {
            logic: Logic::Or,
            conditions: vec![cond("a", CmpOp::Ge, 70.0), cond("b", CmpOp::Le, 0.3)],
        };

        let one_true = view(&[
            ("a", IndicatorValue::Ready(72.0)),
            ("b", IndicatorValue::Ready(5.0)),
        ]);
        assert!(evaluate(&set, &one_true));

        let none_true = view(&[
            ("a", IndicatorValue::Ready(10.0)),
            ("b", IndicatorValue::Ready(5.0)),
        ]);
        assert!(!evaluate(&set, &none_true));
    }

    #[test]
    fn or_gate_with_only_not_ready_members_is_false() {
        let set = ConditionSet {
            logic: Logic::Or,
            conditions: vec![cond("a", CmpOp::Ge, 70.0)],
        };

        assert!(!evaluate(&set, &view(&[("a", IndicatorValue::NotReady)])));
        // Missing entirely behaves the same as NotReady.
        assert!(!evaluate(&set, &view(&[])));
    }

    #[test]
    fn negative_thresholds_compare_correctly() {
        // The cancel gate fires when momentum reversal drops below -20.
        let set = ConditionSet {
            logic: Logic::And,
            conditions: vec![cond("reversal", CmpOp::Le, -20.0)],
        };

        assert!(evaluate(
            &set,
            &view(&[("reversal", IndicatorValue::Ready(-25.0))])
        ));
        assert!(!evaluate(
            &set,
            &view(&[("reversal", IndicatorValue::Ready(-5.0))])
        ));
    }

    #[test]
    fn empty_set_never_passes() {
        let set = ConditionSet {
            logic: Logic::And,
            conditions: vec![],
        };
        assert!(!evaluate(&set, &view(&[])));
    }

    #[test]
    fn explain_reports_each_member() {
        let set = ConditionSet {
            logic: Logic::And,
            conditions: vec![cond("a", CmpOp::Ge, 10.0), cond("b", CmpOp::Gt, 2.0)],
        };
        let outcomes = explain(
            &set,
            &view(&[
                ("a", IndicatorValue::Ready(12.0)),
                ("b", IndicatorValue::NotReady),
            ]),
        );

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].satisfied);
        assert!(!outcomes[1].satisfied);
        assert_eq!(outcomes[1].observed, None);
    }
}
