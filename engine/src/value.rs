use std::fmt;

/// Outcome of one indicator computation.
///
/// `NotReady` means the buffered history cannot support the formula's
/// windows yet. It is an expected, self-healing condition — distinct from
/// zero, and MUST NOT satisfy any threshold downstream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorValue {
    Ready(f64),
    NotReady,
}

impl IndicatorValue {
    pub fn is_ready(&self) -> bool {
        matches!(self, IndicatorValue::Ready(_))
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            IndicatorValue::Ready(v) => Some(*v),
            IndicatorValue::NotReady => None,
        }
    }

    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            IndicatorValue::Ready(v) => IndicatorValue::Ready(f(v)),
            IndicatorValue::NotReady => IndicatorValue::NotReady,
        }
    }
}

impl From<Option<f64>> for IndicatorValue {
    fn from(v: Option<f64>) -> Self {
        match v {
            Some(v) => IndicatorValue::Ready(v),
            None => IndicatorValue::NotReady,
        }
    }
}

impl fmt::Display for IndicatorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorValue::Ready(v) => write!(f, "{v}"),
            IndicatorValue::NotReady => f.write_str("not-ready"),
        }
    }
}
