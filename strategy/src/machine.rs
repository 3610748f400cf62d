//! Pure per-phase decision logic.
//
//  No async, no IO, no clocks: the manager feeds in the readings view and
//  the window bookkeeping, and gets back what the phase wants to do next.
//  Keeping this pure is what lets the scenario tests (and any replay
//  harness) exercise every branch without standing up the runtime.

use engine::registry::ReadingsView;

use crate::conditions;
use crate::config::StrategyConfig;

/// What a readings update asks a live instance to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Hold,
    /// O1: withdraw still-pending exposure and cool down.
    Cancel,
    /// ZE1: flatten the position at profit.
    Close,
    /// Momentum reversal spiked against the position: force-close now.
    Emergency,
}

/// S1. True only when every entry condition holds (And logic, pinned by
/// config validation) — NotReady members fail the gate.
pub fn entry_ready(cfg: &StrategyConfig, readings: &ReadingsView) -> bool {
    conditions::evaluate(&cfg.entry.conditions, readings)
}

/// While the entry order is pending (Entering / CancelPending race window):
/// the only gate that applies is O1, and only inside its window.
pub fn entering_decision(
    cfg: &StrategyConfig,
    readings: &ReadingsView,
    within_cancel_window: bool,
) -> Decision {
    if within_cancel_window && conditions::evaluate(&cfg.cancel.conditions, readings) {
        Decision::Cancel
    } else {
        Decision::Hold
    }
}

/// With a confirmed position: emergency preempts everything, then O1
/// (inside its window), then the ZE1 close gate.
pub fn active_decision(
    cfg: &StrategyConfig,
    readings: &ReadingsView,
    within_cancel_window: bool,
) -> Decision {
    if conditions::evaluate(&cfg.emergency.conditions, readings) {
        return Decision::Emergency;
    }
    if within_cancel_window && conditions::evaluate(&cfg.cancel.conditions, readings) {
        return Decision::Cancel;
    }
    if conditions::evaluate(&cfg.close.conditions, readings) {
        return Decision::Close;
    }
    Decision::Hold
}

/// While the flatten order works: only the emergency gate can still
/// preempt.
pub fn closing_decision(cfg: &StrategyConfig, readings: &ReadingsView) -> Decision {
    if conditions::evaluate(&cfg.emergency.conditions, readings) {
        Decision::Emergency
    } else {
        Decision::Hold
    }
}
