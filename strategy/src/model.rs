use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use engine::context::EntrySnapshot;
use executor::resilient::ActionTracker;
use executor::types::{OrderId, OrderIntent};
use market::types::Symbol;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyId(String);

impl StrategyId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StrategyId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Signal,
    Entering,
    ActivePosition,
    CancelPending,
    Closing,
    Emergency,
    Cooldown,
    Failed,
}

impl Phase {
    /// Failed is the only terminal phase; everything else either holds
    /// exposure or is on its way back to Idle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Failed)
    }

    /// Phases during which the instance holds (or may hold) a position.
    pub fn holds_position(&self) -> bool {
        matches!(
            self,
            Phase::ActivePosition | Phase::Closing | Phase::Emergency
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Idle => "Idle",
            Phase::Signal => "Signal",
            Phase::Entering => "Entering",
            Phase::ActivePosition => "ActivePosition",
            Phase::CancelPending => "CancelPending",
            Phase::Closing => "Closing",
            Phase::Emergency => "Emergency",
            Phase::Cooldown => "Cooldown",
            Phase::Failed => "Failed",
        };
        f.write_str(s)
    }
}

impl FromStr for Phase {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Idle" => Ok(Phase::Idle),
            "Signal" => Ok(Phase::Signal),
            "Entering" => Ok(Phase::Entering),
            "ActivePosition" => Ok(Phase::ActivePosition),
            "CancelPending" => Ok(Phase::CancelPending),
            "Closing" => Ok(Phase::Closing),
            "Emergency" => Ok(Phase::Emergency),
            "Cooldown" => Ok(Phase::Cooldown),
            "Failed" => Ok(Phase::Failed),
            other => Err(anyhow::anyhow!("Invalid Phase value: {}", other)),
        }
    }
}

/// Live execution state for one (strategy, symbol). Created on the first
/// entry trigger, removed when its cooldown lapses; a Failed instance stays
/// archived until a fresh trigger replaces it.
#[derive(Debug)]
pub struct StrategyInstance {
    pub id: Uuid,

    // Identity
    pub strategy: StrategyId,
    pub symbol: Symbol,

    // Lifecycle
    pub phase: Phase,
    pub phase_entered_ms: u64,
    pub cooldown_until_ms: Option<u64>,

    // Entry
    /// Captured exactly once at entry; never overwritten while live.
    pub entry: Option<EntrySnapshot>,
    pub size_fraction: f64,
    pub entry_order: Option<OrderId>,
    pub entry_action: ActionTracker,

    // Close / emergency
    pub close_order: Option<OrderId>,
    pub close_action: Option<ActionTracker>,

    // In-flight submission bookkeeping
    pub pending_intent: Option<OrderIntent>,
    pub submit_attempts: u32,
}

impl StrategyInstance {
    pub fn new(strategy: StrategyId, symbol: Symbol, now_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            strategy,
            symbol,
            phase: Phase::Signal,
            phase_entered_ms: now_ms,
            cooldown_until_ms: None,
            entry: None,
            size_fraction: 0.0,
            entry_order: None,
            entry_action: ActionTracker::new("entry-order"),
            close_order: None,
            close_action: None,
            pending_intent: None,
            submit_attempts: 0,
        }
    }

    pub fn set_phase(&mut self, phase: Phase, now_ms: u64) {
        tracing::info!(
            strategy = %self.strategy,
            symbol = %self.symbol,
            from = %self.phase,
            to = %phase,
            ts_ms = now_ms,
            "phase transition"
        );
        self.phase = phase;
        self.phase_entered_ms = now_ms;
    }

    /// Record the entry snapshot. Returns false (and changes nothing) if
    /// one is already set — the snapshot is write-once for the instance.
    pub fn arm_entry(&mut self, snapshot: EntrySnapshot) -> bool {
        if self.entry.is_some() {
            return false;
        }
        self.entry = Some(snapshot);
        true
    }

    pub fn in_cooldown(&self, now_ms: u64) -> bool {
        matches!(self.phase, Phase::Cooldown)
            && self.cooldown_until_ms.is_some_and(|until| now_ms < until)
    }

    pub fn age_in_phase_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.phase_entered_ms)
    }

    /// Milliseconds since entry, for the cancel-window check.
    pub fn age_since_entry_ms(&self, now_ms: u64) -> Option<u64> {
        self.entry
            .map(|snap| now_ms.saturating_sub(snap.entry_ts_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(price: f64) -> EntrySnapshot {
        EntrySnapshot {
            entry_ts_ms: 1_000,
            entry_price: price,
            peak_velocity: 2.0,
        }
    }

    #[test]
    fn entry_snapshot_is_write_once() {
        let mut inst =
            StrategyInstance::new(StrategyId::from("s1"), Symbol::from("PUMP"), 1_000);

        assert!(inst.arm_entry(snapshot(1.15)));
        assert!(!inst.arm_entry(snapshot(9.99)));
        assert_eq!(inst.entry.unwrap().entry_price, 1.15);
    }

    #[test]
    fn cooldown_gate_follows_the_deadline() {
        let mut inst =
            StrategyInstance::new(StrategyId::from("s1"), Symbol::from("PUMP"), 1_000);
        inst.set_phase(Phase::Cooldown, 2_000);
        inst.cooldown_until_ms = Some(10_000);

        assert!(inst.in_cooldown(5_000));
        assert!(!inst.in_cooldown(10_000));
    }

    #[test]
    fn phase_round_trips_through_display() {
        for phase in [
            Phase::Idle,
            Phase::Signal,
            Phase::Entering,
            Phase::ActivePosition,
            Phase::CancelPending,
            Phase::Closing,
            Phase::Emergency,
            Phase::Cooldown,
            Phase::Failed,
        ] {
            assert_eq!(phase.to_string().parse::<Phase>().unwrap(), phase);
        }
    }
}
