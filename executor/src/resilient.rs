//! Resilient action execution.
//!
//! One retry/backoff primitive, two call sites with identical semantics:
//! order submission inside the strategy layer, and market-data channel
//! resubscription in the feed layer. Both inject their own action closure;
//! the timing and state rules live here once.
//!
//! ## State rules
//!
//! ```text
//! Pending ──success──▶ Active
//!    │ failure
//!    ▼
//! Retrying{n} ──success──▶ Active        (late or prompt — both fine)
//!    │ schedule exhausted
//!    ▼
//! Failed                                  (terminal; confirmations ignored)
//!
//! Pending/Retrying ──deadline──▶ Expired ──confirmation──▶ Active
//! ```
//!
//! A confirmation that lands after the tracker moved past Pending is a
//! *reconciliation*, not an error: from Expired or Retrying it re-activates;
//! from Failed it is logged at info and dropped.

use std::time::Duration;

use tracing::{error, info, warn};

use crate::types::ExecutionError;

/// Ordered wait durations between attempts. The schedule length IS the
/// attempt budget: `[1s, 2s, 4s]` means three attempts, with a wait after
/// each failure (the last wait covers a final confirmation that may still
/// arrive before the verdict).
#[derive(Debug, Clone)]
pub struct BackoffSchedule {
    delays: Vec<Duration>,
}

impl Default for BackoffSchedule {
    fn default() -> Self {
        Self {
            delays: vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
            ],
        }
    }
}

impl BackoffSchedule {
    pub fn new(delays: Vec<Duration>) -> Result<Self, ExecutionError> {
        if delays.is_empty() {
            return Err(ExecutionError::EmptySchedule);
        }
        Ok(Self { delays })
    }

    pub fn from_secs(secs: &[u64]) -> Result<Self, ExecutionError> {
        Self::new(secs.iter().map(|s| Duration::from_secs(*s)).collect())
    }

    pub fn attempts(&self) -> u32 {
        self.delays.len() as u32
    }

    /// Wait after the given 1-based attempt, if any attempts remain after it.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        self.delays.get(attempt as usize - 1).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    /// Submitted, awaiting confirmation.
    Pending,
    /// Confirmed live.
    Active,
    /// Last attempt failed; waiting out the backoff before attempt `n + 1`.
    Retrying { attempt: u32 },
    /// Confirmation deadline passed without a verdict.
    Expired,
    /// Schedule exhausted. Terminal.
    Failed,
}

impl ActionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ActionState::Failed)
    }
}

/// What a confirmation did to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Normal path: Pending became Active.
    Activated,
    /// Late confirmation from Expired/Retrying; treated as success.
    Reactivated,
    /// Already Active; duplicate acknowledgment.
    AlreadyActive,
    /// Tracker had failed terminally; confirmation logged and dropped.
    IgnoredFailed,
}

/// Synchronous state machine for one tracked action. The async driver
/// ([`ResilientExecutor`]) owns the sleeps; callers with event-driven
/// confirmations (order fills) drive the tracker directly.
#[derive(Debug)]
pub struct ActionTracker {
    label: String,
    state: ActionState,
    last_error: Option<String>,
}

impl ActionTracker {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            state: ActionState::Pending,
            last_error: None,
        }
    }

    pub fn state(&self) -> ActionState {
        self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Record a failed attempt. Moves to Retrying while budget remains,
    /// Failed once `max_attempts` have been spent.
    pub fn fail_attempt(&mut self, attempt: u32, max_attempts: u32, error: impl Into<String>) {
        let error = error.into();
        self.last_error = Some(error.clone());
        if attempt >= max_attempts {
            error!(action = %self.label, attempt, "attempts exhausted: {error}");
            self.state = ActionState::Failed;
        } else {
            warn!(action = %self.label, attempt, "attempt failed, will retry: {error}");
            self.state = ActionState::Retrying { attempt };
        }
    }

    /// The confirmation deadline passed without a verdict.
    pub fn expire(&mut self) {
        match self.state {
            ActionState::Pending | ActionState::Retrying { .. } => {
                warn!(action = %self.label, "confirmation deadline passed");
                self.state = ActionState::Expired;
            }
            _ => {}
        }
    }

    /// A success/confirmation signal arrived.
    pub fn confirm(&mut self) -> ConfirmOutcome {
        match self.state {
            ActionState::Pending => {
                self.state = ActionState::Active;
                ConfirmOutcome::Activated
            }
            ActionState::Retrying { .. } | ActionState::Expired => {
                info!(action = %self.label, "late confirmation reconciled, re-activating");
                self.state = ActionState::Active;
                ConfirmOutcome::Reactivated
            }
            ActionState::Active => {
                info!(action = %self.label, "duplicate confirmation ignored");
                ConfirmOutcome::AlreadyActive
            }
            ActionState::Failed => {
                info!(action = %self.label, "confirmation for failed action ignored");
                ConfirmOutcome::IgnoredFailed
            }
        }
    }
}

/// Final verdict of a driven execution.
#[derive(Debug)]
pub enum ExecutionOutcome<T> {
    /// Some attempt succeeded; the executor went Active immediately.
    Confirmed { value: T, attempts: u32 },
    /// Every attempt failed.
    Failed { attempts: u32, last_error: String },
}

impl<T> ExecutionOutcome<T> {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, ExecutionOutcome::Confirmed { .. })
    }
}

/// Async retry driver around a fallible action.
///
/// Runs the action once per schedule slot, sleeping the scheduled delay
/// after each failure. Success at any attempt returns immediately — no
/// residual delay is consumed.
pub struct ResilientExecutor {
    schedule: BackoffSchedule,
}

impl ResilientExecutor {
    pub fn new(schedule: BackoffSchedule) -> Self {
        Self { schedule }
    }

    pub fn schedule(&self) -> &BackoffSchedule {
        &self.schedule
    }

    pub async fn execute<T, E, F, Fut>(&self, label: &str, mut action: F) -> ExecutionOutcome<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let max_attempts = self.schedule.attempts();
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            match action(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        info!(action = %label, attempt, "recovered after retry");
                    }
                    return ExecutionOutcome::Confirmed { value, attempts: attempt };
                }
                Err(e) => {
                    last_error = e.to_string();
                    if let Some(delay) = self.schedule.delay_after(attempt) {
                        warn!(
                            action = %label,
                            attempt,
                            wait_ms = delay.as_millis() as u64,
                            "attempt failed, backing off: {last_error}"
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        error!(action = %label, attempts = max_attempts, "exhausted retries: {last_error}");
        ExecutionOutcome::Failed {
            attempts: max_attempts,
            last_error,
        }
    }
}
