//! Structured observability events emitted by the decision kernel.
//!
//! The kernel reports what it does (phase transitions, rejected ticks,
//! retry exhaustion, reconciled late confirmations) as plain values so the
//! hosting process can ship them to logs or metrics. Emission must never
//! block a decision path: the default sink writes straight to `tracing`,
//! and custom sinks are expected to buffer or drop rather than wait.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A strategy instance moved to a new phase.
    PhaseTransition,
    /// An entry signal fired for a symbol that already has a live or
    /// cooling-down instance. Ignored, never queued.
    SignalIgnored,
    /// An indicator refresh produced NotReady where the previous reading
    /// was usable (or there was none yet).
    IndicatorNotReady,
    /// A tick arrived with a timestamp older than the last stored one.
    TickRejected,
    /// A resilient action failed an attempt and is waiting out its backoff.
    RetryScheduled,
    /// A resilient action exhausted its backoff schedule.
    RetryExhausted,
    /// A fill or confirmation arrived after the tracked state had moved on.
    LateConfirmation,
    /// A cancel request targeted an order that was already filled.
    CancelNoop,
    /// A position was force-closed by the emergency gate.
    EmergencyExit,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoreEvent {
    pub kind: EventKind,
    pub symbol: Option<String>,
    pub phase: Option<String>,
    pub ts_ms: u64,
    pub details: String,
}

impl CoreEvent {
    pub fn new(kind: EventKind, ts_ms: u64, details: impl Into<String>) -> Self {
        Self {
            kind,
            symbol: None,
            phase: None,
            ts_ms,
            details: details.into(),
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = Some(phase.into());
        self
    }

    /// Event timestamp as a UTC datetime, if `ts_ms` is representable.
    pub fn at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.ts_ms as i64).single()
    }
}

/// Where kernel events go. Implementations must not block the caller.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: CoreEvent);
}

/// Default sink: routes each event to `tracing` at a severity matching its
/// kind. `RetryExhausted` and `EmergencyExit` are operator-facing failures;
/// `LateConfirmation` is informational by contract, never an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, e: CoreEvent) {
        match e.kind {
            EventKind::RetryExhausted | EventKind::EmergencyExit => {
                error!(kind = ?e.kind, symbol = ?e.symbol, phase = ?e.phase, ts_ms = e.ts_ms, "{}", e.details)
            }
            EventKind::TickRejected => {
                warn!(kind = ?e.kind, symbol = ?e.symbol, ts_ms = e.ts_ms, "{}", e.details)
            }
            EventKind::IndicatorNotReady => {
                debug!(kind = ?e.kind, symbol = ?e.symbol, ts_ms = e.ts_ms, "{}", e.details)
            }
            _ => {
                info!(kind = ?e.kind, symbol = ?e.symbol, phase = ?e.phase, ts_ms = e.ts_ms, "{}", e.details)
            }
        }
    }
}

/// Sink that discards everything. For callers that wire their own telemetry.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: CoreEvent) {}
}
