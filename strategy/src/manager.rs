//! StrategyManager
//!
//! Owns the arena of live strategy instances and drives each one through
//! its phases. Responsibilities:
//!   • Evaluate the entry gate on every readings update, per symbol
//!   • Enforce at-most-one live instance per (strategy, symbol)
//!   • Emit OrderIntents / CancelIntents through the `OrderRouter` seam
//!   • Reconcile OrderEvents (fills, rejections, cancellations) back into
//!     the matching instance — including late fills
//!   • Check entry timeouts, close timeouts, and cooldown expiry on a
//!     periodic scheduler tick
//!
//! Transitions for one instance are serialized behind that instance's own
//! mutex; the arena map lock is only ever held for lookup and insert. There
//! is deliberately no global lock across symbols — one stuck symbol must
//! not stall the rest.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use common::events::{CoreEvent, EventKind, EventSink};
use engine::context::{EntrySnapshot, PositionContextStore};
use engine::registry::{IndicatorReading, ReadingsRegistry, ReadingsView};
use executor::resilient::{ActionState, ActionTracker, BackoffSchedule, ConfirmOutcome};
use executor::types::{
    CancelIntent, IntentPurpose, OrderEvent, OrderId, OrderIntent, OrderRouter, OrderStatus,
    Side,
};
use market::manager::MarketHub;
use market::types::Symbol;

use crate::config::StrategyConfig;
use crate::machine::{self, Decision};
use crate::model::{Phase, StrategyInstance};

type SharedInstance = Arc<Mutex<StrategyInstance>>;

pub struct StrategyManager {
    cfg: Arc<StrategyConfig>,
    hub: Arc<MarketHub>,
    registry: Arc<ReadingsRegistry>,
    positions: Arc<PositionContextStore>,
    router: Arc<dyn OrderRouter>,
    events: Arc<dyn EventSink>,
    backoff: BackoffSchedule,

    /// Live instances keyed by symbol. Outer lock guards the map only;
    /// each instance serializes its own transitions.
    instances: Mutex<HashMap<Symbol, SharedInstance>>,

    /// Order id → owning instance, for event reconciliation (late fills
    /// must find their instance even after the arena entry was replaced).
    orders: Mutex<HashMap<OrderId, SharedInstance>>,
}

impl StrategyManager {
    pub fn new(
        cfg: Arc<StrategyConfig>,
        hub: Arc<MarketHub>,
        registry: Arc<ReadingsRegistry>,
        positions: Arc<PositionContextStore>,
        router: Arc<dyn OrderRouter>,
        events: Arc<dyn EventSink>,
    ) -> anyhow::Result<Arc<Self>> {
        let backoff = BackoffSchedule::from_secs(&cfg.backoff_s)?;
        Ok(Arc::new(Self {
            cfg,
            hub,
            registry,
            positions,
            router,
            events,
            backoff,
            instances: Mutex::new(HashMap::new()),
            orders: Mutex::new(HashMap::new()),
        }))
    }

    /// Wire the manager into the runtime: consume readings updates and run
    /// the deadline ticker. Deadlines ride tokio's monotonic timer; the
    /// wall-clock stamp is only used for event payloads.
    pub async fn run(self: &Arc<Self>) {
        let mut rx = self.registry.subscribe().await;
        let mgr = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(reading) = rx.recv().await {
                mgr.on_reading(reading).await;
            }
        });

        let mgr = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(1));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                mgr.on_tick(common::time::now_ms()).await;
            }
        });
    }

    /// One readings update for one symbol. This is the main decision
    /// entry point, identical under live and replayed ticks.
    pub async fn on_reading(self: &Arc<Self>, reading: IndicatorReading) {
        let symbol = reading.symbol.clone();
        let now_ms = reading.ts_ms;
        let view = self.registry.snapshot_for(&symbol).await;

        let existing = { self.instances.lock().await.get(&symbol).cloned() };
        match existing {
            Some(inst_arc) => {
                let archived = {
                    let mut inst = inst_arc.lock().await;
                    if inst.phase == Phase::Failed {
                        true
                    } else {
                        self.drive(&inst_arc, &mut inst, &view, now_ms).await;
                        false
                    }
                };
                // A Failed instance is archival only: a fresh signal may
                // replace it.
                if archived && machine::entry_ready(&self.cfg, &view) {
                    self.try_enter(symbol, &view, now_ms).await;
                }
            }
            None => {
                if machine::entry_ready(&self.cfg, &view) {
                    self.try_enter(symbol, &view, now_ms).await;
                }
            }
        }
    }

    /// Order event fed back from the external execution layer.
    pub async fn on_order_event(self: &Arc<Self>, ev: OrderEvent) {
        let Some(inst_arc) = self.orders.lock().await.get(&ev.order_id).cloned() else {
            info!(order_id = %ev.order_id, symbol = %ev.symbol, "event for unknown order ignored");
            return;
        };

        let mut inst = inst_arc.lock().await;
        let is_entry = inst.entry_order == Some(ev.order_id);
        let is_close = inst.close_order == Some(ev.order_id);

        match ev.status {
            OrderStatus::Filled { fill_price } => {
                if is_entry {
                    self.entry_filled(&mut inst, fill_price, ev.ts_ms);
                } else if is_close {
                    self.close_filled(&mut inst, fill_price, ev.ts_ms);
                } else {
                    info!(order_id = %ev.order_id, "fill for superseded order ignored");
                }
            }
            OrderStatus::Rejected { reason } => {
                let retryable = (is_entry && inst.phase == Phase::Entering)
                    || (is_close
                        && matches!(inst.phase, Phase::Closing | Phase::Emergency));
                if retryable {
                    self.note_submit_failure(&inst_arc, &mut inst, reason, ev.ts_ms);
                } else {
                    info!(order_id = %ev.order_id, phase = %inst.phase, "rejection outside a retryable phase ignored: {reason}");
                }
            }
            OrderStatus::Cancelled => {
                if is_entry && inst.phase == Phase::CancelPending {
                    info!(symbol = %inst.symbol, "pending exposure withdrawn");
                    self.begin_cooldown(&mut inst, self.cfg.cancel.cooldown_s, ev.ts_ms);
                } else {
                    info!(order_id = %ev.order_id, phase = %inst.phase, "cancellation event ignored");
                }
            }
        }
    }

    /// Deadline sweep. `now_ms` is explicit so replay tests can drive
    /// logical time; the runtime loop feeds it from the wall clock while
    /// tokio's monotonic timer paces the calls.
    pub async fn on_tick(self: &Arc<Self>, now_ms: u64) {
        let arcs: Vec<(Symbol, SharedInstance)> = {
            self.instances
                .lock()
                .await
                .iter()
                .map(|(s, a)| (s.clone(), Arc::clone(a)))
                .collect()
        };

        let mut finished: Vec<(Symbol, Option<OrderId>, Option<OrderId>)> = Vec::new();

        for (symbol, inst_arc) in arcs {
            let mut inst = inst_arc.lock().await;
            match inst.phase {
                Phase::Entering => {
                    let timeout_ms = self.cfg.entry_order.timeout_s * 1000;
                    if inst.age_in_phase_ms(now_ms) >= timeout_ms {
                        // A stale entry is not chased.
                        inst.entry_action.expire();
                        error!(symbol = %symbol, "no fill within the entry window, failing instance");
                        inst.set_phase(Phase::Failed, now_ms);
                        self.emit_phase(&inst, now_ms, "entry timed out without a fill");
                    }
                }
                Phase::Closing => {
                    let timeout_ms = self.cfg.close.timeout_s * 1000;
                    if inst.age_in_phase_ms(now_ms) >= timeout_ms {
                        warn!(symbol = %symbol, "flatten order unfilled past its window, escalating");
                        self.trigger_emergency(&inst_arc, &mut inst, now_ms).await;
                    }
                }
                Phase::Cooldown => {
                    if !inst.in_cooldown(now_ms) {
                        inst.set_phase(Phase::Idle, now_ms);
                        self.emit_phase(&inst, now_ms, "cooldown complete, returning to idle");
                        finished.push((symbol.clone(), inst.entry_order, inst.close_order));
                    }
                }
                _ => {}
            }
        }

        if !finished.is_empty() {
            let mut map = self.instances.lock().await;
            let mut orders = self.orders.lock().await;
            for (symbol, entry_order, close_order) in finished {
                map.remove(&symbol);
                if let Some(id) = entry_order {
                    orders.remove(&id);
                }
                if let Some(id) = close_order {
                    orders.remove(&id);
                }
                self.positions.clear(&symbol);
            }
        }
    }

    /// Current phase of the symbol's instance, if one exists. Mostly for
    /// tests and operator surfaces.
    pub async fn phase_of(&self, symbol: &Symbol) -> Option<Phase> {
        let arc = { self.instances.lock().await.get(symbol).cloned() }?;
        let inst = arc.lock().await;
        Some(inst.phase)
    }

    pub async fn cooldown_until(&self, symbol: &Symbol) -> Option<u64> {
        let arc = { self.instances.lock().await.get(symbol).cloned() }?;
        let inst = arc.lock().await;
        inst.cooldown_until_ms
    }

    // ---- entry ----

    async fn try_enter(self: &Arc<Self>, symbol: Symbol, view: &ReadingsView, now_ms: u64) {
        let Some(series) = self.hub.series(&symbol).await else {
            return;
        };
        let Some(entry_price) = series.read().await.latest().map(|t| t.price) else {
            return;
        };
        let Some(peak_velocity) = view.value(&self.cfg.entry.velocity_indicator).value()
        else {
            debug!(symbol = %symbol, "entry signal without a usable velocity reading");
            return;
        };

        let inst_arc = {
            let mut map = self.instances.lock().await;
            let existing = map.get(&symbol).cloned();
            match existing {
                Some(existing) => {
                    let occupied = {
                        let existing = existing.lock().await;
                        existing.phase != Phase::Failed
                    };
                    if occupied {
                        // Live or cooling down: ignored, never queued.
                        self.events.emit(
                            CoreEvent::new(
                                EventKind::SignalIgnored,
                                now_ms,
                                "entry signal while an instance is live",
                            )
                            .with_symbol(symbol.as_str()),
                        );
                        return;
                    }
                    info!(symbol = %symbol, "replacing archived failed instance");
                    let fresh = Arc::new(Mutex::new(StrategyInstance::new(
                        self.cfg.id.clone(),
                        symbol.clone(),
                        now_ms,
                    )));
                    map.insert(symbol.clone(), Arc::clone(&fresh));
                    fresh
                }
                None => {
                    let fresh = Arc::new(Mutex::new(StrategyInstance::new(
                        self.cfg.id.clone(),
                        symbol.clone(),
                        now_ms,
                    )));
                    map.insert(symbol.clone(), Arc::clone(&fresh));
                    fresh
                }
            }
        };

        let mut inst = inst_arc.lock().await;
        let snapshot = EntrySnapshot {
            entry_ts_ms: now_ms,
            entry_price,
            peak_velocity,
        };
        inst.arm_entry(snapshot);
        // A replaced Failed instance may have left a stale armed snapshot.
        self.positions.clear(&symbol);
        self.positions.arm(symbol.clone(), snapshot);
        self.emit_phase(&inst, now_ms, "entry gate satisfied");

        self.submit_entry(&inst_arc, &mut inst, view, now_ms).await;
    }

    async fn submit_entry(
        self: &Arc<Self>,
        inst_arc: &SharedInstance,
        inst: &mut StrategyInstance,
        view: &ReadingsView,
        now_ms: u64,
    ) {
        let magnitude = self
            .cfg
            .sizing
            .magnitude_indicator()
            .and_then(|id| view.value(id).value());
        inst.size_fraction = self.cfg.sizing.size_for(magnitude);

        let intent = OrderIntent {
            id: Uuid::new_v4(),
            symbol: inst.symbol.clone(),
            side: Side::Sell,
            size_fraction: inst.size_fraction,
            purpose: IntentPurpose::Entry,
            ts_ms: now_ms,
        };
        inst.entry_order = Some(intent.id);
        inst.pending_intent = Some(intent.clone());
        inst.submit_attempts = 1;
        inst.set_phase(Phase::Entering, now_ms);
        self.emit_phase(&inst, now_ms, "entry order submitted");

        self.orders
            .lock()
            .await
            .insert(intent.id, Arc::clone(inst_arc));

        if let Err(e) = self.router.submit(&intent).await {
            self.note_submit_failure(inst_arc, inst, e.to_string(), now_ms);
        }
    }

    // ---- phase driving ----

    async fn drive(
        self: &Arc<Self>,
        inst_arc: &SharedInstance,
        inst: &mut StrategyInstance,
        view: &ReadingsView,
        now_ms: u64,
    ) {
        match inst.phase {
            Phase::Signal | Phase::Idle => {}
            Phase::Entering => {
                let in_window = self.within_cancel_window(inst, now_ms);
                if machine::entering_decision(&self.cfg, view, in_window) == Decision::Cancel {
                    self.request_cancel(inst, now_ms).await;
                }
            }
            Phase::ActivePosition => {
                let in_window = self.within_cancel_window(inst, now_ms);
                match machine::active_decision(&self.cfg, view, in_window) {
                    Decision::Emergency => {
                        self.trigger_emergency(inst_arc, inst, now_ms).await
                    }
                    Decision::Cancel => self.request_cancel(inst, now_ms).await,
                    Decision::Close => self.begin_close(inst_arc, inst, now_ms).await,
                    Decision::Hold => {}
                }
            }
            Phase::CancelPending => {
                // Awaiting the external verdict; nothing to decide here.
            }
            Phase::Closing => {
                if machine::closing_decision(&self.cfg, view) == Decision::Emergency {
                    self.trigger_emergency(inst_arc, inst, now_ms).await;
                }
            }
            Phase::Emergency => {}
            Phase::Cooldown => {
                if machine::entry_ready(&self.cfg, view) {
                    self.events.emit(
                        CoreEvent::new(
                            EventKind::SignalIgnored,
                            now_ms,
                            "entry signal suppressed by cooldown",
                        )
                        .with_symbol(inst.symbol.as_str())
                        .with_phase(inst.phase.to_string()),
                    );
                }
            }
            Phase::Failed => {}
        }
    }

    fn within_cancel_window(&self, inst: &StrategyInstance, now_ms: u64) -> bool {
        inst.age_since_entry_ms(now_ms)
            .is_some_and(|age| age <= self.cfg.cancel.window_s * 1000)
    }

    /// O1: withdraw the pending entry. Invalid once the entry has filled —
    /// that is a logged no-op, never an error.
    async fn request_cancel(&self, inst: &mut StrategyInstance, now_ms: u64) {
        if inst.entry_action.state() == ActionState::Active {
            info!(symbol = %inst.symbol, "cancel requested after fill, treating as no-op");
            self.events.emit(
                CoreEvent::new(
                    EventKind::CancelNoop,
                    now_ms,
                    "entry already filled, cancellation no longer valid",
                )
                .with_symbol(inst.symbol.as_str())
                .with_phase(inst.phase.to_string()),
            );
            return;
        }
        let Some(order_id) = inst.entry_order else {
            return;
        };

        inst.set_phase(Phase::CancelPending, now_ms);
        self.emit_phase(&inst, now_ms, "momentum still against us, withdrawing entry");

        let cancel = CancelIntent {
            order_id,
            symbol: inst.symbol.clone(),
            ts_ms: now_ms,
        };
        if let Err(e) = self.router.cancel(&cancel).await {
            warn!(symbol = %inst.symbol, "cancel request failed: {e}");
        }
    }

    async fn begin_close(
        self: &Arc<Self>,
        inst_arc: &SharedInstance,
        inst: &mut StrategyInstance,
        now_ms: u64,
    ) {
        let intent = OrderIntent {
            id: Uuid::new_v4(),
            symbol: inst.symbol.clone(),
            side: Side::Buy,
            size_fraction: inst.size_fraction,
            purpose: IntentPurpose::Flatten,
            ts_ms: now_ms,
        };
        inst.close_order = Some(intent.id);
        inst.close_action = Some(ActionTracker::new("flatten-order"));
        inst.pending_intent = Some(intent.clone());
        inst.submit_attempts = 1;
        inst.set_phase(Phase::Closing, now_ms);
        self.emit_phase(&inst, now_ms, "exit gate satisfied, flattening");

        self.orders
            .lock()
            .await
            .insert(intent.id, Arc::clone(inst_arc));

        if let Err(e) = self.router.submit(&intent).await {
            self.note_submit_failure(inst_arc, inst, e.to_string(), now_ms);
        }
    }

    async fn trigger_emergency(
        self: &Arc<Self>,
        inst_arc: &SharedInstance,
        inst: &mut StrategyInstance,
        now_ms: u64,
    ) {
        // Withdraw a still-working flatten order before force-closing.
        if let (Some(order_id), Some(action)) = (inst.close_order, inst.close_action.as_ref())
        {
            if matches!(
                action.state(),
                ActionState::Pending | ActionState::Retrying { .. }
            ) {
                let cancel = CancelIntent {
                    order_id,
                    symbol: inst.symbol.clone(),
                    ts_ms: now_ms,
                };
                if let Err(e) = self.router.cancel(&cancel).await {
                    warn!(symbol = %inst.symbol, "could not withdraw flatten order: {e}");
                }
            }
        }

        let intent = OrderIntent {
            id: Uuid::new_v4(),
            symbol: inst.symbol.clone(),
            side: Side::Buy,
            size_fraction: inst.size_fraction,
            purpose: IntentPurpose::EmergencyFlatten,
            ts_ms: now_ms,
        };
        inst.close_order = Some(intent.id);
        inst.close_action = Some(ActionTracker::new("emergency-flatten"));
        inst.pending_intent = Some(intent.clone());
        inst.submit_attempts = 1;
        inst.set_phase(Phase::Emergency, now_ms);

        error!(symbol = %inst.symbol, "momentum reversal against the position, force-closing");
        self.events.emit(
            CoreEvent::new(
                EventKind::EmergencyExit,
                now_ms,
                "pump re-accelerated against an open position",
            )
            .with_symbol(inst.symbol.as_str())
            .with_phase(inst.phase.to_string()),
        );

        self.orders
            .lock()
            .await
            .insert(intent.id, Arc::clone(inst_arc));

        if let Err(e) = self.router.submit(&intent).await {
            self.note_submit_failure(inst_arc, inst, e.to_string(), now_ms);
        }
    }

    // ---- order event reconciliation ----

    fn entry_filled(&self, inst: &mut StrategyInstance, fill_price: f64, now_ms: u64) {
        match inst.entry_action.confirm() {
            ConfirmOutcome::Activated => match inst.phase {
                Phase::Entering => {
                    info!(symbol = %inst.symbol, fill_price, "entry filled");
                    inst.set_phase(Phase::ActivePosition, now_ms);
                    self.emit_phase(inst, now_ms, "entry filled, position open");
                }
                Phase::CancelPending => {
                    info!(symbol = %inst.symbol, fill_price, "fill beat the cancel request");
                    self.events.emit(
                        CoreEvent::new(
                            EventKind::CancelNoop,
                            now_ms,
                            "fill arrived before the cancel, position open",
                        )
                        .with_symbol(inst.symbol.as_str())
                        .with_phase(inst.phase.to_string()),
                    );
                    inst.set_phase(Phase::ActivePosition, now_ms);
                    self.emit_phase(inst, now_ms, "entry filled, position open");
                }
                _ => {}
            },
            ConfirmOutcome::Reactivated => {
                // Tracked state was Expired/Retrying, not Failed: the late
                // fill is a success and re-activates the instance.
                self.events.emit(
                    CoreEvent::new(
                        EventKind::LateConfirmation,
                        now_ms,
                        "late fill reconciled, re-activating instance",
                    )
                    .with_symbol(inst.symbol.as_str())
                    .with_phase(inst.phase.to_string()),
                );
                inst.set_phase(Phase::ActivePosition, now_ms);
                self.emit_phase(inst, now_ms, "late fill, position open");
            }
            ConfirmOutcome::AlreadyActive => {
                info!(symbol = %inst.symbol, "duplicate fill acknowledgment ignored");
            }
            ConfirmOutcome::IgnoredFailed => {
                self.events.emit(
                    CoreEvent::new(
                        EventKind::LateConfirmation,
                        now_ms,
                        "confirmation for a failed instance ignored",
                    )
                    .with_symbol(inst.symbol.as_str())
                    .with_phase(inst.phase.to_string()),
                );
            }
        }
    }

    fn close_filled(&self, inst: &mut StrategyInstance, fill_price: f64, now_ms: u64) {
        if let Some(action) = inst.close_action.as_mut() {
            action.confirm();
        }
        let cooldown_s = match inst.phase {
            Phase::Emergency => self.cfg.emergency.cooldown_s,
            _ => self.cfg.close.cooldown_s,
        };
        info!(symbol = %inst.symbol, fill_price, "position flattened");
        self.begin_cooldown(inst, cooldown_s, now_ms);
    }

    fn begin_cooldown(&self, inst: &mut StrategyInstance, cooldown_s: u64, now_ms: u64) {
        inst.cooldown_until_ms = Some(now_ms + cooldown_s * 1000);
        inst.set_phase(Phase::Cooldown, now_ms);
        self.positions.clear(&inst.symbol);
        self.emit_phase(
            inst,
            now_ms,
            format!("cooling down for {cooldown_s}s"),
        );
    }

    /// Record a failed submission attempt (transport error or broker
    /// rejection) and either schedule the next attempt or fail the phase.
    fn note_submit_failure(
        self: &Arc<Self>,
        inst_arc: &SharedInstance,
        inst: &mut StrategyInstance,
        error: String,
        now_ms: u64,
    ) {
        let attempt = inst.submit_attempts.max(1);
        let max_attempts = self.backoff.attempts();
        let purpose = inst.pending_intent.as_ref().map(|i| i.purpose);

        let tracker = match purpose {
            Some(IntentPurpose::Entry) | None => &mut inst.entry_action,
            Some(_) => inst
                .close_action
                .get_or_insert_with(|| ActionTracker::new("close-order")),
        };
        tracker.fail_attempt(attempt, max_attempts, error.clone());
        let failed = tracker.state() == ActionState::Failed;

        if failed {
            inst.set_phase(Phase::Failed, now_ms);
            self.events.emit(
                CoreEvent::new(
                    EventKind::RetryExhausted,
                    now_ms,
                    format!("order submission exhausted retries: {error}"),
                )
                .with_symbol(inst.symbol.as_str())
                .with_phase(inst.phase.to_string()),
            );
            if purpose == Some(IntentPurpose::Entry) {
                // Nothing was ever opened; free the snapshot.
                self.positions.clear(&inst.symbol);
            }
            return;
        }

        let delay = self.backoff.delay_after(attempt).unwrap_or_default();
        self.events.emit(
            CoreEvent::new(
                EventKind::RetryScheduled,
                now_ms,
                format!(
                    "attempt {attempt}/{max_attempts} failed, retrying in {}s: {error}",
                    delay.as_secs()
                ),
            )
            .with_symbol(inst.symbol.as_str())
            .with_phase(inst.phase.to_string()),
        );

        let mgr = Arc::clone(self);
        let inst_arc = Arc::clone(inst_arc);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            mgr.resubmit(inst_arc).await;
        });
    }

    async fn resubmit(self: Arc<Self>, inst_arc: SharedInstance) {
        let intent = {
            let mut inst = inst_arc.lock().await;
            let Some(intent) = inst.pending_intent.clone() else {
                return;
            };
            let expected_phase = match intent.purpose {
                IntentPurpose::Entry => Phase::Entering,
                IntentPurpose::Flatten => Phase::Closing,
                IntentPurpose::EmergencyFlatten => Phase::Emergency,
            };
            // A late fill or a preempting transition makes this retry moot.
            if inst.phase != expected_phase {
                debug!(symbol = %inst.symbol, phase = %inst.phase, "skipping retry, instance moved on");
                return;
            }
            inst.submit_attempts += 1;
            intent
        };

        if let Err(e) = self.router.submit(&intent).await {
            let mut inst = inst_arc.lock().await;
            self.note_submit_failure(&inst_arc, &mut inst, e.to_string(), common::time::now_ms());
        }
    }

    fn emit_phase(&self, inst: &StrategyInstance, now_ms: u64, details: impl Into<String>) {
        self.events.emit(
            CoreEvent::new(EventKind::PhaseTransition, now_ms, details)
                .with_symbol(inst.symbol.as_str())
                .with_phase(inst.phase.to_string()),
        );
    }
}
