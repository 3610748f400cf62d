//! IndicatorEngine
//!
//! Evaluates every configured indicator on its own refresh cadence.
//! Responsibilities:
//!   • One runner per `IndicatorSpec`, ticking at that spec's `refresh_ms`
//!   • Each firing evaluates the spec for every symbol the hub has seen
//!   • Readings go to the `ReadingsRegistry`; transitions into NotReady are
//!     reported as observability events
//!
//! Window math uses the symbol's **latest tick timestamp** as "now", not the
//! wall clock: replaying a recorded tick stream reproduces the live readings
//! bit for bit. The wall/monotonic clock only drives the refresh cadence.
//!
//! Evaluations for different indicators run in parallel (independent
//! runners); a failure or data gap on one symbol never halts another —
//! each symbol is evaluated on its own and skipped independently.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Mutex;
use tokio::time::{Duration, MissedTickBehavior, interval};

use common::events::{CoreEvent, EventKind, EventSink};
use market::manager::MarketHub;
use market::types::Symbol;

use crate::context::PositionContextStore;
use crate::formulas::IndicatorComputer;
use crate::registry::{IndicatorReading, PublishOutcome, ReadingsRegistry};
use crate::spec::IndicatorSpec;

struct SpecRunner {
    spec: IndicatorSpec,
    /// Per-symbol evaluation state (sample rings and the like). The outer
    /// lock guards only the map; each computer carries its own lock so
    /// symbols evaluate in parallel.
    states: Mutex<HashMap<Symbol, Arc<Mutex<IndicatorComputer>>>>,
}

pub struct IndicatorEngine {
    hub: Arc<MarketHub>,
    runners: Vec<Arc<SpecRunner>>,
    registry: Arc<ReadingsRegistry>,
    positions: Arc<PositionContextStore>,
    events: Arc<dyn EventSink>,
}

impl IndicatorEngine {
    /// Specs must already be validated (the config loader rejects bad ones
    /// before anything is constructed from them).
    pub fn new(
        hub: Arc<MarketHub>,
        specs: Vec<IndicatorSpec>,
        positions: Arc<PositionContextStore>,
        events: Arc<dyn EventSink>,
    ) -> Arc<Self> {
        let runners = specs
            .into_iter()
            .map(|spec| {
                Arc::new(SpecRunner {
                    spec,
                    states: Mutex::new(HashMap::new()),
                })
            })
            .collect();

        Arc::new(Self {
            hub,
            runners,
            registry: ReadingsRegistry::new(),
            positions,
            events,
        })
    }

    pub fn registry(&self) -> Arc<ReadingsRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn positions(&self) -> Arc<PositionContextStore> {
        Arc::clone(&self.positions)
    }

    /// Spawn one cadence task per indicator spec.
    pub fn spawn(self: &Arc<Self>) {
        for runner in &self.runners {
            let engine = Arc::clone(self);
            let runner = Arc::clone(runner);
            tokio::spawn(async move {
                let mut ticker = interval(Duration::from_millis(runner.spec.refresh_ms));
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    ticker.tick().await;
                    engine.evaluate_runner(&runner).await;
                }
            });
        }
    }

    /// Evaluate every spec for every symbol exactly once. This is the
    /// replay/backtest entry point: same ticks in, same readings out.
    pub async fn evaluate_once(&self) {
        join_all(
            self.runners
                .iter()
                .map(|runner| self.evaluate_runner(runner)),
        )
        .await;
    }

    async fn evaluate_runner(&self, runner: &SpecRunner) {
        let symbols = self.hub.symbols().await;
        join_all(
            symbols
                .iter()
                .map(|symbol| self.evaluate_symbol(runner, symbol)),
        )
        .await;
    }

    async fn evaluate_symbol(&self, runner: &SpecRunner, symbol: &Symbol) {
        let Some(series) = self.hub.series(symbol).await else {
            return;
        };

        let computer = {
            let mut states = runner.states.lock().await;
            Arc::clone(states.entry(symbol.clone()).or_insert_with(|| {
                Arc::new(Mutex::new(IndicatorComputer::for_kind(&runner.spec.kind)))
            }))
        };

        let entry = self.positions.get(symbol);

        let (now_ms, value) = {
            let guard = series.read().await;
            let Some(now_ms) = guard.latest().map(|t| t.ts_ms) else {
                return;
            };

            let mut computer = computer.lock().await;
            (now_ms, computer.evaluate(&guard, now_ms, entry.as_ref()))
        };

        let reading = IndicatorReading {
            indicator: runner.spec.id.clone(),
            symbol: symbol.clone(),
            ts_ms: now_ms,
            value,
        };

        match self.registry.publish(reading).await {
            PublishOutcome::Accepted { previous } => {
                // Report the edge into NotReady, not every NotReady refresh.
                let was_usable = previous.map(|p| p.is_ready()).unwrap_or(true);
                if !value.is_ready() && was_usable {
                    self.events.emit(
                        CoreEvent::new(
                            EventKind::IndicatorNotReady,
                            now_ms,
                            format!("indicator {} has insufficient history", runner.spec.id),
                        )
                        .with_symbol(symbol.as_str()),
                    );
                }
            }
            PublishOutcome::Stale => {}
        }
    }
}
