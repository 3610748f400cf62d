//! Latest-reading registry.
//!
//! Keeps exactly one reading per indicator×symbol — the newest — and fans
//! updates out to subscribers. Responsibilities:
//!   • Discard out-of-order readings (an older refresh can never overwrite
//!     newer state)
//!   • Serve consistent per-symbol snapshots to the condition evaluator
//!   • Notify subscribers without ever blocking the publisher

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock, mpsc};
use tracing::{debug, warn};

use market::types::Symbol;

use crate::spec::IndicatorId;
use crate::value::IndicatorValue;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorReading {
    pub indicator: IndicatorId,
    pub symbol: Symbol,
    pub ts_ms: u64,
    pub value: IndicatorValue,
}

/// What `publish` did with a reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PublishOutcome {
    /// Stored and fanned out. Carries the value it replaced, if any.
    Accepted {
        previous: Option<IndicatorValue>,
    },
    /// Older than the retained reading; dropped.
    Stale,
}

/// Read-only snapshot of one symbol's latest readings, as the condition
/// evaluator consumes them. Missing indicators read as NotReady.
#[derive(Debug, Clone, Default)]
pub struct ReadingsView {
    latest: HashMap<IndicatorId, IndicatorReading>,
}

impl ReadingsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reading: IndicatorReading) {
        self.latest.insert(reading.indicator.clone(), reading);
    }

    pub fn get(&self, id: &IndicatorId) -> Option<&IndicatorReading> {
        self.latest.get(id)
    }

    pub fn value(&self, id: &IndicatorId) -> IndicatorValue {
        self.latest
            .get(id)
            .map(|r| r.value)
            .unwrap_or(IndicatorValue::NotReady)
    }
}

pub const SUBSCRIBER_CHANNEL_CAPACITY: usize = 64;

#[derive(Default)]
pub struct ReadingsRegistry {
    latest: RwLock<HashMap<(IndicatorId, Symbol), IndicatorReading>>,
    subscribers: Mutex<Vec<mpsc::Sender<IndicatorReading>>>,
}

impl ReadingsRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Store a reading unless a newer one is already retained, and fan the
    /// accepted reading out to subscribers. Fan-out uses `try_send`: a slow
    /// subscriber loses readings (with a warning) rather than stalling the
    /// indicator engine.
    pub async fn publish(&self, reading: IndicatorReading) -> PublishOutcome {
        let previous = {
            let mut map = self.latest.write().await;
            let key = (reading.indicator.clone(), reading.symbol.clone());
            if let Some(existing) = map.get(&key) {
                if existing.ts_ms > reading.ts_ms {
                    debug!(
                        indicator = %reading.indicator,
                        symbol = %reading.symbol,
                        retained_ts = existing.ts_ms,
                        offered_ts = reading.ts_ms,
                        "discarding stale reading"
                    );
                    return PublishOutcome::Stale;
                }
            }
            map.insert(key, reading.clone()).map(|r| r.value)
        };

        let mut subs = self.subscribers.lock().await;
        subs.retain(|tx| match tx.try_send(reading.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(
                    indicator = %reading.indicator,
                    symbol = %reading.symbol,
                    "subscriber lagging, reading dropped"
                );
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });

        PublishOutcome::Accepted { previous }
    }

    /// Register a new subscriber for every accepted reading.
    pub async fn subscribe(&self) -> mpsc::Receiver<IndicatorReading> {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_CHANNEL_CAPACITY);
        self.subscribers.lock().await.push(tx);
        rx
    }

    pub async fn latest(&self, id: &IndicatorId, symbol: &Symbol) -> Option<IndicatorReading> {
        self.latest
            .read()
            .await
            .get(&(id.clone(), symbol.clone()))
            .cloned()
    }

    /// All latest readings for one symbol, as one consistent view.
    pub async fn snapshot_for(&self, symbol: &Symbol) -> ReadingsView {
        let map = self.latest.read().await;
        let mut view = ReadingsView::new();
        for ((_, sym), reading) in map.iter() {
            if sym == symbol {
                view.insert(reading.clone());
            }
        }
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(id: &str, sym: &str, ts_ms: u64, value: IndicatorValue) -> IndicatorReading {
        IndicatorReading {
            indicator: IndicatorId::from(id),
            symbol: Symbol::from(sym),
            ts_ms,
            value,
        }
    }

    #[tokio::test]
    async fn retains_only_the_newest_reading() {
        let reg = ReadingsRegistry::new();
        let id = IndicatorId::from("pump");
        let sym = Symbol::from("PUMP");

        reg.publish(reading("pump", "PUMP", 1_000, IndicatorValue::Ready(1.0)))
            .await;
        reg.publish(reading("pump", "PUMP", 2_000, IndicatorValue::Ready(2.0)))
            .await;

        let latest = reg.latest(&id, &sym).await.unwrap();
        assert_eq!(latest.ts_ms, 2_000);
        assert_eq!(latest.value, IndicatorValue::Ready(2.0));
    }

    #[tokio::test]
    async fn stale_reading_cannot_overwrite_newer_state() {
        let reg = ReadingsRegistry::new();
        let id = IndicatorId::from("pump");
        let sym = Symbol::from("PUMP");

        reg.publish(reading("pump", "PUMP", 2_000, IndicatorValue::Ready(2.0)))
            .await;
        let outcome = reg
            .publish(reading("pump", "PUMP", 1_000, IndicatorValue::Ready(9.0)))
            .await;

        assert_eq!(outcome, PublishOutcome::Stale);
        let latest = reg.latest(&id, &sym).await.unwrap();
        assert_eq!(latest.value, IndicatorValue::Ready(2.0));
    }

    #[tokio::test]
    async fn subscribers_receive_accepted_readings_only() {
        let reg = ReadingsRegistry::new();
        let mut rx = reg.subscribe().await;

        reg.publish(reading("pump", "PUMP", 2_000, IndicatorValue::Ready(2.0)))
            .await;
        reg.publish(reading("pump", "PUMP", 1_000, IndicatorValue::Ready(9.0)))
            .await;

        let got = rx.recv().await.unwrap();
        assert_eq!(got.ts_ms, 2_000);
        assert!(rx.try_recv().is_err(), "stale reading must not fan out");
    }

    #[tokio::test]
    async fn snapshot_isolates_symbols() {
        let reg = ReadingsRegistry::new();

        reg.publish(reading("pump", "AAA", 1_000, IndicatorValue::Ready(1.0)))
            .await;
        reg.publish(reading("pump", "BBB", 1_000, IndicatorValue::Ready(7.0)))
            .await;

        let view = reg.snapshot_for(&Symbol::from("AAA")).await;
        assert_eq!(
            view.value(&IndicatorId::from("pump")),
            IndicatorValue::Ready(1.0)
        );
        // Unknown indicator reads NotReady, never an error.
        assert_eq!(
            view.value(&IndicatorId::from("missing")),
            IndicatorValue::NotReady
        );
    }
}
