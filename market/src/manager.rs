//! MarketHub
//!
//! Owns the live per-symbol tick buffers and the ingest boundary.
//! Responsibilities:
//!   • Accept ticks from the external market-data layer
//!   • Enforce non-decreasing timestamps per symbol (reject + log otherwise)
//!   • Create a symbol's series lazily on its first tick
//!   • Hand out shared read handles for the indicator layer
//!
//! Exactly one ingest path appends ticks for a given symbol; indicator
//! queries run concurrently behind the per-symbol read/write lock and always
//! observe fully-applied ticks. Failures are per-symbol: a rejected tick for
//! one symbol never disturbs another's series.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use common::events::{CoreEvent, EventKind, EventSink};

use crate::buffer::{IngestError, SymbolSeries};
use crate::types::{QuoteLevel, Symbol, Tick};

pub type SharedSeries = Arc<RwLock<SymbolSeries>>;

pub struct MarketHub {
    /// Live series indexed by symbol. The outer lock guards only the map;
    /// each series carries its own lock.
    series: RwLock<HashMap<Symbol, SharedSeries>>,

    /// Retention horizon applied to every new series.
    max_age_ms: u64,

    events: Arc<dyn EventSink>,
}

impl MarketHub {
    pub fn new(max_age_ms: u64, events: Arc<dyn EventSink>) -> Arc<Self> {
        Arc::new(Self {
            series: RwLock::new(HashMap::new()),
            max_age_ms,
            events,
        })
    }

    /// Tick ingest boundary. Timestamps must be non-decreasing per symbol;
    /// violations are rejected, logged, and reported as events.
    pub async fn ingest(
        &self,
        symbol: Symbol,
        ts_ms: u64,
        price: f64,
        volume: f64,
        best_bid: QuoteLevel,
        best_ask: QuoteLevel,
    ) -> Result<(), IngestError> {
        let tick = Tick {
            symbol: symbol.clone(),
            ts_ms,
            price,
            volume,
            bid: best_bid,
            ask: best_ask,
        };

        let series = self.series_for(&symbol).await;
        let mut guard = series.write().await;

        match guard.append(tick) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(symbol = %symbol, ts_ms, "rejected tick: {e}");
                self.events.emit(
                    CoreEvent::new(EventKind::TickRejected, ts_ms, e.to_string())
                        .with_symbol(symbol.as_str()),
                );
                Err(e)
            }
        }
    }

    /// Shared handle to one symbol's series, if it has ever ticked.
    pub async fn series(&self, symbol: &Symbol) -> Option<SharedSeries> {
        self.series.read().await.get(symbol).cloned()
    }

    /// All symbols currently holding a series.
    pub async fn symbols(&self) -> Vec<Symbol> {
        self.series.read().await.keys().cloned().collect()
    }

    async fn series_for(&self, symbol: &Symbol) -> SharedSeries {
        {
            let map = self.series.read().await;
            if let Some(existing) = map.get(symbol) {
                return Arc::clone(existing);
            }
        }

        let mut map = self.series.write().await;
        Arc::clone(map.entry(symbol.clone()).or_insert_with(|| {
            Arc::new(RwLock::new(SymbolSeries::with_retention(
                symbol.clone(),
                self.max_age_ms,
            )))
        }))
    }
}
