//! Entry-time position context shared between the strategy layer and the
//! indicators that are only meaningful once a position exists
//! (momentum reversal, dump exhaustion, support proximity).
//!
//! The snapshot is captured exactly once at entry and never overwritten
//! while the position is live; the strategy layer arms it on entry and
//! clears it when the instance closes.

use std::collections::HashMap;
use std::sync::RwLock;

use market::types::Symbol;

/// Frozen observation taken at the moment a position is opened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntrySnapshot {
    pub entry_ts_ms: u64,
    /// Price at entry — the pump peak the retracement factors measure from.
    pub entry_price: f64,
    /// Velocity reading at entry, the reference for momentum reversal.
    pub peak_velocity: f64,
}

#[derive(Default)]
pub struct PositionContextStore {
    inner: RwLock<HashMap<Symbol, EntrySnapshot>>,
}

impl PositionContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the snapshot for a symbol. Returns false (and changes nothing)
    /// if one is already armed — the entry snapshot is write-once.
    pub fn arm(&self, symbol: Symbol, snapshot: EntrySnapshot) -> bool {
        let mut map = self.inner.write().unwrap();
        if map.contains_key(&symbol) {
            return false;
        }
        map.insert(symbol, snapshot);
        true
    }

    pub fn get(&self, symbol: &Symbol) -> Option<EntrySnapshot> {
        self.inner.read().unwrap().get(symbol).copied()
    }

    pub fn clear(&self, symbol: &Symbol) {
        self.inner.write().unwrap().remove(symbol);
    }
}
