use tracing::Span;

use super::TraceId;

/// Root span for one symbol's processing path (ingest, indicator refresh).
pub fn symbol_span(symbol: &str, trace_id: &TraceId) -> Span {
    tracing::info_span!("symbol", symbol = %symbol, trace_id = %trace_id)
}

/// Span covering one strategy instance's lifecycle.
pub fn instance_span(strategy: &str, symbol: &str) -> Span {
    tracing::info_span!("instance", strategy = %strategy, symbol = %symbol)
}
