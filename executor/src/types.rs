//! Common types and small abstraction traits at the execution boundary.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use market::types::Symbol;

/// Unique identifier for one order intent, echoed back on its events.
pub type OrderId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Open the short.
    Sell,
    /// Cover the short.
    Buy,
}

/// Why an intent was emitted. The external layer does not need to know the
/// strategy's phase machinery, only what the intent is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentPurpose {
    Entry,
    Flatten,
    EmergencyFlatten,
}

impl fmt::Display for IntentPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IntentPurpose::Entry => "entry",
            IntentPurpose::Flatten => "flatten",
            IntentPurpose::EmergencyFlatten => "emergency_flatten",
        };
        f.write_str(s)
    }
}

/// Instruction to the external execution layer. The kernel sizes the order
/// as a fraction of allocatable capital; broker-specific order types are
/// the router's business.
#[derive(Debug, Clone)]
pub struct OrderIntent {
    pub id: OrderId,
    pub symbol: Symbol,
    pub side: Side,
    pub size_fraction: f64,
    pub purpose: IntentPurpose,
    pub ts_ms: u64,
}

/// Request to withdraw a still-pending intent.
#[derive(Debug, Clone)]
pub struct CancelIntent {
    pub order_id: OrderId,
    pub symbol: Symbol,
    pub ts_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderStatus {
    Filled { fill_price: f64 },
    Rejected { reason: String },
    Cancelled,
}

/// Fed back from the external execution layer for a previously emitted
/// intent.
#[derive(Debug, Clone)]
pub struct OrderEvent {
    pub order_id: OrderId,
    pub symbol: Symbol,
    pub status: OrderStatus,
    pub ts_ms: u64,
}

/// Errors that can occur when handing intents to the external layer.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("router rejected intent: {0}")]
    Rejected(String),

    #[error("router transport error: {0}")]
    Transport(String),

    #[error("backoff schedule must not be empty")]
    EmptySchedule,

    #[error("other: {0}")]
    Other(String),
}

/// Abstraction over the external execution layer.
///
/// `submit` returning Ok means the intent was *accepted for handling*, not
/// filled; fills, rejections, and cancellations come back asynchronously as
/// `OrderEvent`s.
#[async_trait]
pub trait OrderRouter: Send + Sync {
    async fn submit(&self, intent: &OrderIntent) -> Result<(), ExecutionError>;

    async fn cancel(&self, cancel: &CancelIntent) -> Result<(), ExecutionError>;
}
