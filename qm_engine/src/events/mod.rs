//! Engine events.
//!
//! The reconciler publishes an event whenever an order is created from a completed payment session, and —
//! because the webhook endpoint acknowledges receipt no matter what happens after signature verification — a
//! structured failure record whenever a captured payment could not be reconciled. Hook a monitoring sink into
//! the latter; silently lost reconciliations are invisible otherwise.

mod channel;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use hooks::{EventHandlers, EventHooks, EventProducers};
use serde::{Deserialize, Serialize};

use crate::db_types::Order;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPaidEvent {
    pub order: Order,
}

impl OrderPaidEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// A completed payment session that could not be turned into an order. The payment has already been captured,
/// so these need eyes on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationFailedEvent {
    pub session_id: String,
    pub reason: String,
}

impl ReconciliationFailedEvent {
    pub fn new<S: Into<String>>(session_id: S, reason: S) -> Self {
        Self { session_id: session_id.into(), reason: reason.into() }
    }
}
