use qm_common::Price;
use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderItem};

/// The reconciler's view of a completed payment session, after the integration layer has pulled the relevant
/// fields out of the processor's event payload. The cart metadata is still the opaque blob the session was
/// created with; parsing it (and re-pricing it against the catalog) is the reconciler's job.
#[derive(Debug, Clone)]
pub struct CompletedCheckout {
    /// The processor-assigned session id. Used as the idempotency key.
    pub session_id: String,
    pub customer_email: String,
    /// The amount the processor captured, already converted from minor units.
    pub total_price: Price,
    pub cart_metadata: String,
}

/// An order together with its line items. Built by an explicit join; nothing is populated implicitly on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Summary wrapper returned from the order-listing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResult {
    pub total_orders: Price,
    pub orders: Vec<OrderWithItems>,
}

impl OrderResult {
    pub fn new(orders: Vec<OrderWithItems>) -> Self {
        let total_orders = orders.iter().map(|o| o.order.total_price).sum();
        Self { total_orders, orders }
    }
}
