use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewOrder, NewOrderItem, Order},
    events::{EventProducers, OrderPaidEvent, ReconciliationFailedEvent},
    helpers::cart,
    order_objects::CompletedCheckout,
    traits::{CheckoutGatewayDatabase, CheckoutGatewayError, InsertOrderResult},
};

/// `OrderFlowApi` is the primary API for converting completed payment sessions into persisted orders
/// (reconciliation).
///
/// The flow never trusts prices supplied by the client or embedded in the session metadata: every line item is
/// re-priced from the catalog at reconciliation time. The order total, however, is the amount the processor
/// actually captured.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> OrderFlowApi<B>
where B: CheckoutGatewayDatabase
{
    /// Reconciles a completed payment session into at most one order.
    ///
    /// The caller has already verified the webhook signature; whatever happens here, the webhook endpoint
    /// acknowledges receipt, so every abandoned reconciliation is published as a
    /// [`ReconciliationFailedEvent`] for the monitoring hooks.
    ///
    /// Returns `Ok(Some(order))` when a new order was created, and `Ok(None)` when the event was absorbed
    /// without creating one (unknown buyer, empty cart after re-resolution, or a duplicate delivery).
    pub async fn process_completed_checkout(
        &self,
        checkout: CompletedCheckout,
    ) -> Result<Option<Order>, CheckoutGatewayError> {
        let session_id = checkout.session_id.clone();
        trace!("🔄️📦️ Reconciling completed payment session [{session_id}]");
        let user = match self.db.fetch_active_user_by_email(&checkout.customer_email).await? {
            Some(user) => user,
            None => {
                // The payment went through, but there is nobody to attribute the order to.
                warn!("🔄️📦️ No active user matches the buyer email for session [{session_id}]. No order created.");
                self.call_reconciliation_failed_hook(&session_id, "no user matches the buyer email").await;
                return Ok(None);
            },
        };

        let cart_items = match cart::parse_cart(&checkout.cart_metadata) {
            Ok(items) => items,
            Err(e) => {
                warn!("🔄️📦️ Session [{session_id}] carried unparseable cart metadata. {e}");
                self.call_reconciliation_failed_hook(&session_id, &format!("unparseable cart metadata: {e}")).await;
                return Err(e.into());
            },
        };

        let mut items = Vec::with_capacity(cart_items.len());
        for item in &cart_items {
            if item.quantity == 0 {
                warn!("🔄️📦️ Dropping zero-quantity line for product #{} in session [{session_id}]", item.product_id);
                continue;
            }
            // Re-resolve against the catalog. The payment is already captured, so a vanished product drops
            // its line rather than failing the whole session.
            match self.db.fetch_product_by_id(item.product_id).await? {
                Some(product) => items.push(NewOrderItem {
                    product_id: product.id,
                    quantity: item.quantity,
                    unit_price: product.price,
                }),
                None => {
                    warn!(
                        "🔄️📦️ Product #{} in session [{session_id}] no longer exists. Dropping the line.",
                        item.product_id
                    );
                },
            }
        }

        if items.is_empty() {
            warn!("🔄️📦️ Session [{session_id}] resolved to no line items. No order created.");
            self.call_reconciliation_failed_hook(&session_id, "cart resolved to no line items").await;
            return Ok(None);
        }

        let order = NewOrder {
            payment_session_id: session_id.clone(),
            user_id: user.id,
            // The total the processor captured, not a recomputation from the surviving lines.
            total_price: checkout.total_price,
            items,
        };
        match self.db.insert_order_once(order).await? {
            InsertOrderResult::Inserted(order) => {
                info!("🔄️📦️ Order #{} created for session [{session_id}], total {}", order.id, order.total_price);
                self.call_order_paid_hook(&order).await;
                Ok(Some(order))
            },
            InsertOrderResult::AlreadyExists(_) => {
                info!("🔄️📦️ Session [{session_id}] was already reconciled. Duplicate delivery suppressed.");
                Ok(None)
            },
        }
    }

    async fn call_order_paid_hook(&self, order: &Order) {
        for emitter in &self.producers.order_paid_producer {
            debug!("🔄️📦️ Notifying order paid hook subscribers");
            let event = OrderPaidEvent::new(order.clone());
            emitter.publish_event(event).await;
        }
    }

    async fn call_reconciliation_failed_hook(&self, session_id: &str, reason: &str) {
        for emitter in &self.producers.reconciliation_failed_producer {
            let event = ReconciliationFailedEvent::new(session_id, reason);
            emitter.publish_event(event).await;
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
