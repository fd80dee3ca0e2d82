use log::*;

use crate::{
    order_objects::{OrderResult, OrderWithItems},
    traits::{OrderApiError, OrderManagement},
};

/// Read and delete access to the order store. Orders are only ever created by the reconciliation flow
/// ([`super::OrderFlowApi`]).
#[derive(Debug, Clone)]
pub struct OrdersApi<B> {
    db: B,
}

impl<B> OrdersApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrdersApi<B>
where B: OrderManagement
{
    pub async fn fetch_order(&self, id: i64) -> Result<OrderWithItems, OrderApiError> {
        self.db.fetch_order_with_items(id).await?.ok_or(OrderApiError::OrderNotFound(id))
    }

    pub async fn fetch_all_orders(&self) -> Result<OrderResult, OrderApiError> {
        let orders = self.db.fetch_all_orders().await?;
        Ok(OrderResult::new(orders))
    }

    pub async fn fetch_orders_for_user(&self, user_id: i64) -> Result<OrderResult, OrderApiError> {
        let orders = self.db.fetch_orders_for_user(user_id).await?;
        trace!("📦️ {} orders fetched for user #{user_id}", orders.len());
        Ok(OrderResult::new(orders))
    }

    pub async fn delete_order(&self, id: i64) -> Result<(), OrderApiError> {
        self.db.delete_order(id).await?;
        info!("📦️ Order #{id} deleted");
        Ok(())
    }
}
