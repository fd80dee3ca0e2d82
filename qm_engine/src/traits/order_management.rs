use thiserror::Error;

use crate::order_objects::OrderWithItems;

/// Read and delete access to stored orders. Orders are created exclusively through
/// [`super::CheckoutGatewayDatabase::insert_order_once`]; nothing else writes to the order store.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Fetches an order and its line items (explicit join).
    async fn fetch_order_with_items(&self, id: i64) -> Result<Option<OrderWithItems>, OrderApiError>;

    /// All orders, newest first, each with its line items.
    async fn fetch_all_orders(&self) -> Result<Vec<OrderWithItems>, OrderApiError>;

    /// The given user's orders, newest first, each with its line items.
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<OrderWithItems>, OrderApiError>;

    /// Deletes the order and its line items. Returns [`OrderApiError::OrderNotFound`] if the id does not
    /// resolve.
    async fn delete_order(&self, id: i64) -> Result<(), OrderApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum OrderApiError {
    #[error("There is an internal database error: {0}")]
    DatabaseError(String),
    #[error("No order found with id {0}")]
    OrderNotFound(i64),
}

impl From<sqlx::Error> for OrderApiError {
    fn from(e: sqlx::Error) -> Self {
        OrderApiError::DatabaseError(e.to_string())
    }
}
