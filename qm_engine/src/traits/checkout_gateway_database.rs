use thiserror::Error;

use crate::{
    db_types::{NewOrder, Order},
    helpers::cart::CartMetadataError,
    traits::{AccountApiError, CatalogApiError, CatalogManagement, OrderApiError, OrderManagement, UserManagement},
};

/// The highest-level storage contract: everything the order reconciler needs from a backend.
///
/// A backend that implements this trait can attribute completed payment sessions to users, re-price carts
/// against the catalog, and persist exactly one order per session.
#[allow(async_fn_in_trait)]
pub trait CheckoutGatewayDatabase: CatalogManagement + OrderManagement + UserManagement {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Takes a new order and, in a single atomic transaction, stores the order row and its line items.
    ///
    /// Idempotency is enforced by the storage layer: the order's `payment_session_id` carries a uniqueness
    /// constraint, so a second insert for the same session reports
    /// [`InsertOrderResult::AlreadyExists`] instead of creating a duplicate. There is no read-then-write
    /// pre-check to race against.
    async fn insert_order_once(&self, order: NewOrder) -> Result<InsertOrderResult, CheckoutGatewayError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), CheckoutGatewayError> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum InsertOrderResult {
    Inserted(Order),
    /// An order for this payment session already exists. The duplicate delivery is suppressed.
    AlreadyExists(String),
}

#[derive(Debug, Clone, Error)]
pub enum CheckoutGatewayError {
    #[error("There is an internal database error: {0}")]
    DatabaseError(String),
    #[error("An order already exists for payment session {0}")]
    OrderAlreadyExists(String),
    #[error("Could not parse the cart metadata attached to the session. {0}")]
    InvalidCartMetadata(#[from] CartMetadataError),
    #[error("{0}")]
    AccountError(#[from] AccountApiError),
    #[error("{0}")]
    CatalogError(#[from] CatalogApiError),
    #[error("{0}")]
    OrderError(#[from] OrderApiError),
}

impl From<sqlx::Error> for CheckoutGatewayError {
    fn from(e: sqlx::Error) -> Self {
        CheckoutGatewayError::DatabaseError(e.to_string())
    }
}
