//! Cart metadata serialization.
//!
//! The original cart (product ids and quantities only, never prices) rides along with the checkout session as
//! an opaque metadata string, and comes back on the completion webhook for reconciliation.

use thiserror::Error;

use crate::db_types::CartItem;

#[derive(Debug, Clone, Error)]
#[error("Could not parse cart metadata. {0}")]
pub struct CartMetadataError(pub String);

pub fn serialize_cart(items: &[CartItem]) -> String {
    // CartItem contains only integers; serialization cannot fail
    serde_json::to_string(items).expect("cart items always serialize")
}

pub fn parse_cart(metadata: &str) -> Result<Vec<CartItem>, CartMetadataError> {
    serde_json::from_str(metadata).map_err(|e| CartMetadataError(e.to_string()))
}
