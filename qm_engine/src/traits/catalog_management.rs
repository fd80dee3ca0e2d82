use thiserror::Error;

use crate::{
    catalog_objects::ProductQueryFilter,
    db_types::{NewProduct, Product, ProductUpdate},
};

/// Read and write access to the product catalog.
///
/// The catalog is the authoritative source of prices. Both the checkout session builder and the order
/// reconciler re-resolve every product id through [`CatalogManagement::fetch_product_by_id`]; client-supplied
/// prices are never trusted.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    /// Pure read. Returns `None` if the id does not resolve.
    async fn fetch_product_by_id(&self, id: i64) -> Result<Option<Product>, CatalogApiError>;

    /// Fetches products matching the filter, ordered by name, with limit/offset pagination.
    async fn search_products(&self, query: ProductQueryFilter) -> Result<Vec<Product>, CatalogApiError>;

    async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogApiError>;

    /// Applies the non-`None` fields of the update. Fails with [`CatalogApiError::ProductNotFound`] if the id
    /// does not resolve.
    async fn update_product(&self, id: i64, update: ProductUpdate) -> Result<Product, CatalogApiError>;

    /// Removes the product. Line items on existing orders keep their captured price; their product reference
    /// is nulled out.
    async fn delete_product(&self, id: i64) -> Result<(), CatalogApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum CatalogApiError {
    #[error("There is an internal database error: {0}")]
    DatabaseError(String),
    #[error("Product with id {0} not found")]
    ProductNotFound(i64),
    #[error("Invalid product data. {0}")]
    ValidationError(String),
    #[error("The requested product change would result in a no-op.")]
    UpdateNoOp,
}

impl From<sqlx::Error> for CatalogApiError {
    fn from(e: sqlx::Error) -> Self {
        CatalogApiError::DatabaseError(e.to_string())
    }
}
