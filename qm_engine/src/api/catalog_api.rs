use log::*;

use crate::{
    catalog_objects::ProductQueryFilter,
    db_types::{NewProduct, Product, ProductUpdate},
    traits::{CatalogApiError, CatalogManagement},
};

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Typed access to the product catalog. Validation happens here so every backend gets the same rules.
#[derive(Debug, Clone)]
pub struct CatalogApi<B> {
    db: B,
}

impl<B> CatalogApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    /// Resolves a product id to the current catalog record. Callers that must fail the whole request on a
    /// missing product get a [`CatalogApiError::ProductNotFound`] naming the offending id.
    pub async fn fetch_product(&self, id: i64) -> Result<Product, CatalogApiError> {
        self.db.fetch_product_by_id(id).await?.ok_or(CatalogApiError::ProductNotFound(id))
    }

    pub async fn fetch_product_by_id(&self, id: i64) -> Result<Option<Product>, CatalogApiError> {
        self.db.fetch_product_by_id(id).await
    }

    pub async fn search_products(&self, query: ProductQueryFilter) -> Result<Vec<Product>, CatalogApiError> {
        self.db.search_products(query).await
    }

    pub async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogApiError> {
        validate_name(&product.name)?;
        validate_description(product.description.as_deref())?;
        if product.price.is_negative() {
            return Err(CatalogApiError::ValidationError("Price must be at least 0".to_string()));
        }
        let product = self.db.insert_product(product).await?;
        debug!("🛒️ Product {} created with id {}", product.name, product.id);
        Ok(product)
    }

    pub async fn update_product(&self, id: i64, update: ProductUpdate) -> Result<Product, CatalogApiError> {
        if update.is_empty() {
            return Err(CatalogApiError::UpdateNoOp);
        }
        if let Some(name) = &update.name {
            validate_name(name)?;
        }
        validate_description(update.description.as_deref())?;
        if update.price.map(|p| p.is_negative()).unwrap_or(false) {
            return Err(CatalogApiError::ValidationError("Price must be at least 0".to_string()));
        }
        self.db.update_product(id, update).await
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), CatalogApiError> {
        self.db.delete_product(id).await?;
        debug!("🛒️ Product {id} deleted");
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), CatalogApiError> {
    if name.trim().is_empty() {
        return Err(CatalogApiError::ValidationError("Product name is required".to_string()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CatalogApiError::ValidationError(format!(
            "Product name cannot exceed {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> Result<(), CatalogApiError> {
    if description.map(|d| d.chars().count() > MAX_DESCRIPTION_LENGTH).unwrap_or(false) {
        return Err(CatalogApiError::ValidationError(format!(
            "Description cannot exceed {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(())
}
