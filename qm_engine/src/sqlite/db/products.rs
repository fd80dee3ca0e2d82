use log::{debug, trace};
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, SqliteConnection};

use crate::{
    catalog_objects::{ProductQueryFilter, DEFAULT_PAGE_SIZE},
    db_types::{NewProduct, Product, ProductUpdate, DEFAULT_PRODUCT_IMAGE},
    traits::CatalogApiError,
};

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, sqlx::Error> {
    let image = product.image.unwrap_or_else(|| DEFAULT_PRODUCT_IMAGE.to_string());
    let inserted: Product = sqlx::query_as(
        r#"
            INSERT INTO products (name, description, price, category, image)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(product.name)
    .bind(product.description)
    .bind(product.price)
    .bind(product.category)
    .bind(image)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Product [{}] inserted with id {}", inserted.name, inserted.id);
    Ok(inserted)
}

pub async fn fetch_product_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(id).fetch_optional(conn).await
}

/// Fetches products according to criteria specified in the `ProductQueryFilter`.
///
/// Resulting products are ordered by name in ascending order. Pagination always applies; an unbounded
/// catalog read is not offered.
pub async fn search_products(
    query: ProductQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<Product>, sqlx::Error> {
    let mut builder = QueryBuilder::new(
        r#"
    SELECT * FROM products
    "#,
    );
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(category) = query.category {
        where_clause.push("category = ");
        where_clause.push_bind_unseparated(category.to_string());
    }
    if let Some(min_price) = query.min_price {
        where_clause.push("price >= ");
        where_clause.push_bind_unseparated(min_price.cents());
    }
    if let Some(max_price) = query.max_price {
        where_clause.push("price <= ");
        where_clause.push_bind_unseparated(max_price.cents());
    }
    if let Some(name) = query.name {
        where_clause.push("name LIKE ");
        where_clause.push_bind_unseparated(format!("%{name}%"));
    }
    builder.push(" ORDER BY name ASC");
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 500);
    builder.push(format!(" LIMIT {limit}"));
    let offset = query.offset.unwrap_or_default().max(0);
    if offset > 0 {
        builder.push(format!(" OFFSET {offset}"));
    }

    trace!("📝️ Executing query: {}", builder.sql());
    let query = builder.build_query_as::<Product>();
    let products = query.fetch_all(conn).await?;
    trace!("Result of search_products: {:?}", products.len());
    Ok(products)
}

pub async fn update_product(
    id: i64,
    update: ProductUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, CatalogApiError> {
    if update.is_empty() {
        debug!("📝️ No fields to update for product {id}. Update request skipped.");
        return Err(CatalogApiError::UpdateNoOp);
    }
    let mut builder = QueryBuilder::new("UPDATE products SET updated_at = CURRENT_TIMESTAMP, ");
    let mut set_clause = builder.separated(", ");
    if let Some(name) = update.name {
        set_clause.push("name = ");
        set_clause.push_bind_unseparated(name);
    }
    if let Some(description) = update.description {
        set_clause.push("description = ");
        set_clause.push_bind_unseparated(description);
    }
    if let Some(price) = update.price {
        set_clause.push("price = ");
        set_clause.push_bind_unseparated(price.cents());
    }
    if let Some(category) = update.category {
        set_clause.push("category = ");
        set_clause.push_bind_unseparated(category.to_string());
    }
    if let Some(image) = update.image {
        set_clause.push("image = ");
        set_clause.push_bind_unseparated(image);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING *");
    trace!("📝️ Executing query: {}", builder.sql());
    let res = builder
        .build()
        .fetch_optional(conn)
        .await
        .map_err(CatalogApiError::from)?
        .map(|row: SqliteRow| Product::from_row(&row))
        .transpose()
        .map_err(CatalogApiError::from)?;
    Ok(res)
}

/// Returns `false` if no product with the given id exists.
pub async fn delete_product(id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}
