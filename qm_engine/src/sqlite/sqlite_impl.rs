//! `SqliteDatabase` is a concrete implementation of a QuickMart storage backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};

use super::db::{auth, new_pool, orders, products, users};
use crate::{
    catalog_objects::ProductQueryFilter,
    db_types::{NewOrder, NewProduct, NewUser, Product, ProductUpdate, User, UserCredentials, UserUpdate},
    order_objects::OrderWithItems,
    traits::{
        AccountApiError,
        AuthApiError,
        AuthManagement,
        CatalogApiError,
        CatalogManagement,
        CheckoutGatewayDatabase,
        CheckoutGatewayError,
        InsertOrderResult,
        OrderApiError,
        OrderManagement,
        UserManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Opens a connection pool against the given URL. Call [`SqliteDatabase::run_migrations`] before serving
    /// requests against a fresh database.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, CheckoutGatewayError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    /// Creates the database file if it does not exist yet.
    pub async fn create_if_missing(url: &str) -> Result<(), CheckoutGatewayError> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            info!("🗃️ Database {url} does not exist yet. Creating it.");
            Sqlite::create_database(url).await.map_err(|e| CheckoutGatewayError::DatabaseError(e.to_string()))?;
        }
        Ok(())
    }

    pub async fn run_migrations(&self) -> Result<(), CheckoutGatewayError> {
        sqlx::migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| CheckoutGatewayError::DatabaseError(e.to_string()))?;
        info!("🗃️ Migrations complete");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

//--------------------------------------  CatalogManagement  ---------------------------------------------------------
impl CatalogManagement for SqliteDatabase {
    async fn fetch_product_by_id(&self, id: i64) -> Result<Option<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(products::fetch_product_by_id(id, &mut conn).await?)
    }

    async fn search_products(&self, query: ProductQueryFilter) -> Result<Vec<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(products::search_products(query, &mut conn).await?)
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(products::insert_product(product, &mut conn).await?)
    }

    async fn update_product(&self, id: i64, update: ProductUpdate) -> Result<Product, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        products::update_product(id, update, &mut conn).await?.ok_or(CatalogApiError::ProductNotFound(id))
    }

    async fn delete_product(&self, id: i64) -> Result<(), CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let deleted = products::delete_product(id, &mut conn).await?;
        if deleted {
            Ok(())
        } else {
            Err(CatalogApiError::ProductNotFound(id))
        }
    }
}

//--------------------------------------   UserManagement   ----------------------------------------------------------
impl UserManagement for SqliteDatabase {
    async fn fetch_user_by_id(&self, id: i64) -> Result<Option<User>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::fetch_user_by_id(id, &mut conn).await?)
    }

    async fn fetch_active_user_by_email(&self, email: &str) -> Result<Option<User>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::fetch_active_user_by_email(email, &mut conn).await?)
    }

    async fn fetch_all_users(&self) -> Result<Vec<User>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::fetch_all_users(&mut conn).await?)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        users::insert_user(user, &mut conn).await
    }

    async fn update_user(&self, id: i64, update: UserUpdate) -> Result<User, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        users::update_user(id, update, &mut conn).await?.ok_or(AccountApiError::UserNotFound(id))
    }

    async fn deactivate_user(&self, id: i64) -> Result<(), AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let deactivated = users::deactivate_user(id, &mut conn).await?;
        if deactivated {
            Ok(())
        } else {
            Err(AccountApiError::UserNotFound(id))
        }
    }
}

//--------------------------------------   AuthManagement   ----------------------------------------------------------
impl AuthManagement for SqliteDatabase {
    async fn fetch_credentials_by_email(&self, email: &str) -> Result<Option<UserCredentials>, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(auth::fetch_credentials_by_email(email, &mut conn).await?)
    }

    async fn fetch_credentials_by_user_id(&self, user_id: i64) -> Result<Option<UserCredentials>, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(auth::fetch_credentials_by_user_id(user_id, &mut conn).await?)
    }

    async fn update_password_hash(&self, user_id: i64, password_hash: &str) -> Result<(), AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        let updated = auth::update_password_hash(user_id, password_hash, &mut conn).await?;
        if updated {
            Ok(())
        } else {
            Err(AuthApiError::UserNotFound(user_id))
        }
    }

    async fn store_reset_token(
        &self,
        user_id: i64,
        token_digest: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        let stored = auth::store_reset_token(user_id, token_digest, expires_at, &mut conn).await?;
        if stored {
            Ok(())
        } else {
            Err(AuthApiError::UserNotFound(user_id))
        }
    }

    async fn fetch_user_by_reset_digest(&self, token_digest: &str) -> Result<Option<User>, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(auth::fetch_user_by_reset_digest(token_digest, &mut conn).await?)
    }
}

//--------------------------------------   OrderManagement   ---------------------------------------------------------
impl OrderManagement for SqliteDatabase {
    async fn fetch_order_with_items(&self, id: i64) -> Result<Option<OrderWithItems>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let Some(order) = orders::fetch_order_by_id(id, &mut conn).await? else {
            return Ok(None);
        };
        let items = orders::fetch_items_for_order(order.id, &mut conn).await?;
        Ok(Some(OrderWithItems { order, items }))
    }

    async fn fetch_all_orders(&self) -> Result<Vec<OrderWithItems>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let order_rows = orders::fetch_all_orders(&mut conn).await?;
        let mut result = Vec::with_capacity(order_rows.len());
        for order in order_rows {
            let items = orders::fetch_items_for_order(order.id, &mut conn).await?;
            result.push(OrderWithItems { order, items });
        }
        Ok(result)
    }

    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<OrderWithItems>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let order_rows = orders::fetch_orders_for_user(user_id, &mut conn).await?;
        let mut result = Vec::with_capacity(order_rows.len());
        for order in order_rows {
            let items = orders::fetch_items_for_order(order.id, &mut conn).await?;
            result.push(OrderWithItems { order, items });
        }
        Ok(result)
    }

    async fn delete_order(&self, id: i64) -> Result<(), OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let deleted = orders::delete_order(id, &mut conn).await?;
        if deleted {
            Ok(())
        } else {
            Err(OrderApiError::OrderNotFound(id))
        }
    }
}

//------------------------------------ CheckoutGatewayDatabase -------------------------------------------------------
impl CheckoutGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order_once(&self, order: NewOrder) -> Result<InsertOrderResult, CheckoutGatewayError> {
        let mut tx = self.pool.begin().await?;
        let result = orders::idempotent_insert(order, &mut *tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn close(&mut self) -> Result<(), CheckoutGatewayError> {
        debug!("🗃️ Closing database connection pool for {}", self.url);
        self.pool.close().await;
        Ok(())
    }
}
