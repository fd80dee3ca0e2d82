use chrono::{DateTime, Utc};
use mockall::mock;
use qm_engine::{
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

mock! {
    pub CatalogManager {}
    impl CatalogManagement for CatalogManager {
        async fn fetch_product_by_id(&self, id: i64) -> Result<Option<Product>, CatalogApiError>;
        async fn search_products(&self, query: ProductQueryFilter) -> Result<Vec<Product>, CatalogApiError>;
        async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogApiError>;
        async fn update_product(&self, id: i64, update: ProductUpdate) -> Result<Product, CatalogApiError>;
        async fn delete_product(&self, id: i64) -> Result<(), CatalogApiError>;
    }
}

mock! {
    pub AccountManager {}
    impl UserManagement for AccountManager {
        async fn fetch_user_by_id(&self, id: i64) -> Result<Option<User>, AccountApiError>;
        async fn fetch_active_user_by_email(&self, email: &str) -> Result<Option<User>, AccountApiError>;
        async fn fetch_all_users(&self) -> Result<Vec<User>, AccountApiError>;
        async fn insert_user(&self, user: NewUser) -> Result<User, AccountApiError>;
        async fn update_user(&self, id: i64, update: UserUpdate) -> Result<User, AccountApiError>;
        async fn deactivate_user(&self, id: i64) -> Result<(), AccountApiError>;
    }
}

mock! {
    pub AuthManager {}
    impl AuthManagement for AuthManager {
        async fn fetch_credentials_by_email(&self, email: &str) -> Result<Option<UserCredentials>, AuthApiError>;
        async fn fetch_credentials_by_user_id(&self, user_id: i64) -> Result<Option<UserCredentials>, AuthApiError>;
        async fn update_password_hash(&self, user_id: i64, password_hash: &str) -> Result<(), AuthApiError>;
        async fn store_reset_token(&self, user_id: i64, token_digest: &str, expires_at: DateTime<Utc>) -> Result<(), AuthApiError>;
        async fn fetch_user_by_reset_digest(&self, token_digest: &str) -> Result<Option<User>, AuthApiError>;
    }
}

mock! {
    pub OrderManager {}
    impl OrderManagement for OrderManager {
        async fn fetch_order_with_items(&self, id: i64) -> Result<Option<OrderWithItems>, OrderApiError>;
        async fn fetch_all_orders(&self) -> Result<Vec<OrderWithItems>, OrderApiError>;
        async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<OrderWithItems>, OrderApiError>;
        async fn delete_order(&self, id: i64) -> Result<(), OrderApiError>;
    }
}

// The webhook handler needs the full gateway contract in one backend.
mock! {
    pub Gateway {}
    impl CatalogManagement for Gateway {
        async fn fetch_product_by_id(&self, id: i64) -> Result<Option<Product>, CatalogApiError>;
        async fn search_products(&self, query: ProductQueryFilter) -> Result<Vec<Product>, CatalogApiError>;
        async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogApiError>;
        async fn update_product(&self, id: i64, update: ProductUpdate) -> Result<Product, CatalogApiError>;
        async fn delete_product(&self, id: i64) -> Result<(), CatalogApiError>;
    }
    impl UserManagement for Gateway {
        async fn fetch_user_by_id(&self, id: i64) -> Result<Option<User>, AccountApiError>;
        async fn fetch_active_user_by_email(&self, email: &str) -> Result<Option<User>, AccountApiError>;
        async fn fetch_all_users(&self) -> Result<Vec<User>, AccountApiError>;
        async fn insert_user(&self, user: NewUser) -> Result<User, AccountApiError>;
        async fn update_user(&self, id: i64, update: UserUpdate) -> Result<User, AccountApiError>;
        async fn deactivate_user(&self, id: i64) -> Result<(), AccountApiError>;
    }
    impl OrderManagement for Gateway {
        async fn fetch_order_with_items(&self, id: i64) -> Result<Option<OrderWithItems>, OrderApiError>;
        async fn fetch_all_orders(&self) -> Result<Vec<OrderWithItems>, OrderApiError>;
        async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<OrderWithItems>, OrderApiError>;
        async fn delete_order(&self, id: i64) -> Result<(), OrderApiError>;
    }
    impl CheckoutGatewayDatabase for Gateway {
        fn url(&self) -> &str;
        async fn insert_order_once(&self, order: NewOrder) -> Result<InsertOrderResult, CheckoutGatewayError>;
        async fn close(&mut self) -> Result<(), CheckoutGatewayError>;
    }
}
