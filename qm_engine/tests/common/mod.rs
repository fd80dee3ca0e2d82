//! Shared setup for the engine integration tests: a fresh, migrated SQLite database per test.

use qm_common::Price;
use qm_engine::{
    db_types::{Product, ProductCategory, User},
    AccountApi,
    CatalogApi,
    RegisterUser,
    SqliteDatabase,
};

pub const TEST_PASSWORD: &str = "correct horse battery";

pub fn random_db_path() -> String {
    format!("sqlite://{}/qm_test_{}.db", std::env::temp_dir().display(), rand::random::<u64>())
}

pub async fn prepare_test_db() -> SqliteDatabase {
    dotenvy::dotenv().ok();
    let _ = env_logger::try_init();
    let url = random_db_path();
    SqliteDatabase::create_if_missing(&url).await.expect("Error creating test database");
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
    db.run_migrations().await.expect("Error running DB migrations");
    db
}

pub async fn seed_user(db: &SqliteDatabase, email: &str) -> User {
    let api = AccountApi::new(db.clone());
    let registration = RegisterUser {
        first_name: "Alice".to_string(),
        last_name: "Meyer".to_string(),
        email: email.to_string(),
        password: TEST_PASSWORD.to_string(),
    };
    api.register_user(registration).await.expect("Error registering test user")
}

pub async fn seed_product(db: &SqliteDatabase, name: &str, price_cents: i64) -> Product {
    let api = CatalogApi::new(db.clone());
    let product = qm_engine::db_types::NewProduct {
        name: name.to_string(),
        description: Some(format!("{name} (test catalog entry)")),
        price: Price::from_cents(price_cents),
        category: ProductCategory::Electronics,
        image: None,
    };
    api.create_product(product).await.expect("Error creating test product")
}
