use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use qm_common::Price;
use qm_engine::{
    db_types::{Product, ProductCategory, Role},
    traits::CatalogApiError,
    CatalogApi,
};

use super::{
    helpers::{api_post, issue_token, public_get, test_user},
    mocks::MockCatalogManager,
};

fn sample_product(id: i64, name: &str, cents: i64) -> Product {
    Product {
        id,
        name: name.to_string(),
        description: None,
        price: Price::from_cents(cents),
        category: ProductCategory::Electronics,
        image: "/img/products/default.jpg".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
    }
}

fn public_configure(cfg: &mut ServiceConfig) {
    let mut catalog = MockCatalogManager::new();
    catalog
        .expect_search_products()
        .returning(|_| Ok(vec![sample_product(1, "Espresso machine", 6999), sample_product(2, "Grinder", 2450)]));
    catalog.expect_fetch_product_by_id().returning(|id| match id {
        1 => Ok(Some(sample_product(1, "Espresso machine", 6999))),
        _ => Ok(None),
    });
    cfg.service(crate::routes::ProductsRoute::<MockCatalogManager>::new())
        .service(crate::routes::ProductByIdRoute::<MockCatalogManager>::new())
        .app_data(web::Data::new(CatalogApi::new(catalog)));
}

#[actix_web::test]
async fn catalog_listing_is_public() {
    let _ = env_logger::try_init().ok();
    let (status, body) = public_get("/products", public_configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let products: Vec<Product> = serde_json::from_str(&body).unwrap();
    assert_eq!(products.len(), 2);
    // Prices serialize as decimal dollars
    assert!(body.contains("69.99"));
}

#[actix_web::test]
async fn fetch_product_by_id_returns_the_record_or_a_404() {
    let _ = env_logger::try_init().ok();
    let (status, _) = public_get("/products/1", public_configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let err = public_get("/products/99", public_configure).await.expect_err("Expected error");
    assert_eq!(err, "The data was not found. Product with id 99 not found");
}

fn admin_configure(cfg: &mut ServiceConfig) {
    let mut catalog = MockCatalogManager::new();
    catalog.expect_insert_product().returning(|new| {
        let mut created = sample_product(10, &new.name, new.price.cents());
        created.category = new.category;
        Ok(created)
    });
    catalog.expect_delete_product().returning(|id| match id {
        10 => Ok(()),
        id => Err(CatalogApiError::ProductNotFound(id)),
    });
    cfg.service(crate::routes::CreateProductRoute::<MockCatalogManager>::new())
        .service(crate::routes::DeleteProductRoute::<MockCatalogManager>::new())
        .app_data(web::Data::new(CatalogApi::new(catalog)));
}

#[actix_web::test]
async fn admins_can_create_products() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(&test_user(1, "admin@example.com", Role::Admin));
    let body = serde_json::json!({
        "name": "Standing desk",
        "price": 429.0,
        "category": "Furniture",
    });
    let (status, body) = api_post(&token, "/api/products", body, admin_configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    let product: Product = serde_json::from_str(&body).unwrap();
    assert_eq!(product.price, Price::from_cents(42900));
    assert_eq!(product.category, ProductCategory::Furniture);
}

#[actix_web::test]
async fn ordinary_users_cannot_create_products() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(&test_user(2, "user@example.com", Role::User));
    let body = serde_json::json!({
        "name": "Standing desk",
        "price": 429.0,
        "category": "Furniture",
    });
    let err = api_post(&token, "/api/products", body, admin_configure).await.expect_err("Expected error");
    assert_eq!(err, "Insufficient permissions");
}

#[actix_web::test]
async fn deleting_an_unknown_product_is_a_404() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(&test_user(1, "admin@example.com", Role::Admin));
    let err = super::helpers::api_delete(&token, "/api/products/99", admin_configure).await.expect_err("Expected error");
    assert_eq!(err, "The data was not found. Product with id 99 not found");
}
