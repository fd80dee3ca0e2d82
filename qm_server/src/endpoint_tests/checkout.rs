use actix_web::{web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use qm_common::Price;
use qm_engine::{
    db_types::{CartItem, Product, ProductCategory, Role},
    CatalogApi,
};
use stripe_tools::{StripeApi, StripeConfig};

use super::{
    helpers::{api_post, issue_token, test_user},
    mocks::MockCatalogManager,
};
use crate::{
    auth::JwtClaims,
    config::CheckoutConfig,
    data_objects::CheckoutRequest,
    integrations::stripe::build_checkout_session,
};

fn catalog_product(id: i64, cents: i64) -> Product {
    Product {
        id,
        name: format!("Product {id}"),
        description: Some("From the catalog".to_string()),
        price: Price::from_cents(cents),
        category: ProductCategory::Electronics,
        image: "/img/products/default.jpg".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
    }
}

fn claims() -> JwtClaims {
    JwtClaims {
        sub: 42,
        email: "alice@example.com".to_string(),
        role: Role::User,
        iat: Utc::now().timestamp(),
        exp: Utc::now().timestamp() + 3600,
    }
}

fn mock_catalog() -> CatalogApi<MockCatalogManager> {
    let mut catalog = MockCatalogManager::new();
    catalog.expect_fetch_product_by_id().returning(|id| match id {
        1 => Ok(Some(catalog_product(1, 6999))),
        7 => Ok(Some(catalog_product(7, 2450))),
        _ => Ok(None),
    });
    CatalogApi::new(catalog)
}

#[actix_web::test]
async fn line_items_use_catalog_prices_never_client_prices() {
    let _ = env_logger::try_init().ok();
    // A tampering client injects price fields into the cart payload; they have nowhere to land
    let payload = serde_json::json!({
        "items": [
            { "product_id": 1, "quantity": 2, "price": 0.01, "unitPrice": 0.01 },
            { "product_id": 7, "quantity": 1, "price": 0.01 },
        ]
    });
    let request: CheckoutRequest = serde_json::from_value(payload).unwrap();
    let session =
        build_checkout_session(&request.items, &claims(), &mock_catalog(), &CheckoutConfig::default()).await.unwrap();

    assert_eq!(session.line_items.len(), 2);
    assert_eq!(session.line_items[0].unit_amount, 6999);
    assert_eq!(session.line_items[1].unit_amount, 2450);
    assert_eq!(session.customer_email, "alice@example.com");
    assert_eq!(session.client_reference_id, "42");
    // The metadata blob carries ids and quantities only
    assert_eq!(session.cart_metadata, r#"[{"product_id":1,"quantity":2},{"product_id":7,"quantity":1}]"#);
}

#[actix_web::test]
async fn empty_carts_are_rejected_before_any_session_is_requested() {
    let _ = env_logger::try_init().ok();
    let err = build_checkout_session(&[], &claims(), &mock_catalog(), &CheckoutConfig::default())
        .await
        .expect_err("Expected error");
    assert_eq!(err.to_string(), "Invalid request. No products selected for checkout");
}

#[actix_web::test]
async fn an_unknown_product_fails_the_whole_request() {
    let _ = env_logger::try_init().ok();
    let items = [CartItem { product_id: 1, quantity: 1 }, CartItem { product_id: 99, quantity: 1 }];
    let err = build_checkout_session(&items, &claims(), &mock_catalog(), &CheckoutConfig::default())
        .await
        .expect_err("Expected error");
    assert_eq!(err.to_string(), "The data was not found. Product with id 99 not found");
}

#[actix_web::test]
async fn zero_quantities_are_rejected() {
    let _ = env_logger::try_init().ok();
    let items = [CartItem { product_id: 1, quantity: 0 }];
    let err = build_checkout_session(&items, &claims(), &mock_catalog(), &CheckoutConfig::default())
        .await
        .expect_err("Expected error");
    assert_eq!(err.to_string(), "Invalid request. Cart quantities must be at least 1");
}

// The endpoint itself: an empty cart never reaches the payment processor (the StripeApi here points at an
// unroutable address, so any outbound call would error loudly).
fn route_configure(cfg: &mut ServiceConfig) {
    let catalog = MockCatalogManager::new();
    let stripe_config = StripeConfig { api_base: "http://127.0.0.1:1".to_string(), ..Default::default() };
    cfg.service(crate::checkout_routes::CheckoutSessionRoute::<MockCatalogManager>::new())
        .app_data(web::Data::new(CatalogApi::new(catalog)))
        .app_data(web::Data::new(StripeApi::new(stripe_config).unwrap()))
        .app_data(web::Data::new(CheckoutConfig::default()));
}

#[actix_web::test]
async fn the_checkout_endpoint_rejects_empty_carts() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(&test_user(42, "alice@example.com", Role::User));
    let body = serde_json::json!({ "items": [] });
    let err = api_post(&token, "/api/checkout/session", body, route_configure).await.expect_err("Expected error");
    assert_eq!(err, "Invalid request. No products selected for checkout");
}
