use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use qm_common::Price;
use qm_engine::{
    db_types::{Order, OrderItem, Role},
    order_objects::{OrderResult, OrderWithItems},
    OrdersApi,
};

use super::{
    helpers::{api_delete, api_get, issue_token, test_user},
    mocks::MockOrderManager,
};

fn sample_order(id: i64, user_id: i64, session: &str, cents: i64) -> OrderWithItems {
    OrderWithItems {
        order: Order {
            id,
            payment_session_id: session.to_string(),
            user_id,
            total_price: Price::from_cents(cents),
            paid: true,
            created_at: Utc.with_ymd_and_hms(2024, 3, 15, 18, 30, 0).unwrap(),
        },
        items: vec![OrderItem {
            id: id * 10,
            order_id: id,
            product_id: Some(1),
            quantity: 1,
            unit_price: Price::from_cents(cents),
        }],
    }
}

fn configure(cfg: &mut ServiceConfig) {
    let mut order_manager = MockOrderManager::new();
    order_manager
        .expect_fetch_orders_for_user()
        .returning(|user_id| Ok(vec![sample_order(1, user_id, "cs_001", 6999)]));
    order_manager.expect_fetch_all_orders().returning(|| {
        Ok(vec![sample_order(1, 3, "cs_001", 6999), sample_order(2, 4, "cs_002", 2450)])
    });
    order_manager.expect_delete_order().returning(|_| Ok(()));
    cfg.service(crate::routes::MyOrdersRoute::<MockOrderManager>::new())
        .service(crate::routes::OrdersRoute::<MockOrderManager>::new())
        .service(crate::routes::DeleteOrderRoute::<MockOrderManager>::new())
        .app_data(web::Data::new(OrdersApi::new(order_manager)));
}

#[actix_web::test]
async fn users_fetch_their_own_orders() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(&test_user(3, "carol@example.com", Role::User));
    let (status, body) = api_get(&token, "/api/orders/my", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let result: OrderResult = serde_json::from_str(&body).unwrap();
    assert_eq!(result.orders.len(), 1);
    assert_eq!(result.orders[0].order.user_id, 3);
    assert_eq!(result.total_orders, Price::from_cents(6999));
}

#[actix_web::test]
async fn listing_all_orders_requires_the_admin_role() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(&test_user(3, "carol@example.com", Role::User));
    let err = api_get(&token, "/api/orders", configure).await.expect_err("Expected error");
    assert_eq!(err, "Insufficient permissions");

    let admin_token = issue_token(&test_user(1, "admin@example.com", Role::Admin));
    let (status, body) = api_get(&admin_token, "/api/orders", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let result: OrderResult = serde_json::from_str(&body).unwrap();
    assert_eq!(result.orders.len(), 2);
    assert_eq!(result.total_orders, Price::from_cents(9449));
}

#[actix_web::test]
async fn admins_can_delete_orders() {
    let _ = env_logger::try_init().ok();
    let admin_token = issue_token(&test_user(1, "admin@example.com", Role::Admin));
    let (status, _) = api_delete(&admin_token, "/api/orders/1", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::NO_CONTENT);
}
