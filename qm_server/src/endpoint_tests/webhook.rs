use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, App};
use chrono::{TimeZone, Utc};
use qm_common::{Price, Secret};
use qm_engine::{
    db_types::{Order, Product, ProductCategory, Role},
    events::EventProducers,
    traits::InsertOrderResult,
    OrderFlowApi,
};
use stripe_tools::webhook::{compute_signature, SIGNATURE_HEADER};

use super::{helpers::test_user, mocks::MockGateway};

const WEBHOOK_SECRET: &str = "whsec_endpoint_test_secret";

fn signed_header(payload: &[u8]) -> String {
    let timestamp = Utc::now().timestamp();
    format!("t={timestamp},v1={}", compute_signature(WEBHOOK_SECRET, timestamp, payload))
}

fn completed_session_payload(session_id: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "id": "evt_1",
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": session_id,
                "customer_email": "alice@example.com",
                "amount_total": 6999,
                "metadata": { "cart": "[{\"product_id\":1,\"quantity\":1}]" },
            }
        }
    }))
    .unwrap()
}

fn catalog_product(id: i64, cents: i64) -> Product {
    Product {
        id,
        name: format!("Product {id}"),
        description: None,
        price: Price::from_cents(cents),
        category: ProductCategory::Electronics,
        image: "/img/products/default.jpg".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
    }
}

async fn deliver(gateway: MockGateway, payload: Vec<u8>, header: Option<String>) -> Result<(StatusCode, String), String> {
    let order_flow = OrderFlowApi::new(gateway, EventProducers::default());
    let app = App::new()
        .app_data(web::Data::new(order_flow))
        .service(
            web::scope("/stripe")
                .wrap(crate::middleware::SignatureMiddlewareFactory::new(
                    SIGNATURE_HEADER,
                    Secret::new(WEBHOOK_SECRET.to_string()),
                    true,
                ))
                .service(crate::checkout_routes::StripeWebhookRoute::<MockGateway>::new()),
        );
    let service = test::init_service(app).await;
    let mut req = TestRequest::post().uri("/stripe/webhook").insert_header(("Content-Type", "application/json"));
    if let Some(header) = header {
        req = req.insert_header((SIGNATURE_HEADER, header));
    }
    let req = req.set_payload(payload).to_request();
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}

#[actix_web::test]
async fn a_signed_completed_session_creates_an_order() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway
        .expect_fetch_active_user_by_email()
        .returning(|_| Ok(Some(test_user(42, "alice@example.com", Role::User))));
    gateway.expect_fetch_product_by_id().returning(|id| Ok(Some(catalog_product(id, 6999))));
    gateway.expect_insert_order_once().returning(|order| {
        Ok(InsertOrderResult::Inserted(Order {
            id: 1,
            payment_session_id: order.payment_session_id,
            user_id: order.user_id,
            total_price: order.total_price,
            paid: true,
            created_at: Utc::now(),
        }))
    });

    let payload = completed_session_payload("cs_100");
    let header = signed_header(&payload);
    let (status, body) = deliver(gateway, payload, Some(header)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Order processed successfully."));
}

#[actix_web::test]
async fn a_tampered_body_is_rejected_and_no_order_is_created() {
    let _ = env_logger::try_init().ok();
    // No expectations on the mock: any storage call would panic the test
    let gateway = MockGateway::new();
    let payload = completed_session_payload("cs_101");
    let header = signed_header(&payload);
    let mut tampered = payload.clone();
    tampered.extend_from_slice(b" ");
    let err = deliver(gateway, tampered, Some(header)).await.expect_err("Expected error");
    assert_eq!(err, "Invalid webhook signature.");
}

#[actix_web::test]
async fn a_missing_signature_header_is_rejected() {
    let _ = env_logger::try_init().ok();
    let gateway = MockGateway::new();
    let payload = completed_session_payload("cs_102");
    let err = deliver(gateway, payload, None).await.expect_err("Expected error");
    assert_eq!(err, "No webhook signature found.");
}

#[actix_web::test]
async fn unrelated_event_types_are_acknowledged_without_action() {
    let _ = env_logger::try_init().ok();
    let gateway = MockGateway::new();
    let payload = serde_json::to_vec(&serde_json::json!({
        "id": "evt_2",
        "type": "payment_intent.created",
        "data": { "object": {} }
    }))
    .unwrap();
    let header = signed_header(&payload);
    let (status, body) = deliver(gateway, payload, Some(header)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Event acknowledged."));
}

#[actix_web::test]
async fn an_unknown_buyer_is_acknowledged_but_creates_no_order() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway.expect_fetch_active_user_by_email().returning(|_| Ok(None));
    // insert_order_once has no expectation: a call would panic
    let payload = completed_session_payload("cs_103");
    let header = signed_header(&payload);
    let (status, body) = deliver(gateway, payload, Some(header)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Event acknowledged."));
}

#[actix_web::test]
async fn a_duplicate_delivery_is_acknowledged_as_success() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway
        .expect_fetch_active_user_by_email()
        .returning(|_| Ok(Some(test_user(42, "alice@example.com", Role::User))));
    gateway.expect_fetch_product_by_id().returning(|id| Ok(Some(catalog_product(id, 6999))));
    gateway
        .expect_insert_order_once()
        .returning(|order| Ok(InsertOrderResult::AlreadyExists(order.payment_session_id)));

    let payload = completed_session_payload("cs_104");
    let header = signed_header(&payload);
    let (status, body) = deliver(gateway, payload, Some(header)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Event acknowledged."));
}

#[actix_web::test]
async fn malformed_cart_metadata_is_absorbed_with_a_200() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway
        .expect_fetch_active_user_by_email()
        .returning(|_| Ok(Some(test_user(42, "alice@example.com", Role::User))));
    let payload = serde_json::to_vec(&serde_json::json!({
        "id": "evt_3",
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": "cs_105",
                "customer_email": "alice@example.com",
                "amount_total": 6999,
                "metadata": { "cart": "certainly not json" },
            }
        }
    }))
    .unwrap();
    let header = signed_header(&payload);
    let (status, body) = deliver(gateway, payload, Some(header)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"success\":false"));
}
