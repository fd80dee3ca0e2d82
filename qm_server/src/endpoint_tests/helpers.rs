use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::{Duration, TimeZone, Utc};
use qm_common::Secret;
use qm_engine::db_types::{Role, User};

use crate::{
    auth::{decoding_key, TokenIssuer},
    config::AuthConfig,
    middleware::JwtMiddlewareFactory,
};

// Creates a test `AuthConfig` for issuing tokens. DO NOT re-use this secret anywhere.
pub fn get_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: Secret::new("endpoint-test-secret-do-not-reuse".to_string()),
        jwt_validity: Duration::hours(24),
    }
}

pub fn test_user(id: i64, email: &str, role: Role) -> User {
    User {
        id,
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: email.to_string(),
        role,
        is_active: true,
        created_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
    }
}

pub fn issue_token(user: &User) -> String {
    TokenIssuer::new(&get_auth_config()).issue_token(user).expect("Failed to sign token")
}

/// Runs a request against routes mounted under the JWT-guarded `/api` scope.
async fn api_request(
    mut req: TestRequest,
    token: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    if !token.is_empty() {
        req = req.insert_header(("Authorization", format!("Bearer {token}")));
    }
    let req = req.to_request();
    let config = get_auth_config();
    let app = App::new()
        .service(web::scope("/api").wrap(JwtMiddlewareFactory::new(decoding_key(&config))).configure(configure));
    let service = test::init_service(app).await;
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}

/// Runs a request against publicly mounted routes (no auth middleware).
async fn public_request(req: TestRequest, configure: fn(&mut ServiceConfig)) -> Result<(StatusCode, String), String> {
    let req = req.to_request();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}

pub async fn api_get(token: &str, path: &str, configure: fn(&mut ServiceConfig)) -> Result<(StatusCode, String), String> {
    api_request(TestRequest::get().uri(path), token, configure).await
}

pub async fn api_post(
    token: &str,
    path: &str,
    body: serde_json::Value,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    api_request(TestRequest::post().uri(path).set_json(&body), token, configure).await
}

pub async fn api_patch(
    token: &str,
    path: &str,
    body: serde_json::Value,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    api_request(TestRequest::patch().uri(path).set_json(&body), token, configure).await
}

pub async fn api_delete(
    token: &str,
    path: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    api_request(TestRequest::delete().uri(path), token, configure).await
}

pub async fn public_get(path: &str, configure: fn(&mut ServiceConfig)) -> Result<(StatusCode, String), String> {
    public_request(TestRequest::get().uri(path), configure).await
}

pub async fn public_post(
    path: &str,
    body: serde_json::Value,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    public_request(TestRequest::post().uri(path).set_json(&body), configure).await
}
