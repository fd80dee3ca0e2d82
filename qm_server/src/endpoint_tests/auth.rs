use actix_web::{http::StatusCode, web, web::ServiceConfig};
use qm_engine::{
    db_types::{Role, User, UserCredentials},
    helpers::passwords,
    AccountApi,
    AuthApi,
};

use super::{
    helpers::{api_get, get_auth_config, issue_token, public_post, test_user},
    mocks::{MockAccountManager, MockAuthManager},
};
use crate::{auth::TokenIssuer, data_objects::AuthResponse};

fn signup_configure(cfg: &mut ServiceConfig) {
    let mut account_manager = MockAccountManager::new();
    account_manager.expect_insert_user().returning(|user| {
        let mut created = test_user(1, &user.email, Role::User);
        created.first_name = user.first_name;
        created.last_name = user.last_name;
        Ok(created)
    });
    cfg.service(crate::routes::SignupRoute::<MockAccountManager>::new())
        .app_data(web::Data::new(AccountApi::new(account_manager)))
        .app_data(web::Data::new(TokenIssuer::new(&get_auth_config())));
}

#[actix_web::test]
async fn signup_creates_an_account_and_logs_the_user_in() {
    let _ = env_logger::try_init().ok();
    let body = serde_json::json!({
        "first_name": "Alice",
        "last_name": "Meyer",
        "email": "alice@example.com",
        "password": "correct horse battery",
    });
    let (status, body) = public_post("/auth/signup", body, signup_configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    let response: AuthResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(response.user.email, "alice@example.com");
    assert!(!response.token.is_empty());
}

#[actix_web::test]
async fn signup_rejects_short_passwords() {
    let _ = env_logger::try_init().ok();
    let body = serde_json::json!({
        "first_name": "Alice",
        "last_name": "Meyer",
        "email": "alice@example.com",
        "password": "short",
    });
    let err = public_post("/auth/signup", body, signup_configure).await.expect_err("Expected error");
    assert_eq!(err, "Invalid request. Password must be at least 8 characters");
}

fn login_configure(cfg: &mut ServiceConfig) {
    let mut auth_manager = MockAuthManager::new();
    auth_manager.expect_fetch_credentials_by_email().returning(|email| {
        if email == "bob@example.com" {
            let password_hash = passwords::hash_password("a fine password").unwrap();
            Ok(Some(UserCredentials { user: test_user(2, "bob@example.com", Role::User), password_hash }))
        } else {
            Ok(None)
        }
    });
    cfg.service(crate::routes::LoginRoute::<MockAuthManager>::new())
        .app_data(web::Data::new(AuthApi::new(auth_manager)))
        .app_data(web::Data::new(TokenIssuer::new(&get_auth_config())));
}

#[actix_web::test]
async fn login_returns_a_token_for_valid_credentials() {
    let _ = env_logger::try_init().ok();
    let body = serde_json::json!({ "email": "bob@example.com", "password": "a fine password" });
    let (status, body) = public_post("/auth/login", body, login_configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let response: AuthResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(response.user.id, 2);
}

#[actix_web::test]
async fn login_rejects_bad_credentials_without_leaking_which_was_wrong() {
    let _ = env_logger::try_init().ok();
    let wrong_password = serde_json::json!({ "email": "bob@example.com", "password": "not it" });
    let err1 = public_post("/auth/login", wrong_password, login_configure).await.expect_err("Expected error");
    let unknown_email = serde_json::json!({ "email": "ghost@example.com", "password": "a fine password" });
    let err2 = public_post("/auth/login", unknown_email, login_configure).await.expect_err("Expected error");
    assert_eq!(err1, "Authentication Error. Invalid email or password.");
    assert_eq!(err1, err2);
}

fn me_configure(cfg: &mut ServiceConfig) {
    let mut account_manager = MockAccountManager::new();
    account_manager
        .expect_fetch_user_by_id()
        .returning(|id| Ok(Some(test_user(id, "carol@example.com", Role::User))));
    cfg.service(crate::routes::MyAccountRoute::<MockAccountManager>::new())
        .app_data(web::Data::new(AccountApi::new(account_manager)));
}

#[actix_web::test]
async fn fetch_my_account_requires_a_token() {
    let _ = env_logger::try_init().ok();
    let err = api_get("", "/api/users/me", me_configure).await.expect_err("Expected error");
    assert_eq!(err, "Authentication Error. You are not logged in, please login.");
}

#[actix_web::test]
async fn fetch_my_account_rejects_tampered_tokens() {
    let _ = env_logger::try_init().ok();
    let mut token = issue_token(&test_user(3, "carol@example.com", Role::User));
    token.replace_range(token.len() - 10..token.len() - 5, "00000");
    let err = api_get(&token, "/api/users/me", me_configure).await.expect_err("Expected error");
    assert!(err.starts_with("Authentication Error. Authentication token is invalid or has expired."), "got: {err}");
}

#[actix_web::test]
async fn fetch_my_account_returns_the_token_owner() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(&test_user(3, "carol@example.com", Role::User));
    let (status, body) = api_get(&token, "/api/users/me", me_configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let user: User = serde_json::from_str(&body).unwrap();
    assert_eq!(user.id, 3);
    assert_eq!(user.email, "carol@example.com");
}
