//! Access token issuing and validation.
//!
//! Tokens are HS256 JWTs carrying the user's id, email and role. They are short-lived and not refreshed; a
//! password change does not revoke outstanding tokens.

use std::future::{ready, Ready};

use actix_web::{FromRequest, HttpMessage, HttpRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use qm_engine::db_types::{Role, User};
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The user's id.
    pub sub: i64,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl JwtClaims {
    pub fn user_id(&self) -> i64 {
        self.sub
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Extracts the claims that [`crate::middleware::JwtMiddlewareService`] validated and stashed on the request.
impl FromRequest for JwtClaims {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let claims = req
            .extensions()
            .get::<JwtClaims>()
            .cloned()
            .ok_or_else(|| ServerError::AuthenticationError(AuthError::MissingToken).into());
        ready(claims)
    }
}

pub struct TokenIssuer {
    encoding_key: EncodingKey,
    validity: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
        Self { encoding_key, validity: config.jwt_validity }
    }

    /// Issue a new access token for the given user. The caller has already authenticated the user (password
    /// check or fresh signup); this method only signs.
    pub fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.validity).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| AuthError::ValidationError(e.to_string()))
    }
}

pub fn decoding_key(config: &AuthConfig) -> DecodingKey {
    DecodingKey::from_secret(config.jwt_secret.reveal().as_bytes())
}

/// Validates signature and expiry and returns the claims.
pub fn validate_token(token: &str, key: &DecodingKey) -> Result<JwtClaims, AuthError> {
    let data = decode::<JwtClaims>(token, key, &Validation::default())
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;
    Ok(data.claims)
}
