//! JWT authentication middleware.
//!
//! Wraps a scope and requires a valid `Authorization: Bearer <token>` header on every request. On success the
//! validated [`JwtClaims`] are stored in the request extensions, where handlers pick them up via the
//! [`actix_web::FromRequest`] impl on `JwtClaims` (and the ACL middleware reads them for role checks).

use std::{pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
    HttpMessage,
};
use futures::{
    future::{ok, Ready},
    Future,
};
use jsonwebtoken::DecodingKey;
use log::debug;

use crate::{
    auth::{validate_token, JwtClaims},
    errors::{AuthError, ServerError},
};

pub struct JwtMiddlewareFactory {
    decoding_key: DecodingKey,
}

impl JwtMiddlewareFactory {
    pub fn new(decoding_key: DecodingKey) -> Self {
        JwtMiddlewareFactory { decoding_key }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = JwtMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(JwtMiddlewareService { decoding_key: self.decoding_key.clone(), service: Rc::new(service) })
    }
}

pub struct JwtMiddlewareService<S> {
    decoding_key: DecodingKey,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let decoding_key = self.decoding_key.clone();
        Box::pin(async move {
            let token = bearer_token(&req)
                .ok_or_else(|| Error::from(ServerError::AuthenticationError(AuthError::MissingToken)))?;
            let claims = validate_token(&token, &decoding_key).map_err(|e| {
                debug!("🔐️ Rejecting request with invalid access token. {e}");
                Error::from(ServerError::AuthenticationError(e))
            })?;
            req.extensions_mut().insert(claims);
            service.call(req).await
        })
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}
