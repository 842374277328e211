//! Bearer token authentication middleware
//!
//! Resolves the `Authorization: Bearer <token>` header into an
//! [`AuthContext`] stored in the request extensions:
//!
//! - no header: anonymous request, handlers decide whether that is enough
//! - malformed header or a token that fails authentication: `401` with
//!   `WWW-Authenticate: Bearer`, the handler is never called
//!
//! Route handlers demand a caller with the [`AuthenticatedUser`] or
//! [`ActivatedUser`] extractors.

use actix_web::{
    body::EitherBody,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};

use mq_core::domain::{TokenScope, User};
use mq_core::errors::{AuthError, DomainError};
use mq_core::services::Authenticator;

use crate::handlers::ApiError;

/// Who is making the request
#[derive(Debug, Clone)]
pub enum AuthContext {
    Anonymous,
    User(User),
}

impl AuthContext {
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthContext::Anonymous => None,
            AuthContext::User(user) => Some(user),
        }
    }
}

/// Bearer authentication middleware factory
pub struct BearerAuth {
    authenticator: Arc<Authenticator>,
}

impl BearerAuth {
    pub fn new(authenticator: Arc<Authenticator>) -> Self {
        Self { authenticator }
    }
}

impl<S, B> Transform<S, ServiceRequest> for BearerAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = BearerAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(BearerAuthMiddleware {
            service: Rc::new(service),
            authenticator: Arc::clone(&self.authenticator),
        }))
    }
}

/// Bearer authentication middleware service
pub struct BearerAuthMiddleware<S> {
    service: Rc<S>,
    authenticator: Arc<Authenticator>,
}

impl<S, B> Service<ServiceRequest> for BearerAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let authenticator = Arc::clone(&self.authenticator);

        Box::pin(async move {
            let context = match bearer_token(&req) {
                BearerToken::Absent => Ok(AuthContext::Anonymous),
                BearerToken::Malformed => Err(DomainError::Auth(AuthError::InvalidCredentials)),
                BearerToken::Present(token) => authenticator
                    .authenticate(&token, TokenScope::Authentication)
                    .await
                    .map(AuthContext::User),
            };

            match context {
                Ok(context) => {
                    req.extensions_mut().insert(context);
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                }
                Err(error) => {
                    let response = ApiError::from(error).error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
enum BearerToken {
    Absent,
    Malformed,
    Present(String),
}

fn bearer_token(req: &ServiceRequest) -> BearerToken {
    let Some(value) = req.headers().get(AUTHORIZATION) else {
        return BearerToken::Absent;
    };

    let token = value
        .to_str()
        .ok()
        .and_then(|header| header.split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty());

    match token {
        Some(token) => BearerToken::Present(token.to_string()),
        None => BearerToken::Malformed,
    }
}

fn context_of(req: &HttpRequest) -> AuthContext {
    req.extensions()
        .get::<AuthContext>()
        .cloned()
        .unwrap_or(AuthContext::Anonymous)
}

/// Extractor for routes that need any authenticated user
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = match context_of(req) {
            AuthContext::User(user) => Ok(AuthenticatedUser(user)),
            AuthContext::Anonymous => Err(DomainError::Auth(AuthError::AuthenticationRequired).into()),
        };
        ready(result)
    }
}

/// Extractor for routes that need an authenticated, activated user
#[derive(Debug, Clone)]
pub struct ActivatedUser(pub User);

impl FromRequest for ActivatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = match context_of(req) {
            AuthContext::User(user) if user.activated => Ok(ActivatedUser(user)),
            AuthContext::User(_) => Err(DomainError::Auth(AuthError::InactiveAccount).into()),
            AuthContext::Anonymous => Err(DomainError::Auth(AuthError::AuthenticationRequired).into()),
        };
        ready(result)
    }
}
