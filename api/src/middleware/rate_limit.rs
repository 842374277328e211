//! Per-client admission middleware
//!
//! Every request is charged one token from the caller's bucket in the shared
//! [`RateLimiterRegistry`]. A rejected request never reaches the handler.
//!
//! The caller is the peer address. Forwarded headers only name the caller
//! when the peer is one of the configured trusted proxies.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, ResponseError,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    net::IpAddr,
    rc::Rc,
    sync::Arc,
};

use mq_core::errors::DomainError;
use mq_core::services::RateLimiterRegistry;

use crate::handlers::ApiError;

/// Rate limiter middleware factory
pub struct RateLimit {
    registry: Arc<RateLimiterRegistry>,
    trusted_proxies: Arc<[IpAddr]>,
}

impl RateLimit {
    pub fn new(registry: Arc<RateLimiterRegistry>, trusted_proxies: Arc<[IpAddr]>) -> Self {
        Self {
            registry,
            trusted_proxies,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            registry: Arc::clone(&self.registry),
            trusted_proxies: Arc::clone(&self.trusted_proxies),
        }))
    }
}

/// Rate limiter middleware service
pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    registry: Arc<RateLimiterRegistry>,
    trusted_proxies: Arc<[IpAddr]>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut std::task::Context<'_>) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Skip key extraction entirely when limiting is off
        if self.registry.is_enabled() {
            let client = extract_client_ip(&req, &self.trusted_proxies);
            if !self.registry.allow(&client) {
                tracing::warn!(client = %client, path = req.path(), "rate limit exceeded");
                let response = ApiError::from(DomainError::RateLimited).error_response();
                return Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) });
            }
        }

        let service = Rc::clone(&self.service);
        Box::pin(async move { service.call(req).await.map(ServiceResponse::map_into_left_body) })
    }
}

/// Client key for the request
///
/// The peer address, unless the peer is a trusted proxy. Then the nearest
/// untrusted hop of `X-Forwarded-For` (read right to left, so entries a client
/// prepends are never reached), then `X-Real-IP`, then the proxy itself.
pub fn extract_client_ip(req: &ServiceRequest, trusted_proxies: &[IpAddr]) -> String {
    let Some(peer) = req.peer_addr().map(|addr| addr.ip()) else {
        return "unknown".to_string();
    };
    if !trusted_proxies.contains(&peer) {
        return peer.to_string();
    }

    let header = |name: &str| req.headers().get(name).and_then(|value| value.to_str().ok());

    let forwarded = header("x-forwarded-for").and_then(|chain| {
        chain
            .rsplit(',')
            .map_while(|hop| hop.trim().parse::<IpAddr>().ok())
            .find(|hop| !trusted_proxies.contains(hop))
    });
    let real_ip = || header("x-real-ip").and_then(|value| value.trim().parse::<IpAddr>().ok());

    forwarded.or_else(real_ip).unwrap_or(peer).to_string()
}
