//! Application factory
//!
//! Request pipeline, outermost first: access log → rate limit → bearer
//! authentication → handler.

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, Error,
};
use tracing_actix_web::TracingLogger;

use crate::handlers::error::{json_error_handler, not_found, path_error_handler};
use crate::middleware::{BearerAuth, RateLimit};
use crate::routes;
use crate::state::AppState;

/// Create and configure the application with all dependencies
pub fn create_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    let json_config = web::JsonConfig::default()
        .limit(state.max_payload_size)
        .error_handler(json_error_handler);
    let path_config = web::PathConfig::default().error_handler(path_error_handler);

    let bearer_auth = BearerAuth::new(state.authenticator.clone());
    let rate_limit = RateLimit::new(state.rate_limiter.clone(), state.trusted_proxies.clone());

    App::new()
        .app_data(state)
        .app_data(json_config)
        .app_data(path_config)
        // `wrap` order is inside-out: the last one registered runs first
        .wrap(bearer_auth)
        .wrap(rate_limit)
        .wrap(TracingLogger::default())
        .configure(routes::configure)
        .default_service(web::route().to(not_found))
}
