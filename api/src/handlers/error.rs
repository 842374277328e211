//! Domain error to HTTP response mapping
//!
//! Every failure leaves the API as an [`ErrorResponse`] body. 5xx responses
//! carry a generic message; the cause is only logged.

use actix_web::http::{header, StatusCode};
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use std::collections::BTreeMap;

use mq_core::errors::{AuthError, DomainError};
use mq_shared::errors::{error_codes, ErrorResponse};

pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned by handlers and extractors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Malformed request: unreadable JSON, bad header, wrong content type
    #[error("{0}")]
    BadRequest(String),

    /// Well-formed request with invalid field values
    #[error("request failed validation")]
    FailedValidation(BTreeMap<String, String>),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    /// Single-field validation failure
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::FailedValidation(BTreeMap::from([(field.into(), message.into())]))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, failures)| {
                let message = failures
                    .first()
                    .and_then(|failure| failure.message.as_ref())
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| "is invalid".to_string());
                (field.to_string(), message)
            })
            .collect();
        ApiError::FailedValidation(fields)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Domain(error) => domain_status(error),
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::FailedValidation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = match self {
            ApiError::Domain(error) => domain_body(error),
            ApiError::BadRequest(message) => ErrorResponse::new(error_codes::BAD_REQUEST, message.clone()),
            ApiError::FailedValidation(fields) => {
                ErrorResponse::new(error_codes::VALIDATION_FAILED, "request failed validation")
                    .add_detail("fields", fields)
            }
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let mut response = HttpResponse::build(status);
        if status == StatusCode::UNAUTHORIZED {
            response.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        response.json(body)
    }
}

fn domain_status(error: &DomainError) -> StatusCode {
    match error {
        DomainError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        DomainError::Auth(AuthError::InactiveAccount) => StatusCode::FORBIDDEN,
        DomainError::Auth(_) => StatusCode::UNAUTHORIZED,
        DomainError::EditConflict => StatusCode::CONFLICT,
        DomainError::NotFound { .. } | DomainError::InvalidId { .. } => StatusCode::NOT_FOUND,
        DomainError::Validation { .. } | DomainError::DuplicateEmail => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::ShutdownInProgress | DomainError::StorageUnavailable { .. } => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        DomainError::ShutdownTimeout { .. } | DomainError::Internal { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn domain_body(error: &DomainError) -> ErrorResponse {
    match error {
        DomainError::RateLimited => ErrorResponse::new(error_codes::RATE_LIMIT_EXCEEDED, "rate limit exceeded"),
        // Clients learn nothing about which check failed
        DomainError::Auth(auth) if auth.is_token_failure() => ErrorResponse::new(
            error_codes::INVALID_AUTHENTICATION_TOKEN,
            "invalid or missing authentication token",
        ),
        DomainError::Auth(AuthError::AuthenticationRequired) => ErrorResponse::new(
            error_codes::AUTHENTICATION_REQUIRED,
            "you must be authenticated to access this resource",
        ),
        DomainError::Auth(AuthError::InactiveAccount) => ErrorResponse::new(
            error_codes::INACTIVE_ACCOUNT,
            "your user account must be activated to access this resource",
        ),
        DomainError::Auth(_) => {
            ErrorResponse::new(error_codes::INVALID_CREDENTIALS, "invalid authentication credentials")
        }
        DomainError::EditConflict => ErrorResponse::new(
            error_codes::EDIT_CONFLICT,
            "unable to update the record due to an edit conflict, please try again",
        ),
        DomainError::NotFound { .. } | DomainError::InvalidId { .. } => {
            ErrorResponse::new(error_codes::NOT_FOUND, "the requested resource could not be found")
        }
        DomainError::Validation { message } => {
            ErrorResponse::new(error_codes::VALIDATION_FAILED, message.clone())
        }
        DomainError::DuplicateEmail => {
            ErrorResponse::new(error_codes::VALIDATION_FAILED, "request failed validation").add_detail(
                "fields",
                BTreeMap::from([("email", "a user with this email address already exists")]),
            )
        }
        DomainError::ShutdownInProgress => ErrorResponse::new(
            error_codes::SERVICE_UNAVAILABLE,
            "the server is shutting down, please retry shortly",
        ),
        DomainError::StorageUnavailable { .. } => ErrorResponse::new(
            error_codes::SERVICE_UNAVAILABLE,
            "the service is temporarily unavailable",
        ),
        DomainError::ShutdownTimeout { .. } | DomainError::Internal { .. } => ErrorResponse::new(
            error_codes::INTERNAL_ERROR,
            "the server encountered a problem and could not process your request",
        ),
    }
}

/// `JsonConfig` error handler: unreadable bodies are 400s in the common shape
pub fn json_error_handler(error: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::bad_request(format!("body contains badly-formed JSON: {}", error)).into()
}

/// `PathConfig` error handler: an unparseable id names no resource
pub fn path_error_handler(error: actix_web::error::PathError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %error, "Unparseable path parameter");
    ApiError::Domain(DomainError::not_found("resource")).into()
}

/// Fallback for unknown routes
pub async fn not_found() -> ApiResult<HttpResponse> {
    Err(ApiError::Domain(DomainError::not_found("route")))
}
