//! Account handlers: registration, activation, password reset

use actix_web::{web, HttpResponse};
use tracing::{info, warn};
use validator::Validate;

use mq_core::domain::{NewUser, Password, TokenScope};
use mq_core::errors::{DomainError, DomainResult};
use mq_core::services::{MailTemplate, OutboundMail};

use crate::dto::{ActivateUserRequest, MessageResponse, RegisterUserRequest, ResetPasswordRequest, UserEnvelope};
use crate::handlers::{ApiError, ApiResult};
use crate::state::AppState;

/// POST /v1/users
///
/// Creates an inactive account and mails the first activation token on a
/// tracked background task.
pub async fn register_user(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> ApiResult<HttpResponse> {
    let request = body.into_inner();
    request.validate()?;
    Password::validate(&request.password).map_err(|e| field_error("password", e))?;

    let password_hash = hash_password(request.password, state.auth.bcrypt_cost).await?;
    let user = state
        .repositories
        .users
        .insert(&NewUser::new(request.name, request.email, password_hash))
        .await?;
    info!(user_id = user.id, "User registered");

    let token = state
        .authenticator
        .issue(user.id, TokenScope::Activation, state.auth.activation_ttl())
        .await?;
    let mail = OutboundMail::new(
        user.email.clone(),
        MailTemplate::Welcome {
            user_id: user.id,
            activation_token: token.into_plaintext(),
        },
    );
    // The account exists either way; a new activation token can be requested
    if let Err(e) = state.mail.dispatch(mail) {
        warn!(user_id = user.id, error = %e, "Welcome mail not queued");
    }

    Ok(HttpResponse::Accepted().json(UserEnvelope { user }))
}

/// PUT /v1/users/activated
pub async fn activate_user(
    state: web::Data<AppState>,
    body: web::Json<ActivateUserRequest>,
) -> ApiResult<HttpResponse> {
    let request = body.into_inner();
    request.validate()?;

    // The token survives a failed update, so a 409 can be retried
    let user = state
        .authenticator
        .redeem(&request.token, TokenScope::Activation, |owner| {
            state.users.update_entity(owner.id, owner.version, |user| {
                user.activate();
                Ok(())
            })
        })
        .await
        .map_err(|e| token_error(e, "invalid or expired activation token"))?;
    state.authenticator.revoke_all(user.id, TokenScope::Activation).await?;
    info!(user_id = user.id, "User activated");

    Ok(HttpResponse::Ok().json(UserEnvelope { user }))
}

/// PUT /v1/users/password
///
/// Sets a new password from a reset token and signs the user out everywhere.
pub async fn reset_password(
    state: web::Data<AppState>,
    body: web::Json<ResetPasswordRequest>,
) -> ApiResult<HttpResponse> {
    let request = body.into_inner();
    request.validate()?;
    // Checked first so a weak password never touches the token
    Password::validate(&request.password).map_err(|e| field_error("password", e))?;

    let password_hash = hash_password(request.password, state.auth.bcrypt_cost).await?;
    let user = state
        .authenticator
        .redeem(&request.token, TokenScope::PasswordReset, |owner| {
            state.users.update_entity(owner.id, owner.version, move |user| {
                user.set_password_hash(password_hash);
                Ok(())
            })
        })
        .await
        .map_err(|e| token_error(e, "invalid or expired password reset token"))?;

    let revoked = state.authenticator.revoke_all(user.id, TokenScope::Authentication).await?;
    state.authenticator.revoke_all(user.id, TokenScope::PasswordReset).await?;
    info!(user_id = user.id, revoked, "Password reset");

    Ok(HttpResponse::Ok().json(MessageResponse::new("your password was successfully reset")))
}

/// bcrypt off the async worker
pub(crate) async fn hash_password(password: String, cost: u32) -> ApiResult<String> {
    blocking(move || Password::hash(&password, cost)).await
}

pub(crate) async fn verify_password(password: String, password_hash: String) -> ApiResult<bool> {
    blocking(move || Password::verify(&password, &password_hash)).await
}

async fn blocking<T, F>(work: F) -> ApiResult<T>
where
    F: FnOnce() -> DomainResult<T> + Send + 'static,
    T: Send + 'static,
{
    let result = web::block(work)
        .await
        .map_err(|e| DomainError::internal(format!("blocking task failed: {}", e)))?;
    Ok(result?)
}

/// Report a domain validation failure against one request field
pub(crate) fn field_error(field: &str, error: DomainError) -> ApiError {
    match error {
        DomainError::Validation { message } => ApiError::invalid_field(field, message),
        other => other.into(),
    }
}

/// Tokens sent in a body are form input, not credentials: reject them as a
/// field error rather than with `401`
fn token_error(error: DomainError, message: &str) -> ApiError {
    match error {
        DomainError::Auth(auth) if auth.is_token_failure() => ApiError::invalid_field("token", message),
        other => other.into(),
    }
}
