//! Token issuance and revocation handlers

use actix_web::{web, HttpResponse};
use tracing::info;
use validator::Validate;

use mq_core::domain::{TokenScope, User};
use mq_core::errors::{AuthError, DomainError};
use mq_core::services::{MailTemplate, OutboundMail};

use super::users::verify_password;
use crate::dto::{
    AuthenticationTokenEnvelope, CreateAuthenticationTokenRequest, EmailRequest, MessageResponse, TokenView,
};
use crate::handlers::{ApiError, ApiResult};
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

/// POST /v1/tokens/authentication
///
/// Exchanges email and password for a bearer token. Unknown email and wrong
/// password produce the same response.
pub async fn create_authentication_token(
    state: web::Data<AppState>,
    body: web::Json<CreateAuthenticationTokenRequest>,
) -> ApiResult<HttpResponse> {
    let request = body.into_inner();
    request.validate()?;

    let user = state
        .repositories
        .users
        .get_by_email(&request.email)
        .await?
        .ok_or(DomainError::Auth(AuthError::InvalidPassword))?;

    if !verify_password(request.password, user.password_hash.clone()).await? {
        return Err(DomainError::Auth(AuthError::InvalidPassword).into());
    }

    let issued = state
        .authenticator
        .issue(user.id, TokenScope::Authentication, state.auth.authentication_ttl())
        .await?;
    info!(user_id = user.id, "Authentication token issued");

    Ok(HttpResponse::Created().json(AuthenticationTokenEnvelope {
        authentication_token: TokenView::from(issued),
    }))
}

/// DELETE /v1/tokens/authentication
///
/// Signs the caller out of every session.
pub async fn revoke_authentication_tokens(
    caller: AuthenticatedUser,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let user = caller.0;
    let revoked = state.authenticator.revoke_all(user.id, TokenScope::Authentication).await?;
    info!(user_id = user.id, revoked, "Authentication tokens revoked");

    Ok(HttpResponse::Ok().json(MessageResponse::new("authentication tokens revoked")))
}

/// POST /v1/tokens/activation
pub async fn create_activation_token(
    state: web::Data<AppState>,
    body: web::Json<EmailRequest>,
) -> ApiResult<HttpResponse> {
    let user = user_for_email(&state, body.into_inner()).await?;
    if user.activated {
        return Err(ApiError::invalid_field("email", "user has already been activated"));
    }

    let issued = state
        .authenticator
        .issue(user.id, TokenScope::Activation, state.auth.activation_ttl())
        .await?;
    state.mail.dispatch(OutboundMail::new(
        user.email,
        MailTemplate::ActivationToken {
            activation_token: issued.into_plaintext(),
        },
    ))?;

    Ok(HttpResponse::Accepted().json(MessageResponse::new(
        "an email will be sent to you containing activation instructions",
    )))
}

/// POST /v1/tokens/password-reset
pub async fn create_password_reset_token(
    state: web::Data<AppState>,
    body: web::Json<EmailRequest>,
) -> ApiResult<HttpResponse> {
    let user = user_for_email(&state, body.into_inner()).await?;
    if !user.activated {
        return Err(ApiError::invalid_field("email", "user account must be activated"));
    }

    let issued = state
        .authenticator
        .issue(user.id, TokenScope::PasswordReset, state.auth.password_reset_ttl())
        .await?;
    state.mail.dispatch(OutboundMail::new(
        user.email,
        MailTemplate::PasswordReset {
            reset_token: issued.into_plaintext(),
        },
    ))?;

    Ok(HttpResponse::Accepted().json(MessageResponse::new(
        "an email will be sent to you containing password reset instructions",
    )))
}

async fn user_for_email(state: &AppState, request: EmailRequest) -> ApiResult<User> {
    request.validate()?;

    state
        .repositories
        .users
        .get_by_email(&request.email)
        .await?
        .ok_or_else(|| ApiError::invalid_field("email", "no matching email address found"))
}
