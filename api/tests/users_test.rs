//! Registration, activation and password reset flows

mod common;

use actix_web::{http::header, http::StatusCode, test};
use serde_json::{json, Value};

use mq_api::create_app;
use mq_core::domain::TokenScope;
use mq_core::services::MailTemplate;

#[actix_web::test]
async fn test_register_sends_welcome_mail() {
    let ctx = common::context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/v1/users")
        .set_json(json!({
            "name": "Alice",
            "email": "alice@example.com",
            "password": common::PASSWORD
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["activated"], false);
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["user"].get("version").is_none());

    let sent = ctx.mailer.wait_for(1).await;
    assert_eq!(sent[0].recipient, "alice@example.com");
    assert!(matches!(sent[0].template, MailTemplate::Welcome { .. }));
    assert_eq!(common::token_in(&sent[0]).len(), 22);
}

#[actix_web::test]
async fn test_register_rejects_duplicate_email() {
    let ctx = common::context();
    ctx.seed_user("alice@example.com", false).await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/v1/users")
        .set_json(json!({
            "name": "Another Alice",
            "email": "alice@example.com",
            "password": common::PASSWORD
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_failed");
    assert_eq!(
        body["details"]["fields"]["email"],
        "a user with this email address already exists"
    );
}

#[actix_web::test]
async fn test_register_reports_invalid_fields() {
    let ctx = common::context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/v1/users")
        .set_json(json!({ "name": "", "email": "not-an-email", "password": "pa55word" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["details"]["fields"]["name"].is_string());
    assert_eq!(body["details"]["fields"]["email"], "must be a valid email address");

    let req = test::TestRequest::post()
        .uri("/v1/users")
        .set_json(json!({ "name": "Alice", "email": "alice@example.com", "password": "short" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["details"]["fields"]["password"],
        "password must be at least 8 bytes long"
    );

    assert!(ctx.mailer.sent().is_empty());
}

#[actix_web::test]
async fn test_activation_with_mailed_token() {
    let ctx = common::context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/v1/users")
        .set_json(json!({
            "name": "Alice",
            "email": "alice@example.com",
            "password": common::PASSWORD
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::ACCEPTED);
    let token = common::token_in(&ctx.mailer.wait_for(1).await[0]);

    let req = test::TestRequest::put()
        .uri("/v1/users/activated")
        .set_json(json!({ "token": token }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["activated"], true);

    // Single use
    let req = test::TestRequest::put()
        .uri("/v1/users/activated")
        .set_json(json!({ "token": token }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["details"]["fields"]["token"], "invalid or expired activation token");
}

#[actix_web::test]
async fn test_activation_rejects_token_of_another_scope() {
    let ctx = common::context();
    let user = ctx.seed_user("alice@example.com", false).await;
    let wrong = ctx.token_for(&user, TokenScope::Authentication).await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::put()
        .uri("/v1/users/activated")
        .set_json(json!({ "token": wrong }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );

    let stored = ctx.state.users.get(user.id).await.unwrap();
    assert!(!stored.activated);
}

#[actix_web::test]
async fn test_password_reset_flow() {
    let ctx = common::context();
    let (user, old_bearer) = ctx.signed_in("alice@example.com").await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/v1/tokens/password-reset")
        .set_json(json!({ "email": "alice@example.com" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::ACCEPTED);

    let sent = ctx.mailer.wait_for(1).await;
    assert!(matches!(sent[0].template, MailTemplate::PasswordReset { .. }));
    let reset_token = common::token_in(&sent[0]);

    // A weak password leaves the token usable
    let req = test::TestRequest::put()
        .uri("/v1/users/password")
        .set_json(json!({ "password": "short", "token": reset_token }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );

    let req = test::TestRequest::put()
        .uri("/v1/users/password")
        .set_json(json!({ "password": "a-brand-new-password", "token": reset_token }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "your password was successfully reset");

    // Every session was signed out
    let req = test::TestRequest::delete()
        .uri("/v1/tokens/authentication")
        .insert_header((header::AUTHORIZATION, old_bearer.as_str()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/v1/tokens/authentication")
        .set_json(json!({ "email": "alice@example.com", "password": common::PASSWORD }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/v1/tokens/authentication")
        .set_json(json!({ "email": "alice@example.com", "password": "a-brand-new-password" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let stored = ctx.state.users.get(user.id).await.unwrap();
    assert!(stored.version > user.version);
}

#[actix_web::test]
async fn test_activation_token_survives_an_edit_conflict() {
    let (ctx, users) = common::racing_context();
    let user = ctx.seed_user("alice@example.com", false).await;
    let token = ctx.token_for(&user, TokenScope::Activation).await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    users.arm();
    let activate = || {
        test::TestRequest::put()
            .uri("/v1/users/activated")
            .set_json(json!({ "token": token }))
            .to_request()
    };

    let resp = test::call_service(&app, activate()).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "edit_conflict");

    // Same token, second attempt
    let resp = test::call_service(&app, activate()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["activated"], true);

    assert_eq!(
        test::call_service(&app, activate()).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[actix_web::test]
async fn test_reset_token_survives_an_edit_conflict() {
    let (ctx, users) = common::racing_context();
    let user = ctx.seed_user("alice@example.com", true).await;
    let token = ctx.token_for(&user, TokenScope::PasswordReset).await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    users.arm();
    let reset = || {
        test::TestRequest::put()
            .uri("/v1/users/password")
            .set_json(json!({ "password": "a-brand-new-password", "token": token }))
            .to_request()
    };

    assert_eq!(test::call_service(&app, reset()).await.status(), StatusCode::CONFLICT);
    assert_eq!(test::call_service(&app, reset()).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/v1/tokens/authentication")
        .set_json(json!({ "email": "alice@example.com", "password": "a-brand-new-password" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
}
