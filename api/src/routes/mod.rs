//! Route handlers for the `/v1` API

pub mod health;
pub mod movies;
pub mod tokens;
pub mod users;

use actix_web::web;

/// Register every `/v1` route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1")
            .route("/healthcheck", web::get().to(health::healthcheck))
            .service(web::resource("/movies").route(web::post().to(movies::create_movie)))
            .service(
                web::resource("/movies/{id}")
                    .route(web::get().to(movies::show_movie))
                    .route(web::patch().to(movies::update_movie))
                    .route(web::delete().to(movies::delete_movie)),
            )
            .service(web::resource("/users").route(web::post().to(users::register_user)))
            .service(web::resource("/users/activated").route(web::put().to(users::activate_user)))
            .service(web::resource("/users/password").route(web::put().to(users::reset_password)))
            .service(
                web::resource("/tokens/authentication")
                    .route(web::post().to(tokens::create_authentication_token))
                    .route(web::delete().to(tokens::revoke_authentication_tokens)),
            )
            .service(web::resource("/tokens/activation").route(web::post().to(tokens::create_activation_token)))
            .service(
                web::resource("/tokens/password-reset").route(web::post().to(tokens::create_password_reset_token)),
            ),
    );
}
