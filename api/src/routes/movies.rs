//! Movie catalogue handlers
//!
//! Every route needs an activated user. Updates go through the versioned
//! store: a stale expected version is a `409`, never a silent overwrite.

use actix_web::{http::header, web, HttpRequest, HttpResponse};
use tracing::info;

use mq_core::domain::MovieDraft;

use crate::dto::{MessageResponse, MovieEnvelope, UpdateMovieRequest};
use crate::handlers::{ApiError, ApiResult};
use crate::middleware::ActivatedUser;
use crate::state::AppState;

/// Header carrying the version the client read
pub const EXPECTED_VERSION_HEADER: &str = "X-Expected-Version";

/// POST /v1/movies
pub async fn create_movie(
    caller: ActivatedUser,
    state: web::Data<AppState>,
    body: web::Json<MovieDraft>,
) -> ApiResult<HttpResponse> {
    let draft = body.into_inner();
    draft.validate()?;

    let movie = state.repositories.movies.insert(&draft).await?;
    info!(movie_id = movie.id, user_id = caller.0.id, "Movie created");

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/v1/movies/{}", movie.id)))
        .json(MovieEnvelope { movie }))
}

/// GET /v1/movies/{id}
pub async fn show_movie(
    _caller: ActivatedUser,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let movie = state.movies.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MovieEnvelope { movie }))
}

/// PATCH /v1/movies/{id}
///
/// The expected version comes from `X-Expected-Version`, else from the body's
/// `version`, else from a fresh read. Either way the write is conditional.
pub async fn update_movie(
    caller: ActivatedUser,
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateMovieRequest>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    let UpdateMovieRequest { version, patch } = body.into_inner();
    if version.is_some_and(|version| version < 1) {
        return Err(ApiError::bad_request("version must be a positive integer"));
    }

    let expected_version = match (expected_version_header(&req)?, version) {
        (Some(from_header), Some(from_body)) if from_header != from_body => {
            return Err(ApiError::bad_request(format!(
                "{} header and body version disagree",
                EXPECTED_VERSION_HEADER
            )));
        }
        (Some(version), _) | (None, Some(version)) => version,
        (None, None) => state.movies.get(id).await?.version,
    };

    let movie = state
        .movies
        .update_entity(id, expected_version, move |movie| movie.apply(patch))
        .await?;
    info!(movie_id = id, version = movie.version, user_id = caller.0.id, "Movie updated");

    Ok(HttpResponse::Ok().json(MovieEnvelope { movie }))
}

/// DELETE /v1/movies/{id}
pub async fn delete_movie(
    caller: ActivatedUser,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    state.movies.delete(id).await?;
    info!(movie_id = id, user_id = caller.0.id, "Movie deleted");

    Ok(HttpResponse::Ok().json(MessageResponse::new("movie successfully deleted")))
}

fn expected_version_header(req: &HttpRequest) -> ApiResult<Option<i32>> {
    let Some(value) = req.headers().get(EXPECTED_VERSION_HEADER) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|value| value.trim().parse::<i32>().ok())
        .filter(|version| *version >= 1)
        .map(Some)
        .ok_or_else(|| ApiError::bad_request(format!("{} must be a positive integer", EXPECTED_VERSION_HEADER)))
}
