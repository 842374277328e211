use serde::{Deserialize, Serialize};

use mq_core::domain::{Movie, MoviePatch};

/// `PATCH /v1/movies/{id}` body
///
/// `version` is the version the client read. The `X-Expected-Version` header
/// carries the same value and is preferred when both are sent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMovieRequest {
    #[serde(default)]
    pub version: Option<i32>,
    #[serde(flatten)]
    pub patch: MoviePatch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieEnvelope {
    pub movie: Movie,
}
