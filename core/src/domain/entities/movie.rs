//! Movie entity, the main versioned resource of the catalogue.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::versioned::Versioned;
use crate::errors::{DomainError, DomainResult};

const MAX_TITLE_BYTES: usize = 500;
const FIRST_FILM_YEAR: i32 = 1888;
const MAX_GENRES: usize = 5;

/// A stored movie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub year: i32,
    pub runtime_minutes: i32,
    pub genres: Vec<String>,
    pub version: i32,
}

impl Movie {
    /// Check the invariants a stored movie must always satisfy
    pub fn validate(&self) -> DomainResult<()> {
        validate_fields(&self.title, self.year, self.runtime_minutes, &self.genres)
    }

    /// Apply a partial update in place and re-validate the result
    pub fn apply(&mut self, patch: MoviePatch) -> DomainResult<()> {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(year) = patch.year {
            self.year = year;
        }
        if let Some(runtime) = patch.runtime_minutes {
            self.runtime_minutes = runtime;
        }
        if let Some(genres) = patch.genres {
            self.genres = genres;
        }
        self.validate()
    }
}

impl Versioned for Movie {
    const RESOURCE: &'static str = "movie";

    fn id(&self) -> i64 {
        self.id
    }

    fn version(&self) -> i32 {
        self.version
    }

    fn set_version(&mut self, version: i32) {
        self.version = version;
    }
}

/// Fields supplied when creating a movie
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MovieDraft {
    pub title: String,
    pub year: i32,
    pub runtime_minutes: i32,
    pub genres: Vec<String>,
}

impl MovieDraft {
    pub fn validate(&self) -> DomainResult<()> {
        validate_fields(&self.title, self.year, self.runtime_minutes, &self.genres)
    }
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MoviePatch {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub runtime_minutes: Option<i32>,
    pub genres: Option<Vec<String>>,
}

fn validate_fields(title: &str, year: i32, runtime: i32, genres: &[String]) -> DomainResult<()> {
    if title.trim().is_empty() {
        return Err(DomainError::validation("title must be provided"));
    }
    if title.len() > MAX_TITLE_BYTES {
        return Err(DomainError::validation("title must not be more than 500 bytes long"));
    }

    let current_year = Utc::now().year();
    if year < FIRST_FILM_YEAR {
        return Err(DomainError::validation("year must be greater than 1888"));
    }
    if year > current_year {
        return Err(DomainError::validation("year must not be in the future"));
    }

    if runtime <= 0 {
        return Err(DomainError::validation("runtime must be a positive integer"));
    }

    if genres.is_empty() {
        return Err(DomainError::validation("genres must contain at least 1 genre"));
    }
    if genres.len() > MAX_GENRES {
        return Err(DomainError::validation("genres must not contain more than 5 genres"));
    }
    let unique: HashSet<&str> = genres.iter().map(String::as_str).collect();
    if unique.len() != genres.len() {
        return Err(DomainError::validation("genres must not contain duplicate values"));
    }

    Ok(())
}
