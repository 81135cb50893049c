//! Candidate film sources
//!
//! A source supplies the pool of films to rank. Sources may return films the
//! user has already watched; exclusion happens in the recommendation core.

use async_trait::async_trait;

use crate::{error::AppResult, models::Film};

pub mod file;
pub mod tmdb;

pub use file::FileCandidateSource;
pub use tmdb::TmdbProvider;

/// Trait for candidate film providers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Fetches up to `count` candidate films
    ///
    /// `favorite_genres` are the user's top genres, most favored first; an
    /// empty slice asks for a genre-agnostic pool.
    async fn fetch_candidates(&self, favorite_genres: &[String], count: usize) -> AppResult<Vec<Film>>;

    /// Source name for logging
    fn name(&self) -> &'static str;
}
