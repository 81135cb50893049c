/// The Movie Database (TMDB) v3 candidate provider
///
/// API Flow:
/// 1. Listings: /movie/popular and /movie/top_rated, plus /discover/movie for
///    the user's top genres
/// 2. Details: /movie/{id}?append_to_response=credits for directors and cast
///
/// Listings are merged, deduplicated by TMDB id and truncated before the
/// (optional) detail lookups.
use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

use crate::{
    error::{AppError, AppResult},
    models::{
        tmdb::{genre_id, TmdbMovie, TmdbMovieDetails, TmdbPage},
        Film,
    },
    services::providers::CandidateSource,
};

const POPULAR_MIN_VOTES: u64 = 100;
const TOP_RATED_MIN_VOTES: u64 = 500;
/// Minimum vote count requested from the discover endpoint
const DISCOVER_MIN_VOTES: u64 = 100;
const DISCOVER_PAGES: u32 = 3;
/// Favorite genres used for discovery
const MAX_GENRES: usize = 3;
/// Detail lookups run concurrently in batches of this size
const DETAIL_BATCH: usize = 10;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    /// Pages fetched from each of the popular and top-rated listings
    pages: u32,
    /// Candidates enriched with credits via the details endpoint
    detail_limit: usize,
}

impl TmdbProvider {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            pages: 5,
            detail_limit: 0,
        }
    }

    pub fn with_pages(mut self, pages: u32) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_detail_limit(mut self, detail_limit: usize) -> Self {
        self.detail_limit = detail_limit;
        self
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", "en-US")])
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(error = %e, path = %path, "Failed to deserialize TMDB response");
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }

    /// Fetches up to `pages` pages of a listing, keeping movies with at
    /// least `min_votes` votes
    ///
    /// Failed pages are skipped; the listing fails only if every page does.
    async fn listing(
        &self,
        path: &str,
        params: &[(&str, String)],
        pages: u32,
        min_votes: u64,
    ) -> AppResult<Vec<TmdbMovie>> {
        let mut movies = Vec::new();
        let mut last_error = None;
        let mut fetched = 0;

        for page in 1..=pages {
            let mut query = params.to_vec();
            query.push(("page", page.to_string()));

            match self.get::<TmdbPage>(path, &query).await {
                Ok(result) => {
                    fetched += 1;
                    let last_page = result.total_pages.is_some_and(|total| page >= total);
                    movies.extend(
                        result
                            .results
                            .into_iter()
                            .filter(|movie| movie.vote_count >= min_votes),
                    );
                    if last_page {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, path = %path, page, "TMDB page fetch failed");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if fetched == 0 => Err(e),
            _ => Ok(movies),
        }
    }

    pub async fn popular(&self) -> AppResult<Vec<TmdbMovie>> {
        self.listing("/movie/popular", &[], self.pages, POPULAR_MIN_VOTES)
            .await
    }

    pub async fn top_rated(&self) -> AppResult<Vec<TmdbMovie>> {
        self.listing("/movie/top_rated", &[], self.pages, TOP_RATED_MIN_VOTES)
            .await
    }

    /// Best-rated movies having all of `genre_ids`
    pub async fn by_genres(&self, genre_ids: &[u32]) -> AppResult<Vec<TmdbMovie>> {
        let with_genres = genre_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let params = [
            ("with_genres", with_genres),
            ("sort_by", "vote_average.desc".to_string()),
            ("vote_count.gte", DISCOVER_MIN_VOTES.to_string()),
        ];
        self.listing("/discover/movie", &params, DISCOVER_PAGES, 0)
            .await
    }

    /// Full record of one movie, with directors and cast
    pub async fn details(&self, tmdb_id: u64) -> AppResult<Film> {
        let details: TmdbMovieDetails = self
            .get(
                &format!("/movie/{}", tmdb_id),
                &[("append_to_response", "credits".to_string())],
            )
            .await?;
        Ok(details.into())
    }

    /// Converts movies to films, fetching details for the first
    /// `detail_limit` in parallel
    ///
    /// A failed lookup keeps the listing summary for that movie.
    async fn fetch_details_batch(&self, movies: Vec<TmdbMovie>) -> Vec<Film> {
        let split = movies.len().min(self.detail_limit);
        let mut movies = movies;
        let rest = movies.split_off(split);

        let mut films = Vec::with_capacity(movies.len() + rest.len());
        let mut error_count = 0;

        for batch in movies.chunks(DETAIL_BATCH) {
            let mut tasks = Vec::with_capacity(batch.len());
            for movie in batch {
                let provider = self.clone();
                let tmdb_id = movie.id;
                tasks.push(tokio::spawn(async move { provider.details(tmdb_id).await }));
            }

            for (movie, task) in batch.iter().zip(tasks) {
                match task.await {
                    Ok(Ok(film)) => films.push(film),
                    Ok(Err(e)) => {
                        tracing::warn!(error = %e, tmdb_id = movie.id, "Detail fetch failed, keeping summary");
                        error_count += 1;
                        films.push(movie.clone().into());
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Task join error");
                        error_count += 1;
                        films.push(movie.clone().into());
                    }
                }
            }
        }

        if error_count > 0 {
            tracing::warn!(
                success_count = split - error_count,
                error_count,
                "Partial detail fetch failure"
            );
        }

        films.extend(rest.into_iter().map(Film::from));
        films
    }
}

/// TMDB ids of the first few favorite genres that TMDB knows
fn favorite_genre_ids(favorite_genres: &[String]) -> Vec<u32> {
    favorite_genres
        .iter()
        .take(MAX_GENRES)
        .filter_map(|genre| genre_id(genre))
        .collect()
}

/// Keeps the first movie per TMDB id
fn dedupe_movies(movies: Vec<TmdbMovie>) -> Vec<TmdbMovie> {
    let mut seen = HashSet::new();
    movies
        .into_iter()
        .filter(|movie| movie.id != 0 && seen.insert(movie.id))
        .collect()
}

#[async_trait]
impl CandidateSource for TmdbProvider {
    async fn fetch_candidates(&self, favorite_genres: &[String], count: usize) -> AppResult<Vec<Film>> {
        let mut movies = Vec::new();
        let mut errors = Vec::new();

        match self.popular().await {
            Ok(popular) => {
                tracing::info!(count = popular.len(), "Fetched popular movies");
                movies.extend(popular);
            }
            Err(e) => errors.push(e),
        }

        match self.top_rated().await {
            Ok(top_rated) => {
                tracing::info!(count = top_rated.len(), "Fetched top rated movies");
                movies.extend(top_rated);
            }
            Err(e) => errors.push(e),
        }

        let genre_ids = favorite_genre_ids(favorite_genres);
        if !genre_ids.is_empty() {
            match self.by_genres(&genre_ids).await {
                Ok(genre_movies) => {
                    tracing::info!(
                        count = genre_movies.len(),
                        genres = ?genre_ids,
                        "Fetched genre-matched movies"
                    );
                    movies.extend(genre_movies);
                }
                Err(e) => errors.push(e),
            }
        }

        if movies.is_empty() {
            if let Some(e) = errors.into_iter().next() {
                return Err(e);
            }
        } else if !errors.is_empty() {
            tracing::warn!(
                error_count = errors.len(),
                "Some TMDB listings failed, continuing with partial results"
            );
        }

        let mut unique = dedupe_movies(movies);
        unique.truncate(count);

        let films = self.fetch_details_batch(unique).await;
        tracing::info!(count = films.len(), provider = self.name(), "Fetched unique candidates");

        Ok(films)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
