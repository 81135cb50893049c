use std::path::PathBuf;

use serde::Deserialize;

use crate::{
    models::WeightConfig,
    services::{recommendations::GenerateOptions, scoring::TitleMatch},
};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Directory holding the user's film exports and the saved recommendations
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// TMDB API key; without one, candidates come from a local file
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Pages fetched from each TMDB listing
    #[serde(default = "default_tmdb_pages")]
    pub tmdb_pages: u32,

    /// Candidates enriched with TMDB credits before scoring
    #[serde(default = "default_tmdb_detail_limit")]
    pub tmdb_detail_limit: usize,

    /// Candidate file used when no TMDB key is configured
    #[serde(default = "default_candidates_file")]
    pub candidates_file: PathBuf,

    /// Size of the candidate pool requested from the source
    #[serde(default = "default_candidate_count")]
    pub candidate_count: usize,

    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default = "default_true")]
    pub exclude_watched: bool,

    /// Also match watched titles ignoring year suffixes, punctuation and articles
    #[serde(default)]
    pub loose_title_match: bool,

    #[serde(default)]
    pub weight_content: Option<f64>,
    #[serde(default)]
    pub weight_rating: Option<f64>,
    #[serde(default)]
    pub weight_genre: Option<f64>,
    #[serde(default)]
    pub weight_director: Option<f64>,
    #[serde(default)]
    pub weight_actor: Option<f64>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_pages() -> u32 {
    5
}

fn default_tmdb_detail_limit() -> usize {
    100
}

fn default_candidates_file() -> PathBuf {
    PathBuf::from("popular_films.json")
}

fn default_candidate_count() -> usize {
    500
}

fn default_top_n() -> usize {
    10
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Default weights with any `WEIGHT_*` overrides applied
    pub fn weights(&self) -> WeightConfig {
        let defaults = WeightConfig::default();
        WeightConfig {
            content: self.weight_content.unwrap_or(defaults.content),
            rating: self.weight_rating.unwrap_or(defaults.rating),
            genre: self.weight_genre.unwrap_or(defaults.genre),
            director: self.weight_director.unwrap_or(defaults.director),
            actor: self.weight_actor.unwrap_or(defaults.actor),
        }
    }

    pub fn tmdb_api_key(&self) -> Option<&str> {
        self.tmdb_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            top_n: self.top_n,
            exclude_watched: self.exclude_watched,
            weights: self.weights(),
            title_match: if self.loose_title_match {
                TitleMatch::Loose
            } else {
                TitleMatch::Exact
            },
            ..GenerateOptions::default()
        }
    }
}
