use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Display;
use std::sync::LazyLock;

use crate::error::AppError;

mod profile;
mod recommendation;
pub mod tmdb;
mod weights;

pub use profile::TasteProfile;
pub use recommendation::{Recommendation, ScoredCandidate, SimilarFilm, SubScores};
pub use weights::WeightConfig;

/// Number of billed actors that take part in vectorizing and matching
pub const TOP_ACTORS: usize = 5;

/// A watched or candidate film
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Film {
    pub title: String,
    pub year: Option<i32>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub directors: Vec<String>,
    #[serde(default)]
    pub actors: Vec<String>,
    pub description: Option<String>,
    /// Site-wide average rating on a 0-5 scale
    pub community_rating: Option<f64>,
    /// The user's own rating on a 0-5 scale, only set for watched films
    pub personal_rating: Option<f64>,
    pub runtime_minutes: Option<u32>,
    pub url: String,
}

impl Film {
    /// Creates a film with only a title and URL filled in
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    /// Identity key used for deduplication and watched-film matching
    pub fn key(&self) -> FilmKey {
        let url = self.url.trim();
        if url.is_empty() {
            FilmKey::Title(normalize_title(&self.title))
        } else {
            FilmKey::Url(url.to_string())
        }
    }

    /// The billed actors that count downstream
    pub fn top_actors(&self) -> &[String] {
        &self.actors[..self.actors.len().min(TOP_ACTORS)]
    }
}

/// Unique key of a film across the corpus
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilmKey {
    Url(String),
    /// Normalized title, used when the film has no URL
    Title(String),
}

impl Display for FilmKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilmKey::Url(url) => write!(f, "{}", url),
            FilmKey::Title(title) => write!(f, "title:{}", title),
        }
    }
}

/// Lowercases and trims a title for exact matching
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

// ============================================================================
// Exported film records
// ============================================================================

/// Film record as written by the profile exporter or a candidate dump
///
/// Field types vary between exports (ratings as numbers or strings, runtime
/// as "120 mins"), so the loose fields are kept as raw JSON values and
/// validated when converting into [`Film`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawFilm {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<Value>,
    #[serde(default)]
    pub release_date: Option<Value>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub directors: Option<Vec<String>>,
    #[serde(default)]
    pub actors: Option<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "community_rating")]
    pub average_rating: Option<Value>,
    #[serde(default)]
    pub personal_rating: Option<Value>,
    #[serde(default, alias = "runtime_minutes")]
    pub runtime: Option<Value>,
    #[serde(default)]
    pub url: Option<String>,
}

impl TryFrom<RawFilm> for Film {
    type Error = AppError;

    fn try_from(raw: RawFilm) -> Result<Self, Self::Error> {
        let title = raw
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::InvalidInput("Film record has no title".to_string()))?;

        let community_rating = parse_rating(raw.average_rating.as_ref(), "average_rating", &title)?;
        let personal_rating = parse_rating(raw.personal_rating.as_ref(), "personal_rating", &title)?;

        let year = raw
            .year
            .as_ref()
            .and_then(parse_year)
            .or_else(|| raw.release_date.as_ref().and_then(parse_year));

        Ok(Film {
            title,
            year,
            genres: clean_list(raw.genres),
            directors: clean_list(raw.directors),
            actors: clean_list(raw.actors),
            description: raw
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            community_rating,
            personal_rating,
            runtime_minutes: raw.runtime.as_ref().and_then(parse_runtime),
            url: raw.url.map(|u| u.trim().to_string()).unwrap_or_default(),
        })
    }
}

fn number_from_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// Unparseable ratings count as missing; ratings off the 0-5 scale are rejected
fn parse_rating(value: Option<&Value>, field: &str, title: &str) -> Result<Option<f64>, AppError> {
    match value.and_then(number_from_value) {
        Some(rating) if !(0.0..=5.0).contains(&rating) => Err(AppError::InvalidInput(format!(
            "{} {} out of range for '{}'",
            field, rating, title
        ))),
        rating => Ok(rating),
    }
}

fn parse_year(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_f64().map(|y| y as i32),
        Value::String(s) => extract_year(s),
        _ => None,
    }
}

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("compile year pattern"));

static MINUTES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("compile minutes pattern"));

/// Finds the first standalone 19xx/20xx year in a date string
fn extract_year(text: &str) -> Option<i32> {
    YEAR_RE.find(text).and_then(|m| m.as_str().parse().ok())
}

fn parse_runtime(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_f64().filter(|m| *m >= 0.0).map(|m| m.round() as u32),
        Value::String(s) => MINUTES_RE.find(s).and_then(|m| m.as_str().parse().ok()),
        _ => None,
    }
}

/// Trims entries and removes blanks and duplicates, keeping source order
fn clean_list(items: Option<Vec<String>>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();
    for item in items.unwrap_or_default() {
        let item = item.trim();
        if !item.is_empty() && !cleaned.iter().any(|seen| seen == item) {
            cleaned.push(item.to_string());
        }
    }
    cleaned
}
