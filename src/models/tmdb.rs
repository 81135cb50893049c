//! The Movie Database (TMDB) v3 API types

use serde::Deserialize;

use super::Film;

/// TMDB movie genres by id
const GENRES: &[(u32, &str)] = &[
    (28, "Action"),
    (12, "Adventure"),
    (16, "Animation"),
    (35, "Comedy"),
    (80, "Crime"),
    (99, "Documentary"),
    (18, "Drama"),
    (10751, "Family"),
    (14, "Fantasy"),
    (36, "History"),
    (27, "Horror"),
    (10402, "Music"),
    (9648, "Mystery"),
    (10749, "Romance"),
    (878, "Science Fiction"),
    (10770, "TV Movie"),
    (53, "Thriller"),
    (10752, "War"),
    (37, "Western"),
];

pub fn genre_name(id: u32) -> Option<&'static str> {
    GENRES
        .iter()
        .find(|(genre_id, _)| *genre_id == id)
        .map(|(_, name)| *name)
}

/// Maps a genre name (as exported by the profile site) to its TMDB id
pub fn genre_id(name: &str) -> Option<u32> {
    if name.eq_ignore_ascii_case("sci-fi") {
        return Some(878);
    }
    GENRES
        .iter()
        .find(|(_, genre)| genre.eq_ignore_ascii_case(name))
        .map(|(id, _)| *id)
}

/// Converts a 0-10 vote average to the 0-5 scale, rounded to one decimal
fn to_five_star(vote_average: Option<f64>) -> Option<f64> {
    vote_average
        .filter(|v| *v > 0.0 && v.is_finite())
        .map(|v| ((v / 2.0) * 10.0).round() / 10.0)
}

fn release_year(release_date: Option<&str>) -> Option<i32> {
    release_date
        .and_then(|date| date.get(..4))
        .and_then(|year| year.parse().ok())
}

fn film_url(id: u64) -> String {
    format!("https://letterboxd.com/tmdb/{}/", id)
}

/// One page of a TMDB movie listing
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage {
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// Movie summary as returned by listing endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: u64,
}

impl From<TmdbMovie> for Film {
    fn from(movie: TmdbMovie) -> Self {
        Film {
            title: movie.title.unwrap_or_else(|| "Unknown".to_string()),
            year: release_year(movie.release_date.as_deref()),
            genres: movie
                .genre_ids
                .iter()
                .filter_map(|id| genre_name(*id))
                .map(str::to_string)
                .collect(),
            directors: Vec::new(),
            actors: Vec::new(),
            description: movie.overview.filter(|o| !o.trim().is_empty()),
            community_rating: to_five_star(movie.vote_average),
            personal_rating: None,
            runtime_minutes: None,
            url: film_url(movie.id),
        }
    }
}

/// Full movie record from `/movie/{id}?append_to_response=credits`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub credits: Option<TmdbCredits>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
    #[serde(default)]
    pub crew: Vec<TmdbCrewMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCastMember {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCrewMember {
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
}

/// Cast members kept from a details response
const MAX_CAST: usize = 10;

impl From<TmdbMovieDetails> for Film {
    fn from(details: TmdbMovieDetails) -> Self {
        let credits = details.credits.unwrap_or_default();

        let directors = credits
            .crew
            .into_iter()
            .filter(|member| member.job.as_deref() == Some("Director"))
            .map(|member| member.name)
            .collect();

        let actors = credits
            .cast
            .into_iter()
            .take(MAX_CAST)
            .map(|member| member.name)
            .collect();

        Film {
            title: details.title.unwrap_or_else(|| "Unknown".to_string()),
            year: release_year(details.release_date.as_deref()),
            genres: details
                .genres
                .into_iter()
                .map(|g| genre_name(g.id).map(str::to_string).unwrap_or(g.name))
                .collect(),
            directors,
            actors,
            description: details.overview.filter(|o| !o.trim().is_empty()),
            community_rating: to_five_star(details.vote_average),
            personal_rating: None,
            runtime_minutes: details.runtime.filter(|r| *r > 0),
            url: film_url(details.id),
        }
    }
}
