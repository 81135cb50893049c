use std::collections::HashMap;

use crate::error::{RecommendError, RecommendResult};
use crate::models::{Film, TasteProfile};

/// Parameters of the preference analysis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyzerConfig {
    /// Lowest possible favorites threshold
    pub rating_floor: f64,
    /// Percentile of personal ratings used as the favorites threshold
    pub percentile: f64,
    /// Favorites kept even when too few films clear the threshold
    pub min_favorites: usize,
    /// Length of each favorite genre/director/actor list
    pub top_k: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            rating_floor: 4.0,
            percentile: 0.7,
            min_favorites: 3,
            top_k: 10,
        }
    }
}

/// Learns a [`TasteProfile`] from a user's rated films
#[derive(Debug, Clone, Default)]
pub struct PreferenceAnalyzer {
    config: AnalyzerConfig,
}

impl PreferenceAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn analyze(&self, watched: &[Film]) -> RecommendResult<TasteProfile> {
        if watched.is_empty() {
            return Err(RecommendError::InsufficientData(
                "no watched films".to_string(),
            ));
        }

        let rated: Vec<(usize, f64)> = watched
            .iter()
            .enumerate()
            .filter_map(|(i, film)| {
                film.personal_rating
                    .filter(|r| r.is_finite())
                    .map(|r| (i, r))
            })
            .collect();

        if rated.is_empty() {
            return Err(RecommendError::InsufficientData(format!(
                "none of {} watched films has a personal rating",
                watched.len()
            )));
        }

        let ratings: Vec<f64> = rated.iter().map(|(_, r)| *r).collect();
        let avg_personal_rating = mean(ratings.iter().copied()).unwrap_or(0.0);
        let mut threshold = percentile(&ratings, self.config.percentile).max(self.config.rating_floor);

        let mut favorites: Vec<usize> = rated
            .iter()
            .filter(|(_, r)| *r >= threshold)
            .map(|(i, _)| *i)
            .collect();

        if favorites.len() < self.config.min_favorites {
            let mut by_rating = rated.clone();
            // Stable: equal ratings keep watched order
            by_rating.sort_by(|a, b| b.1.total_cmp(&a.1));
            by_rating.truncate(self.config.min_favorites.min(rated.len()));

            threshold = by_rating
                .iter()
                .map(|(_, r)| *r)
                .fold(f64::INFINITY, f64::min);
            // Films tied with the lowest of the top ratings are favorites too
            favorites = rated
                .iter()
                .filter(|(_, r)| *r >= threshold)
                .map(|(i, _)| *i)
                .collect();
        }

        let favorite_films: Vec<&Film> = favorites.iter().map(|&i| &watched[i]).collect();

        Ok(TasteProfile {
            favorite_genres: rank_by_frequency(
                favorite_films.iter().map(|f| f.genres.as_slice()),
                self.config.top_k,
            ),
            favorite_directors: rank_by_frequency(
                favorite_films.iter().map(|f| f.directors.as_slice()),
                self.config.top_k,
            ),
            favorite_actors: rank_by_frequency(
                favorite_films.iter().map(|f| f.top_actors()),
                self.config.top_k,
            ),
            avg_personal_rating,
            highly_rated_threshold: threshold,
            total_rated: rated.len(),
            avg_runtime_preference: mean(
                favorite_films
                    .iter()
                    .filter_map(|f| f.runtime_minutes)
                    .map(f64::from),
            ),
            avg_year_preference: mean(
                favorite_films
                    .iter()
                    .filter_map(|f| f.year)
                    .map(f64::from),
            ),
            favorites,
        })
    }
}

/// Analyzes watched films with the default configuration
pub fn analyze(watched: &[Film]) -> RecommendResult<TasteProfile> {
    PreferenceAnalyzer::default().analyze(watched)
}

/// Linear-interpolated percentile of `values`, `p` in [0, 1]
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let position = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Counts names across films (once per film) and returns the `top_k` most
/// frequent, ties broken by first occurrence
fn rank_by_frequency<'a, I>(lists: I, top_k: usize) -> Vec<String>
where
    I: Iterator<Item = &'a [String]>,
{
    // name -> (count, first seen)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    let mut seen = 0;

    for list in lists {
        let mut in_film: Vec<&str> = Vec::with_capacity(list.len());
        for name in list {
            let name = name.trim();
            if name.is_empty() || in_film.contains(&name) {
                continue;
            }
            in_film.push(name);

            let entry = counts.entry(name).or_insert((0, seen));
            entry.0 += 1;
            seen += 1;
        }
    }

    let mut ranked: Vec<(&str, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked
        .into_iter()
        .take(top_k)
        .map(|(name, _)| name.to_string())
        .collect()
}
