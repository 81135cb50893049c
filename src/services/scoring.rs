//! Hybrid scoring of candidate films against a taste profile.
//!
//! Each candidate gets five sub-scores in [0, 1]: content similarity to the
//! user's favorites, scaled community rating, and genre, director and actor
//! overlap with the profile. The final score is their weighted sum.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{RecommendError, RecommendResult};
use crate::models::{normalize_title, Film, ScoredCandidate, SubScores, TasteProfile, WeightConfig};
use crate::services::vectorizer::SimilarityMatrix;

/// How candidate titles are compared against watched titles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleMatch {
    /// Lowercased, trimmed titles must be equal
    #[default]
    Exact,
    /// Also ignores a trailing "(YYYY)", punctuation and a leading article
    Loose,
}

impl TitleMatch {
    pub fn normalize(&self, title: &str) -> String {
        match self {
            TitleMatch::Exact => normalize_title(title),
            TitleMatch::Loose => normalize_title_loose(title),
        }
    }
}

/// Loose title normalization
///
/// "The Thing (1982)" and "thing" normalize to the same string.
pub fn normalize_title_loose(title: &str) -> String {
    let mut title = title.trim().to_lowercase();

    if let Some(open) = title.rfind('(') {
        let is_year = title[open..]
            .strip_prefix('(')
            .and_then(|tail| tail.strip_suffix(')'))
            .is_some_and(|year| year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()));
        if is_year {
            title.truncate(open);
        }
    }

    let cleaned: String = title
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let words: Vec<&str> = cleaned.split_whitespace().collect();

    let words = match words.split_first() {
        Some((first, rest)) if !rest.is_empty() && matches!(*first, "the" | "a" | "an") => rest,
        _ => &words[..],
    };
    words.join(" ")
}

/// Lookup of watched films by URL and normalized title
#[derive(Debug, Clone, Default)]
pub struct WatchedIndex {
    urls: HashSet<String>,
    titles: HashSet<String>,
    title_match: TitleMatch,
}

impl WatchedIndex {
    pub fn new(watched: &[Film], title_match: TitleMatch) -> Self {
        let urls = watched
            .iter()
            .map(|f| f.url.trim())
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect();
        let titles = watched
            .iter()
            .map(|f| title_match.normalize(&f.title))
            .filter(|title| !title.is_empty())
            .collect();

        Self {
            urls,
            titles,
            title_match,
        }
    }

    /// True if the film shares a URL or a normalized title with a watched film
    pub fn contains(&self, film: &Film) -> bool {
        let url = film.url.trim();
        if !url.is_empty() && self.urls.contains(url) {
            return true;
        }
        let title = self.title_match.normalize(&film.title);
        !title.is_empty() && self.titles.contains(&title)
    }
}

/// Drops candidates the user has already watched, keeping input order
pub fn exclude_watched<'a>(
    watched: &[Film],
    candidates: &'a [Film],
    title_match: TitleMatch,
) -> Vec<&'a Film> {
    let index = WatchedIndex::new(watched, title_match);
    candidates.iter().filter(|c| !index.contains(c)).collect()
}

/// Items of `items` that also appear in `favorites`, in `items` order
///
/// Comparison ignores case; each item is reported once.
pub fn matching<'a>(items: &'a [String], favorites: &[String]) -> Vec<&'a str> {
    let mut matched: Vec<&'a str> = Vec::new();
    for item in items {
        let item = item.trim();
        if item.is_empty() || matched.iter().any(|m| m.eq_ignore_ascii_case(item)) {
            continue;
        }
        if favorites.iter().any(|f| f.trim().eq_ignore_ascii_case(item)) {
            matched.push(item);
        }
    }
    matched
}

fn overlap(items: &[String], favorites: &[String]) -> f64 {
    if favorites.is_empty() {
        return 0.0;
    }
    let score = matching(items, favorites).len() as f64 / favorites.len() as f64;
    score.min(1.0)
}

/// Community ratings min-max scaled over the pool
///
/// A missing rating takes the median of the present ones. Every score is 0.0
/// when no candidate is rated or all ratings are equal.
pub fn rating_scores(candidates: &[&Film]) -> Vec<f64> {
    let mut present: Vec<f64> = candidates
        .iter()
        .filter_map(|c| c.community_rating)
        .filter(|r| r.is_finite())
        .collect();

    if present.is_empty() {
        return vec![0.0; candidates.len()];
    }

    present.sort_by(f64::total_cmp);
    let min = present[0];
    let max = present[present.len() - 1];
    let range = max - min;
    if range <= 0.0 {
        return vec![0.0; candidates.len()];
    }

    let mid = present.len() / 2;
    let median = if present.len() % 2 == 0 {
        (present[mid - 1] + present[mid]) / 2.0
    } else {
        present[mid]
    };

    candidates
        .iter()
        .map(|c| {
            let rating = c
                .community_rating
                .filter(|r| r.is_finite())
                .unwrap_or(median);
            ((rating - min) / range).clamp(0.0, 1.0)
        })
        .collect()
}

/// Scores candidates with a fixed set of normalized weights
#[derive(Debug, Clone)]
pub struct HybridScorer {
    weights: WeightConfig,
}

impl HybridScorer {
    /// Fails with `InvalidConfig` on negative, non-finite or all-zero weights
    pub fn new(weights: WeightConfig) -> RecommendResult<Self> {
        Ok(Self {
            weights: weights.normalized()?,
        })
    }

    /// Scores every candidate
    ///
    /// `similarity` covers the watched films first, then the candidates
    /// starting at row `candidate_offset`; the profile's favorites are rows
    /// of the watched block.
    pub fn score(
        &self,
        candidates: &[&Film],
        profile: &TasteProfile,
        similarity: &SimilarityMatrix,
        candidate_offset: usize,
    ) -> RecommendResult<Vec<ScoredCandidate>> {
        if candidates.is_empty() {
            return Err(RecommendError::EmptyCandidatePool(
                "no candidates to score".to_string(),
            ));
        }
        if candidate_offset + candidates.len() > similarity.size() {
            return Err(RecommendError::InvalidConfig(format!(
                "similarity matrix of size {} does not cover {} candidates at row {}",
                similarity.size(),
                candidates.len(),
                candidate_offset
            )));
        }
        if let Some(&row) = profile.favorites.iter().find(|&&row| row >= similarity.size()) {
            return Err(RecommendError::InvalidConfig(format!(
                "favorite row {} outside similarity matrix of size {}",
                row,
                similarity.size()
            )));
        }

        let ratings = rating_scores(candidates);

        let scored = candidates
            .iter()
            .zip(ratings)
            .enumerate()
            .map(|(i, (film, rating_score))| {
                let sub_scores = SubScores {
                    content_sim: content_similarity(similarity, candidate_offset + i, &profile.favorites),
                    rating_score,
                    genre_match: overlap(&film.genres, &profile.favorite_genres),
                    director_match: overlap(&film.directors, &profile.favorite_directors),
                    actor_match: overlap(film.top_actors(), &profile.favorite_actors),
                };
                ScoredCandidate {
                    candidate: i,
                    rec_score: sub_scores.weighted(&self.weights),
                    sub_scores,
                }
            })
            .collect();

        Ok(scored)
    }
}

/// Mean similarity of `row` to the favorite rows, 0.0 without favorites
fn content_similarity(similarity: &SimilarityMatrix, row: usize, favorites: &[usize]) -> f64 {
    if favorites.is_empty() {
        return 0.0;
    }
    let total: f64 = favorites.iter().map(|&fav| similarity.get(row, fav)).sum();
    (total / favorites.len() as f64).clamp(0.0, 1.0)
}

/// Orders by community rating, highest first, unrated last
///
/// Non-finite ratings count as unrated.
pub fn compare_community_rating(a: Option<f64>, b: Option<f64>) -> Ordering {
    let finite = |r: Option<f64>| r.filter(|r| r.is_finite());
    match (finite(a), finite(b)) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sorts scored candidates best first
///
/// Ties on score go to the higher community rating, then to the earlier
/// candidate.
pub fn rank(scored: &mut [ScoredCandidate], candidates: &[&Film]) {
    scored.sort_by(|a, b| {
        b.rec_score
            .total_cmp(&a.rec_score)
            .then_with(|| {
                compare_community_rating(
                    candidates[a.candidate].community_rating,
                    candidates[b.candidate].community_rating,
                )
            })
            .then_with(|| a.candidate.cmp(&b.candidate))
    });
}
