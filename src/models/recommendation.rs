use serde::{Deserialize, Serialize};

use super::{Film, WeightConfig};

/// A ranked, explained recommendation handed to the persistence sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// 1-based position in the ranked list
    pub rank: usize,
    pub title: String,
    pub year: Option<i32>,
    #[serde(rename = "average_rating")]
    pub community_rating: Option<f64>,
    pub genres: Vec<String>,
    pub directors: Vec<String>,
    pub url: String,
    pub reasons: Vec<String>,
    pub rec_score: f64,
}

impl Recommendation {
    pub fn new(rank: usize, film: &Film, rec_score: f64, reasons: Vec<String>) -> Self {
        Self {
            rank,
            title: film.title.clone(),
            year: film.year,
            community_rating: film.community_rating,
            genres: film.genres.clone(),
            directors: film.directors.clone(),
            url: film.url.clone(),
            reasons,
            rec_score,
        }
    }
}

/// A film ranked by content similarity to a seed film
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarFilm {
    /// 1-based position in the ranked list
    pub rank: usize,
    /// Index of the film in the list it was ranked from
    pub position: usize,
    pub title: String,
    pub year: Option<i32>,
    pub genres: Vec<String>,
    pub url: String,
    pub similarity: f64,
}

impl SimilarFilm {
    pub fn new(rank: usize, position: usize, film: &Film, similarity: f64) -> Self {
        Self {
            rank,
            position,
            title: film.title.clone(),
            year: film.year,
            genres: film.genres.clone(),
            url: film.url.clone(),
            similarity,
        }
    }
}

/// Component scores of one candidate, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SubScores {
    /// Mean cosine similarity to the user's favorites
    pub content_sim: f64,
    /// Community rating, min-max scaled over the candidate pool
    pub rating_score: f64,
    pub genre_match: f64,
    pub director_match: f64,
    pub actor_match: f64,
}

impl SubScores {
    /// Weighted sum of the components, clamped to [0, 1]
    pub fn weighted(&self, weights: &WeightConfig) -> f64 {
        let score = weights.content * self.content_sim
            + weights.rating * self.rating_score
            + weights.genre * self.genre_match
            + weights.director * self.director_match
            + weights.actor * self.actor_match;
        score.clamp(0.0, 1.0)
    }
}

/// Scoring result for one candidate
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    /// Position of the film in the candidate pool that was scored
    pub candidate: usize,
    pub sub_scores: SubScores,
    pub rec_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_serializes_average_rating() {
        let film = Film {
            year: Some(1979),
            community_rating: Some(4.3),
            genres: vec!["Horror".to_string(), "Science Fiction".to_string()],
            directors: vec!["Ridley Scott".to_string()],
            ..Film::new("Alien", "https://letterboxd.com/film/alien/")
        };
        let rec = Recommendation::new(1, &film, 0.72, vec!["Director you enjoy: Ridley Scott".to_string()]);

        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["rank"], 1);
        assert_eq!(json["average_rating"], 4.3);
        assert!(json.get("community_rating").is_none());
        assert_eq!(json["reasons"][0], "Director you enjoy: Ridley Scott");
    }

    #[test]
    fn test_weighted_sub_scores() {
        let scores = SubScores {
            content_sim: 1.0,
            rating_score: 0.5,
            genre_match: 1.0,
            director_match: 0.0,
            actor_match: 1.0,
        };
        let weighted = scores.weighted(&WeightConfig::default());
        assert!((weighted - (0.40 + 0.10 + 0.20 + 0.05)).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_sub_scores_clamped() {
        let scores = SubScores {
            content_sim: 1.0 + 1e-12,
            rating_score: 1.0,
            genre_match: 1.0,
            director_match: 1.0,
            actor_match: 1.0,
        };
        assert!(scores.weighted(&WeightConfig::default()) <= 1.0);
    }
}
