use serde::{Deserialize, Serialize};

/// A user's taste, learned from their rated films
///
/// Built once at the start of a recommendation run and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasteProfile {
    /// Genres ranked by how often they appear among favorites
    pub favorite_genres: Vec<String>,
    pub favorite_directors: Vec<String>,
    pub favorite_actors: Vec<String>,
    /// Mean personal rating over every rated film
    pub avg_personal_rating: f64,
    /// Ratings at or above this value count as favorites
    pub highly_rated_threshold: f64,
    /// Number of watched films carrying a personal rating
    pub total_rated: usize,
    pub avg_runtime_preference: Option<f64>,
    pub avg_year_preference: Option<f64>,
    /// Positions of the favorite films within the watched list
    pub favorites: Vec<usize>,
}
