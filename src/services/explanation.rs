use crate::models::{Film, ScoredCandidate, TasteProfile};
use crate::services::scoring::matching;

/// Reason given when no template qualifies
pub const FALLBACK_REASON: &str = "Recommended based on your overall taste profile";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplanationConfig {
    pub max_reasons: usize,
    /// A template qualifies only when its sub-score exceeds this
    pub min_contribution: f64,
    /// Community rating needed for the rating template
    pub high_rating: f64,
    pub max_genres: usize,
    pub max_directors: usize,
    pub max_actors: usize,
}

impl Default for ExplanationConfig {
    fn default() -> Self {
        Self {
            max_reasons: 3,
            min_contribution: 0.0,
            high_rating: 4.0,
            max_genres: 3,
            max_directors: 2,
            max_actors: 2,
        }
    }
}

/// Turns sub-scores into human-readable reasons
#[derive(Debug, Clone, Default)]
pub struct ExplanationGenerator {
    config: ExplanationConfig,
}

impl ExplanationGenerator {
    pub fn new(config: ExplanationConfig) -> Self {
        Self { config }
    }

    /// Reasons for recommending `film`, strongest sub-score first
    ///
    /// Never empty: falls back to [`FALLBACK_REASON`].
    pub fn explain(&self, film: &Film, profile: &TasteProfile, scored: &ScoredCandidate) -> Vec<String> {
        let scores = &scored.sub_scores;
        // (sub-score, reason) in template order
        let mut reasons: Vec<(f64, String)> = Vec::with_capacity(5);

        let genres = matching(&film.genres, &profile.favorite_genres);
        if !genres.is_empty() {
            reasons.push((
                scores.genre_match,
                format!("Genres you love: {}", join_first(&genres, self.config.max_genres)),
            ));
        }

        let directors = matching(&film.directors, &profile.favorite_directors);
        if !directors.is_empty() {
            reasons.push((
                scores.director_match,
                format!("Director you enjoy: {}", join_first(&directors, self.config.max_directors)),
            ));
        }

        let actors = matching(film.top_actors(), &profile.favorite_actors);
        if !actors.is_empty() {
            reasons.push((
                scores.actor_match,
                format!("Actors you like: {}", join_first(&actors, self.config.max_actors)),
            ));
        }

        if let Some(rating) = film.community_rating.filter(|r| *r >= self.config.high_rating) {
            reasons.push((
                scores.rating_score,
                format!("High community rating: {:.1}/5", rating),
            ));
        }

        reasons.push((
            scores.content_sim,
            "Similar to films you rated highly".to_string(),
        ));

        reasons.retain(|(score, _)| *score > self.config.min_contribution);
        // Stable, so equal sub-scores stay in template order
        reasons.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut reasons: Vec<String> = reasons
            .into_iter()
            .take(self.config.max_reasons)
            .map(|(_, reason)| reason)
            .collect();
        if reasons.is_empty() {
            reasons.push(FALLBACK_REASON.to_string());
        }
        reasons
    }
}

/// Explains a candidate with the default configuration
pub fn explain(film: &Film, profile: &TasteProfile, scored: &ScoredCandidate) -> Vec<String> {
    ExplanationGenerator::default().explain(film, profile, scored)
}

fn join_first(names: &[&str], max: usize) -> String {
    names[..names.len().min(max)].join(", ")
}
