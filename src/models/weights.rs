use serde::{Deserialize, Serialize};

use crate::error::{RecommendError, RecommendResult};

const SUM_TOLERANCE: f64 = 1e-9;

/// Weights of the hybrid score components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightConfig {
    /// Content similarity to the user's favorites
    pub content: f64,
    /// Community rating
    pub rating: f64,
    pub genre: f64,
    pub director: f64,
    pub actor: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            content: 0.40,
            rating: 0.20,
            genre: 0.20,
            director: 0.15,
            actor: 0.05,
        }
    }
}

impl WeightConfig {
    pub fn sum(&self) -> f64 {
        self.content + self.rating + self.genre + self.director + self.actor
    }

    fn fields(&self) -> [(&'static str, f64); 5] {
        [
            ("content", self.content),
            ("rating", self.rating),
            ("genre", self.genre),
            ("director", self.director),
            ("actor", self.actor),
        ]
    }

    /// Validates the weights and rescales them to sum to 1.0
    ///
    /// Fails if any weight is negative or not finite, or if every weight is zero.
    pub fn normalized(&self) -> RecommendResult<Self> {
        for (name, weight) in self.fields() {
            if !weight.is_finite() {
                return Err(RecommendError::InvalidConfig(format!(
                    "{} weight must be a finite number",
                    name
                )));
            }
            if weight < 0.0 {
                return Err(RecommendError::InvalidConfig(format!(
                    "{} weight must not be negative (got {})",
                    name, weight
                )));
            }
        }

        let sum = self.sum();
        if sum <= 0.0 {
            return Err(RecommendError::InvalidConfig(
                "at least one weight must be positive".to_string(),
            ));
        }

        if (sum - 1.0).abs() <= SUM_TOLERANCE {
            return Ok(*self);
        }

        Ok(Self {
            content: self.content / sum,
            rating: self.rating / sum,
            genre: self.genre / sum,
            director: self.director / sum,
            actor: self.actor / sum,
        })
    }
}
