//! Recommendation pipeline
//!
//! The analyzer, vectorizer, scorer and explanation generator are pure and
//! synchronous; `generate` chains them. `pipeline` and `providers` are the
//! async glue around them.

pub mod explanation;
pub mod pipeline;
pub mod preferences;
pub mod providers;
pub mod recommendations;
pub mod scoring;
pub mod text;
pub mod vectorizer;

pub use recommendations::{generate, rank_by_community_rating, similar_films, GenerateOptions};
