pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod telemetry;

pub use error::{AppError, AppResult, RecommendError, RecommendResult};
pub use models::{Film, Recommendation, SimilarFilm, TasteProfile, WeightConfig};
pub use services::{generate, rank_by_community_rating, similar_films, GenerateOptions};
