use std::path::PathBuf;

use async_trait::async_trait;

use crate::{
    error::{AppError, AppResult},
    models::Film,
    services::providers::CandidateSource,
    store::parse_films,
};

/// Candidate films read from a JSON export (e.g. a scraped popular-films list)
#[derive(Debug, Clone)]
pub struct FileCandidateSource {
    path: PathBuf,
}

impl FileCandidateSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CandidateSource for FileCandidateSource {
    async fn fetch_candidates(&self, _favorite_genres: &[String], count: usize) -> AppResult<Vec<Film>> {
        let json = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::NotFound(format!("candidate file {} does not exist", self.path.display()))
            } else {
                AppError::Io(e)
            }
        })?;

        let mut films = parse_films(&json)?;
        films.truncate(count);

        tracing::info!(
            path = %self.path.display(),
            count = films.len(),
            source = self.name(),
            "Loaded candidate films"
        );

        Ok(films)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
