//! Film data on disk
//!
//! Watched films come from the profile exporter's JSON files in the data
//! directory; recommendations are written back next to them.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{
    error::{AppError, AppResult},
    models::{Film, RawFilm, Recommendation},
};

/// Shared export read when a user has no export of their own
const SHARED_EXPORT: &str = "collected_films.json";

/// Reads and writes a user's film files in one data directory
#[derive(Debug, Clone)]
pub struct FilmStore {
    data_dir: PathBuf,
}

impl FilmStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Export files tried for `username`, in order
    pub fn watched_paths(&self, username: &str) -> Vec<PathBuf> {
        vec![
            self.data_dir.join(format!("{}_films_minimal.json", username)),
            self.data_dir.join(format!("{}_detailed_films.json", username)),
            self.data_dir.join(SHARED_EXPORT),
        ]
    }

    /// Loads the user's watched films from the first non-empty export
    pub fn load_watched(&self, username: &str) -> AppResult<Vec<Film>> {
        for path in self.watched_paths(username) {
            if !path.is_file() {
                continue;
            }

            let films = read_films(&path)?;
            if films.is_empty() {
                tracing::debug!(path = %path.display(), "Skipping empty film export");
                continue;
            }

            tracing::info!(
                username = %username,
                path = %path.display(),
                count = films.len(),
                "Loaded watched films"
            );
            return Ok(films);
        }

        Err(AppError::NotFound(format!(
            "no film data for user '{}' in {}",
            username,
            self.data_dir.display()
        )))
    }

    pub fn recommendations_path(&self, username: &str) -> PathBuf {
        self.data_dir.join(format!("{}_recommendations.json", username))
    }

    /// Writes the ranked list as pretty-printed JSON and returns its path
    pub fn save_recommendations(
        &self,
        username: &str,
        recommendations: &[Recommendation],
    ) -> AppResult<PathBuf> {
        fs::create_dir_all(&self.data_dir)?;
        let path = self.recommendations_path(username);
        let json = serde_json::to_string_pretty(recommendations)?;
        fs::write(&path, json)?;

        tracing::info!(
            path = %path.display(),
            count = recommendations.len(),
            "Saved recommendations"
        );
        Ok(path)
    }

    pub fn load_recommendations(&self, username: &str) -> AppResult<Vec<Recommendation>> {
        let path = self.recommendations_path(username);
        if !path.is_file() {
            return Err(AppError::NotFound(format!(
                "no recommendations saved at {}",
                path.display()
            )));
        }
        let json = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Reads a JSON array of film records from `path`
pub fn read_films(path: &Path) -> AppResult<Vec<Film>> {
    let json = fs::read_to_string(path)?;
    parse_films(&json)
}

/// Parses a JSON array of film records
///
/// Records that fail validation are skipped with a warning. Films sharing an
/// identity key keep their first occurrence.
pub fn parse_films(json: &str) -> AppResult<Vec<Film>> {
    let raw: Vec<RawFilm> = serde_json::from_str(json)?;
    let total = raw.len();

    let mut seen = HashSet::new();
    let mut films = Vec::with_capacity(total);
    let mut skipped = 0;

    for (position, record) in raw.into_iter().enumerate() {
        match Film::try_from(record) {
            Ok(film) => {
                if seen.insert(film.key()) {
                    films.push(film);
                } else {
                    tracing::debug!(key = %film.key(), "Dropping duplicate film record");
                }
            }
            Err(e) => {
                skipped += 1;
                tracing::warn!(position, error = %e, "Skipping invalid film record");
            }
        }
    }

    if skipped > 0 {
        tracing::warn!(
            total,
            skipped,
            kept = films.len(),
            "Some film records were invalid"
        );
    }

    Ok(films)
}
