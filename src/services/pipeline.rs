use std::path::PathBuf;

use tracing::Instrument;

use crate::{
    error::{AppError, AppResult, RecommendError},
    models::{normalize_title, Film, Recommendation, SimilarFilm},
    services::{
        preferences::PreferenceAnalyzer,
        providers::CandidateSource,
        recommendations::{generate, rank_by_community_rating, similar_films, GenerateOptions},
    },
    store::FilmStore,
    telemetry::{run_span, RunId},
};

/// Result of one end-to-end recommendation run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: RunId,
    pub recommendations: Vec<Recommendation>,
    /// True when the list was ranked by community rating alone
    pub fallback: bool,
    pub saved_to: PathBuf,
}

/// Loads a user's films, fetches candidates, ranks them and saves the list
///
/// A user without personal ratings gets candidates ranked by community
/// rating instead of an error.
pub async fn recommend_for_user(
    store: &FilmStore,
    source: &dyn CandidateSource,
    username: &str,
    options: &GenerateOptions,
    candidate_count: usize,
) -> AppResult<RunOutcome> {
    let run_id = RunId::new();
    run(store, source, username, options, candidate_count, run_id)
        .instrument(run_span(run_id, username))
        .await
}

async fn run(
    store: &FilmStore,
    source: &dyn CandidateSource,
    username: &str,
    options: &GenerateOptions,
    candidate_count: usize,
    run_id: RunId,
) -> AppResult<RunOutcome> {
    let watched = store.load_watched(username)?;

    // Only picks genres for the source; `generate` builds its own profile
    let favorite_genres = match PreferenceAnalyzer::new(options.analyzer).analyze(&watched) {
        Ok(profile) => {
            tracing::info!(
                total_rated = profile.total_rated,
                favorites = profile.favorites.len(),
                threshold = profile.highly_rated_threshold,
                top_genres = ?profile.favorite_genres.iter().take(3).collect::<Vec<_>>(),
                "Analyzed taste profile"
            );
            profile.favorite_genres
        }
        Err(e) => {
            tracing::warn!(error = %e, "No taste profile, fetching generic candidates");
            Vec::new()
        }
    };

    let candidates = source
        .fetch_candidates(&favorite_genres, candidate_count)
        .await?;
    tracing::info!(
        source = source.name(),
        watched = watched.len(),
        candidates = candidates.len(),
        "Ranking candidates"
    );

    let (recommendations, fallback) = match generate(&watched, &candidates, options) {
        Ok(recs) => (recs, false),
        Err(RecommendError::InsufficientData(reason)) => {
            tracing::warn!(reason = %reason, "Falling back to community rating ranking");
            (rank_by_community_rating(&watched, &candidates, options)?, true)
        }
        Err(e) => return Err(e.into()),
    };

    let saved_to = store.save_recommendations(username, &recommendations)?;
    tracing::info!(
        count = recommendations.len(),
        fallback,
        "Recommendation run complete"
    );

    Ok(RunOutcome {
        run_id,
        recommendations,
        fallback,
        saved_to,
    })
}

/// Films from a user's history most similar to the one titled `title`
///
/// Titles are compared trimmed and case-insensitively; the first match is
/// the seed.
pub fn similar_in_history(
    store: &FilmStore,
    username: &str,
    title: &str,
    top_n: usize,
) -> AppResult<(Film, Vec<SimilarFilm>)> {
    let watched = store.load_watched(username)?;
    let wanted = normalize_title(title);

    let seed = watched
        .iter()
        .position(|film| normalize_title(&film.title) == wanted)
        .ok_or_else(|| {
            AppError::NotFound(format!("'{}' is not among {}'s films", title.trim(), username))
        })?;

    let similar = similar_films(&watched, seed, top_n)?;
    tracing::info!(
        seed = %watched[seed].title,
        count = similar.len(),
        "Found similar films"
    );

    Ok((watched[seed].clone(), similar))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::MockCandidateSource;
    use tempfile::TempDir;

    const WATCHED: &str = r#"[
        {"title": "Tokyo Story", "genres": ["Drama"], "directors": ["Yasujiro Ozu"],
         "personal_rating": 5, "url": "https://letterboxd.com/film/tokyo-story/"},
        {"title": "Late Spring", "genres": ["Drama"], "directors": ["Yasujiro Ozu"],
         "personal_rating": 4.5, "url": "https://letterboxd.com/film/late-spring/"},
        {"title": "Halloween", "genres": ["Horror"], "directors": ["John Carpenter"],
         "personal_rating": 2, "url": "https://letterboxd.com/film/halloween/"}
    ]"#;

    fn candidates() -> Vec<Film> {
        vec![
            Film {
                genres: vec!["Horror".to_string()],
                directors: vec!["Wes Craven".to_string()],
                community_rating: Some(3.6),
                ..Film::new("Scream", "https://letterboxd.com/film/scream/")
            },
            Film {
                genres: vec!["Drama".to_string()],
                directors: vec!["Yasujiro Ozu".to_string()],
                community_rating: Some(4.3),
                ..Film::new("Early Summer", "https://letterboxd.com/film/early-summer/")
            },
            Film::new("Tokyo Story", "https://letterboxd.com/film/tokyo-story/"),
        ]
    }

    fn store_with(watched: &str) -> (TempDir, FilmStore) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("ana_films_minimal.json"), watched).unwrap();
        let store = FilmStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn test_run_ranks_and_saves() {
        let (_dir, store) = store_with(WATCHED);

        let mut source = MockCandidateSource::new();
        source
            .expect_fetch_candidates()
            .withf(|genres, count| genres.first().map(String::as_str) == Some("Drama") && *count == 50)
            .times(1)
            .returning(|_, _| Ok(candidates()));
        source.expect_name().return_const("mock");

        let outcome = recommend_for_user(&store, &source, "ana", &GenerateOptions::default(), 50)
            .await
            .unwrap();

        assert!(!outcome.fallback);
        assert_eq!(outcome.recommendations.len(), 2);
        assert_eq!(outcome.recommendations[0].title, "Early Summer");
        assert!(outcome.saved_to.exists());
        assert_eq!(store.load_recommendations("ana").unwrap(), outcome.recommendations);
    }

    #[tokio::test]
    async fn test_unrated_user_gets_community_ranking() {
        let (_dir, store) = store_with(
            r#"[{"title": "Tokyo Story", "url": "https://letterboxd.com/film/tokyo-story/"}]"#,
        );

        let mut source = MockCandidateSource::new();
        source
            .expect_fetch_candidates()
            .withf(|genres, _| genres.is_empty())
            .returning(|_, _| Ok(candidates()));
        source.expect_name().return_const("mock");

        let outcome = recommend_for_user(&store, &source, "ana", &GenerateOptions::default(), 10)
            .await
            .unwrap();

        assert!(outcome.fallback);
        let titles: Vec<&str> = outcome.recommendations.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Early Summer", "Scream"]);
    }

    #[test]
    fn test_source_failure_propagates() {
        let (_dir, store) = store_with(WATCHED);

        let mut source = MockCandidateSource::new();
        source
            .expect_fetch_candidates()
            .returning(|_, _| Err(AppError::ExternalApi("TMDB API returned status 503".to_string())));
        source.expect_name().return_const("mock");

        let result = tokio_test::block_on(recommend_for_user(
            &store,
            &source,
            "ana",
            &GenerateOptions::default(),
            10,
        ));
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }

    #[tokio::test]
    async fn test_missing_user_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = FilmStore::new(dir.path());
        let source = MockCandidateSource::new();

        let result = recommend_for_user(&store, &source, "ghost", &GenerateOptions::default(), 10).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_similar_in_history() {
        let (_dir, store) = store_with(WATCHED);

        let (seed, similar) = similar_in_history(&store, "ana", "  tokyo story ", 5).unwrap();

        assert_eq!(seed.title, "Tokyo Story");
        let titles: Vec<&str> = similar.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Late Spring", "Halloween"]);
        assert!(similar[0].similarity > 0.99);
    }

    #[test]
    fn test_similar_in_history_unknown_title() {
        let (_dir, store) = store_with(WATCHED);
        assert!(matches!(
            similar_in_history(&store, "ana", "Stalker", 5),
            Err(AppError::NotFound(_))
        ));
    }
}
