use std::collections::HashSet;

use film_recommender::{
    generate,
    models::FilmKey,
    services::{
        pipeline::recommend_for_user,
        preferences::analyze,
        providers::FileCandidateSource,
        scoring::TitleMatch,
        vectorizer::vectorize,
    },
    store::FilmStore,
    Film, GenerateOptions, RecommendError, WeightConfig,
};
use tempfile::TempDir;

fn film(title: &str, genres: &[&str], directors: &[&str]) -> Film {
    Film {
        genres: genres.iter().map(|s| s.to_string()).collect(),
        directors: directors.iter().map(|s| s.to_string()).collect(),
        ..Film::new(title, format!("https://letterboxd.com/film/{}/", title.to_lowercase().replace(' ', "-")))
    }
}

fn rated(title: &str, genres: &[&str], directors: &[&str], rating: f64) -> Film {
    Film {
        personal_rating: Some(rating),
        ..film(title, genres, directors)
    }
}

fn candidate(title: &str, genres: &[&str], directors: &[&str], community: Option<f64>) -> Film {
    Film {
        community_rating: community,
        ..film(title, genres, directors)
    }
}

fn reichardt_fan() -> Vec<Film> {
    vec![
        rated("Old Joy", &["Drama"], &["Kelly Reichardt"], 5.0),
        rated("Wendy and Lucy", &["Drama"], &["Kelly Reichardt"], 5.0),
        rated("Certain Women", &["Drama"], &["Kelly Reichardt"], 4.5),
        rated("Meeks Cutoff", &["Drama", "Western"], &["Kelly Reichardt"], 4.5),
        rated("Grown Ups", &["Comedy"], &["Dennis Dugan"], 2.0),
    ]
}

fn mixed_pool() -> Vec<Film> {
    vec![
        candidate("Halloween Kills", &["Horror"], &["David Gordon Green"], Some(2.6)),
        candidate("First Cow", &["Drama"], &["Kelly Reichardt"], Some(3.8)),
        candidate("Night Moves", &["Drama", "Thriller"], &["Kelly Reichardt"], Some(3.3)),
        candidate("Showing Up", &["Comedy", "Drama"], &["Kelly Reichardt"], Some(3.4)),
        candidate("Leave No Trace", &["Drama"], &["Debra Granik"], Some(4.0)),
        candidate("The Conjuring", &["Horror"], &["James Wan"], Some(3.6)),
        candidate("Paddington 2", &["Comedy", "Family"], &["Paul King"], Some(4.2)),
        candidate("Winter's Bone", &["Drama", "Mystery"], &["Debra Granik"], None),
        candidate("Grown Ups 2", &["Comedy"], &["Dennis Dugan"], Some(1.4)),
        candidate("Old Joy", &["Drama"], &["Kelly Reichardt"], Some(3.7)),
    ]
}

#[test]
fn test_director_and_genre_match_outranks_unrelated_film() {
    let watched = reichardt_fan();
    let candidates = vec![
        candidate("Halloween", &["Horror"], &["John Carpenter"], Some(4.4)),
        candidate("First Cow", &["Drama"], &["Kelly Reichardt"], Some(3.8)),
    ];

    let recs = generate(&watched, &candidates, &GenerateOptions::default()).unwrap();

    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0].title, "First Cow");
    assert_eq!(recs[1].title, "Halloween");
    assert!(recs[0].rec_score > recs[1].rec_score);
    assert!(recs[0].reasons.iter().any(|r| r == "Genres you love: Drama"));
    assert!(recs[0]
        .reasons
        .iter()
        .any(|r| r == "Director you enjoy: Kelly Reichardt"));
    assert_eq!(recs[1].reasons, vec!["High community rating: 4.4/5"]);
}

#[test]
fn test_all_candidates_watched_is_empty_pool() {
    let watched = reichardt_fan();
    let candidates: Vec<Film> = watched.iter().map(|f| Film { personal_rating: None, ..f.clone() }).collect();

    assert!(matches!(
        generate(&watched, &candidates, &GenerateOptions::default()),
        Err(RecommendError::EmptyCandidatePool(_))
    ));
}

#[test]
fn test_full_ties_keep_input_order() {
    let watched = reichardt_fan();
    let candidates: Vec<Film> = ["Tie A", "Tie B", "Tie C", "Tie D"]
        .iter()
        .map(|title| candidate(title, &["Drama"], &["Kelly Reichardt"], Some(3.5)))
        .collect();

    let recs = generate(&watched, &candidates, &GenerateOptions::default()).unwrap();

    let titles: Vec<&str> = recs.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Tie A", "Tie B", "Tie C", "Tie D"]);
    assert!(recs.windows(2).all(|pair| pair[0].rec_score == pair[1].rec_score));
}

#[test]
fn test_top_n_limits_output() {
    let watched = reichardt_fan();
    let candidates = mixed_pool();
    let options = GenerateOptions {
        top_n: 3,
        exclude_watched: false,
        ..GenerateOptions::default()
    };

    let recs = generate(&watched, &candidates, &options).unwrap();

    assert_eq!(recs.len(), 3);
    assert_eq!(recs.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[test]
fn test_scores_bounded_and_sorted() {
    let recs = generate(&reichardt_fan(), &mixed_pool(), &GenerateOptions::default()).unwrap();

    assert_eq!(recs.len(), 9);
    for rec in &recs {
        assert!((0.0..=1.0).contains(&rec.rec_score), "{} out of range", rec.rec_score);
        assert!(!rec.reasons.is_empty() && rec.reasons.len() <= 3);
    }
    assert!(recs.windows(2).all(|pair| pair[0].rec_score >= pair[1].rec_score));
}

#[test]
fn test_generate_is_deterministic() {
    let watched = reichardt_fan();
    let candidates = mixed_pool();
    let options = GenerateOptions::default();

    let first = generate(&watched, &candidates, &options).unwrap();
    let second = generate(&watched, &candidates, &options).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_no_recommendation_shares_a_key_with_watched() {
    let mut watched = reichardt_fan();
    // Watched entry without a URL is matched by title
    watched.push(Film {
        personal_rating: Some(4.0),
        ..Film::new("Paddington 2", "")
    });
    let candidates = mixed_pool();

    let recs = generate(&watched, &candidates, &GenerateOptions::default()).unwrap();

    let watched_keys: HashSet<FilmKey> = watched.iter().map(Film::key).collect();
    let watched_titles: HashSet<String> = watched.iter().map(|f| f.title.to_lowercase()).collect();
    for rec in &recs {
        assert!(!watched_keys.contains(&FilmKey::Url(rec.url.clone())));
        assert!(!watched_titles.contains(&rec.title.to_lowercase()));
    }
    assert_eq!(recs.len(), 8);
}

#[test]
fn test_loose_title_match_excludes_year_suffixed_titles() {
    let watched = vec![rated("The Thing", &["Horror"], &["John Carpenter"], 5.0)];
    let candidates = vec![
        Film::new("Thing (1982)", "https://example.org/the-thing-1982"),
        Film::new("The Fog", "https://example.org/the-fog"),
    ];

    let exact = generate(&watched, &candidates, &GenerateOptions::default()).unwrap();
    assert_eq!(exact.len(), 2);

    let options = GenerateOptions {
        title_match: TitleMatch::Loose,
        ..GenerateOptions::default()
    };
    let loose = generate(&watched, &candidates, &options).unwrap();
    assert_eq!(loose.len(), 1);
    assert_eq!(loose[0].title, "The Fog");
}

#[test]
fn test_unrated_history_is_insufficient() {
    let watched = vec![film("Old Joy", &["Drama"], &["Kelly Reichardt"])];
    assert!(matches!(
        generate(&watched, &mixed_pool(), &GenerateOptions::default()),
        Err(RecommendError::InsufficientData(_))
    ));
}

#[test]
fn test_invalid_weights_rejected() {
    let options = GenerateOptions {
        weights: WeightConfig {
            content: 0.0,
            rating: 0.0,
            genre: 0.0,
            director: 0.0,
            actor: 0.0,
        },
        ..GenerateOptions::default()
    };
    assert!(matches!(
        generate(&reichardt_fan(), &mixed_pool(), &options),
        Err(RecommendError::InvalidConfig(_))
    ));
}

#[test]
fn test_unnormalized_weights_rank_like_normalized() {
    let scaled = GenerateOptions {
        weights: WeightConfig {
            content: 4.0,
            rating: 2.0,
            genre: 2.0,
            director: 1.5,
            actor: 0.5,
        },
        ..GenerateOptions::default()
    };
    let a = generate(&reichardt_fan(), &mixed_pool(), &scaled).unwrap();
    let b = generate(&reichardt_fan(), &mixed_pool(), &GenerateOptions::default()).unwrap();

    let titles = |recs: &[film_recommender::Recommendation]| {
        recs.iter().map(|r| r.title.clone()).collect::<Vec<_>>()
    };
    assert_eq!(titles(&a[..]), titles(&b[..]));
}

#[test]
fn test_favorite_genres_come_from_watched_films() {
    let watched = reichardt_fan();
    let profile = analyze(&watched).unwrap();

    let watched_genres: HashSet<&str> = watched
        .iter()
        .flat_map(|f| f.genres.iter().map(String::as_str))
        .collect();
    assert!(profile
        .favorite_genres
        .iter()
        .all(|g| watched_genres.contains(g.as_str())));
    assert_eq!(profile.favorite_genres[0], "Drama");
}

#[test]
fn test_similarity_symmetric_over_corpus() {
    let mut corpus = reichardt_fan();
    corpus.extend(mixed_pool());
    corpus.push(Film::new("No Metadata", "https://letterboxd.com/film/no-metadata/"));

    let model = vectorize(&corpus);
    let sim = &model.similarity;
    let empty = corpus.len() - 1;

    for i in 0..corpus.len() {
        for j in 0..corpus.len() {
            assert_eq!(sim.get(i, j), sim.get(j, i));
            assert!(!sim.get(i, j).is_nan());
        }
        if i != empty {
            assert_eq!(sim.get(i, i), 1.0);
        }
        assert_eq!(sim.get(i, empty), 0.0);
    }
}

#[tokio::test]
async fn test_end_to_end_with_file_candidates() {
    let dir = TempDir::new().unwrap();
    let watched = serde_json::json!([
        {"title": "Old Joy", "genres": ["Drama"], "directors": ["Kelly Reichardt"],
         "personal_rating": "5", "url": "https://letterboxd.com/film/old-joy/"},
        {"title": "Wendy and Lucy", "genres": ["Drama"], "directors": ["Kelly Reichardt"],
         "personal_rating": 4.5, "url": "https://letterboxd.com/film/wendy-and-lucy/"}
    ]);
    std::fs::write(
        dir.path().join("ana_detailed_films.json"),
        serde_json::to_string(&watched).unwrap(),
    )
    .unwrap();

    let candidates_path = dir.path().join("popular.json");
    std::fs::write(
        &candidates_path,
        serde_json::to_string(&mixed_pool()).unwrap(),
    )
    .unwrap();

    let store = FilmStore::new(dir.path());
    let source = FileCandidateSource::new(&candidates_path);
    let options = GenerateOptions {
        top_n: 5,
        ..GenerateOptions::default()
    };

    let outcome = recommend_for_user(&store, &source, "ana", &options, 500)
        .await
        .unwrap();

    assert!(!outcome.fallback);
    assert_eq!(outcome.recommendations.len(), 5);
    assert!(outcome
        .recommendations
        .iter()
        .all(|r| r.title != "Old Joy"));
    assert!(outcome.saved_to.ends_with("ana_recommendations.json"));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&outcome.saved_to).unwrap()).unwrap();
    assert_eq!(saved.as_array().unwrap().len(), 5);
    assert!(saved[0].get("average_rating").is_some());
}
