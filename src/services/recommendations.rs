use crate::{
    error::{RecommendError, RecommendResult},
    models::{Film, Recommendation, SimilarFilm, WeightConfig},
    services::{
        explanation::{ExplanationConfig, ExplanationGenerator, FALLBACK_REASON},
        preferences::{AnalyzerConfig, PreferenceAnalyzer},
        scoring::{compare_community_rating, exclude_watched, rank, HybridScorer, TitleMatch},
        vectorizer::{ContentVectorizer, VectorizerConfig},
    },
};

/// Options of one recommendation run
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    /// Length of the returned list; must be at least 1
    pub top_n: usize,
    pub exclude_watched: bool,
    pub weights: WeightConfig,
    pub title_match: TitleMatch,
    pub analyzer: AnalyzerConfig,
    pub vectorizer: VectorizerConfig,
    pub explanation: ExplanationConfig,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            top_n: 10,
            exclude_watched: true,
            weights: WeightConfig::default(),
            title_match: TitleMatch::default(),
            analyzer: AnalyzerConfig::default(),
            vectorizer: VectorizerConfig::default(),
            explanation: ExplanationConfig::default(),
        }
    }
}

impl GenerateOptions {
    fn candidate_pool<'a>(&self, watched: &[Film], candidates: &'a [Film]) -> RecommendResult<Vec<&'a Film>> {
        if self.top_n == 0 {
            return Err(RecommendError::InvalidConfig(
                "top_n must be at least 1".to_string(),
            ));
        }

        let pool: Vec<&Film> = if self.exclude_watched {
            exclude_watched(watched, candidates, self.title_match)
        } else {
            candidates.iter().collect()
        };

        if pool.is_empty() {
            let reason = if candidates.is_empty() {
                "no candidate films were supplied".to_string()
            } else {
                format!("all {} candidates were already watched", candidates.len())
            };
            return Err(RecommendError::EmptyCandidatePool(reason));
        }

        Ok(pool)
    }
}

/// Builds the ranked, explained top-N recommendation list
///
/// Learns a taste profile from the rated `watched` films, drops candidates
/// already watched, scores the rest against the profile and returns the best
/// `top_n` with reasons. Deterministic for identical inputs.
pub fn generate(
    watched: &[Film],
    candidates: &[Film],
    options: &GenerateOptions,
) -> RecommendResult<Vec<Recommendation>> {
    let scorer = HybridScorer::new(options.weights)?;
    let profile = PreferenceAnalyzer::new(options.analyzer).analyze(watched)?;
    let pool = options.candidate_pool(watched, candidates)?;

    let model = ContentVectorizer::new(options.vectorizer)
        .vectorize(watched.iter().chain(pool.iter().copied()));

    let mut scored = scorer.score(&pool, &profile, &model.similarity, watched.len())?;
    rank(&mut scored, &pool);

    let explainer = ExplanationGenerator::new(options.explanation);

    let recommendations = scored
        .iter()
        .take(options.top_n)
        .enumerate()
        .map(|(i, s)| {
            let film = pool[s.candidate];
            let reasons = explainer.explain(film, &profile, s);
            Recommendation::new(i + 1, film, s.rec_score, reasons)
        })
        .collect();

    Ok(recommendations)
}

/// Ranks candidates by community rating alone
///
/// Used when the user has no personal ratings to learn from. The score is
/// the community rating scaled to [0, 1]; unrated films rank last.
pub fn rank_by_community_rating(
    watched: &[Film],
    candidates: &[Film],
    options: &GenerateOptions,
) -> RecommendResult<Vec<Recommendation>> {
    let mut pool = options.candidate_pool(watched, candidates)?;
    pool.sort_by(|a, b| compare_community_rating(a.community_rating, b.community_rating));

    let high_rating = options.explanation.high_rating;

    let recommendations = pool
        .into_iter()
        .take(options.top_n)
        .enumerate()
        .map(|(i, film)| {
            let rating = film.community_rating.filter(|r| r.is_finite());
            let reason = match rating {
                Some(r) if r >= high_rating => format!("High community rating: {:.1}/5", r),
                _ => FALLBACK_REASON.to_string(),
            };
            let score = rating.map_or(0.0, |r| (r / 5.0).clamp(0.0, 1.0));
            Recommendation::new(i + 1, film, score, vec![reason])
        })
        .collect();

    Ok(recommendations)
}

/// Films most similar in content to the film at position `seed`
///
/// Ranks every other film of `films` by cosine similarity to the seed, most
/// similar first. Equal similarities keep input order.
pub fn similar_films(films: &[Film], seed: usize, top_n: usize) -> RecommendResult<Vec<SimilarFilm>> {
    if top_n == 0 {
        return Err(RecommendError::InvalidConfig(
            "top_n must be at least 1".to_string(),
        ));
    }
    if seed >= films.len() {
        return Err(RecommendError::InvalidConfig(format!(
            "seed position {} is outside the {} films",
            seed,
            films.len()
        )));
    }

    let model = ContentVectorizer::default().vectorize(films);

    let similar = model
        .similarity
        .most_similar(seed, top_n)
        .into_iter()
        .enumerate()
        .map(|(i, (position, similarity))| SimilarFilm::new(i + 1, position, &films[position], similarity))
        .collect();

    Ok(similar)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn film(title: &str, rating: Option<f64>) -> Film {
        Film {
            community_rating: rating,
            ..Film::new(title, format!("https://letterboxd.com/film/{}/", title))
        }
    }

    #[test]
    fn test_invalid_weights_fail_before_analysis() {
        let options = GenerateOptions {
            weights: WeightConfig {
                rating: f64::INFINITY,
                ..WeightConfig::default()
            },
            ..GenerateOptions::default()
        };
        assert!(matches!(
            generate(&[], &[], &options),
            Err(RecommendError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_top_n_is_invalid() {
        let options = GenerateOptions {
            top_n: 0,
            ..GenerateOptions::default()
        };
        let candidates = vec![film("a", Some(4.0))];
        assert!(matches!(
            rank_by_community_rating(&[], &candidates, &options),
            Err(RecommendError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rank_by_community_rating() {
        let watched = vec![film("seen", Some(4.9))];
        let candidates = vec![
            film("seen", Some(4.9)),
            film("ok", Some(3.2)),
            film("unrated", None),
            film("great", Some(4.44)),
        ];
        let recs = rank_by_community_rating(&watched, &candidates, &GenerateOptions::default()).unwrap();

        let titles: Vec<&str> = recs.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["great", "ok", "unrated"]);
        assert_eq!(recs[0].reasons, vec!["High community rating: 4.4/5"]);
        assert_eq!(recs[1].reasons, vec![FALLBACK_REASON]);
        assert_eq!(recs[2].rec_score, 0.0);
        assert_eq!(recs.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_rank_by_community_rating_empty_pool() {
        let watched = vec![film("a", None)];
        let candidates = vec![film("a", Some(4.0))];
        assert!(matches!(
            rank_by_community_rating(&watched, &candidates, &GenerateOptions::default()),
            Err(RecommendError::EmptyCandidatePool(_))
        ));
    }

    fn titled(title: &str, genres: &[&str], directors: &[&str]) -> Film {
        Film {
            genres: genres.iter().map(|s| s.to_string()).collect(),
            directors: directors.iter().map(|s| s.to_string()).collect(),
            ..film(title, None)
        }
    }

    #[test]
    fn test_similar_films_ranks_seed_row() {
        let films = vec![
            titled("Tokyo Story", &["Drama"], &["Yasujiro Ozu"]),
            titled("The Thing", &["Horror"], &["John Carpenter"]),
            titled("Late Spring", &["Drama"], &["Yasujiro Ozu"]),
            titled("Floating Clouds", &["Drama", "Romance"], &["Mikio Naruse"]),
        ];

        let similar = similar_films(&films, 0, 5).unwrap();

        let titles: Vec<&str> = similar.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Late Spring", "Floating Clouds", "The Thing"]);
        assert_eq!(similar.iter().map(|s| s.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(similar[0].position, 2);
        assert!(similar[0].similarity > similar[1].similarity);
        assert_eq!(similar[2].similarity, 0.0);
        assert!(similar.iter().all(|s| s.position != 0));
    }

    #[test]
    fn test_similar_films_ties_keep_input_order() {
        let films = vec![
            titled("Seed", &["Western"], &[]),
            titled("Copy B", &["Western"], &[]),
            titled("Copy A", &["Western"], &[]),
        ];
        let similar = similar_films(&films, 0, 1).unwrap();
        assert_eq!(similar.len(), 1);
        assert_eq!(similar[0].title, "Copy B");
    }

    #[test]
    fn test_similar_films_rejects_bad_arguments() {
        let films = vec![titled("Only", &["Drama"], &[])];
        assert!(matches!(
            similar_films(&films, 1, 5),
            Err(RecommendError::InvalidConfig(_))
        ));
        assert!(matches!(
            similar_films(&films, 0, 0),
            Err(RecommendError::InvalidConfig(_))
        ));
        assert!(similar_films(&films, 0, 5).unwrap().is_empty());
    }
}
