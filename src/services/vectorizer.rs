use std::collections::HashMap;

use crate::models::Film;
use crate::services::text::{ngrams, person_token, slug, tokenize};

/// Tuning knobs of the content vectorizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorizerConfig {
    /// Vocabulary cap, keeping the most frequent terms in the corpus
    pub max_features: usize,
    /// Longest n-gram taken from the content string
    pub max_ngram: usize,
    /// Leading characters of the description that are vectorized
    pub description_chars: usize,
    pub genre_repeat: usize,
    pub director_repeat: usize,
    pub actor_repeat: usize,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: 1000,
            max_ngram: 2,
            description_chars: 200,
            genre_repeat: 3,
            director_repeat: 4,
            actor_repeat: 2,
        }
    }
}

/// Sparse TF-IDF vector, L2-normalized unless it is the zero vector
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentVector {
    /// (term index, weight) pairs sorted by term index
    entries: Vec<(usize, f64)>,
}

impl ContentVector {
    fn from_counts(counts: HashMap<usize, f64>, idf: &[f64]) -> Self {
        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(term, tf)| (term, tf * idf[term]))
            .collect();
        entries.sort_by_key(|(term, _)| *term);

        let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, weight) in entries.iter_mut() {
                *weight /= norm;
            }
        }

        Self { entries }
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Dot product by merge-joining the sorted entries
    pub fn dot(&self, other: &ContentVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_term, a_weight) = self.entries[i];
            let (b_term, b_weight) = other.entries[j];
            match a_term.cmp(&b_term) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_weight * b_weight;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Cosine similarity of two content vectors; 0.0 if either is the zero vector
pub fn cosine_similarity(a: &ContentVector, b: &ContentVector) -> f64 {
    if a.is_zero() || b.is_zero() {
        return 0.0;
    }
    a.dot(b).clamp(0.0, 1.0)
}

/// Dense symmetric n×n matrix of pairwise film similarities
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    fn build(vectors: &[ContentVector]) -> Self {
        let size = vectors.len();
        let mut values = vec![0.0; size * size];

        for i in 0..size {
            if vectors[i].is_zero() {
                continue;
            }
            values[i * size + i] = 1.0;
            for j in (i + 1)..size {
                let sim = cosine_similarity(&vectors[i], &vectors[j]);
                values[i * size + j] = sim;
                values[j * size + i] = sim;
            }
        }

        Self { size, values }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.size..(i + 1) * self.size]
    }

    /// Up to `top_n` other rows, most similar to `seed` first
    ///
    /// Equal similarities keep row order. `seed` must be below [`Self::size`].
    pub fn most_similar(&self, seed: usize, top_n: usize) -> Vec<(usize, f64)> {
        let mut ranked: Vec<(usize, f64)> = self
            .row(seed)
            .iter()
            .copied()
            .enumerate()
            .filter(|(i, _)| *i != seed)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(top_n);
        ranked
    }
}

/// Vectors and similarities of one corpus, plus the vocabulary they index
#[derive(Debug, Clone)]
pub struct ContentModel {
    /// Selected terms in index order
    pub vocabulary: Vec<String>,
    pub idf: Vec<f64>,
    pub vectors: Vec<ContentVector>,
    pub similarity: SimilarityMatrix,
}

/// TF-IDF vectorizer over weighted film content strings
#[derive(Debug, Clone, Default)]
pub struct ContentVectorizer {
    config: VectorizerConfig,
}

impl ContentVectorizer {
    pub fn new(config: VectorizerConfig) -> Self {
        Self { config }
    }

    /// Builds the weighted content string of a film
    ///
    /// Genres, directors and the top actors become single tokens repeated
    /// by their weight; the description prefix is appended once.
    pub fn content_string(&self, film: &Film) -> String {
        let mut parts: Vec<String> = Vec::new();

        let genres: Vec<String> = film
            .genres
            .iter()
            .map(|g| slug(g))
            .filter(|g| !g.is_empty())
            .collect();
        for _ in 0..self.config.genre_repeat {
            parts.extend(genres.iter().cloned());
        }

        let directors: Vec<String> = film
            .directors
            .iter()
            .map(|d| person_token("director", d))
            .filter(|d| !d.is_empty())
            .collect();
        for _ in 0..self.config.director_repeat {
            parts.extend(directors.iter().cloned());
        }

        let actors: Vec<String> = film
            .top_actors()
            .iter()
            .map(|a| person_token("actor", a))
            .filter(|a| !a.is_empty())
            .collect();
        for _ in 0..self.config.actor_repeat {
            parts.extend(actors.iter().cloned());
        }

        if let Some(description) = film.description.as_deref() {
            let prefix: String = description.chars().take(self.config.description_chars).collect();
            if !prefix.trim().is_empty() {
                parts.push(prefix);
            }
        }

        parts.join(" ")
    }

    fn terms(&self, film: &Film) -> Vec<String> {
        ngrams(&tokenize(&self.content_string(film)), self.config.max_ngram.max(1))
    }

    /// Vectorizes a corpus and computes every pairwise similarity
    pub fn vectorize<'a, I>(&self, films: I) -> ContentModel
    where
        I: IntoIterator<Item = &'a Film>,
    {
        let documents: Vec<Vec<String>> = films.into_iter().map(|film| self.terms(film)).collect();
        let vocabulary = self.select_vocabulary(&documents);
        let index: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, term)| (term.as_str(), i))
            .collect();

        let mut doc_freq = vec![0usize; vocabulary.len()];
        let mut doc_counts: Vec<HashMap<usize, f64>> = Vec::with_capacity(documents.len());
        for terms in &documents {
            let mut counts: HashMap<usize, f64> = HashMap::new();
            for term in terms {
                if let Some(&i) = index.get(term.as_str()) {
                    *counts.entry(i).or_insert(0.0) += 1.0;
                }
            }
            for &i in counts.keys() {
                doc_freq[i] += 1;
            }
            doc_counts.push(counts);
        }

        // Smoothed idf: ln((1 + n) / (1 + df)) + 1
        let n = documents.len() as f64;
        let idf: Vec<f64> = doc_freq
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let vectors: Vec<ContentVector> = doc_counts
            .into_iter()
            .map(|counts| ContentVector::from_counts(counts, &idf))
            .collect();
        let similarity = SimilarityMatrix::build(&vectors);

        ContentModel {
            vocabulary,
            idf,
            vectors,
            similarity,
        }
    }

    /// Keeps the `max_features` most frequent terms, returned in sorted order
    fn select_vocabulary(&self, documents: &[Vec<String>]) -> Vec<String> {
        let mut frequency: HashMap<&str, usize> = HashMap::new();
        for term in documents.iter().flatten() {
            *frequency.entry(term.as_str()).or_insert(0) += 1;
        }

        let mut ranked: Vec<(&str, usize)> = frequency.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.config.max_features);

        let mut vocabulary: Vec<String> = ranked.into_iter().map(|(term, _)| term.to_string()).collect();
        vocabulary.sort();
        vocabulary
    }
}

/// Vectorizes a corpus with the default configuration
pub fn vectorize(films: &[Film]) -> ContentModel {
    ContentVectorizer::default().vectorize(films)
}
