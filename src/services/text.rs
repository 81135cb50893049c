//! Tokenization for the content vectorizer.

use std::sync::LazyLock;

use regex::Regex;

/// English stop words, sorted for binary search
const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "almost", "also", "am", "among",
    "an", "and", "another", "any", "are", "around", "as", "at", "be", "because", "been",
    "before", "being", "below", "between", "both", "but", "by", "can", "cannot", "could",
    "did", "do", "does", "doing", "done", "down", "during", "each", "either", "else", "enough",
    "etc", "even", "ever", "every", "few", "for", "from", "further", "get", "gets", "got",
    "had", "has", "have", "having", "he", "her", "here", "hers", "herself", "him", "himself",
    "his", "how", "however", "if", "in", "into", "is", "it", "its", "itself", "just", "least",
    "less", "many", "may", "me", "might", "more", "most", "much", "must", "my", "myself",
    "neither", "no", "nor", "not", "now", "of", "off", "often", "on", "once", "one", "only",
    "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own",
    "per", "perhaps", "rather", "same", "she", "should", "since", "so", "some", "still",
    "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there",
    "these", "they", "this", "those", "though", "through", "thus", "to", "too", "toward",
    "under", "until", "up", "upon", "us", "very", "via", "was", "we", "well", "were", "what",
    "whatever", "when", "where", "whether", "which", "while", "who", "whom", "whose", "why",
    "will", "with", "within", "without", "would", "yet", "you", "your", "yours", "yourself",
    "yourselves",
];

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.binary_search(&token).is_ok()
}

static SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}_]+").expect("compile token split pattern"));

/// Lowercases text and splits it into tokens of two or more word characters,
/// dropping stop words
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    SPLIT_RE
        .split(&lowered)
        .filter(|token| token.chars().count() >= 2)
        .filter(|token| !is_stop_word(token))
        .map(str::to_string)
        .collect()
}

/// Expands tokens into all n-grams from length 1 up to `max_n`
///
/// Unigrams come first, then bigrams, and so on; n-gram parts are joined
/// with a single space.
pub fn ngrams(tokens: &[String], max_n: usize) -> Vec<String> {
    let mut terms = tokens.to_vec();
    for n in 2..=max_n {
        if tokens.len() < n {
            break;
        }
        terms.extend(tokens.windows(n).map(|window| window.join(" ")));
    }
    terms
}

/// Collapses a name into a single lowercase token
///
/// "Bong Joon-ho" becomes "bong_joon_ho".
pub fn slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    slug
}

/// Token standing for a person, e.g. `director_agnes_varda`
pub fn person_token(role: &str, name: &str) -> String {
    let slug = slug(name);
    if slug.is_empty() {
        String::new()
    } else {
        format!("{}_{}", role, slug)
    }
}
