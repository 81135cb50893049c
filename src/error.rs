/// Errors raised by the recommendation core
///
/// Every failure of the scoring pipeline is returned to the caller as one of
/// these variants; the core never logs or swallows them.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    /// Not enough personal ratings to learn a taste profile
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Malformed scoring or ranking configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Nothing left to rank after excluding watched films
    #[error("Empty candidate pool: {0}")]
    EmptyCandidatePool(String),
}

pub type RecommendResult<T> = Result<T, RecommendError>;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Recommendation error: {0}")]
    Recommend(#[from] RecommendError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External API error: {0}")]
    ExternalApi(String),
}

pub type AppResult<T> = Result<T, AppError>;
