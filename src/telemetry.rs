use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

/// Identifier of one recommendation run, attached to every log line of it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Creates a new random run ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Span wrapping one recommendation run
pub fn run_span(run_id: RunId, username: &str) -> tracing::Span {
    tracing::info_span!(
        "recommendation_run",
        run_id = %run_id,
        username = %username,
    )
}

/// Installs the global subscriber
///
/// Filtering follows `RUST_LOG` and defaults to `info`. Calling this twice is
/// harmless; the second call leaves the first subscriber in place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init();
}
