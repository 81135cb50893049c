use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

/// Largest list the CLI will produce
pub const MAX_TOP_N: usize = 50;

/// Personalized film recommendations from a rating history
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Username whose exported films are in the data directory
    pub username: String,

    /// Number of recommendations (1 to 50)
    #[arg(long, short = 'n')]
    pub top_n: Option<usize>,

    /// Keep films the user has already watched in the candidate pool
    #[arg(long)]
    pub no_exclude: bool,

    /// Read candidates from this JSON file instead of TMDB
    #[arg(long)]
    pub candidates: Option<PathBuf>,

    /// Directory holding the film exports
    #[arg(long, env = "DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Also treat "Title (YYYY)" and "The Title" as the same watched film
    #[arg(long)]
    pub loose_titles: bool,

    /// List the user's own films closest in content to this one instead
    #[arg(long, value_name = "TITLE")]
    pub similar_to: Option<String>,
}

impl Cli {
    /// Applies command-line overrides on top of the environment config
    pub fn apply(&self, config: &mut Config) {
        if let Some(top_n) = self.top_n {
            config.top_n = top_n;
        }
        config.top_n = config.top_n.clamp(1, MAX_TOP_N);

        if self.no_exclude {
            config.exclude_watched = false;
        }
        if self.loose_titles {
            config.loose_title_match = true;
        }
        if let Some(data_dir) = &self.data_dir {
            config.data_dir = data_dir.clone();
        }
    }

    pub fn username(&self) -> &str {
        self.username.trim()
    }
}
