use clap::Parser;

use film_recommender::{
    cli::Cli,
    config::Config,
    services::{
        pipeline::{recommend_for_user, similar_in_history},
        providers::{CandidateSource, FileCandidateSource, TmdbProvider},
    },
    store::FilmStore,
    telemetry::init_tracing,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    cli.apply(&mut config);

    let store = FilmStore::new(&config.data_dir);

    if let Some(title) = &cli.similar_to {
        let (seed, similar) = similar_in_history(&store, cli.username(), title, config.top_n)?;
        println!("Films similar to {}:\n", seed.title);
        for film in &similar {
            let year = film.year.map(|y| format!(" ({})", y)).unwrap_or_default();
            println!("{:>2}. {}{}  [similarity {:.3}]", film.rank, film.title, year, film.similarity);
            if !film.genres.is_empty() {
                let genres: Vec<&str> = film.genres.iter().take(3).map(String::as_str).collect();
                println!("      Genres: {}", genres.join(", "));
            }
        }
        return Ok(());
    }

    let source: Box<dyn CandidateSource> = match (&cli.candidates, config.tmdb_api_key()) {
        (Some(path), _) => Box::new(FileCandidateSource::new(path)),
        (None, Some(api_key)) => Box::new(
            TmdbProvider::new(api_key.to_string(), config.tmdb_api_url.clone())
                .with_pages(config.tmdb_pages)
                .with_detail_limit(config.tmdb_detail_limit),
        ),
        (None, None) => {
            tracing::info!(
                path = %config.candidates_file.display(),
                "No TMDB API key configured, reading candidates from file"
            );
            Box::new(FileCandidateSource::new(store.data_dir().join(&config.candidates_file)))
        }
    };

    let outcome = recommend_for_user(
        &store,
        source.as_ref(),
        cli.username(),
        &config.generate_options(),
        config.candidate_count,
    )
    .await?;

    if outcome.fallback {
        println!("No personal ratings found; ranked by community rating.\n");
    }

    for rec in &outcome.recommendations {
        let year = rec.year.map(|y| format!(" ({})", y)).unwrap_or_default();
        let rating = rec
            .community_rating
            .map(|r| format!("{:.1}/5", r))
            .unwrap_or_else(|| "unrated".to_string());
        println!("{:>2}. {}{}  [{}, score {:.3}]", rec.rank, rec.title, year, rating, rec.rec_score);
        for reason in &rec.reasons {
            println!("      - {}", reason);
        }
    }

    println!("\nSaved to {}", outcome.saved_to.display());
    Ok(())
}
