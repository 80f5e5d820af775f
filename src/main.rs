//! Game server binary.
//!
//! Loads maps, opens the score file and serves the JSON line protocol until
//! interrupted.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use squad_guessr::adapter::{
    load_maps, open_file_scores, run_game_server, AppConfig, FileRoundSource, RoundSource,
};
use squad_guessr::core::GameSession;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::from_env();
    let maps = load_maps(&config.maps_path, config.display_size)?;
    let scores = open_file_scores(config.scores_path.clone()).context("failed to open score file")?;
    info!(
        scores = %scores.backend().path().display(),
        rounds = %config.rounds_path.display(),
        "starting"
    );

    let session = GameSession::new(Arc::new(maps), Box::new(scores));
    let source: Arc<dyn RoundSource> =
        Arc::new(FileRoundSource::new(&config.rounds_path, config.seed));

    tokio::select! {
        result = run_game_server(config.server, session, source, None) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            Ok(())
        }
    }
}
