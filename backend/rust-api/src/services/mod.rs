use crate::config::Config;
use crate::models::{riddle, Riddle};
use anyhow::Context;

use score_service::ScoreStore;
use session_service::SessionService;

pub struct AppState {
    pub config: Config,
    pub catalog: Vec<Riddle>,
    pub sessions: SessionService,
    pub scores: ScoreStore,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        Self::with_catalog(config, riddle::catalog())
    }

    pub fn with_catalog(config: Config, catalog: Vec<Riddle>) -> anyhow::Result<Self> {
        let scores = ScoreStore::new(&config.high_scores_path);

        tracing::info!(
            "Bootstrapping high score file at {}",
            scores.path().display()
        );
        scores
            .ensure_initialized()
            .context("Failed to initialize high score file")?;

        let sessions = SessionService::new(config.session_ttl_seconds);

        tracing::info!("Loaded riddle catalog with {} riddles", catalog.len());

        Ok(Self {
            config,
            catalog,
            sessions,
            scores,
        })
    }
}

pub mod score_service;
pub mod session_service;
