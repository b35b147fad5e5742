mod batch;
mod catalog;
mod config;
mod db;
mod errors;
mod generation;
mod llm_client;
mod models;
mod store;
mod taxonomy;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::batch::{BatchConfig, BatchOrchestrator};
use crate::catalog::PgCatalog;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::{GeminiClient, GeminiSettings, RetryPolicy};
use crate::store::PgResultStore;
use crate::taxonomy::Taxonomy;

/// Generates mood-tailored one-sentence film recommendations for the whole catalog.
#[derive(Parser)]
#[command(name = "film-takes", version)]
struct Cli {
    /// Process at most this many movies (overrides BATCH_LIMIT)
    #[arg(long)]
    limit: Option<u32>,

    /// JSON taxonomy file to use instead of the built-in moods (overrides TAXONOMY_PATH)
    #[arg(long)]
    taxonomy: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting film-takes v{}", env!("CARGO_PKG_VERSION"));

    let taxonomy = match cli.taxonomy.or_else(|| config.taxonomy_path.clone()) {
        Some(path) => Taxonomy::load(&path)
            .with_context(|| format!("Failed to load taxonomy from {}", path.display()))?,
        None => Taxonomy::builtin(),
    };
    info!(
        "Taxonomy loaded: {} moods, {} mood/reason pairs",
        taxonomy.moods().len(),
        taxonomy.pair_count()
    );

    let pool = create_pool(&config.database_url)?;

    let llm = GeminiClient::new(GeminiSettings {
        api_key: config.gemini_api_key.clone(),
        api_base: config.gemini_api_base.clone(),
        model: config.gemini_model.clone(),
        retry: RetryPolicy::new(config.llm_max_retries),
    })?;
    info!("LLM client initialized (model: {})", llm.model());

    let mut orchestrator = BatchOrchestrator::new(
        Arc::new(PgCatalog::new(pool.clone())),
        Arc::new(llm),
        Arc::new(PgResultStore::new(pool)),
        taxonomy,
        BatchConfig {
            bounded_limit: cli.limit.or(config.batch_limit),
        },
    );

    orchestrator.run().await?;

    Ok(())
}
