use anyhow::Context;
use parley::api::{self, app_state::AppState};
use parley::config::loader::ConfigLoader;
use parley::generation::create_generator;
use parley::index::create_knowledge_index;
use parley::observability::{
    AppMetrics, ObservabilityState, create_observability_router, init_tracing,
};
use parley::services::create_answer_service;
use parley::storage::StorageFactory;
use parley::synonyms::{Normalizer, SynonymTable};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::load().context("failed to load configuration")?;
    ConfigLoader::validate(&config).context("invalid configuration")?;

    let _log_guard = init_tracing(&config.logging, env!("CARGO_PKG_NAME"));
    info!(
        "Starting {} ({} environment)...",
        config.app_name, config.environment
    );

    let table = SynonymTable::load(&config.synonyms.path);
    info!("Synonym table loaded with {} entries", table.len());
    let normalizer = Normalizer::new(Arc::new(table));

    let store = StorageFactory::create(&config.database).await?;
    info!("Conversation store initialized (backend: {})", config.database.backend);

    let index = create_knowledge_index(&config.knowledge, &config.embedding).await?;
    match &index {
        Some(_) => info!(
            "Knowledge base indexed from {} (embedding backend: {})",
            config.knowledge.source_path.display(),
            config.embedding.backend
        ),
        None => warn!(
            "Knowledge base {} not found, answers will fail until it is provided",
            config.knowledge.source_path.display()
        ),
    }
    let knowledge_loaded = index.is_some();

    let generator = create_generator(&config.generator)?;
    info!("Generator initialized: {}", generator.name());

    let answer_service = create_answer_service(
        normalizer,
        store.clone(),
        index,
        generator,
        config.knowledge.top_k,
    );

    let metrics = Arc::new(AppMetrics::default());
    let app_state = AppState::new(answer_service, metrics.clone());
    info!("Application state created");

    let observability_state = Arc::new(ObservabilityState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        metrics,
        store,
        knowledge_loaded,
    ));
    let api_router = api::create_router(app_state);
    let router = create_observability_router(observability_state).merge(api_router);
    info!("API router created with observability endpoints");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
