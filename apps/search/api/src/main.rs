use std::sync::Arc;
use std::time::Duration;

use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_posts::PgPostRepository;
use domain_search::{FastTextEmbedder, IndexService, RebuildTracker, SearchService, VectorStore};
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    // Connect to databases concurrently
    let postgres_future = async {
        database::postgres::connect_from_config_with_retry(config.database.clone(), None)
            .await
            .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))
    };

    let redis_future = async {
        database::redis::connect_from_config_with_retry(config.redis.clone(), None)
            .await
            .map_err(|e| eyre::eyre!("Redis connection failed: {}", e))
    };

    let (db, redis) = tokio::try_join!(postgres_future, redis_future)?;

    // Model init may download ONNX weights on first run, keep it off the
    // async runtime threads.
    let ml_config = config.ml.clone();
    let embedder = tokio::task::spawn_blocking(move || FastTextEmbedder::new(&ml_config))
        .await
        .map_err(|e| eyre::eyre!("Embedder initialization panicked: {}", e))??;
    let embedder = Arc::new(embedder);

    let store = Arc::new(VectorStore::open(
        config.index.container_path(),
        config.ml.dimension,
    )?);
    info!(posts = store.len(), "Vector store ready");

    let repository = Arc::new(PgPostRepository::new(db.clone()));
    let indexer = Arc::new(IndexService::new(
        repository.clone(),
        embedder.clone(),
        store.clone(),
        config.ml.batch_size,
    ));
    let search = Arc::new(SearchService::new(
        repository,
        embedder.clone(),
        store.clone(),
    ));

    let state = AppState {
        config,
        db,
        redis,
        embedder,
        store,
        indexer,
        search,
        tracker: RebuildTracker::new(),
    };

    let api_routes = api::routes(&state);

    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;

    let app = router
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone()));

    info!("Starting search API with graceful shutdown (30s timeout)");

    let server_config = state.config.server.clone();
    create_production_app(app, &server_config, Duration::from_secs(30), async move {
        info!("Shutting down: closing database connections");

        tokio::join!(
            async {
                match state.db.close().await {
                    Ok(_) => info!("PostgreSQL connection closed successfully"),
                    Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
                }
            },
            async {
                // ConnectionManager closes on drop
                drop(state.redis);
                info!("Redis connection closed successfully");
            }
        );
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Search API shutdown complete");
    Ok(())
}
