use std::sync::Arc;

use catalog_hierarchy::core::config::Config;
use catalog_hierarchy::core::database;
use catalog_hierarchy::features::categories::{HierarchyService, PgCategoryStore};
use catalog_hierarchy::features::products::PgProductCatalog;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        "Configuration loaded: tokio_worker_threads={}, max_walk_steps={}",
        worker_threads,
        config.hierarchy.max_walk_steps
    );

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    tracing::info!("Running database migrations...");
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    let category_store = Arc::new(PgCategoryStore::new(pool.clone()));
    let product_catalog = Arc::new(PgProductCatalog::new(pool.clone()));
    let hierarchy_service =
        HierarchyService::new(category_store, product_catalog, &config.hierarchy);
    tracing::info!("Hierarchy service initialized");

    if config.hierarchy.audit_on_startup {
        let report = hierarchy_service
            .audit()
            .await
            .map_err(|e| anyhow::anyhow!("Category hierarchy audit failed: {}", e))?;
        tracing::info!(
            "Category hierarchy is consistent: {} categories in {} trees",
            report.total,
            report.roots
        );
    } else {
        tracing::info!("Startup audit disabled");
    }

    pool.close().await;

    Ok(())
}
