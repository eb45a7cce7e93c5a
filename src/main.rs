mod config;
mod db;
mod error;
mod registry;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use registry::ComponentRegistry;
use services::condition::{ConditionEvaluator, PredicateSet};
use services::persistence::{MemoryPageRepository, PageRepository, PgPageRepository};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env().expect("invalid configuration");

    let registry = Arc::new(ComponentRegistry::with_builtins(&config.component_asset_prefix));
    if let Some(path) = &config.component_catalog {
        match registry::catalog::load_catalog(path) {
            Ok(definitions) => {
                registry::catalog::register_catalog(&registry, definitions, &config.component_asset_prefix);
            }
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "component catalog not loaded"),
        }
    }
    if registry.is_empty() {
        tracing::warn!("no components registered; every page will render empty");
    }
    tracing::info!(components = registry.len(), "component registry ready");

    let repo: Arc<dyn PageRepository> = match &config.database_url {
        Some(url) => {
            let pool = db::init_pool(url, config.db_max_connections)
                .await
                .expect("database init failed");
            Arc::new(PgPageRepository::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; pages are kept in memory only");
            Arc::new(MemoryPageRepository::new())
        }
    };

    let evaluator = ConditionEvaluator::new(config.absent_context, PredicateSet::standard());
    let state = state::AppState::new(registry, repo, evaluator);

    state.pages.hydrate().await.expect("page hydration failed");
    if config.seed_demo_pages {
        state.pages.seed_demo_pages().await.expect("demo page seeding failed");
    }

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, "pagecraft listening");
    axum::serve(listener, app).await.expect("server failed");
}
