use std::sync::Arc;

use anyhow::Context;
use hugrelay::{
    AppState, app,
    config::Config,
    store::{DocumentStore, MemoryStore, SqliteStore},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log)))
        .init();

    let store: Arc<dyn DocumentStore> = if config.in_memory() {
        tracing::warn!("using in-memory store, nothing survives a restart");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(
            SqliteStore::connect(&config.database_url, config.max_db_connections)
                .await
                .with_context(|| format!("opening {}", config.database_url))?,
        )
    };

    let app = app(AppState::load(store).await);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    tracing::info!(address = %config.bind, "hugrelay listening");
    axum::serve(listener, app).await?;

    Ok(())
}
